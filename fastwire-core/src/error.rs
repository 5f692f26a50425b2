/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 12/6/26
******************************************************************************/

//! Error types for the FastWire FAST codec.
//!
//! Errors fall into the three categories the FAST specification defines:
//! static errors (schema construction), dynamic errors (stream processing),
//! and representation errors (value conversion and range). A top-level
//! [`FastError`] unifies them with transport I/O errors.

use crate::types::FastType;
use thiserror::Error;

/// Result type alias using [`FastError`] as the error type.
pub type Result<T> = std::result::Result<T, FastError>;

/// Top-level error type for all FastWire operations.
#[derive(Debug, Error)]
pub enum FastError {
    /// Error raised while building a template schema.
    #[error("static error: {0}")]
    Static(#[from] StaticError),

    /// Error raised while encoding or decoding a stream.
    #[error("dynamic error: {0}")]
    Dynamic(#[from] DynError),

    /// Error raised while converting or range-checking a value.
    #[error("representation error: {0}")]
    Repr(#[from] RepError),

    /// I/O error from the underlying stream.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors detected when a template schema is built.
///
/// These never occur during streaming: an invalid field definition is
/// rejected before it can reach a stream.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StaticError {
    /// The operator cannot be applied to the field type.
    #[error("operator {operator} cannot be applied to type {fast_type}")]
    OperatorTypeMismatch {
        /// The offending operator name.
        operator: String,
        /// The field type it was applied to.
        fast_type: FastType,
    },

    /// A constant field was declared without an initial value.
    #[error("constant field {field} requires an initial value")]
    NoInitialValue {
        /// The field name.
        field: String,
    },

    /// A mandatory field with a default operator has no default value.
    #[error("mandatory field {field} with a default operator requires a default value")]
    MissingDefaultValue {
        /// The field name.
        field: String,
    },

    /// The declared default value does not match the field type.
    #[error("default value {value} does not match type {fast_type} for field {field}")]
    InvalidDefaultType {
        /// The field name.
        field: String,
        /// The declared field type.
        fast_type: FastType,
        /// The offending default value.
        value: String,
    },

    /// Two templates were registered under the same identifier.
    #[error("template id {id} is already registered")]
    DuplicateTemplateId {
        /// The contested identifier.
        id: u32,
    },
}

/// Errors detected while processing a stream.
///
/// Structural variants (EOF, malformed stop-bit data, unknown templates)
/// mean the stream position can no longer be trusted and always abort the
/// current message.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DynError {
    /// The stream ended in the middle of a message.
    #[error("unexpected end of stream")]
    UnexpectedEof,

    /// The stream referenced a template id that is not registered.
    #[error("unknown template id: {0}")]
    UnknownTemplate(u32),

    /// A message's template has no id in the registry.
    #[error("template {name} is not registered")]
    TemplateNotRegistered {
        /// The template name.
        name: String,
    },

    /// The stream reuses the previous template id before any was sent.
    #[error("stream reuses the previous template id but none has been seen")]
    MissingTemplateId,

    /// A template id larger than the unsigned 32-bit range was decoded.
    #[error("template id {0} exceeds the unsigned 32-bit range")]
    TemplateIdOutOfRange(u64),

    /// A mandatory field had no value to encode or decode.
    #[error("mandatory field {field} has no value")]
    MandatoryFieldAbsent {
        /// The field name.
        field: String,
    },

    /// An absent field could not be reconstructed: no prior value, no default.
    #[error("field {field} has no prior value and no default to fall back on")]
    NoPriorValue {
        /// The field name.
        field: String,
    },

    /// A delta arrived while the prior value is the empty state.
    #[error("delta for field {field} arrived while the prior value is empty")]
    EmptyPriorValue {
        /// The field name.
        field: String,
    },

    /// The value cannot be encoded under the field's operator.
    #[error("cannot encode value {value} for field {field}: {reason}")]
    CantEncodeValue {
        /// The field name.
        field: String,
        /// Display form of the offending value.
        value: String,
        /// Why the operator rejected it.
        reason: String,
    },

    /// A value of the wrong kind was used where another was expected.
    #[error("expected a {expected} value, found {actual}")]
    InvalidType {
        /// The expected value kind.
        expected: String,
        /// The actual value kind or display form.
        actual: String,
    },

    /// A dictionary prior does not match the field type that reads it.
    #[error("prior value {value} for field {field} does not match the field type")]
    InvalidPriorValue {
        /// The field name.
        field: String,
        /// Display form of the prior value.
        value: String,
    },

    /// A string-delta subtraction length exceeds the base value length.
    #[error("string delta subtraction {subtraction} exceeds base length {length}")]
    SubtractionOutOfRange {
        /// The subtraction length from the wire.
        subtraction: i64,
        /// The base value length it was applied to.
        length: usize,
    },

    /// A field index was read from a message that does not carry it.
    #[error("field {index} is not present in this message")]
    FieldNotPresent {
        /// The field index within the message.
        index: usize,
    },

    /// A field name was used that the template does not define.
    #[error("template does not define a field named {name}")]
    UnknownField {
        /// The requested field name.
        name: String,
    },

    /// A stop-bit integer accumulated more than 64 bits.
    #[error("stop-bit integer overflows 64 bits")]
    IntegerOverflow,

    /// An ascii field contained bytes outside the 7-bit range.
    #[error("string contains bytes outside the ascii range")]
    InvalidString,

    /// A unicode field contained invalid UTF-8.
    #[error("invalid utf-8 in unicode field")]
    InvalidUtf8,

    /// A string used a zero-padded form longer than the canonical encoding.
    #[error("overlong string encoding")]
    OverlongEncoding,
}

/// Errors detected while converting or range-checking values.
///
/// These are recoverable at the call site: the stream position is intact
/// and the operation can continue with a defined fallback when the error
/// handler allows it.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RepError {
    /// A numeric value does not fit the requested representation.
    #[error("numeric value {value} cannot be represented as {target}")]
    NumericOverflow {
        /// Display form of the value.
        value: String,
        /// The representation that rejected it.
        target: &'static str,
    },

    /// A decimal with a fractional part was converted to an integer.
    #[error("decimal value {value} cannot be converted to an integer")]
    DecimalCantConvertToInt {
        /// Display form of the decimal.
        value: String,
    },

    /// A decimal exponent is outside the wire range.
    #[error("decimal exponent {exponent} is outside the range [-63, 63]")]
    ExponentOutOfRange {
        /// The offending exponent.
        exponent: i32,
    },
}

/// What the codec should do after a recoverable error is reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ErrorAction {
    /// Propagate the error and abort the current message.
    #[default]
    Abort,
    /// Continue with the operation's defined fallback value.
    Continue,
}

/// Receives recoverable codec errors and decides whether processing
/// continues.
///
/// Structural dynamic errors never reach the handler: once the stream
/// position is unreliable there is nothing sensible to continue with.
pub trait ErrorHandler: std::fmt::Debug {
    /// Called with a recoverable error; the returned action decides
    /// whether the codec aborts or proceeds with a fallback.
    fn on_error(&self, error: &FastError) -> ErrorAction;
}

/// The default handler: every reported error aborts.
#[derive(Debug, Clone, Copy, Default)]
pub struct StrictErrorHandler;

impl ErrorHandler for StrictErrorHandler {
    fn on_error(&self, _error: &FastError) -> ErrorAction {
        ErrorAction::Abort
    }
}

/// A lenient handler that logs reported errors and continues with the
/// fallback value.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingErrorHandler;

impl ErrorHandler for LoggingErrorHandler {
    fn on_error(&self, error: &FastError) -> ErrorAction {
        tracing::warn!(%error, "recoverable codec error, continuing with fallback");
        ErrorAction::Continue
    }
}
