/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 12/6/26
******************************************************************************/

//! # FastWire
//!
//! A FAST (FIX Adapted for Streaming) protocol codec for Rust.
//!
//! FAST compresses streams of structured messages by conditioning each
//! field's wire form on previously transferred values: most fields of a
//! market-data update cost zero or one byte once the stream is warm.
//!
//! ## Features
//!
//! - **Stop-bit encoding**: self-delimiting fields, no length prefixes
//! - **Field operators**: constant, copy, default, delta, increment, tail
//! - **Exact decimals**: mantissa/exponent pairs, no floating point on the wire
//! - **Injected error policy**: strict-abort or lenient-continue per stream
//! - **Sync core**: plain `Read`/`Write`, adaptable to any transport
//!
//! ## Quick Start
//!
//! ```rust
//! use fastwire::prelude::*;
//! use std::io::Cursor;
//! use std::sync::Arc;
//!
//! let mut registry = BasicTemplateRegistry::new();
//! let template = registry
//!     .register(
//!         1,
//!         MessageTemplate::new("Quote")
//!             .with_field(Scalar::new("Symbol", FastType::Ascii, Operator::Copy, false))
//!             .with_field(Scalar::new("Bid", FastType::Decimal, Operator::Delta, false)),
//!     )
//!     .unwrap();
//! let registry: Arc<dyn TemplateRegistry> = Arc::new(registry);
//!
//! let mut message = Message::new(Arc::clone(&template));
//! message.set("Symbol", "MSFT").unwrap();
//! message.set("Bid", DecimalValue::new(50123, -2)).unwrap();
//!
//! let mut encoder = FastEncoder::new(Vec::new(), Arc::clone(&registry));
//! encoder.write_message(&message).unwrap();
//!
//! let mut decoder = FastDecoder::new(Cursor::new(encoder.into_inner()), registry);
//! let decoded = decoder.read_message().unwrap().unwrap();
//! assert_eq!(decoded, message);
//! ```
//!
//! ## Crate Organization
//!
//! - [`core`]: scalar values, exact decimals, types, and error definitions
//! - [`dictionary`]: prior-value state shared across a stream's messages
//! - [`codec`]: stop-bit wire primitives and presence maps
//! - [`template`]: field definitions, operators, templates, and contexts
//! - [`engine`]: the message-level encoder and decoder

pub mod core {
    //! Scalar values, exact decimals, types, and error definitions.
    pub use fastwire_core::*;
}

pub mod dictionary {
    //! Prior-value state shared across a stream's messages.
    pub use fastwire_dictionary::*;
}

pub mod codec {
    //! Stop-bit wire primitives and presence maps.
    pub use fastwire_codec::*;
}

pub mod template {
    //! Field definitions, operators, templates, and contexts.
    pub use fastwire_template::*;
}

pub mod engine {
    //! The message-level encoder and decoder.
    pub use fastwire_engine::*;
}

/// Prelude module for convenient imports.
pub mod prelude {
    // Core types
    pub use fastwire_core::{
        DecimalValue, DynError, ErrorAction, ErrorHandler, FastError, FastType,
        LoggingErrorHandler, QName, RepError, Result, ScalarValue, StaticError,
        StrictErrorHandler,
    };

    // Dictionary state
    pub use fastwire_dictionary::{Dictionary, DictionaryValue, FieldKey};

    // Wire primitives
    pub use fastwire_codec::{PresenceMapBuilder, PresenceMapReader};

    // Templates and values
    pub use fastwire_template::{
        BasicTemplateRegistry, Context, Field, FieldValue, Group, GroupValue, Message,
        MessageTemplate, Operator, Scalar, Sequence, SequenceValue, TemplateRegistry,
    };

    // Engine
    pub use fastwire_engine::{FastDecoder, FastEncoder, encode_message};
}

#[cfg(test)]
mod tests {
    use super::prelude::*;
    use std::io::Cursor;
    use std::sync::Arc;

    #[test]
    fn test_prelude_imports() {
        let _value = ScalarValue::UInt32(10);
        let _decimal = DecimalValue::new(942755, -2);
        let _operator = Operator::Copy;
        let _context = Context::new();
    }

    #[test]
    fn test_facade_round_trip() {
        let mut registry = BasicTemplateRegistry::new();
        let template = registry
            .register(
                1,
                MessageTemplate::new("Trade")
                    .with_field(Scalar::new("Symbol", FastType::Ascii, Operator::Copy, false))
                    .with_field(Scalar::new("Qty", FastType::U32, Operator::None, false)),
            )
            .unwrap();
        let registry: Arc<dyn TemplateRegistry> = Arc::new(registry);

        let mut message = Message::new(template);
        message.set("Symbol", "AAPL").unwrap();
        message.set("Qty", 250u32).unwrap();

        let mut encoder = FastEncoder::new(Vec::new(), Arc::clone(&registry));
        encoder.write_message(&message).unwrap();

        let mut decoder = FastDecoder::new(Cursor::new(encoder.into_inner()), registry);
        assert_eq!(decoder.read_message().unwrap().unwrap(), message);
        assert!(decoder.read_message().unwrap().is_none());
    }
}
