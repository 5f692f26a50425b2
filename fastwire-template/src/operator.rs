/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 12/6/26
******************************************************************************/

//! Field operators.
//!
//! An operator names the rule that relates a field's value to its
//! dictionary prior. The rule decides whether the field claims a presence
//! map bit, whether bytes appear on the wire at all, and whether the
//! dictionary entry moves.

use fastwire_core::FastType;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The FAST field operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Operator {
    /// No relation to prior values, the value always travels.
    #[default]
    None,
    /// The value is pinned at template definition time and never travels.
    Constant,
    /// The value travels only when it differs from the declared default.
    Default,
    /// The value travels only when it differs from the prior.
    Copy,
    /// The value travels only when it is not the prior plus one.
    Increment,
    /// The difference to the prior travels, without a presence map bit.
    Delta,
    /// Only the changed suffix travels.
    Tail,
}

impl Operator {
    /// Whether a field under this operator claims a presence map bit.
    ///
    /// Constant claims one only in the optional form, where the bit
    /// carries the presence of the field itself.
    #[must_use]
    pub const fn uses_pmap_bit(self, optional: bool) -> bool {
        match self {
            Self::None | Self::Delta => false,
            Self::Constant => optional,
            Self::Default | Self::Copy | Self::Increment | Self::Tail => true,
        }
    }

    /// Whether this operator reads or writes dictionary state.
    #[must_use]
    pub const fn uses_dictionary(self) -> bool {
        matches!(self, Self::Copy | Self::Increment | Self::Delta | Self::Tail)
    }

    /// Whether the operator is defined for a field type.
    ///
    /// Increment is an integer rule; tail works on the suffix of string
    /// and byte-vector content.
    #[must_use]
    pub const fn valid_for(self, fast_type: FastType) -> bool {
        match self {
            Self::Increment => fast_type.is_integer(),
            Self::Tail => matches!(
                fast_type,
                FastType::Ascii | FastType::Unicode | FastType::ByteVector
            ),
            _ => true,
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::None => "none",
            Self::Constant => "constant",
            Self::Default => "default",
            Self::Copy => "copy",
            Self::Increment => "increment",
            Self::Delta => "delta",
            Self::Tail => "tail",
        };
        write!(f, "{name}")
    }
}
