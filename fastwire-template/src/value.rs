/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 12/6/26
******************************************************************************/

//! Decoded field content.
//!
//! Values mirror the field tree: a scalar holds one typed value, a group
//! holds one slot per inner field, and a sequence holds zero or more
//! group-shaped elements. Absent optional fields are `None` slots rather
//! than a value variant, so presence survives a round trip exactly.

use fastwire_core::ScalarValue;
use serde::{Deserialize, Serialize};

/// One field's content inside a message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FieldValue {
    /// A single typed value.
    Scalar(ScalarValue),
    /// The values of a nested group.
    Group(GroupValue),
    /// The elements of a sequence.
    Sequence(SequenceValue),
}

impl FieldValue {
    /// Returns the scalar inside, if this is one.
    #[must_use]
    pub fn as_scalar(&self) -> Option<&ScalarValue> {
        match self {
            Self::Scalar(value) => Some(value),
            _ => None,
        }
    }

    /// Returns the group inside, if this is one.
    #[must_use]
    pub fn as_group(&self) -> Option<&GroupValue> {
        match self {
            Self::Group(value) => Some(value),
            _ => None,
        }
    }

    /// Returns the sequence inside, if this is one.
    #[must_use]
    pub fn as_sequence(&self) -> Option<&SequenceValue> {
        match self {
            Self::Sequence(value) => Some(value),
            _ => None,
        }
    }

    /// A short label for diagnostics.
    #[must_use]
    pub const fn kind_name(&self) -> &'static str {
        match self {
            Self::Scalar(_) => "scalar",
            Self::Group(_) => "group",
            Self::Sequence(_) => "sequence",
        }
    }
}

impl From<ScalarValue> for FieldValue {
    fn from(value: ScalarValue) -> Self {
        Self::Scalar(value)
    }
}

impl From<GroupValue> for FieldValue {
    fn from(value: GroupValue) -> Self {
        Self::Group(value)
    }
}

impl From<SequenceValue> for FieldValue {
    fn from(value: SequenceValue) -> Self {
        Self::Sequence(value)
    }
}

macro_rules! scalar_from {
    ($($source:ty),* $(,)?) => {
        $(impl From<$source> for FieldValue {
            fn from(value: $source) -> Self {
                Self::Scalar(value.into())
            }
        })*
    };
}

scalar_from!(u32, i32, u64, i64, fastwire_core::DecimalValue, &str, String, bytes::Bytes);

/// One slot per field of a group or template body, in declaration order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GroupValue {
    values: Vec<Option<FieldValue>>,
}

impl GroupValue {
    /// Creates an empty value to be filled slot by slot.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a value with `len` absent slots.
    #[must_use]
    pub fn sized(len: usize) -> Self {
        Self {
            values: vec![None; len],
        }
    }

    /// Appends the next slot in declaration order.
    pub fn push(&mut self, value: Option<FieldValue>) {
        self.values.push(value);
    }

    /// Fills one slot, growing the value if needed.
    pub fn set(&mut self, index: usize, value: FieldValue) {
        if index >= self.values.len() {
            self.values.resize(index + 1, None);
        }
        self.values[index] = Some(value);
    }

    /// Reads one slot. Absent and out-of-range slots both read as `None`.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&FieldValue> {
        self.values.get(index).and_then(Option::as_ref)
    }

    /// Reads one slot as a scalar.
    #[must_use]
    pub fn scalar(&self, index: usize) -> Option<&ScalarValue> {
        self.get(index).and_then(FieldValue::as_scalar)
    }

    /// Number of slots.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// True when no slot exists.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterates the slots in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = Option<&FieldValue>> {
        self.values.iter().map(Option::as_ref)
    }
}

impl From<Vec<Option<FieldValue>>> for GroupValue {
    fn from(values: Vec<Option<FieldValue>>) -> Self {
        Self { values }
    }
}

/// The elements of a sequence, each shaped like the sequence's field list.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SequenceValue {
    elements: Vec<GroupValue>,
}

impl SequenceValue {
    /// Creates a sequence with no elements.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends one element.
    pub fn push(&mut self, element: GroupValue) {
        self.elements.push(element);
    }

    /// The elements in wire order.
    #[must_use]
    pub fn elements(&self) -> &[GroupValue] {
        &self.elements
    }

    /// Reads one element.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&GroupValue> {
        self.elements.get(index)
    }

    /// Number of elements.
    #[must_use]
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    /// True when the sequence has no elements.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }
}

impl From<Vec<GroupValue>> for SequenceValue {
    fn from(elements: Vec<GroupValue>) -> Self {
        Self { elements }
    }
}
