//! Named, multi-valued property.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use super::Scalar;

/// A property: a name plus an ordered sequence of typed values.
///
/// Multi-valued properties (tags and the like) are first-class. Blank values
/// never enter the sequence, so a property may legitimately hold zero values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Property {
    name: String,
    values: SmallVec<[Scalar; 1]>,
}

impl Property {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            values: SmallVec::new(),
        }
    }

    /// Single-valued convenience constructor.
    pub fn single(name: impl Into<String>, value: impl Into<Scalar>) -> Self {
        let mut property = Property::new(name);
        property.push(value.into());
        property
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Append a value. Blank values are silently dropped — a value is
    /// "present" only if its trimmed textual form is non-empty.
    pub fn push(&mut self, value: Scalar) {
        if value.is_blank() {
            return;
        }
        self.values.push(value);
    }

    pub fn with_value(mut self, value: impl Into<Scalar>) -> Self {
        self.push(value.into());
        self
    }

    pub fn values(&self) -> &[Scalar] {
        &self.values
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// The first value, or the default (empty string) when there is none.
    /// Never fails.
    pub fn first(&self) -> Scalar {
        self.values.first().cloned().unwrap_or_default()
    }
}
