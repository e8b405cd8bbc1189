//! Categorical encoding for region/crop labels.
//!
//! Codes follow label-encoder semantics: the trained classes are kept sorted
//! and a label's code is its index. Unseen labels never fail; they map to
//! [`DEFAULT_CODE`] and emit a warning.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::ModelError;

/// Code used for labels the encoder was never trained on.
pub const DEFAULT_CODE: usize = 0;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "LabelEncoderRepr", into = "LabelEncoderRepr")]
pub struct LabelEncoder {
    classes: Vec<String>,
}

#[derive(Serialize, Deserialize)]
struct LabelEncoderRepr {
    classes: Vec<String>,
}

impl From<LabelEncoderRepr> for LabelEncoder {
    fn from(value: LabelEncoderRepr) -> Self {
        Self::new(value.classes)
    }
}

impl From<LabelEncoder> for LabelEncoderRepr {
    fn from(value: LabelEncoder) -> Self {
        Self {
            classes: value.classes,
        }
    }
}

impl LabelEncoder {
    /// Build from trained labels. Duplicates are dropped and classes sorted.
    pub fn new<I, S>(classes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut classes: Vec<String> = classes.into_iter().map(Into::into).collect();
        classes.sort();
        classes.dedup();
        Self { classes }
    }

    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    /// Trained code for `value`, if any.
    pub fn code(&self, value: &str) -> Option<usize> {
        self.classes
            .binary_search_by(|c| c.as_str().cmp(value))
            .ok()
    }
}

/// Encoders keyed by field name (`"state"`, `"crop"`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EncoderTable {
    fields: BTreeMap<String, LabelEncoder>,
}

impl EncoderTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_field(mut self, field: impl Into<String>, encoder: LabelEncoder) -> Self {
        self.fields.insert(field.into(), encoder);
        self
    }

    pub fn field(&self, field: &str) -> Option<&LabelEncoder> {
        self.fields.get(field)
    }

    /// Encode `value` for `field`; never fails.
    pub fn encode(&self, field: &str, value: &str) -> usize {
        let Some(encoder) = self.fields.get(field) else {
            warn!(field, value, "no encoder trained for field; using default code");
            return DEFAULT_CODE;
        };

        match encoder.code(value) {
            Some(code) => code,
            None => {
                warn!(field, value, "unseen label; using default code");
                DEFAULT_CODE
            }
        }
    }

    /// Fail when `other` assigns different codes to any of `fields`.
    ///
    /// Two tables agree on a field only when their class lists are identical.
    pub fn ensure_consistent_with(
        &self,
        other: &EncoderTable,
        fields: &[&str],
    ) -> Result<(), ModelError> {
        for field in fields {
            let (Some(a), Some(b)) = (self.field(field), other.field(field)) else {
                return Err(ModelError::Incompatible(format!(
                    "encoder for {field:?} missing from one of the tables"
                )));
            };
            if a.classes() != b.classes() {
                let only_a: Vec<_> = a.classes().iter().filter(|c| b.code(c).is_none()).collect();
                let only_b: Vec<_> = b.classes().iter().filter(|c| a.code(c).is_none()).collect();
                return Err(ModelError::Incompatible(format!(
                    "encoders disagree on {field:?}: only in first {only_a:?}, only in second {only_b:?}"
                )));
            }
        }
        Ok(())
    }
}
