//! Named, ordered model inputs.

use crate::error::ModelError;

/// A single row of named features.
///
/// Insertion order is kept, but models never rely on it: [`select`](Self::select)
/// reorders to the trained feature order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeatureRecord {
    fields: Vec<(&'static str, f64)>,
}

impl FeatureRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set `name`, replacing any previous value.
    pub fn with(mut self, name: &'static str, value: f64) -> Self {
        self.set(name, value);
        self
    }

    pub fn set(&mut self, name: &'static str, value: f64) {
        match self.fields.iter_mut().find(|(k, _)| *k == name) {
            Some((_, v)) => *v = value,
            None => self.fields.push((name, value)),
        }
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        self.fields.iter().find(|(k, _)| *k == name).map(|(_, v)| *v)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut f64> {
        self.fields.iter_mut().find(|(k, _)| *k == name).map(|(_, v)| v)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Values in exactly the order of `names`; fails if any name is missing
    /// or holds a non-finite value.
    pub fn select<S: AsRef<str>>(&self, names: &[S]) -> Result<Vec<f64>, ModelError> {
        names
            .iter()
            .map(|name| {
                let name = name.as_ref();
                let value = self
                    .get(name)
                    .ok_or_else(|| ModelError::MissingFeature(name.to_string()))?;
                if value.is_finite() {
                    Ok(value)
                } else {
                    Err(ModelError::NonFinite(name.to_string()))
                }
            })
            .collect()
    }
}
