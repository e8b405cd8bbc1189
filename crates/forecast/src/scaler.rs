//! Frozen standardization for the demand model's numeric features.

use serde::{Deserialize, Serialize};

use crate::error::ModelError;
use crate::feature_record::FeatureRecord;

/// `(x - mean) / scale`, fit once offline and read-only at serving time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ScalerRepr", into = "ScalerRepr")]
pub struct StandardScaler {
    columns: Vec<String>,
    mean: Vec<f64>,
    scale: Vec<f64>,
}

#[derive(Serialize, Deserialize)]
struct ScalerRepr {
    columns: Vec<String>,
    mean: Vec<f64>,
    scale: Vec<f64>,
}

impl TryFrom<ScalerRepr> for StandardScaler {
    type Error = ModelError;

    fn try_from(value: ScalerRepr) -> Result<Self, Self::Error> {
        Self::new(value.columns, value.mean, value.scale)
    }
}

impl From<StandardScaler> for ScalerRepr {
    fn from(value: StandardScaler) -> Self {
        Self {
            columns: value.columns,
            mean: value.mean,
            scale: value.scale,
        }
    }
}

impl StandardScaler {
    /// Zero scales (constant training columns) are treated as 1.
    pub fn new(columns: Vec<String>, mean: Vec<f64>, scale: Vec<f64>) -> Result<Self, ModelError> {
        if columns.len() != mean.len() || columns.len() != scale.len() {
            return Err(ModelError::Malformed(format!(
                "scaler has {} columns, {} means and {} scales",
                columns.len(),
                mean.len(),
                scale.len()
            )));
        }
        if mean.iter().chain(scale.iter()).any(|v| !v.is_finite()) {
            return Err(ModelError::Malformed("scaler parameters must be finite".into()));
        }

        let scale = scale
            .into_iter()
            .map(|s| if s == 0.0 { 1.0 } else { s })
            .collect();

        Ok(Self {
            columns,
            mean,
            scale,
        })
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Scale exactly the scaler's columns in `record`, in place.
    pub fn transform(&self, record: &mut FeatureRecord) -> Result<(), ModelError> {
        for ((column, mean), scale) in self.columns.iter().zip(&self.mean).zip(&self.scale) {
            let value = record
                .get_mut(column)
                .ok_or_else(|| ModelError::MissingFeature(column.clone()))?;
            *value = (*value - mean) / scale;
        }
        Ok(())
    }
}
