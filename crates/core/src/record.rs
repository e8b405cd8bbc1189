//! Resolved values and the records returned to callers.

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};

use crate::month::MonthKey;

/// Where a resolved value came from.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Provenance {
    /// Read from the record store.
    Stored,
    /// Produced by model inference.
    Inferred,
    /// Inference failed; a fixed fallback value was substituted.
    Fallback,
}

/// A value paired with its provenance.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Resolved<T> {
    pub value: T,
    pub provenance: Provenance,
}

impl<T> Resolved<T> {
    pub fn stored(value: T) -> Self {
        Self {
            value,
            provenance: Provenance::Stored,
        }
    }

    pub fn inferred(value: T) -> Self {
        Self {
            value,
            provenance: Provenance::Inferred,
        }
    }

    pub fn fallback(value: T) -> Self {
        Self {
            value,
            provenance: Provenance::Fallback,
        }
    }
}

/// The two signals the engine resolves.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Signal {
    Price,
    Demand,
}

impl Signal {
    pub fn as_str(&self) -> &'static str {
        match self {
            Signal::Price => "price",
            Signal::Demand => "demand",
        }
    }
}

/// One labelled month in a forecast or history sequence.
///
/// Serializes as `{"month": "March 2024", "price": 12.34}` (or `"demand"`).
/// The key and provenance stay internal.
#[derive(Debug, Clone, PartialEq)]
pub struct PredictionRecord {
    pub key: MonthKey,
    pub signal: Signal,
    pub value: f64,
    pub provenance: Provenance,
}

impl PredictionRecord {
    /// Build a record; the value is rounded to 2 decimals regardless of provenance.
    pub fn new(key: MonthKey, signal: Signal, resolved: Resolved<f64>) -> Self {
        Self {
            key,
            signal,
            value: round2(resolved.value),
            provenance: resolved.provenance,
        }
    }

    pub fn label(&self) -> String {
        self.key.label()
    }
}

impl Serialize for PredictionRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(2))?;
        map.serialize_entry("month", &self.label())?;
        map.serialize_entry(self.signal.as_str(), &self.value)?;
        map.end()
    }
}

/// Per-crop summary produced by the cross-crop snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CropSnapshot {
    pub name: String,
    pub previous_month_price: f64,
    pub next_month_price: f64,
    pub previous_month_demand: f64,
    pub next_month_demand: f64,
}

/// Round half away from zero to 2 decimal places.
pub fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}
