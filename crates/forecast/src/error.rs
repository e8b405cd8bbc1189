//! Error types for the resolution engine.
//!
//! Only [`ForecastError`] ever reaches callers of the engine; [`ModelError`]
//! and [`StoreError`] are absorbed inside single-month resolution.

use agrocast_core::DomainError;
use thiserror::Error;

pub type ForecastResult<T> = Result<T, ForecastError>;

/// Request-level failure. Raised before any resolution work begins.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ForecastError {
    #[error("validation failed: {0}")]
    Validation(String),
}

impl ForecastError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }
}

impl From<DomainError> for ForecastError {
    fn from(value: DomainError) -> Self {
        Self::Validation(value.to_string())
    }
}

/// Failure while assembling features or running a trained model.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ModelError {
    #[error("feature {0:?} missing from input record")]
    MissingFeature(String),

    #[error("expected {expected} features, got {got}")]
    FeatureCount { expected: usize, got: usize },

    #[error("non-finite value for feature {0:?}")]
    NonFinite(String),

    #[error("model produced a non-finite prediction")]
    NonFinitePrediction,

    #[error("malformed model: {0}")]
    Malformed(String),

    #[error("artifacts are incompatible: {0}")]
    Incompatible(String),
}

/// Failure talking to the record store.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("record store unavailable: {0}")]
    Unavailable(String),

    #[error("record store backend error: {0}")]
    Backend(String),
}
