//! `agrocast-core`: domain vocabulary shared by the engine, adapters and API.
//!
//! This crate contains **pure domain** primitives (no infrastructure concerns):
//! calendar months, resolved values and the records handed back to callers.

pub mod error;
pub mod month;
pub mod record;

pub use error::{DomainError, DomainResult};
pub use month::MonthKey;
pub use record::{round2, CropSnapshot, PredictionRecord, Provenance, Resolved, Signal};
