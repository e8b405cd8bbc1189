//! Infrastructure layer: config, artifact loading, record stores, external services.

pub mod artifacts;
pub mod config;
pub mod external;
pub mod records;

pub use artifacts::{load_artifacts, ArtifactError};
pub use config::{AppConfig, ConfigError};
pub use records::{load_seed, SeedError};

#[cfg(feature = "postgres")]
pub use records::postgres::PostgresRecordStore;
