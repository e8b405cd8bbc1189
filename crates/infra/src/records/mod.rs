//! Record store adapters.
//!
//! The in-memory store lives in `agrocast-forecast`; this module seeds it
//! from a JSON export and provides the Postgres-backed store.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use agrocast_core::MonthKey;
use agrocast_forecast::{InMemoryRecordStore, MonthRecord};
use thiserror::Error;
use tracing::info;

#[cfg(feature = "postgres")]
pub mod postgres;

/// `{ "<region>": { "<crop>": { "MM-YYYY": {"price": f, "demand": f} } } }`
pub type SeedFile = BTreeMap<String, BTreeMap<String, BTreeMap<MonthKey, MonthRecord>>>;

#[derive(Debug, Error)]
pub enum SeedError {
    #[error("failed to read record seed {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse record seed {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Build an in-memory store from a JSON seed file.
pub fn load_seed(path: impl AsRef<Path>) -> Result<InMemoryRecordStore, SeedError> {
    let path = path.as_ref();
    let bytes = fs::read(path).map_err(|source| SeedError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let seed: SeedFile = serde_json::from_slice(&bytes).map_err(|source| SeedError::Parse {
        path: path.to_path_buf(),
        source,
    })?;

    let store = seed_store(seed);
    info!(path = %path.display(), records = store.len(), "record store seeded");
    Ok(store)
}

pub fn seed_store(seed: SeedFile) -> InMemoryRecordStore {
    let store = InMemoryRecordStore::new();
    for (region, crops) in seed {
        for (crop, months) in crops {
            for (month, record) in months {
                store.insert(region.as_str(), crop.as_str(), month, record);
            }
        }
    }
    store
}

#[cfg(test)]
mod tests {
    use agrocast_forecast::RecordStore;

    use super::*;

    #[test]
    fn seed_file_populates_store() {
        let path = std::env::temp_dir().join(format!("agrocast-seed-{}.json", uuid::Uuid::now_v7()));
        fs::write(
            &path,
            r#"{
                "Bihar": {
                    "Rice": {"03-2024": {"price": 31.5, "demand": 640}, "04-2024": {"price": 33}},
                    "Wheat": {"03-2024": {"demand": 410}}
                }
            }"#,
        )
        .unwrap();

        let store = load_seed(&path).unwrap();
        let _ = fs::remove_file(&path);

        let march = MonthKey::new(2024, 3).unwrap();
        let april = MonthKey::new(2024, 4).unwrap();
        assert_eq!(store.len(), 3);
        assert_eq!(
            store.get("Bihar", "Rice", march).unwrap(),
            Some(MonthRecord::new(Some(31.5), Some(640.0)))
        );
        assert_eq!(store.get("Bihar", "Rice", april).unwrap().unwrap().demand, None);
        assert_eq!(store.crops("Bihar").unwrap(), vec!["Rice", "Wheat"]);
    }

    #[test]
    fn bad_month_key_is_a_parse_error() {
        let path = std::env::temp_dir().join(format!("agrocast-seed-{}.json", uuid::Uuid::now_v7()));
        fs::write(&path, r#"{"Bihar": {"Rice": {"2024-03": {"price": 1}}}}"#).unwrap();

        let err = load_seed(&path).unwrap_err();
        let _ = fs::remove_file(&path);
        assert!(matches!(err, SeedError::Parse { .. }));
    }

    #[test]
    fn bundled_sample_seed_loads() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../data/records.sample.json");
        let store = load_seed(path).unwrap();
        assert_eq!(store.crops("Punjab").unwrap(), vec!["Rice", "Wheat"]);
        let feb = MonthKey::new(2024, 2).unwrap();
        assert_eq!(store.get("Punjab", "Rice", feb).unwrap().unwrap().demand, Some(0.0));
    }

    #[test]
    fn missing_seed_is_an_io_error() {
        let err = load_seed("/nonexistent/agrocast/seed.json").unwrap_err();
        assert!(matches!(err, SeedError::Io { .. }));
    }
}
