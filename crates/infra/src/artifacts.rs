//! Loads exported model artifacts from a directory.
//!
//! Expected files: `price_model.json`, `demand_model.json`, `scaler.json`,
//! `price_encoders.json`, `demand_encoders.json`.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use agrocast_forecast::{EncoderTable, ForestRegressor, ModelArtifacts, ModelError, StandardScaler};
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{info, warn};

pub const PRICE_MODEL_FILE: &str = "price_model.json";
pub const DEMAND_MODEL_FILE: &str = "demand_model.json";
pub const SCALER_FILE: &str = "scaler.json";
pub const PRICE_ENCODERS_FILE: &str = "price_encoders.json";
pub const DEMAND_ENCODERS_FILE: &str = "demand_encoders.json";

#[derive(Debug, Error)]
pub enum ArtifactError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error(transparent)]
    Model(#[from] ModelError),
}

/// Read and validate every artifact in `dir`.
///
/// With `strict_encoders`, price and demand encoders that disagree on a code
/// abort the load; otherwise the mismatch is only logged.
pub fn load_artifacts(dir: impl AsRef<Path>, strict_encoders: bool) -> Result<ModelArtifacts, ArtifactError> {
    let dir = dir.as_ref();

    let price_model: ForestRegressor = read_json(&dir.join(PRICE_MODEL_FILE))?;
    let demand_model: ForestRegressor = read_json(&dir.join(DEMAND_MODEL_FILE))?;
    let scaler: StandardScaler = read_json(&dir.join(SCALER_FILE))?;
    let price_encoders: EncoderTable = read_json(&dir.join(PRICE_ENCODERS_FILE))?;
    let demand_encoders: EncoderTable = read_json(&dir.join(DEMAND_ENCODERS_FILE))?;

    info!(
        dir = %dir.display(),
        price_trees = price_model.n_trees(),
        demand_trees = demand_model.n_trees(),
        "model artifacts read"
    );

    let artifacts = ModelArtifacts::new(
        Arc::new(price_model),
        Arc::new(demand_model),
        scaler,
        price_encoders,
        demand_encoders,
    )?;

    if let Err(e) = artifacts.ensure_encoders_consistent() {
        if strict_encoders {
            return Err(e.into());
        }
        warn!(error = %e, "price and demand encoders disagree; continuing");
    }

    Ok(artifacts)
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, ArtifactError> {
    let bytes = fs::read(path).map_err(|source| ArtifactError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_slice(&bytes).map_err(|source| ArtifactError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use agrocast_forecast::{Regressor, PRICE_FEATURES};
    use serde_json::json;

    use super::*;

    struct TempDir(PathBuf);

    impl TempDir {
        fn new() -> Self {
            let path = std::env::temp_dir().join(format!("agrocast-artifacts-{}", uuid::Uuid::now_v7()));
            fs::create_dir_all(&path).unwrap();
            Self(path)
        }

        fn write(&self, name: &str, value: serde_json::Value) {
            fs::write(self.0.join(name), serde_json::to_vec(&value).unwrap()).unwrap();
        }
    }

    impl Drop for TempDir {
        fn drop(&mut self) {
            let _ = fs::remove_dir_all(&self.0);
        }
    }

    fn stump(feature: usize, threshold: f64, lo: f64, hi: f64) -> serde_json::Value {
        json!({"nodes": [
            {"feature": feature, "threshold": threshold, "left": 1, "right": 2},
            {"value": lo},
            {"value": hi},
        ]})
    }

    fn write_valid(dir: &TempDir) {
        dir.write(
            PRICE_MODEL_FILE,
            json!({"feature_names": PRICE_FEATURES, "trees": [stump(3, 6.0, 20.0, 40.0), json!({"nodes": [{"value": 30.0}]})]}),
        );
        dir.write(
            DEMAND_MODEL_FILE,
            json!({"feature_names": ["price", "supply"], "trees": [stump(0, 0.0, 900.0, 700.0)]}),
        );
        dir.write(
            SCALER_FILE,
            json!({"columns": ["price", "marketing_spend", "competitor_price", "supply"],
                   "mean": [30.0, 30000.0, 30.0, 1250.0],
                   "scale": [10.0, 11000.0, 11.0, 430.0]}),
        );
        let encoders = json!({"state": {"classes": ["Bihar", "Punjab"]}, "crop": {"classes": ["Rice", "Wheat"]}});
        dir.write(PRICE_ENCODERS_FILE, encoders.clone());
        dir.write(DEMAND_ENCODERS_FILE, encoders);
    }

    #[test]
    fn loads_a_complete_directory() {
        let dir = TempDir::new();
        write_valid(&dir);

        let artifacts = load_artifacts(&dir.0, true).unwrap();
        let row = [0.0, 0.0, 2024.0, 3.0, 30.0, 100.0, 0.3, 0.5];
        // (20 + 30) / 2
        assert_eq!(artifacts.price_model().predict(&row).unwrap(), 25.0);
        assert_eq!(artifacts.price_encoders().encode("state", "Punjab"), 1);
    }

    #[test]
    fn bundled_sample_artifacts_load() {
        let dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../artifacts");
        let artifacts = load_artifacts(dir, true).unwrap();
        assert_eq!(artifacts.price_model().feature_names(), PRICE_FEATURES);
        assert_eq!(artifacts.demand_encoders().encode("crop", "Wheat"), 3);
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let dir = TempDir::new();
        write_valid(&dir);
        fs::remove_file(dir.0.join(SCALER_FILE)).unwrap();

        let err = load_artifacts(&dir.0, true).unwrap_err();
        assert!(matches!(err, ArtifactError::Io { ref path, .. } if path.ends_with(SCALER_FILE)));
    }

    #[test]
    fn malformed_tree_is_rejected_at_parse_time() {
        let dir = TempDir::new();
        write_valid(&dir);
        dir.write(
            DEMAND_MODEL_FILE,
            json!({"feature_names": ["price"], "trees": [stump(4, 0.0, 1.0, 2.0)]}),
        );

        let err = load_artifacts(&dir.0, true).unwrap_err();
        assert!(matches!(err, ArtifactError::Parse { .. }));
    }

    #[test]
    fn price_model_must_use_price_features() {
        let dir = TempDir::new();
        write_valid(&dir);
        dir.write(
            PRICE_MODEL_FILE,
            json!({"feature_names": ["month"], "trees": [json!({"nodes": [{"value": 1.0}]})]}),
        );

        let err = load_artifacts(&dir.0, true).unwrap_err();
        assert!(matches!(err, ArtifactError::Model(ModelError::Incompatible(_))));
    }

    #[test]
    fn encoder_mismatch_respects_strictness() {
        let dir = TempDir::new();
        write_valid(&dir);
        dir.write(
            DEMAND_ENCODERS_FILE,
            json!({"state": {"classes": ["Assam", "Bihar", "Punjab"]}, "crop": {"classes": ["Rice", "Wheat"]}}),
        );

        assert!(matches!(
            load_artifacts(&dir.0, true),
            Err(ArtifactError::Model(_))
        ));
        assert!(load_artifacts(&dir.0, false).is_ok());
    }
}
