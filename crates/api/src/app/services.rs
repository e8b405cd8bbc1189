//! Service wiring: artifacts, record store, engine, generative-AI client.

use std::sync::Arc;

use agrocast_forecast::{FeatureProviders, ForecastEngine, InMemoryRecordStore, RecordStore};
use agrocast_infra::config::{AppConfig, RecordSource};
use agrocast_infra::external::{ContentGenerator, GeminiClient};
use agrocast_infra::{load_artifacts, load_seed};
use anyhow::Context;
use axum::response::Response;
use tracing::{error, info, warn};

use crate::app::errors;

/// Shared, immutable services handed to every request.
#[derive(Clone)]
pub struct AppServices {
    pub engine: Arc<ForecastEngine>,
    /// `None` when no API key is configured.
    pub generator: Option<Arc<dyn ContentGenerator>>,
}

impl AppServices {
    pub fn new(engine: ForecastEngine, generator: Option<Arc<dyn ContentGenerator>>) -> Self {
        Self {
            engine: Arc::new(engine),
            generator,
        }
    }
}

pub async fn build_services(config: &AppConfig) -> anyhow::Result<AppServices> {
    let artifacts = load_artifacts(&config.artifacts_dir, config.strict_encoders)
        .with_context(|| format!("loading model artifacts from {}", config.artifacts_dir.display()))?;

    let store = build_record_store(&config.records).await?;

    if let Some(seed) = config.feature_seed {
        info!(seed, "synthetic features are seeded");
    }
    let engine = ForecastEngine::new(
        store,
        Arc::new(artifacts),
        FeatureProviders::synthetic(config.feature_seed),
        config.engine.clone(),
    );

    let generator = match &config.gemini {
        Some(gemini) => {
            let client = GeminiClient::new(gemini).context("building generator client")?;
            info!(endpoint = client.endpoint(), "generative-AI routes enabled");
            Some(Arc::new(client) as Arc<dyn ContentGenerator>)
        }
        None => {
            warn!("GEMINI_API_KEY not set; disease and fertilizer routes will return 503");
            None
        }
    };

    Ok(AppServices::new(engine, generator))
}

async fn build_record_store(source: &RecordSource) -> anyhow::Result<Arc<dyn RecordStore>> {
    match source {
        RecordSource::InMemory { seed: Some(path) } => {
            let store = load_seed(path)?;
            Ok(Arc::new(store))
        }
        RecordSource::InMemory { seed: None } => {
            warn!("no record seed configured; every value will be inferred");
            Ok(Arc::new(InMemoryRecordStore::new()))
        }
        #[cfg(feature = "postgres")]
        RecordSource::Postgres { database_url } => {
            let store = agrocast_infra::PostgresRecordStore::connect(database_url)
                .await
                .context("connecting to postgres record store")?;
            Ok(Arc::new(store))
        }
        #[cfg(not(feature = "postgres"))]
        RecordSource::Postgres { .. } => {
            anyhow::bail!("USE_PERSISTENT_STORES=true but the postgres feature is not enabled")
        }
    }
}

/// Run engine work on the blocking pool, inside the caller's span.
///
/// Record stores may block on I/O, so resolution never runs on a runtime worker.
pub async fn blocking<T, F>(f: F) -> Result<T, Response>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    let span = tracing::Span::current();
    tokio::task::spawn_blocking(move || span.in_scope(f))
        .await
        .map_err(|e| {
            error!(error = %e, "resolution task failed");
            errors::internal_error("resolution task failed")
        })
}
