//! The engine facade used by the orchestration layer.

use std::sync::Arc;

use agrocast_core::{CropSnapshot, MonthKey, PredictionRecord, Signal};
use tracing::info;

use crate::artifacts::ModelArtifacts;
use crate::demand::DemandResolver;
use crate::error::ForecastResult;
use crate::features::{MarketProvider, SyntheticFeatures, WeatherProvider};
use crate::price::PriceResolver;
use crate::request::{AnchorRequest, RangeRequest, SnapshotRequest};
use crate::store::{Absence, RecordStore, StoreGateway};
use crate::{snapshot, walker};

/// Tunables fixed at startup.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineSettings {
    pub fallback_price: f64,
    pub fallback_demand: f64,
    /// Number of months a history walks back, anchor included.
    pub history_len: usize,
    /// Longest forecast range accepted, in months.
    pub max_forecast_months: u32,
    /// Absence rule for the cross-crop snapshot.
    pub snapshot_absence: Absence,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            fallback_price: 100.0,
            fallback_demand: 100.0,
            history_len: 6,
            max_forecast_months: 120,
            snapshot_absence: Absence::MissingOrZero,
        }
    }
}

/// Weather and market feature sources.
#[derive(Clone)]
pub struct FeatureProviders {
    pub weather: Arc<dyn WeatherProvider>,
    pub market: Arc<dyn MarketProvider>,
}

impl FeatureProviders {
    pub fn new(weather: Arc<dyn WeatherProvider>, market: Arc<dyn MarketProvider>) -> Self {
        Self { weather, market }
    }

    /// Random stand-ins; deterministic when `seed` is set.
    pub fn synthetic(seed: Option<u64>) -> Self {
        let provider = Arc::new(match seed {
            Some(seed) => SyntheticFeatures::seeded(seed),
            None => SyntheticFeatures::new(),
        });
        Self {
            weather: provider.clone(),
            market: provider,
        }
    }
}

/// Resolution engine: forecasts, histories and cross-crop snapshots.
///
/// Immutable after construction; share it behind an `Arc`.
#[derive(Clone)]
pub struct ForecastEngine {
    store: StoreGateway,
    price: PriceResolver,
    demand: DemandResolver,
    settings: EngineSettings,
}

impl ForecastEngine {
    pub fn new(
        store: Arc<dyn RecordStore>,
        artifacts: Arc<ModelArtifacts>,
        features: FeatureProviders,
        settings: EngineSettings,
    ) -> Self {
        let store = StoreGateway::new(store);
        let price = PriceResolver::new(
            store.clone(),
            artifacts.clone(),
            features.weather,
            settings.fallback_price,
        );
        let demand = DemandResolver::new(
            store.clone(),
            price.clone(),
            artifacts,
            features.market,
            settings.fallback_demand,
        );

        Self {
            store,
            price,
            demand,
            settings,
        }
    }

    pub fn price_resolver(&self) -> &PriceResolver {
        &self.price
    }

    pub fn demand_resolver(&self) -> &DemandResolver {
        &self.demand
    }

    /// One price record per month from `start` to `end` inclusive.
    pub fn forecast_price(
        &self,
        region: &str,
        crop: &str,
        start: MonthKey,
        end: MonthKey,
    ) -> ForecastResult<Vec<PredictionRecord>> {
        let months = walker::forward(start, end, self.settings.max_forecast_months)?;
        info!(region, crop, %start, %end, months = months.len(), "forecasting price");
        Ok(walker::label(months, Signal::Price, |m| self.price.resolve(region, crop, m)))
    }

    /// One demand record per month from `start` to `end` inclusive.
    pub fn forecast_demand(
        &self,
        region: &str,
        crop: &str,
        start: MonthKey,
        end: MonthKey,
    ) -> ForecastResult<Vec<PredictionRecord>> {
        let months = walker::forward(start, end, self.settings.max_forecast_months)?;
        info!(region, crop, %start, %end, months = months.len(), "forecasting demand");
        Ok(walker::label(months, Signal::Demand, |m| self.demand.resolve(region, crop, m)))
    }

    /// Price for the anchor month and the months before it, most recent first.
    pub fn history_price(&self, region: &str, crop: &str, anchor: MonthKey) -> Vec<PredictionRecord> {
        info!(region, crop, %anchor, "resolving price history");
        let months = walker::backward(anchor, self.settings.history_len);
        walker::label(months, Signal::Price, |m| self.price.resolve(region, crop, m))
    }

    /// Demand for the anchor month and the months before it, most recent first.
    pub fn history_demand(&self, region: &str, crop: &str, anchor: MonthKey) -> Vec<PredictionRecord> {
        info!(region, crop, %anchor, "resolving demand history");
        let months = walker::backward(anchor, self.settings.history_len);
        walker::label(months, Signal::Demand, |m| self.demand.resolve(region, crop, m))
    }

    /// Price and demand for two months across every crop stored for `region`.
    pub fn snapshot(&self, region: &str, previous: MonthKey, next: MonthKey) -> Vec<CropSnapshot> {
        info!(region, %previous, %next, "building crop snapshot");
        snapshot::snapshot(
            &self.store,
            &self.price,
            &self.demand,
            region,
            previous,
            next,
            self.settings.snapshot_absence,
        )
    }

    /// Validate and run a forecast request for `signal`.
    pub fn forecast(&self, signal: Signal, request: &RangeRequest) -> ForecastResult<Vec<PredictionRecord>> {
        let q = request.validate()?;
        match signal {
            Signal::Price => self.forecast_price(&q.region, &q.crop, q.start, q.end),
            Signal::Demand => self.forecast_demand(&q.region, &q.crop, q.start, q.end),
        }
    }

    /// Validate and run a history request for `signal`.
    pub fn history(&self, signal: Signal, request: &AnchorRequest) -> ForecastResult<Vec<PredictionRecord>> {
        let q = request.validate()?;
        Ok(match signal {
            Signal::Price => self.history_price(&q.region, &q.crop, q.anchor),
            Signal::Demand => self.history_demand(&q.region, &q.crop, q.anchor),
        })
    }

    /// Validate and run a snapshot request.
    pub fn snapshot_request(&self, request: &SnapshotRequest) -> ForecastResult<Vec<CropSnapshot>> {
        let q = request.validate()?;
        Ok(self.snapshot(&q.region, q.previous, q.next))
    }
}
