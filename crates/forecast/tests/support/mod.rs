//! Shared fixtures: linear stand-in models, fixed features, counting stores.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use agrocast_core::MonthKey;
use agrocast_forecast::{
    EncoderTable, EngineSettings, FeatureProviders, ForecastEngine, InMemoryRecordStore, LabelEncoder,
    MarketFeatures, MarketProvider, ModelArtifacts, ModelError, MonthRecord, RecordStore, Regressor,
    StandardScaler, StoreError, WeatherFeatures, WeatherProvider, PRICE_FEATURES,
};

/// `bias + sum(w_i * x_i)` over named features.
#[derive(Debug)]
pub struct Linear {
    names: Vec<String>,
    weights: Vec<f64>,
    bias: f64,
}

impl Linear {
    pub fn new(terms: &[(&str, f64)], bias: f64) -> Self {
        Self {
            names: terms.iter().map(|(n, _)| n.to_string()).collect(),
            weights: terms.iter().map(|(_, w)| *w).collect(),
            bias,
        }
    }
}

impl Regressor for Linear {
    fn feature_names(&self) -> &[String] {
        &self.names
    }

    fn predict(&self, row: &[f64]) -> Result<f64, ModelError> {
        if row.len() != self.names.len() {
            return Err(ModelError::FeatureCount {
                expected: self.names.len(),
                got: row.len(),
            });
        }
        Ok(self.bias + row.iter().zip(&self.weights).map(|(x, w)| x * w).sum::<f64>())
    }
}

/// Model that always fails.
#[derive(Debug)]
pub struct Broken {
    names: Vec<String>,
}

impl Broken {
    pub fn with_names(names: &[&str]) -> Self {
        Self {
            names: names.iter().map(|n| n.to_string()).collect(),
        }
    }
}

impl Regressor for Broken {
    fn feature_names(&self) -> &[String] {
        &self.names
    }

    fn predict(&self, _row: &[f64]) -> Result<f64, ModelError> {
        Err(ModelError::NonFinitePrediction)
    }
}

/// price = state + 10 * crop + month + temperature
pub fn price_model() -> Linear {
    let weights = [1.0, 10.0, 0.0, 1.0, 1.0, 0.0, 0.0, 0.0];
    let terms: Vec<(&str, f64)> = PRICE_FEATURES.iter().copied().zip(weights).collect();
    Linear::new(&terms, 0.0)
}

/// demand = 500 + 10 * scaled(price), columns in a different order than the record.
pub fn demand_model() -> Linear {
    Linear::new(
        &[
            ("price", 10.0),
            ("supply", 0.0),
            ("state", 0.0),
            ("crop", 0.0),
            ("year", 0.0),
            ("month", 0.0),
            ("seasonality", 0.0),
            ("special_event", 0.0),
            ("marketing_spend", 0.0),
            ("competitor_price", 0.0),
        ],
        500.0,
    )
}

/// price scaled as (p - 20) / 5; other columns unchanged.
pub fn scaler() -> StandardScaler {
    StandardScaler::new(
        vec![
            "price".into(),
            "marketing_spend".into(),
            "competitor_price".into(),
            "supply".into(),
        ],
        vec![20.0, 0.0, 0.0, 0.0],
        vec![5.0, 1.0, 1.0, 1.0],
    )
    .unwrap()
}

pub fn encoders() -> EncoderTable {
    EncoderTable::new()
        .with_field("state", LabelEncoder::new(["Bihar", "Punjab"]))
        .with_field("crop", LabelEncoder::new(["Rice", "Wheat"]))
}

pub fn artifacts() -> Arc<ModelArtifacts> {
    artifacts_with(Arc::new(price_model()), Arc::new(demand_model()))
}

pub fn artifacts_with(price: Arc<dyn Regressor>, demand: Arc<dyn Regressor>) -> Arc<ModelArtifacts> {
    Arc::new(ModelArtifacts::new(price, demand, scaler(), encoders(), encoders()).unwrap())
}

/// Constant weather and market features.
#[derive(Debug, Clone, Copy)]
pub struct FixedFeatures;

pub const TEMPERATURE: f64 = 30.0;

impl WeatherProvider for FixedFeatures {
    fn weather(&self, _region: &str, _month: MonthKey) -> WeatherFeatures {
        WeatherFeatures {
            temperature: TEMPERATURE,
            rainfall: 100.0,
            soil_moisture: 0.3,
            ndvi: 0.5,
        }
    }
}

impl MarketProvider for FixedFeatures {
    fn market(&self, _region: &str, _crop: &str, _month: MonthKey) -> MarketFeatures {
        MarketFeatures {
            seasonality: 1.0,
            marketing_spend: 20_000.0,
            competitor_price: 25.0,
            special_event: 0,
            supply: 1_000.0,
        }
    }
}

pub fn fixed_features() -> FeatureProviders {
    FeatureProviders::new(Arc::new(FixedFeatures), Arc::new(FixedFeatures))
}

/// Expected inferred price under [`price_model`] and [`FixedFeatures`].
pub fn expected_price(state_code: f64, crop_code: f64, month: u32) -> f64 {
    state_code + 10.0 * crop_code + f64::from(month) + TEMPERATURE
}

/// Expected inferred demand for a given (resolved) price.
pub fn expected_demand(price: f64) -> f64 {
    500.0 + 10.0 * (price - 20.0) / 5.0
}

/// Record store wrapper that counts calls.
#[derive(Debug, Default)]
pub struct CountingStore {
    pub inner: InMemoryRecordStore,
    gets: AtomicUsize,
    listings: AtomicUsize,
}

impl CountingStore {
    pub fn gets(&self) -> usize {
        self.gets.load(Ordering::SeqCst)
    }

    pub fn listings(&self) -> usize {
        self.listings.load(Ordering::SeqCst)
    }
}

impl RecordStore for CountingStore {
    fn get(&self, region: &str, crop: &str, month: MonthKey) -> Result<Option<MonthRecord>, StoreError> {
        self.gets.fetch_add(1, Ordering::SeqCst);
        self.inner.get(region, crop, month)
    }

    fn crops(&self, region: &str) -> Result<Vec<String>, StoreError> {
        self.listings.fetch_add(1, Ordering::SeqCst);
        self.inner.crops(region)
    }
}

/// Store whose backend is always down.
#[derive(Debug, Default)]
pub struct DownStore;

impl RecordStore for DownStore {
    fn get(&self, _: &str, _: &str, _: MonthKey) -> Result<Option<MonthRecord>, StoreError> {
        Err(StoreError::Unavailable("connection refused".into()))
    }

    fn crops(&self, _: &str) -> Result<Vec<String>, StoreError> {
        Err(StoreError::Unavailable("connection refused".into()))
    }
}

pub fn engine(store: Arc<dyn RecordStore>) -> ForecastEngine {
    ForecastEngine::new(store, artifacts(), fixed_features(), EngineSettings::default())
}

pub fn mk(year: i32, month: u32) -> MonthKey {
    MonthKey::new(year, month).unwrap()
}
