//! Single-month price resolution.

use std::sync::Arc;

use agrocast_core::{round2, MonthKey, Resolved, Signal};
use tracing::{debug, warn};

use crate::artifacts::{ModelArtifacts, PRICE_FEATURES};
use crate::error::ModelError;
use crate::feature_record::FeatureRecord;
use crate::features::WeatherProvider;
use crate::store::{Absence, StoreGateway};

/// Resolves one month's price: stored value first, price model second.
///
/// Never fails. If inference breaks, the configured fallback price is
/// returned with [`Provenance::Fallback`](agrocast_core::Provenance::Fallback).
#[derive(Clone)]
pub struct PriceResolver {
    store: StoreGateway,
    artifacts: Arc<ModelArtifacts>,
    weather: Arc<dyn WeatherProvider>,
    fallback: f64,
}

impl PriceResolver {
    pub fn new(
        store: StoreGateway,
        artifacts: Arc<ModelArtifacts>,
        weather: Arc<dyn WeatherProvider>,
        fallback: f64,
    ) -> Self {
        Self {
            store,
            artifacts,
            weather,
            fallback,
        }
    }

    pub fn resolve(&self, region: &str, crop: &str, month: MonthKey) -> Resolved<f64> {
        self.resolve_with(region, crop, month, Absence::Missing)
    }

    pub fn resolve_with(&self, region: &str, crop: &str, month: MonthKey, absence: Absence) -> Resolved<f64> {
        if let Some(price) = self.store.lookup(region, crop, month, Signal::Price, absence) {
            debug!(region, crop, month = %month, price, "price served from store");
            return Resolved::stored(price);
        }
        self.infer(region, crop, month)
    }

    /// Model inference only, bypassing the store.
    pub fn infer(&self, region: &str, crop: &str, month: MonthKey) -> Resolved<f64> {
        match self.try_infer(region, crop, month) {
            Ok(price) => {
                debug!(region, crop, month = %month, price, "price inferred");
                Resolved::inferred(price)
            }
            Err(e) => {
                warn!(region, crop, month = %month, error = %e, fallback = self.fallback, "price inference failed");
                Resolved::fallback(self.fallback)
            }
        }
    }

    fn try_infer(&self, region: &str, crop: &str, month: MonthKey) -> Result<f64, ModelError> {
        let encoders = self.artifacts.price_encoders();
        let weather = self.weather.weather(region, month);

        let record = FeatureRecord::new()
            .with("state_encoded", encoders.encode("state", region) as f64)
            .with("crop_encoded", encoders.encode("crop", crop) as f64)
            .with("year", f64::from(month.year()))
            .with("month", f64::from(month.month()))
            .with("temperature", weather.temperature)
            .with("rainfall", weather.rainfall)
            .with("soil_moisture", weather.soil_moisture)
            .with("ndvi", weather.ndvi);

        let row = record.select(&PRICE_FEATURES)?;
        let price = self.artifacts.price_model().predict(&row)?;
        Ok(round2(price))
    }
}
