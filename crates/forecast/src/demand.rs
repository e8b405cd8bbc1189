//! Single-month demand resolution.

use std::sync::Arc;

use agrocast_core::{round2, MonthKey, Resolved, Signal};
use tracing::{debug, warn};

use crate::artifacts::ModelArtifacts;
use crate::error::ModelError;
use crate::feature_record::FeatureRecord;
use crate::features::MarketProvider;
use crate::price::PriceResolver;
use crate::store::{Absence, StoreGateway};

/// Resolves one month's demand: stored value first, demand model second.
///
/// The demand model takes the month's price as a feature; that price always
/// comes from [`PriceResolver::resolve`], so a stored price wins over an
/// inferred one.
#[derive(Clone)]
pub struct DemandResolver {
    store: StoreGateway,
    price: PriceResolver,
    artifacts: Arc<ModelArtifacts>,
    market: Arc<dyn MarketProvider>,
    fallback: f64,
}

impl DemandResolver {
    pub fn new(
        store: StoreGateway,
        price: PriceResolver,
        artifacts: Arc<ModelArtifacts>,
        market: Arc<dyn MarketProvider>,
        fallback: f64,
    ) -> Self {
        Self {
            store,
            price,
            artifacts,
            market,
            fallback,
        }
    }

    pub fn resolve(&self, region: &str, crop: &str, month: MonthKey) -> Resolved<f64> {
        self.resolve_with(region, crop, month, Absence::Missing)
    }

    pub fn resolve_with(&self, region: &str, crop: &str, month: MonthKey, absence: Absence) -> Resolved<f64> {
        if let Some(demand) = self.store.lookup(region, crop, month, Signal::Demand, absence) {
            debug!(region, crop, month = %month, demand, "demand served from store");
            return Resolved::stored(demand);
        }
        self.infer(region, crop, month)
    }

    /// Like [`Self::resolve_with`], but inference uses `price` instead of
    /// resolving the month's price again.
    pub fn resolve_given_price(
        &self,
        region: &str,
        crop: &str,
        month: MonthKey,
        absence: Absence,
        price: f64,
    ) -> Resolved<f64> {
        if let Some(demand) = self.store.lookup(region, crop, month, Signal::Demand, absence) {
            debug!(region, crop, month = %month, demand, "demand served from store");
            return Resolved::stored(demand);
        }
        self.infer_at(region, crop, month, price)
    }

    /// Demand inference, bypassing the stored demand (the price feature is
    /// still resolved through the store).
    pub fn infer(&self, region: &str, crop: &str, month: MonthKey) -> Resolved<f64> {
        let price = self.price.resolve(region, crop, month).value;
        self.infer_at(region, crop, month, price)
    }

    fn infer_at(&self, region: &str, crop: &str, month: MonthKey, price: f64) -> Resolved<f64> {
        match self.try_infer(region, crop, month, price) {
            Ok(demand) => {
                debug!(region, crop, month = %month, demand, "demand inferred");
                Resolved::inferred(demand)
            }
            Err(e) => {
                warn!(region, crop, month = %month, error = %e, fallback = self.fallback, "demand inference failed");
                Resolved::fallback(self.fallback)
            }
        }
    }

    fn try_infer(&self, region: &str, crop: &str, month: MonthKey, price: f64) -> Result<f64, ModelError> {
        let market = self.market.market(region, crop, month);
        let encoders = self.artifacts.demand_encoders();

        let mut record = FeatureRecord::new()
            .with("state", encoders.encode("state", region) as f64)
            .with("crop", encoders.encode("crop", crop) as f64)
            .with("year", f64::from(month.year()))
            .with("month", f64::from(month.month()))
            .with("seasonality", market.seasonality)
            .with("special_event", f64::from(market.special_event))
            .with("price", price)
            .with("marketing_spend", market.marketing_spend)
            .with("competitor_price", market.competitor_price)
            .with("supply", market.supply);

        self.artifacts.scaler().transform(&mut record)?;

        let model = self.artifacts.demand_model();
        let row = record.select(model.feature_names())?;
        let demand = model.predict(&row)?;
        Ok(round2(demand))
    }
}
