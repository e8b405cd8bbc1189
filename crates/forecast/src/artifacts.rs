//! The immutable set of trained artifacts shared by all requests.

use std::sync::Arc;

use crate::encoder::EncoderTable;
use crate::error::ModelError;
use crate::model::Regressor;
use crate::scaler::StandardScaler;

/// Price-model input, in trained order.
pub const PRICE_FEATURES: [&str; 8] = [
    "state_encoded",
    "crop_encoded",
    "year",
    "month",
    "temperature",
    "rainfall",
    "soil_moisture",
    "ndvi",
];

/// Every field the demand record carries; the model picks its own order.
pub const DEMAND_FEATURES: [&str; 10] = [
    "state",
    "crop",
    "year",
    "month",
    "seasonality",
    "special_event",
    "price",
    "marketing_spend",
    "competitor_price",
    "supply",
];

/// Demand fields standardized before inference.
pub const DEMAND_SCALED_FEATURES: [&str; 4] = ["price", "marketing_spend", "competitor_price", "supply"];

/// Categorical domains both models encode.
pub const ENCODED_FIELDS: [&str; 2] = ["state", "crop"];

/// Models, encoders and scaler, loaded once at startup.
#[derive(Debug, Clone)]
pub struct ModelArtifacts {
    price_model: Arc<dyn Regressor>,
    demand_model: Arc<dyn Regressor>,
    scaler: StandardScaler,
    price_encoders: EncoderTable,
    demand_encoders: EncoderTable,
}

impl ModelArtifacts {
    /// Bundle artifacts, checking that their feature contracts line up.
    pub fn new(
        price_model: Arc<dyn Regressor>,
        demand_model: Arc<dyn Regressor>,
        scaler: StandardScaler,
        price_encoders: EncoderTable,
        demand_encoders: EncoderTable,
    ) -> Result<Self, ModelError> {
        if price_model.feature_names() != PRICE_FEATURES {
            return Err(ModelError::Incompatible(format!(
                "price model expects {:?}, serving provides {:?}",
                price_model.feature_names(),
                PRICE_FEATURES
            )));
        }

        if let Some(unknown) = demand_model
            .feature_names()
            .iter()
            .find(|n| !DEMAND_FEATURES.contains(&n.as_str()))
        {
            return Err(ModelError::Incompatible(format!(
                "demand model expects unknown feature {unknown:?}"
            )));
        }

        let mut columns: Vec<&str> = scaler.columns().iter().map(String::as_str).collect();
        columns.sort_unstable();
        let mut expected = DEMAND_SCALED_FEATURES;
        expected.sort_unstable();
        if columns != expected {
            return Err(ModelError::Incompatible(format!(
                "scaler columns {:?} do not match {:?}",
                scaler.columns(),
                DEMAND_SCALED_FEATURES
            )));
        }

        Ok(Self {
            price_model,
            demand_model,
            scaler,
            price_encoders,
            demand_encoders,
        })
    }

    /// Fail when the price-model and demand-model encoders assign different
    /// codes to the same region or crop.
    pub fn ensure_encoders_consistent(&self) -> Result<(), ModelError> {
        self.price_encoders
            .ensure_consistent_with(&self.demand_encoders, &ENCODED_FIELDS)
    }

    pub fn price_model(&self) -> &dyn Regressor {
        self.price_model.as_ref()
    }

    pub fn demand_model(&self) -> &dyn Regressor {
        self.demand_model.as_ref()
    }

    pub fn scaler(&self) -> &StandardScaler {
        &self.scaler
    }

    pub fn price_encoders(&self) -> &EncoderTable {
        &self.price_encoders
    }

    pub fn demand_encoders(&self) -> &EncoderTable {
        &self.demand_encoders
    }
}
