use axum::{
    routing::{get, post},
    Router,
};

pub mod assistant;
pub mod forecast;
pub mod system;

/// Router for the forecasting and assistant endpoints.
///
/// Paths keep the names existing clients already call.
pub fn router() -> Router {
    Router::new()
        .route("/", get(system::home))
        .route("/health", get(system::health))
        .route("/predict", post(forecast::predict_price))
        .route("/predict_demand", post(forecast::predict_demand))
        .route("/pastPrices", post(forecast::past_prices))
        .route("/pastDemand", post(forecast::past_demand))
        .route("/cropsCollection", post(forecast::crops_collection))
        .route("/detectDisease", post(assistant::detect_disease))
        .route("/fertCalculator", post(assistant::fert_calculator))
}
