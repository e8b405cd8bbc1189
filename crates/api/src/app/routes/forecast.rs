use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Extension},
    response::{IntoResponse, Response},
    Json,
};
use tracing::info;

use agrocast_core::Signal;
use agrocast_forecast::{AnchorRequest, RangeRequest, SnapshotRequest};

use crate::app::services::{blocking, AppServices};
use crate::app::{dto, errors};

pub async fn predict_price(
    Extension(services): Extension<Arc<AppServices>>,
    body: Result<Json<RangeRequest>, JsonRejection>,
) -> Response {
    match body {
        Ok(Json(req)) => forecast(services, Signal::Price, req).await,
        Err(e) => errors::json_rejection(e),
    }
}

pub async fn predict_demand(
    Extension(services): Extension<Arc<AppServices>>,
    body: Result<Json<RangeRequest>, JsonRejection>,
) -> Response {
    match body {
        Ok(Json(req)) => forecast(services, Signal::Demand, req).await,
        Err(e) => errors::json_rejection(e),
    }
}

pub async fn past_prices(
    Extension(services): Extension<Arc<AppServices>>,
    body: Result<Json<AnchorRequest>, JsonRejection>,
) -> Response {
    match body {
        Ok(Json(req)) => history(services, Signal::Price, req).await,
        Err(e) => errors::json_rejection(e),
    }
}

pub async fn past_demand(
    Extension(services): Extension<Arc<AppServices>>,
    body: Result<Json<AnchorRequest>, JsonRejection>,
) -> Response {
    match body {
        Ok(Json(req)) => history(services, Signal::Demand, req).await,
        Err(e) => errors::json_rejection(e),
    }
}

pub async fn crops_collection(
    Extension(services): Extension<Arc<AppServices>>,
    body: Result<Json<SnapshotRequest>, JsonRejection>,
) -> Response {
    let Json(req) = match body {
        Ok(b) => b,
        Err(e) => return errors::json_rejection(e),
    };

    let engine = services.engine.clone();
    match blocking(move || engine.snapshot_request(&req)).await {
        Ok(Ok(crops)) => {
            info!(crops = crops.len(), "crop snapshot served");
            Json(dto::CropsCollectionResponse { crops }).into_response()
        }
        Ok(Err(e)) => errors::forecast_error_to_response(e),
        Err(resp) => resp,
    }
}

async fn forecast(services: Arc<AppServices>, signal: Signal, req: RangeRequest) -> Response {
    let engine = services.engine.clone();
    match blocking(move || engine.forecast(signal, &req)).await {
        Ok(Ok(records)) => Json(records).into_response(),
        Ok(Err(e)) => errors::forecast_error_to_response(e),
        Err(resp) => resp,
    }
}

async fn history(services: Arc<AppServices>, signal: Signal, req: AnchorRequest) -> Response {
    let engine = services.engine.clone();
    match blocking(move || engine.history(signal, &req)).await {
        Ok(Ok(records)) => Json(records).into_response(),
        Ok(Err(e)) => errors::forecast_error_to_response(e),
        Err(resp) => resp,
    }
}
