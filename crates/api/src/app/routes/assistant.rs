//! Generative-AI backed helpers: disease detection and fertilizer advice.

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Extension},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::Value;
use tracing::{info, warn};

use agrocast_infra::external::{
    candidate_text, disease_payload, extract_json_object, fertilizer_payload, ExternalError, FertilizerQuery,
    UpstreamResponse,
};

use crate::app::services::AppServices;
use crate::app::{dto, errors};

/// Forward the generator's status and body unchanged.
fn passthrough(upstream: UpstreamResponse) -> Response {
    let status = StatusCode::from_u16(upstream.status).unwrap_or(StatusCode::BAD_GATEWAY);
    (status, Json(upstream.body)).into_response()
}

pub async fn detect_disease(
    Extension(services): Extension<Arc<AppServices>>,
    body: Result<Json<dto::DetectDiseaseRequest>, JsonRejection>,
) -> Response {
    let Json(req) = match body {
        Ok(b) => b,
        Err(e) => return errors::json_rejection(e),
    };
    let Some(image) = req.image_base64.filter(|s| !s.trim().is_empty()) else {
        return errors::json_error(
            StatusCode::BAD_REQUEST,
            "validation_error",
            "Missing required fields: image_base64",
        );
    };
    let Some(generator) = services.generator.clone() else {
        return errors::generator_unavailable();
    };

    let language = req.language.unwrap_or_else(|| "English".to_string());
    info!(language = %language, image_bytes = image.len(), "disease detection requested");

    match generator.generate(&disease_payload(&image, &language)).await {
        Ok(upstream) => passthrough(upstream),
        Err(e) => {
            warn!(error = %e, "disease detection failed");
            errors::external_error_to_response(e)
        }
    }
}

pub async fn fert_calculator(
    Extension(services): Extension<Arc<AppServices>>,
    body: Result<Json<Value>, JsonRejection>,
) -> Response {
    let Json(body) = match body {
        Ok(b) => b,
        Err(e) => return errors::json_rejection(e),
    };
    let query = match FertilizerQuery::from_json(&body) {
        Ok(q) => q,
        Err(msg) => return errors::json_error(StatusCode::BAD_REQUEST, "validation_error", msg),
    };
    let Some(generator) = services.generator.clone() else {
        return errors::generator_unavailable();
    };

    info!(crop = %query.crop, area_ha = query.area_ha, "fertilizer advice requested");

    let upstream = match generator.generate(&fertilizer_payload(&query)).await {
        Ok(u) => u,
        Err(e) => {
            warn!(error = %e, "fertilizer request failed");
            return errors::external_error_to_response(e);
        }
    };
    if !upstream.is_success() {
        warn!(status = upstream.status, "generator rejected fertilizer request");
        return passthrough(upstream);
    }

    let parsed = candidate_text(&upstream.body)
        .ok_or_else(|| ExternalError::InvalidResponse("response has no candidate text".into()))
        .and_then(extract_json_object);

    match parsed {
        Ok(advice) => (StatusCode::OK, Json(advice)).into_response(),
        Err(e) => {
            warn!(error = %e, "could not parse fertilizer advice");
            errors::external_error_to_response(e)
        }
    }
}
