use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use agrocast_forecast::ForecastError;
use agrocast_infra::external::ExternalError;

pub fn forecast_error_to_response(err: ForecastError) -> axum::response::Response {
    match err {
        ForecastError::Validation(msg) => json_error(StatusCode::BAD_REQUEST, "validation_error", msg),
    }
}

pub fn external_error_to_response(err: ExternalError) -> axum::response::Response {
    match err {
        ExternalError::Transport(msg) => json_error(StatusCode::BAD_GATEWAY, "upstream_unavailable", msg),
        ExternalError::InvalidResponse(msg) => {
            json_error(StatusCode::BAD_GATEWAY, "upstream_invalid_response", msg)
        }
    }
}

pub fn json_rejection(rejection: JsonRejection) -> axum::response::Response {
    json_error(StatusCode::BAD_REQUEST, "invalid_json", rejection.body_text())
}

pub fn generator_unavailable() -> axum::response::Response {
    json_error(
        StatusCode::SERVICE_UNAVAILABLE,
        "generator_unavailable",
        "generative-AI service is not configured",
    )
}

pub fn internal_error(message: impl Into<String>) -> axum::response::Response {
    json_error(StatusCode::INTERNAL_SERVER_ERROR, "internal_error", message)
}

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}
