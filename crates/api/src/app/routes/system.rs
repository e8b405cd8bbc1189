use axum::http::StatusCode;

pub async fn home() -> &'static str {
    "Crop Price Prediction API is running!"
}

pub async fn health() -> StatusCode {
    StatusCode::OK
}
