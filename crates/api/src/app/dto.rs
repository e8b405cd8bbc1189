use serde::{Deserialize, Serialize};

use agrocast_core::CropSnapshot;

// -------------------------
// Request DTOs
// -------------------------

// Forecast, history and snapshot bodies are the engine's own request types
// (`RangeRequest`, `AnchorRequest`, `SnapshotRequest`).

#[derive(Debug, Deserialize)]
pub struct DetectDiseaseRequest {
    pub image_base64: Option<String>,
    pub language: Option<String>,
}

// -------------------------
// Response DTOs
// -------------------------

#[derive(Debug, Serialize)]
pub struct CropsCollectionResponse {
    pub crops: Vec<CropSnapshot>,
}
