//! Request payloads for the disease and fertilizer assistants, and parsing of
//! the generated text.

use serde::Deserialize;
use serde_json::{json, Value};

use super::ExternalError;

fn generation_config() -> Value {
    json!({
        "temperature": 0.2,
        "topK": 10,
        "topP": 0.95,
        "maxOutputTokens": 2048
    })
}

/// Image plus agronomist prompt; answers are translated into `language`.
pub fn disease_payload(image_base64: &str, language: &str) -> Value {
    let prompt = format!(
        "You are an agronomist. Identify any visible crop disease and suggest an appropriate \
         chemical or organic treatment.\n\
         Respond ONLY in JSON using this schema:\n\
         {{\"disease\":string, \"treatment\":string, \"crop_name\":string}}\n\
         Translate all values (not keys) into {language}. If could not translate then give in English"
    );

    json!({
        "contents": [{
            "parts": [
                {"inline_data": {"mime_type": "image/jpeg", "data": image_base64}},
                {"text": prompt}
            ]
        }],
        "generationConfig": generation_config()
    })
}

/// Accepts JSON numbers or numeric strings.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
enum Area {
    Number(f64),
    Text(String),
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
struct FertilizerRequest {
    crop: Option<String>,
    area_ha: Option<Area>,
    soil_type: Option<String>,
    growth_stage: Option<String>,
}

/// Fertilizer question with defaults applied.
#[derive(Debug, Clone, PartialEq)]
pub struct FertilizerQuery {
    pub crop: String,
    pub area_ha: f64,
    pub soil_type: String,
    pub growth_stage: String,
}

impl FertilizerQuery {
    /// Parse a request body. Missing fields default to Wheat, 1 ha, loamy
    /// soil, vegetative stage; the crop name is title-cased.
    pub fn from_json(body: &Value) -> Result<Self, String> {
        let req: FertilizerRequest = serde_json::from_value(body.clone()).map_err(|e| e.to_string())?;

        let area_ha = match req.area_ha {
            None => 1.0,
            Some(Area::Number(v)) => v,
            Some(Area::Text(s)) => s
                .trim()
                .parse()
                .map_err(|_| format!("area_ha must be a number, got {s:?}"))?,
        };
        if !area_ha.is_finite() || area_ha <= 0.0 {
            return Err(format!("area_ha must be a positive number, got {area_ha}"));
        }

        Ok(Self {
            crop: title_case(req.crop.as_deref().unwrap_or("Wheat")),
            area_ha,
            soil_type: req.soil_type.unwrap_or_else(|| "loamy".into()),
            growth_stage: req.growth_stage.unwrap_or_else(|| "vegetative".into()),
        })
    }
}

pub fn fertilizer_payload(q: &FertilizerQuery) -> Value {
    let prompt = format!(
        "You are an agronomy assistant.\n\
         Given a crop, {crop} in {area} hectare, with {soil} soil, and at {stage} stage. \
         Suggest fertilizer requirements and example products.\n\
         Respond ONLY in JSON using this structure:\n\
         {{\n\
           \"crop\": \"<crop>\",\n\
           \"area_ha\": <float>,\n\
           \"soil_type\": \"<soil>\",\n\
           \"growth_stage\": \"<stage>\",\n\
           \"fertilizer\": {{\n\
             \"N_kg\": <float>,\n\
             \"P_kg\": <float>,\n\
             \"K_kg\": <float>,\n\
             \"products\": [\n\
               {{\"name\": \"Urea\", \"amount_kg\": <float>}},\n\
               {{\"name\": \"DAP\", \"amount_kg\": <float>}}\n\
             ]\n\
           }},\n\
           \"notes\": \"<short agronomy suggestion>\"\n\
         }}",
        crop = q.crop,
        area = q.area_ha,
        soil = q.soil_type,
        stage = q.growth_stage,
    );

    json!({
        "contents": [{"parts": [{"text": prompt}]}],
        "generationConfig": generation_config()
    })
}

/// Text of the first candidate's first part.
pub fn candidate_text(body: &Value) -> Option<&str> {
    body.get("candidates")?
        .get(0)?
        .get("content")?
        .get("parts")?
        .get(0)?
        .get("text")?
        .as_str()
}

/// Parse the span from the first `{` to the last `}` as JSON.
pub fn extract_json_object(text: &str) -> Result<Value, ExternalError> {
    let (Some(start), Some(end)) = (text.find('{'), text.rfind('}')) else {
        return Err(ExternalError::InvalidResponse("no JSON object in generated text".into()));
    };
    if end < start {
        return Err(ExternalError::InvalidResponse("no JSON object in generated text".into()));
    }
    serde_json::from_str(&text[start..=end]).map_err(|e| ExternalError::InvalidResponse(e.to_string()))
}

fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut word_start = true;
    for c in s.chars() {
        if c.is_alphabetic() {
            if word_start {
                out.extend(c.to_uppercase());
            } else {
                out.extend(c.to_lowercase());
            }
            word_start = false;
        } else {
            out.push(c);
            word_start = true;
        }
    }
    out
}
