//! Request validation.
//!
//! Requests arrive with every field optional; `validate` turns them into
//! typed queries or a [`ForecastError::Validation`] before any resolution
//! work starts.

use agrocast_core::MonthKey;
use serde::Deserialize;

use crate::error::{ForecastError, ForecastResult};

/// Largest magnitude at which every integral `f64` converts to `i64` exactly.
const MAX_EXACT_FLOAT_INT: f64 = 9_007_199_254_740_992.0;

/// An integer that clients may send as a JSON number or a numeric string.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum IntField {
    Int(i64),
    Float(f64),
    Text(String),
}

impl IntField {
    /// `Ok(None)` for blank text; an error for non-integral input.
    fn value(&self, name: &str) -> ForecastResult<Option<i64>> {
        match self {
            IntField::Int(v) => Ok(Some(*v)),
            IntField::Float(v) if v.fract() == 0.0 && v.abs() <= MAX_EXACT_FLOAT_INT => Ok(Some(*v as i64)),
            IntField::Float(v) if v.fract() == 0.0 => {
                Err(ForecastError::validation(format!("{name} {v} out of range")))
            }
            IntField::Float(v) => Err(ForecastError::validation(format!("{name} must be an integer, got {v}"))),
            IntField::Text(s) if s.trim().is_empty() => Ok(None),
            IntField::Text(s) => s
                .trim()
                .parse()
                .map(Some)
                .map_err(|_| ForecastError::validation(format!("{name} must be an integer, got {s:?}"))),
        }
    }
}

impl From<i64> for IntField {
    fn from(value: i64) -> Self {
        IntField::Int(value)
    }
}

/// Forecast request over a month range.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RangeRequest {
    pub state: Option<String>,
    pub crop: Option<String>,
    pub start_year: Option<IntField>,
    pub start_month: Option<IntField>,
    pub end_year: Option<IntField>,
    pub end_month: Option<IntField>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RangeQuery {
    pub region: String,
    pub crop: String,
    pub start: MonthKey,
    pub end: MonthKey,
}

impl RangeRequest {
    pub fn validate(&self) -> ForecastResult<RangeQuery> {
        let missing = missing_fields(&[
            ("state", text_present(&self.state)),
            ("crop", text_present(&self.crop)),
            ("startYear", int_present(&self.start_year)),
            ("startMonth", int_present(&self.start_month)),
            ("endYear", int_present(&self.end_year)),
            ("endMonth", int_present(&self.end_month)),
        ]);
        if !missing.is_empty() {
            return Err(missing_error(&missing));
        }

        Ok(RangeQuery {
            region: required_text(&self.state, "state")?,
            crop: required_text(&self.crop, "crop")?,
            start: month_key(&self.start_year, &self.start_month, "start")?,
            end: month_key(&self.end_year, &self.end_month, "end")?,
        })
    }
}

/// History request anchored at one month.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnchorRequest {
    pub state: Option<String>,
    pub crop: Option<String>,
    pub year: Option<IntField>,
    pub month: Option<IntField>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AnchorQuery {
    pub region: String,
    pub crop: String,
    pub anchor: MonthKey,
}

impl AnchorRequest {
    pub fn validate(&self) -> ForecastResult<AnchorQuery> {
        let missing = missing_fields(&[
            ("state", text_present(&self.state)),
            ("crop", text_present(&self.crop)),
            ("year", int_present(&self.year)),
            ("month", int_present(&self.month)),
        ]);
        if !missing.is_empty() {
            return Err(missing_error(&missing));
        }

        Ok(AnchorQuery {
            region: required_text(&self.state, "state")?,
            crop: required_text(&self.crop, "crop")?,
            anchor: month_key(&self.year, &self.month, "anchor")?,
        })
    }
}

/// Cross-crop snapshot request; months use the `"MM-YYYY"` form.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotRequest {
    pub selected_state: Option<String>,
    pub previous_month: Option<String>,
    pub next_month: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SnapshotQuery {
    pub region: String,
    pub previous: MonthKey,
    pub next: MonthKey,
}

impl SnapshotRequest {
    pub fn validate(&self) -> ForecastResult<SnapshotQuery> {
        let missing = missing_fields(&[
            ("selectedState", text_present(&self.selected_state)),
            ("previousMonth", text_present(&self.previous_month)),
            ("nextMonth", text_present(&self.next_month)),
        ]);
        if !missing.is_empty() {
            return Err(missing_error(&missing));
        }

        Ok(SnapshotQuery {
            region: required_text(&self.selected_state, "selectedState")?,
            previous: required_text(&self.previous_month, "previousMonth")?.parse()?,
            next: required_text(&self.next_month, "nextMonth")?.parse()?,
        })
    }
}

fn text_present(field: &Option<String>) -> bool {
    field.as_deref().is_some_and(|s| !s.trim().is_empty())
}

fn int_present(field: &Option<IntField>) -> bool {
    match field {
        None => false,
        Some(IntField::Text(s)) => !s.trim().is_empty(),
        Some(_) => true,
    }
}

fn missing_fields<'a>(fields: &[(&'a str, bool)]) -> Vec<&'a str> {
    fields
        .iter()
        .filter(|(_, present)| !present)
        .map(|(name, _)| *name)
        .collect()
}

fn missing_error(missing: &[&str]) -> ForecastError {
    ForecastError::validation(format!("Missing required fields: {}", missing.join(", ")))
}

fn required_text(field: &Option<String>, name: &str) -> ForecastResult<String> {
    field
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .ok_or_else(|| missing_error(&[name]))
}

fn required_int(field: &Option<IntField>, name: &str) -> ForecastResult<i64> {
    field
        .as_ref()
        .map(|f| f.value(name))
        .transpose()?
        .flatten()
        .ok_or_else(|| missing_error(&[name]))
}

fn month_key(year: &Option<IntField>, month: &Option<IntField>, which: &str) -> ForecastResult<MonthKey> {
    let y = required_int(year, &format!("{which} year"))?;
    let m = required_int(month, &format!("{which} month"))?;

    let y = i32::try_from(y).map_err(|_| ForecastError::validation(format!("{which} year {y} out of range")))?;
    let m = u32::try_from(m).map_err(|_| ForecastError::validation(format!("{which} month {m} out of range")))?;
    Ok(MonthKey::new(y, m)?)
}
