//! Month-sequence walking.
//!
//! Forecasts walk forward from a start month to an end month (inclusive);
//! histories walk backward from an anchor month (inclusive), most recent
//! first. Both rely on [`MonthKey`]'s December/January wraparound.

use agrocast_core::{MonthKey, PredictionRecord, Resolved, Signal};

use crate::error::{ForecastError, ForecastResult};

/// Months from `start` to `end`, both inclusive.
///
/// Rejects `end < start` and spans longer than `max_months`.
pub fn forward(start: MonthKey, end: MonthKey, max_months: u32) -> ForecastResult<Vec<MonthKey>> {
    let span = start.months_until(end);
    if span < 0 {
        return Err(ForecastError::validation(format!(
            "end month {end} is before start month {start}"
        )));
    }
    if span + 1 > i64::from(max_months) {
        return Err(ForecastError::validation(format!(
            "range {start}..{end} covers {} months, limit is {max_months}",
            span + 1
        )));
    }
    Ok(MonthKey::range_inclusive(start, end).collect())
}

/// `steps` months ending at `anchor`, most recent first.
///
/// Shorter than `steps` when the walk reaches January of year 1.
pub fn backward(anchor: MonthKey, steps: usize) -> Vec<MonthKey> {
    anchor.iter_back().take(steps).collect()
}

/// Resolve each month in order and label the results.
pub fn label<I, F>(months: I, signal: Signal, mut resolve: F) -> Vec<PredictionRecord>
where
    I: IntoIterator<Item = MonthKey>,
    F: FnMut(MonthKey) -> Resolved<f64>,
{
    months
        .into_iter()
        .map(|month| PredictionRecord::new(month, signal, resolve(month)))
        .collect()
}
