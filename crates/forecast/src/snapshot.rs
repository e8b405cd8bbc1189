//! Cross-crop snapshot: price and demand for two months, for every crop
//! with stored data in a region.

use agrocast_core::{round2, CropSnapshot, MonthKey};
use tracing::debug;

use crate::demand::DemandResolver;
use crate::price::PriceResolver;
use crate::store::{Absence, StoreGateway};

/// Build one [`CropSnapshot`] per crop listed for `region`.
///
/// Each crop resolves two prices; demand inference reuses the price resolved
/// for the same month. `absence` decides whether a stored zero counts as data.
pub fn snapshot(
    store: &StoreGateway,
    price: &PriceResolver,
    demand: &DemandResolver,
    region: &str,
    previous: MonthKey,
    next: MonthKey,
    absence: Absence,
) -> Vec<CropSnapshot> {
    let crops = store.crops(region);
    debug!(region, crops = crops.len(), %previous, %next, "building crop snapshot");

    crops
        .into_iter()
        .map(|crop| {
            let previous_month_price = price.resolve_with(region, &crop, previous, absence).value;
            let previous_month_demand = demand
                .resolve_given_price(region, &crop, previous, absence, previous_month_price)
                .value;
            let next_month_price = price.resolve_with(region, &crop, next, absence).value;
            let next_month_demand = demand
                .resolve_given_price(region, &crop, next, absence, next_month_price)
                .value;

            CropSnapshot {
                name: crop,
                previous_month_price: round2(previous_month_price),
                next_month_price: round2(next_month_price),
                previous_month_demand: round2(previous_month_demand),
                next_month_demand: round2(next_month_demand),
            }
        })
        .collect()
}
