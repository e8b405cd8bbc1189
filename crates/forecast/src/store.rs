//! Read access to previously recorded prices and demand.

use std::collections::BTreeMap;
use std::sync::{Arc, RwLock};

use agrocast_core::{MonthKey, Signal};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::StoreError;

/// A stored month for one (region, crop). Either field may be absent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MonthRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub demand: Option<f64>,
}

impl MonthRecord {
    pub fn new(price: Option<f64>, demand: Option<f64>) -> Self {
        Self { price, demand }
    }

    pub fn value(&self, signal: Signal) -> Option<f64> {
        match signal {
            Signal::Price => self.price,
            Signal::Demand => self.demand,
        }
    }
}

/// Read-only record store.
///
/// "Document absent" and "field absent" are both represented as `None`
/// (or a `MonthRecord` with the field unset) and treated identically.
pub trait RecordStore: Send + Sync {
    fn get(&self, region: &str, crop: &str, month: MonthKey) -> Result<Option<MonthRecord>, StoreError>;

    /// Crops that have any stored data under `region`.
    fn crops(&self, region: &str) -> Result<Vec<String>, StoreError>;
}

impl<S> RecordStore for Arc<S>
where
    S: RecordStore + ?Sized,
{
    fn get(&self, region: &str, crop: &str, month: MonthKey) -> Result<Option<MonthRecord>, StoreError> {
        (**self).get(region, crop, month)
    }

    fn crops(&self, region: &str) -> Result<Vec<String>, StoreError> {
        (**self).crops(region)
    }
}

/// Which stored values count as "no data".
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum Absence {
    /// Only a missing field is absent; a stored zero is a real measurement.
    #[default]
    Missing,
    /// A stored zero is also treated as absent (legacy snapshot behavior).
    MissingOrZero,
}

impl Absence {
    /// The stored value, if this policy accepts it as present.
    pub fn present(&self, value: Option<f64>) -> Option<f64> {
        match (self, value) {
            (_, None) => None,
            (Absence::MissingOrZero, Some(v)) if v == 0.0 => None,
            (_, Some(v)) => Some(v),
        }
    }
}

/// Store access used by the resolvers.
///
/// Store failures are logged and reported as "not found" so resolution
/// falls through to inference.
#[derive(Clone)]
pub struct StoreGateway {
    store: Arc<dyn RecordStore>,
}

impl StoreGateway {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }

    pub fn lookup(&self, region: &str, crop: &str, month: MonthKey, signal: Signal, absence: Absence) -> Option<f64> {
        match self.store.get(region, crop, month) {
            Ok(record) => absence.present(record.and_then(|r| r.value(signal))),
            Err(e) => {
                warn!(region, crop, month = %month, error = %e, "record lookup failed; treating as not found");
                None
            }
        }
    }

    pub fn crops(&self, region: &str) -> Vec<String> {
        match self.store.crops(region) {
            Ok(crops) => crops,
            Err(e) => {
                warn!(region, error = %e, "crop listing failed; treating region as empty");
                Vec::new()
            }
        }
    }
}

type RegionMap = BTreeMap<String, BTreeMap<String, BTreeMap<MonthKey, MonthRecord>>>;

/// In-memory record store for tests/dev.
///
/// Crops are listed in lexical order.
#[derive(Debug, Default)]
pub struct InMemoryRecordStore {
    inner: RwLock<RegionMap>,
}

impl InMemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, region: impl Into<String>, crop: impl Into<String>, month: MonthKey, record: MonthRecord) {
        if let Ok(mut map) = self.inner.write() {
            map.entry(region.into())
                .or_default()
                .entry(crop.into())
                .or_default()
                .insert(month, record);
        }
    }

    pub fn set_price(&self, region: &str, crop: &str, month: MonthKey, price: f64) {
        self.update(region, crop, month, |r| r.price = Some(price));
    }

    pub fn set_demand(&self, region: &str, crop: &str, month: MonthKey, demand: f64) {
        self.update(region, crop, month, |r| r.demand = Some(demand));
    }

    fn update(&self, region: &str, crop: &str, month: MonthKey, f: impl FnOnce(&mut MonthRecord)) {
        if let Ok(mut map) = self.inner.write() {
            let record = map
                .entry(region.to_string())
                .or_default()
                .entry(crop.to_string())
                .or_default()
                .entry(month)
                .or_default();
            f(record);
        }
    }

    pub fn len(&self) -> usize {
        self.inner
            .read()
            .map(|m| m.values().flat_map(|c| c.values()).map(BTreeMap::len).sum())
            .unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl RecordStore for InMemoryRecordStore {
    fn get(&self, region: &str, crop: &str, month: MonthKey) -> Result<Option<MonthRecord>, StoreError> {
        let map = self
            .inner
            .read()
            .map_err(|_| StoreError::Unavailable("lock poisoned".into()))?;
        Ok(map
            .get(region)
            .and_then(|crops| crops.get(crop))
            .and_then(|months| months.get(&month))
            .copied())
    }

    fn crops(&self, region: &str) -> Result<Vec<String>, StoreError> {
        let map = self
            .inner
            .read()
            .map_err(|_| StoreError::Unavailable("lock poisoned".into()))?;
        Ok(map
            .get(region)
            .map(|crops| crops.keys().cloned().collect())
            .unwrap_or_default())
    }
}
