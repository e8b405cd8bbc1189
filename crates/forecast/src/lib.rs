//! `agrocast-forecast`
//!
//! **Responsibility:** the temporal resolution engine.
//!
//! For any (region, crop, month) the engine prefers a value recorded in the
//! store and falls back to model inference, then walks month sequences
//! forward (forecast) or backward (history) applying that rule to price and
//! demand alike.
//!
//! - Storage-agnostic: the store is a [`RecordStore`] supplied by callers (infra).
//! - Models, encoders and the scaler are immutable [`ModelArtifacts`] loaded once
//!   and shared by reference.
//! - Sequence operations never fail on a single bad month; failures degrade
//!   to fixed fallback values.

pub mod artifacts;
pub mod demand;
pub mod encoder;
pub mod engine;
pub mod error;
pub mod feature_record;
pub mod features;
pub mod model;
pub mod price;
pub mod request;
pub mod scaler;
pub mod snapshot;
pub mod store;
pub mod walker;

pub use artifacts::{ModelArtifacts, DEMAND_FEATURES, DEMAND_SCALED_FEATURES, PRICE_FEATURES};
pub use demand::DemandResolver;
pub use encoder::{EncoderTable, LabelEncoder, DEFAULT_CODE};
pub use engine::{EngineSettings, FeatureProviders, ForecastEngine};
pub use error::{ForecastError, ForecastResult, ModelError, StoreError};
pub use feature_record::FeatureRecord;
pub use features::{
    MarketFeatures, MarketProvider, SyntheticFeatures, WeatherFeatures, WeatherProvider,
};
pub use model::{ForestRegressor, Node, Regressor, Tree};
pub use price::PriceResolver;
pub use request::{AnchorQuery, AnchorRequest, IntField, RangeQuery, RangeRequest, SnapshotQuery, SnapshotRequest};
pub use scaler::StandardScaler;
pub use store::{Absence, InMemoryRecordStore, MonthRecord, RecordStore, StoreGateway};
