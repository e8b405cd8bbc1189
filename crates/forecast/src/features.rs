//! Feature synthesis for model inputs.
//!
//! Weather features feed the price model, market features the demand model.
//! Real data sources are not wired in yet; [`SyntheticFeatures`] stands in
//! by sampling uniform values from the ranges seen in training data. Anything
//! implementing the provider traits can replace it without touching the
//! resolvers.

use agrocast_core::MonthKey;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeatherFeatures {
    pub temperature: f64,
    pub rainfall: f64,
    pub soil_moisture: f64,
    pub ndvi: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MarketFeatures {
    pub seasonality: f64,
    pub marketing_spend: f64,
    pub competitor_price: f64,
    /// 1 when a festival/market event falls in the month, else 0.
    pub special_event: u8,
    pub supply: f64,
}

/// Source of weather-derived features for a region and month.
///
/// A production implementation must be deterministic for a given
/// `(region, month)`.
pub trait WeatherProvider: Send + Sync {
    fn weather(&self, region: &str, month: MonthKey) -> WeatherFeatures;
}

/// Source of market/economic features for a region, crop and month.
pub trait MarketProvider: Send + Sync {
    fn market(&self, region: &str, crop: &str, month: MonthKey) -> MarketFeatures;
}

/// Probability that a synthetic month carries a special event.
const SPECIAL_EVENT_P: f64 = 0.2;

/// Uniform random stand-in for real weather and market feeds.
///
/// Unseeded, every call draws fresh entropy (values are not reproducible).
/// Seeded, values are a pure function of `(seed, region, crop, month)`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SyntheticFeatures {
    seed: Option<u64>,
}

impl SyntheticFeatures {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seeded(seed: u64) -> Self {
        Self { seed: Some(seed) }
    }

    fn rng(&self, stream: &str, parts: &[&str], month: MonthKey) -> StdRng {
        match self.seed {
            None => StdRng::from_entropy(),
            Some(seed) => {
                let mut h = Fnv64::new(seed);
                h.write(stream.as_bytes());
                for p in parts {
                    h.write(p.as_bytes());
                    h.write(&[0xff]);
                }
                h.write(&month.year().to_le_bytes());
                h.write(&month.month().to_le_bytes());
                StdRng::seed_from_u64(h.finish())
            }
        }
    }
}

impl WeatherProvider for SyntheticFeatures {
    fn weather(&self, region: &str, month: MonthKey) -> WeatherFeatures {
        let mut rng = self.rng("weather", &[region], month);
        WeatherFeatures {
            temperature: rng.gen_range(20.0..45.0),
            rainfall: rng.gen_range(0.0..300.0),
            soil_moisture: rng.gen_range(0.1..0.5),
            ndvi: rng.gen_range(0.2..0.7),
        }
    }
}

impl MarketProvider for SyntheticFeatures {
    fn market(&self, region: &str, crop: &str, month: MonthKey) -> MarketFeatures {
        let mut rng = self.rng("market", &[region, crop], month);
        MarketFeatures {
            seasonality: rng.gen_range(0.5..1.5),
            marketing_spend: rng.gen_range(10_000.0..50_000.0),
            competitor_price: rng.gen_range(10.0..50.0),
            special_event: u8::from(rng.gen_bool(SPECIAL_EVENT_P)),
            supply: rng.gen_range(500.0..2000.0),
        }
    }
}

/// FNV-1a, used only to derive stable per-key seeds.
struct Fnv64(u64);

impl Fnv64 {
    const OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
    const PRIME: u64 = 0x0000_0100_0000_01b3;

    fn new(seed: u64) -> Self {
        let mut h = Self(Self::OFFSET);
        h.write(&seed.to_le_bytes());
        h
    }

    fn write(&mut self, bytes: &[u8]) {
        for b in bytes {
            self.0 ^= u64::from(*b);
            self.0 = self.0.wrapping_mul(Self::PRIME);
        }
    }

    fn finish(&self) -> u64 {
        self.0
    }
}
