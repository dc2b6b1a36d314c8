use std::fmt::{Display, Formatter};
use std::sync::Mutex;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use config::AdjustmentConfig;

/// Which relative band a price is perturbed within.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AdjustmentBand {
    Spot,
    Meme,
}

impl Display for AdjustmentBand {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            AdjustmentBand::Spot => write!(f, "spot"),
            AdjustmentBand::Meme => write!(f, "meme"),
        }
    }
}

/// Presentational price jitter backed by an owned, seedable generator.
#[derive(Debug)]
pub struct Jitter {
    rng: Mutex<StdRng>,
    spot_band: f64,
    meme_band: f64,
}

impl Jitter {
    pub fn new(rng: StdRng, bands: &AdjustmentConfig) -> Self {
        Jitter { rng: Mutex::new(rng), spot_band: bands.spot_band, meme_band: bands.meme_band }
    }

    pub fn from_entropy(bands: &AdjustmentConfig) -> Self {
        Self::new(StdRng::from_entropy(), bands)
    }

    pub fn seeded(seed: u64, bands: &AdjustmentConfig) -> Self {
        Self::new(StdRng::seed_from_u64(seed), bands)
    }

    pub fn band(&self, band: AdjustmentBand) -> f64 {
        match band {
            AdjustmentBand::Spot => self.spot_band,
            AdjustmentBand::Meme => self.meme_band,
        }
    }

    /// Returns `price * (1 + u)` with `u` drawn uniformly from `[-band, band]`.
    pub fn adjust(&self, price: f64, band: AdjustmentBand) -> f64 {
        let band = self.band(band);
        let offset = match self.rng.lock() {
            Ok(mut rng) => rng.gen_range(-band..=band),
            Err(poisoned) => poisoned.into_inner().gen_range(-band..=band),
        };
        price * (1.0 + offset)
    }
}
