//! Seeded, deterministic permutation generator and inverter.
//!
//! Every call re-seeds a fresh generator from the stored seed, so a
//! scrambler carries no state between calls: `unscramble` can rebuild the
//! exact permutation that `scramble` applied without ever seeing its output.

use crate::error::{ChainError, Result};
use crate::registry::{attr_u64, Codec, Exportable, Identity, Kind};
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::{SystemTime, UNIX_EPOCH};

/// Domain label mixed into the generator seed
const RNG_DOMAIN: &[u8] = b"cipherchain_scrambler_v1";

/// Where a scrambler's seed comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SeedSetting {
    /// Caller supplied seed
    Custom,
    /// Seed captured from the clock at construction
    #[default]
    Random,
}

impl SeedSetting {
    /// Numeric tag used in exported trees
    pub fn code(self) -> u64 {
        match self {
            Self::Custom => 0,
            Self::Random => 1,
        }
    }

    pub fn from_code(code: u64) -> Result<Self> {
        match code {
            0 => Ok(Self::Custom),
            1 => Ok(Self::Random),
            _ => Err(ChainError::UnsupportedSetting(format!(
                "seed setting: {}",
                code
            ))),
        }
    }
}

impl std::str::FromStr for SeedSetting {
    type Err = ChainError;
    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "custom" => Ok(Self::Custom),
            "random" => Ok(Self::Random),
            _ => Err(ChainError::UnsupportedSetting(format!(
                "seed setting: {}",
                s
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scrambler {
    seed: u64,
}

impl Scrambler {
    pub const NAME: &'static str = "helper.scrambler";

    /// Scrambler with a fixed seed
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }

    /// Scrambler seeded from the current time in nanoseconds.
    ///
    /// The seed is read once here and never again; resets and exports reuse it.
    pub fn from_clock() -> Self {
        let seed = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| u64::try_from(d.as_nanos()).unwrap_or(u64::MAX))
            .unwrap_or_default();
        Self { seed }
    }

    pub fn with_setting(setting: SeedSetting, seed: u64) -> Self {
        match setting {
            SeedSetting::Custom => Self::new(seed),
            SeedSetting::Random => Self::from_clock(),
        }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    fn rng(&self) -> ChaCha20Rng {
        let mut hasher = blake3::Hasher::new();
        hasher.update(RNG_DOMAIN);
        hasher.update(&self.seed.to_le_bytes());
        ChaCha20Rng::from_seed(*hasher.finalize().as_bytes())
    }

    /// Shuffle `items` in place (Fisher-Yates driven by the seeded generator)
    pub fn scramble<T>(&self, items: &mut [T]) {
        items.shuffle(&mut self.rng());
    }

    /// Undo [`Scrambler::scramble`] in place.
    ///
    /// Scrambles the index sequence `0..len` with the same seed; slot `j` of
    /// the scrambled data originally lived at `order[j]`.
    pub fn unscramble<T: Clone>(&self, items: &mut [T]) {
        let order = self.permutation(items.len());
        let scrambled = items.to_vec();
        for (item, &origin) in scrambled.into_iter().zip(order.iter()) {
            items[origin] = item;
        }
    }

    /// The permutation applied to a sequence of `len` elements
    pub fn permutation(&self, len: usize) -> Vec<usize> {
        let mut order: Vec<usize> = (0..len).collect();
        self.scramble(&mut order);
        order
    }
}

impl Default for Scrambler {
    fn default() -> Self {
        Self::from_clock()
    }
}

impl Exportable for Scrambler {
    const KIND: Kind = Kind::Scrambler;
    const ARITY: usize = 2;

    fn identity(&self) -> Identity {
        Identity::helper(Self::NAME)
    }

    fn export_attributes(&self, _codec: &Codec<'_>) -> Result<Vec<Value>> {
        // Clock-derived seeds are pinned as custom seeds on export
        Ok(vec![
            Value::from(SeedSetting::Custom.code()),
            Value::from(self.seed),
        ])
    }

    fn import_attributes(attributes: &[Value], _codec: &Codec<'_>) -> Result<Self> {
        let setting = SeedSetting::from_code(attr_u64(attributes, 0, "seed setting")?)
            .map_err(|e| ChainError::Importer(e.to_string()))?;
        let seed = attr_u64(attributes, 1, "seed")?;
        Ok(Self::with_setting(setting, seed))
    }
}
