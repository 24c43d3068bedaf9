//! Cipher models: reversible transforms sharing one contract.
//!
//! ```text
//! Shift      whole buffer   additive shift inside an alphabet scope
//! Swap       whole buffer   block reversal or seeded scrambling
//! RotorBank  one symbol     odometer-stepped rotor permutations
//! ```

pub mod rotor;
pub mod rotor_bank;
pub mod shift;
pub mod swap;

pub use rotor::*;
pub use rotor_bank::*;
pub use shift::*;
pub use swap::*;

use crate::error::Result;
use crate::registry::{Exportable, Identity, Kind};
use serde::{Deserialize, Serialize};

/// How much input a model consumes per call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    /// Exactly one symbol per call
    Char,
    /// The whole buffer at once
    Whole,
}

impl Granularity {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Char => "char",
            Self::Whole => "whole",
        }
    }
}

/// Which way data flows through shared transform logic
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    #[default]
    Encrypt,
    Decrypt,
}

/// Contract every model in a chain satisfies
pub trait CipherModel {
    fn name(&self) -> &'static str;

    fn granularity(&self) -> Granularity;

    fn encrypt(&mut self, data: &[u8]) -> Result<Vec<u8>>;

    fn decrypt(&mut self, data: &[u8]) -> Result<Vec<u8>>;

    /// Return to the state recorded at construction
    fn reset(&mut self) {}

    fn identity(&self) -> Identity {
        Identity::model(self.name(), self.granularity())
    }
}

/// The closed set of cipher models a chain can hold
#[derive(Debug, Clone)]
pub enum Model {
    Shift(Shift),
    Swap(Swap),
    RotorBank(RotorBank),
}

impl Model {
    pub fn kind(&self) -> Kind {
        match self {
            Self::Shift(_) => Shift::KIND,
            Self::Swap(_) => Swap::KIND,
            Self::RotorBank(_) => RotorBank::KIND,
        }
    }
}

impl CipherModel for Model {
    fn name(&self) -> &'static str {
        match self {
            Self::Shift(m) => m.name(),
            Self::Swap(m) => m.name(),
            Self::RotorBank(m) => m.name(),
        }
    }

    fn granularity(&self) -> Granularity {
        match self {
            Self::Shift(m) => m.granularity(),
            Self::Swap(m) => m.granularity(),
            Self::RotorBank(m) => m.granularity(),
        }
    }

    fn encrypt(&mut self, data: &[u8]) -> Result<Vec<u8>> {
        match self {
            Self::Shift(m) => m.encrypt(data),
            Self::Swap(m) => m.encrypt(data),
            Self::RotorBank(m) => m.encrypt(data),
        }
    }

    fn decrypt(&mut self, data: &[u8]) -> Result<Vec<u8>> {
        match self {
            Self::Shift(m) => m.decrypt(data),
            Self::Swap(m) => m.decrypt(data),
            Self::RotorBank(m) => m.decrypt(data),
        }
    }

    fn reset(&mut self) {
        match self {
            Self::Shift(m) => m.reset(),
            Self::Swap(m) => m.reset(),
            Self::RotorBank(m) => m.reset(),
        }
    }
}

impl From<Shift> for Model {
    fn from(model: Shift) -> Self {
        Self::Shift(model)
    }
}

impl From<Swap> for Model {
    fn from(model: Swap) -> Self {
        Self::Swap(model)
    }
}

impl From<RotorBank> for Model {
    fn from(model: RotorBank) -> Self {
        Self::RotorBank(model)
    }
}
