//! Cipherchain - composable, reversible byte-transform pipeline
//!
//! A chain of independent cipher models, each with a forward (`encrypt`) and
//! inverse (`decrypt`) transform, applied in sequence to a byte buffer. The
//! transforms are deterministic and reproducible from their configuration;
//! they are not a secure cipher suite.
//!
//! ## Models
//!
//! ```text
//! Input → RotorBank → Shift → Swap → ... → Output
//! ```
//!
//! - **RotorBank**: rotor machine stepping like an odometer, one symbol per call
//! - **Shift**: additive shift inside an (optionally scrambled) alphabet scope
//! - **Swap**: block reversal or seeded scrambling, whole buffer or per section
//!
//! Helpers shared by the models:
//!
//! - **AlphabetScope**: ordered symbol universe built from a preset range
//! - **Scrambler**: seeded permutation generator with an exact inverse
//! - **Rotor**: one permutation disc with a turning position
//!
//! ## Serialization
//!
//! A [`TypeRegistry`] maps stable identifiers to types so an entire chain,
//! nested helpers included, can be flattened to JSON and rebuilt later with
//! the same behavior.
//!
//! ## Example
//!
//! ```
//! use cipherchain::helpers::{AlphabetScope, ScopePreset, Scrambler};
//! use cipherchain::models::{Rotor, RotorBank, Shift, Swap, SwapSetting};
//! use cipherchain::{CipherChain, TypeRegistry};
//!
//! let scope = AlphabetScope::with_preset(ScopePreset::Printable);
//! let rotors = (0..3)
//!     .map(|i| Rotor::new(scope.len(), 0, 0, Some(Scrambler::new(i))))
//!     .collect::<Result<Vec<_>, _>>()
//!     .unwrap();
//!
//! let mut chain = CipherChain::new()
//!     .with(RotorBank::new(scope.clone(), rotors))
//!     .with(Shift::new(5, scope, Some(Scrambler::new(10))))
//!     .with(Swap::new(SwapSetting::Random, 1, 1, Some(Scrambler::new(20))).unwrap());
//!
//! let cipher = chain.encrypt(b"attack at dawn").unwrap();
//!
//! let registry = TypeRegistry::with_builtin();
//! let exported = chain.export(&registry).unwrap();
//! let mut restored = CipherChain::import(&registry, &exported).unwrap();
//! assert_eq!(restored.decrypt(&cipher).unwrap(), b"attack at dawn");
//! ```

pub mod chain;
pub mod cli;
pub mod error;
pub mod helpers;
pub mod models;
pub mod registry;
pub mod store;

pub use chain::CipherChain;
pub use error::{ChainError, Result};
pub use models::{CipherModel, Model};
pub use registry::{Node, TypeRegistry};
pub use store::{load_chain, save_chain, ChainDocument, FileStore, MemoryStore, Store};
