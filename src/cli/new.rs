use crate::chain::CipherChain;
use crate::error::{ChainError, Result};
use crate::helpers::{AlphabetScope, ScopePreset, Scrambler};
use crate::models::{Rotor, RotorBank, Shift, Swap, SwapSetting};
use crate::registry::TypeRegistry;
use crate::store::{save_chain, FileStore};
use std::path::PathBuf;

/// Options for the new command
#[derive(Debug, Clone)]
pub struct NewOptions {
    /// Directory chain documents are stored in
    pub dir: PathBuf,
    pub preset: ScopePreset,
    /// Rotor count of the rotor bank; 0 leaves the bank out
    pub rotors: usize,
    pub shift: Option<i64>,
    pub swap: Option<SwapSetting>,
    pub reverse_amount: usize,
    pub section_amount: usize,
    /// Master seed; every scrambler gets the next seed in sequence
    pub seed: Option<u64>,
    pub overwrite: bool,
}

impl Default for NewOptions {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("saves"),
            preset: ScopePreset::Printable,
            rotors: 3,
            shift: Some(5),
            swap: Some(SwapSetting::Random),
            reverse_amount: 1,
            section_amount: 1,
            seed: None,
            overwrite: false,
        }
    }
}

/// Hands out scramblers from a master seed, or from the clock without one
struct SeedSource {
    next: Option<u64>,
}

impl SeedSource {
    fn scrambler(&mut self) -> Scrambler {
        match self.next {
            Some(seed) => {
                self.next = Some(seed.wrapping_add(1));
                Scrambler::new(seed)
            }
            None => Scrambler::from_clock(),
        }
    }
}

/// Build the chain described by `options`: rotor bank, then shift, then swap
pub fn build_chain(options: &NewOptions) -> Result<CipherChain> {
    let mut seeds = SeedSource { next: options.seed };
    let scope = AlphabetScope::with_preset(options.preset);
    let mut chain = CipherChain::new();

    if options.rotors > 0 {
        let rotors = (0..options.rotors)
            .map(|_| Rotor::new(scope.len(), 0, 0, Some(seeds.scrambler())))
            .collect::<Result<Vec<_>>>()?;
        chain.push(RotorBank::new(scope.clone(), rotors));
    }

    if let Some(amount) = options.shift {
        chain.push(Shift::new(amount, scope, Some(seeds.scrambler())));
    }

    if let Some(setting) = options.swap {
        let scrambler = setting.needs_scrambler().then(|| seeds.scrambler());
        chain.push(Swap::new(
            setting,
            options.reverse_amount,
            options.section_amount,
            scrambler,
        )?);
    }

    if chain.is_empty() {
        return Err(ChainError::Configuration(
            "a chain needs at least one model".into(),
        ));
    }
    Ok(chain)
}

/// Build a chain and store it as `name` in the options directory
pub fn create_chain(name: &str, options: &NewOptions) -> Result<CipherChain> {
    let chain = build_chain(options)?;
    let registry = TypeRegistry::with_builtin();
    let mut store = FileStore::new(&options.dir);

    if !save_chain(&mut store, &registry, &chain, name, options.overwrite)? {
        return Err(ChainError::Storage(format!(
            "chain {} already exists in {}; pass --overwrite to replace it",
            name,
            options.dir.display()
        )));
    }
    Ok(chain)
}
