use crate::error::{ChainError, Result};
use crate::helpers::{AlphabetScope, ScopePreset};
use crate::models::{CipherModel, Direction, Granularity, Rotor};
use crate::registry::{Codec, Exportable, Identity, Kind};
use serde_json::Value;

/// Rotor machine over an alphabet scope, one symbol per call.
///
/// Each symbol first steps the rotors like an odometer (rightmost rotor
/// turns, carries ripple left on wrap), then travels through every rotor
/// right to left and back out left to right, skipping the leftmost rotor on
/// the way back. That path reads the same in both directions, so decrypting
/// walks it again with each rotor's inverse mapping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RotorBank {
    scope: AlphabetScope,
    rotors: Vec<Rotor>,
}

impl RotorBank {
    pub const NAME: &'static str = "model.enigma";

    /// Rotor sizes are checked against the scope length on use, not here
    pub fn new(scope: AlphabetScope, rotors: Vec<Rotor>) -> Self {
        Self { scope, rotors }
    }

    pub fn add_rotor(&mut self, rotor: Rotor) {
        self.rotors.push(rotor);
    }

    pub fn scope(&self) -> &AlphabetScope {
        &self.scope
    }

    pub fn rotors(&self) -> &[Rotor] {
        &self.rotors
    }

    pub fn positions(&self) -> Vec<usize> {
        self.rotors.iter().map(Rotor::position).collect()
    }

    /// Odometer step: turn the rightmost rotor, carry left while rotors wrap
    pub fn advance_all(&mut self) {
        for rotor in self.rotors.iter_mut().rev() {
            if !rotor.advance() {
                break;
            }
        }
    }

    /// Rotor indices in visiting order: `n-1 ..= 0`, then `1 .. n`
    fn signal_path(&self) -> impl Iterator<Item = usize> {
        let n = self.rotors.len();
        (0..n).rev().chain(1..n)
    }

    fn validate(&self) -> Result<()> {
        let expected = self.scope.len();
        for (i, rotor) in self.rotors.iter().enumerate() {
            if rotor.size() != expected {
                return Err(ChainError::Configuration(format!(
                    "rotor {} has size {} but the scope holds {} symbols",
                    i,
                    rotor.size(),
                    expected
                )));
            }
        }
        Ok(())
    }

    fn map_symbol(&mut self, symbol: u8, direction: Direction) -> Result<u8> {
        self.validate()?;
        let mut index = self.scope.index_of(symbol)?;

        self.advance_all();
        for i in self.signal_path() {
            let rotor = &self.rotors[i];
            index = match direction {
                Direction::Encrypt => rotor.forward(index),
                Direction::Decrypt => rotor.backward(index),
            };
        }
        Ok(self.scope.symbol(index))
    }

    pub fn encrypt_symbol(&mut self, symbol: u8) -> Result<u8> {
        self.map_symbol(symbol, Direction::Encrypt)
    }

    pub fn decrypt_symbol(&mut self, symbol: u8) -> Result<u8> {
        self.map_symbol(symbol, Direction::Decrypt)
    }

    fn single_symbol(data: &[u8]) -> Result<u8> {
        match data {
            [symbol] => Ok(*symbol),
            _ => Err(ChainError::Input(format!(
                "rotor bank takes exactly one symbol per call, got {}",
                data.len()
            ))),
        }
    }
}

impl Default for RotorBank {
    fn default() -> Self {
        Self::new(AlphabetScope::with_preset(ScopePreset::Printable), Vec::new())
    }
}

impl CipherModel for RotorBank {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn granularity(&self) -> Granularity {
        Granularity::Char
    }

    fn encrypt(&mut self, data: &[u8]) -> Result<Vec<u8>> {
        let symbol = Self::single_symbol(data)?;
        Ok(vec![self.encrypt_symbol(symbol)?])
    }

    fn decrypt(&mut self, data: &[u8]) -> Result<Vec<u8>> {
        let symbol = Self::single_symbol(data)?;
        Ok(vec![self.decrypt_symbol(symbol)?])
    }

    fn reset(&mut self) {
        for rotor in &mut self.rotors {
            rotor.reset();
        }
    }
}

impl Exportable for RotorBank {
    const KIND: Kind = Kind::RotorBank;
    const ARITY: usize = 2;

    fn identity(&self) -> Identity {
        CipherModel::identity(self)
    }

    fn export_attributes(&self, codec: &Codec<'_>) -> Result<Vec<Value>> {
        Ok(vec![codec.export(&self.scope)?, codec.export_list(&self.rotors)?])
    }

    fn import_attributes(attributes: &[Value], codec: &Codec<'_>) -> Result<Self> {
        let scope = codec.import(&attributes[0])?;
        let rotors = codec.import_list(&attributes[1])?;
        Ok(Self::new(scope, rotors))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::helpers::Scrambler;

    fn lowercase() -> AlphabetScope {
        AlphabetScope::new(ScopePreset::LettersLower, None)
    }

    fn identity_bank(count: usize) -> RotorBank {
        let rotors = (0..count)
            .map(|_| Rotor::new(26, 0, 0, None).unwrap())
            .collect();
        RotorBank::new(lowercase(), rotors)
    }

    #[test]
    fn test_odometer_cycles_through_every_state_once() {
        let scope = AlphabetScope::new(ScopePreset::Test, None);
        let rotors = vec![
            Rotor::new(2, 0, 0, None).unwrap(),
            Rotor::new(3, 0, 0, None).unwrap(),
            Rotor::new(4, 0, 0, None).unwrap(),
        ];
        let mut bank = RotorBank::new(scope, rotors);
        let start = bank.positions();

        let mut seen = std::collections::HashSet::new();
        for step in 1..=24 {
            let before = bank.positions();
            bank.advance_all();
            let after = bank.positions();

            // A rotor only turns when its right-hand neighbour wrapped
            for i in 0..2 {
                let neighbour_wrapped = after[i + 1] == 0 && before[i + 1] != 0;
                assert_eq!(after[i] != before[i], neighbour_wrapped, "step {}", step);
            }

            assert!(seen.insert(after.clone()), "state {:?} repeated", after);
            if step < 24 {
                assert_ne!(after, start);
            }
        }
        assert_eq!(bank.positions(), start);
    }

    #[test]
    fn test_encrypt_advances_before_mapping() {
        let mut bank = identity_bank(3);
        let cipher = bank.encrypt_symbol(b'a').unwrap();

        assert_eq!(bank.positions(), vec![0, 0, 1]);
        // Rightmost rotor sits on the path twice, each adding its position
        assert_eq!(cipher, b'c');

        bank.reset();
        assert_eq!(bank.positions(), vec![0, 0, 0]);
        assert_eq!(bank.decrypt_symbol(cipher).unwrap(), b'a');
    }

    #[test]
    fn test_scrambled_bank_roundtrip() {
        let scope = AlphabetScope::with_preset(ScopePreset::Printable);
        let size = scope.len();
        let rotors = (0..3)
            .map(|i| Rotor::new(size, i * 5, i as i64 - 1, Some(Scrambler::new(100 + i as u64))).unwrap())
            .collect();
        let mut bank = RotorBank::new(scope, rotors);

        let plain = b"The quick brown fox\tjumps over the lazy dog\n".repeat(12);
        let cipher: Vec<u8> = plain.iter().map(|&b| bank.encrypt_symbol(b).unwrap()).collect();
        assert_ne!(cipher, plain);

        bank.reset();
        let recovered: Vec<u8> = cipher.iter().map(|&b| bank.decrypt_symbol(b).unwrap()).collect();
        assert_eq!(recovered, plain);
    }

    #[test]
    fn test_requires_exactly_one_symbol() {
        let mut bank = identity_bank(1);
        assert!(matches!(bank.encrypt(b"ab"), Err(ChainError::Input(_))));
        assert!(matches!(bank.decrypt(b""), Err(ChainError::Input(_))));
        assert_eq!(bank.encrypt(b"a").unwrap().len(), 1);
    }

    #[test]
    fn test_size_mismatch_fails_on_use() {
        let mut bank = RotorBank::new(lowercase(), vec![Rotor::new(25, 0, 0, None).unwrap()]);
        assert!(matches!(
            bank.encrypt_symbol(b'a'),
            Err(ChainError::Configuration(_))
        ));
    }

    #[test]
    fn test_symbol_outside_scope_does_not_step_rotors() {
        let mut bank = identity_bank(2);
        assert!(matches!(
            bank.encrypt_symbol(b'A'),
            Err(ChainError::Scope { symbol: b'A' })
        ));
        assert_eq!(bank.positions(), vec![0, 0]);
    }

    #[test]
    fn test_empty_bank_is_identity() {
        let mut bank = RotorBank::new(lowercase(), Vec::new());
        assert_eq!(bank.encrypt_symbol(b'q').unwrap(), b'q');
    }
}
