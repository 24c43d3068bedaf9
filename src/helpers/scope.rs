use crate::error::{ChainError, Result};
use crate::helpers::Scrambler;
use crate::registry::{attr_str, Codec, Exportable, Identity, Kind};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Symbols appended to a scope when no explicit extras are given
pub const DEFAULT_EXTRA_SYMBOLS: &[u8] = b"\n\t ";

/// Named symbol ranges a scope can be built from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum ScopePreset {
    #[default]
    Full,
    LettersDigits,
    LettersAll,
    LettersLower,
    LettersHigher,
    Printable,
    Test,
}

impl ScopePreset {
    /// Inclusive byte range enumerated by this preset
    pub fn range(self) -> (u8, u8) {
        match self {
            Self::Full => (1, 255),
            Self::LettersDigits => (48, 122),
            Self::LettersAll => (65, 122),
            Self::LettersLower => (97, 122),
            Self::LettersHigher => (65, 90),
            Self::Printable => (33, 255),
            Self::Test => (97, 102),
        }
    }

    /// Character class filter applied to the range
    pub fn admits(self, symbol: u8) -> bool {
        let c = char::from(symbol);
        match self {
            Self::LettersAll | Self::LettersLower | Self::LettersHigher => c.is_alphabetic(),
            Self::LettersDigits => c.is_alphanumeric(),
            // No-break space and soft hyphen are not printable either
            Self::Printable => !c.is_control() && symbol != 0xA0 && symbol != 0xAD,
            Self::Full | Self::Test => true,
        }
    }

    /// Whether the preset itself enumerates `symbol`
    pub fn contains(self, symbol: u8) -> bool {
        let (start, stop) = self.range();
        (start..=stop).contains(&symbol) && self.admits(symbol)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Full => "full",
            Self::LettersDigits => "letters-digits",
            Self::LettersAll => "letters-all",
            Self::LettersLower => "letters-lower",
            Self::LettersHigher => "letters-higher",
            Self::Printable => "printable",
            Self::Test => "test",
        }
    }
}

impl std::str::FromStr for ScopePreset {
    type Err = ChainError;
    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "full" => Ok(Self::Full),
            "letters-digits" | "lettersdigits" => Ok(Self::LettersDigits),
            "letters-all" | "lettersall" => Ok(Self::LettersAll),
            "letters-lower" | "letterslower" => Ok(Self::LettersLower),
            "letters-higher" | "lettershigher" => Ok(Self::LettersHigher),
            "printable" => Ok(Self::Printable),
            "test" => Ok(Self::Test),
            _ => Err(ChainError::UnsupportedSetting(format!("scope preset: {}", s))),
        }
    }
}

/// Ordered symbol universe of a per-symbol cipher model
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlphabetScope {
    preset: ScopePreset,
    extra_symbols: Option<Vec<u8>>,
    symbols: Vec<u8>,
    /// First index of each byte value in `symbols`
    index: [Option<usize>; 256],
}

impl AlphabetScope {
    pub const NAME: &'static str = "helper.ascii_scope";

    /// Build a scope from a preset and optional extra symbols.
    ///
    /// Extras are appended verbatim after the preset range, without class
    /// filtering or deduplication.
    pub fn new(preset: ScopePreset, extra_symbols: Option<Vec<u8>>) -> Self {
        let (start, stop) = preset.range();
        let mut symbols: Vec<u8> = (start..=stop).filter(|&b| preset.admits(b)).collect();
        if let Some(extra) = &extra_symbols {
            symbols.extend_from_slice(extra);
        }

        let mut scope = Self {
            preset,
            extra_symbols,
            symbols,
            index: [None; 256],
        };
        scope.rebuild_index();
        scope
    }

    /// Scope with the default extra symbols (newline, tab, space).
    ///
    /// Extras the preset already enumerates are left out, so every symbol
    /// appears once and the scope stays invertible.
    pub fn with_preset(preset: ScopePreset) -> Self {
        let extras = DEFAULT_EXTRA_SYMBOLS
            .iter()
            .copied()
            .filter(|&symbol| !preset.contains(symbol))
            .collect();
        Self::new(preset, Some(extras))
    }

    /// Copy of this scope with its symbol order permuted by `scrambler`
    pub fn scrambled(&self, scrambler: &Scrambler) -> Self {
        let mut scope = self.clone();
        scrambler.scramble(&mut scope.symbols);
        scope.rebuild_index();
        scope
    }

    fn rebuild_index(&mut self) {
        self.index = [None; 256];
        for (i, &symbol) in self.symbols.iter().enumerate() {
            let slot = &mut self.index[symbol as usize];
            if slot.is_none() {
                *slot = Some(i);
            }
        }
    }

    pub fn preset(&self) -> ScopePreset {
        self.preset
    }

    pub fn extra_symbols(&self) -> Option<&[u8]> {
        self.extra_symbols.as_deref()
    }

    pub fn symbols(&self) -> &[u8] {
        &self.symbols
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    /// True when some symbol appears more than once
    pub fn has_duplicates(&self) -> bool {
        self.index
            .iter()
            .flatten()
            .count()
            != self.symbols.len()
    }

    pub fn index_of(&self, symbol: u8) -> Result<usize> {
        self.index[symbol as usize].ok_or(ChainError::Scope { symbol })
    }

    /// Symbol at `index`, wrapping around the scope length
    pub fn symbol(&self, index: usize) -> u8 {
        self.symbols[index % self.symbols.len()]
    }
}

impl Default for AlphabetScope {
    fn default() -> Self {
        Self::with_preset(ScopePreset::default())
    }
}

impl Exportable for AlphabetScope {
    const KIND: Kind = Kind::Scope;
    const ARITY: usize = 2;

    fn identity(&self) -> Identity {
        Identity::helper(Self::NAME)
    }

    fn export_attributes(&self, _codec: &Codec<'_>) -> Result<Vec<Value>> {
        let extra = match &self.extra_symbols {
            Some(symbols) => Value::from(symbols.clone()),
            None => Value::Null,
        };
        Ok(vec![Value::from(self.preset.as_str()), extra])
    }

    fn import_attributes(attributes: &[Value], _codec: &Codec<'_>) -> Result<Self> {
        let preset: ScopePreset = attr_str(attributes, 0, "scope preset")?
            .parse()
            .map_err(|e: ChainError| ChainError::Importer(e.to_string()))?;

        let extra = match &attributes[1] {
            Value::Null => None,
            Value::Array(items) => Some(
                items
                    .iter()
                    .map(|v| {
                        v.as_u64()
                            .and_then(|n| u8::try_from(n).ok())
                            .ok_or_else(|| {
                                ChainError::Importer(format!("extra symbol is not a byte: {}", v))
                            })
                    })
                    .collect::<Result<Vec<u8>>>()?,
            ),
            other => {
                return Err(ChainError::Importer(format!(
                    "extra symbols must be a list or null, found {}",
                    other
                )))
            }
        };

        Ok(Self::new(preset, extra))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_test_preset_without_extras() {
        let scope = AlphabetScope::new(ScopePreset::Test, None);
        assert_eq!(scope.symbols(), b"abcdef");
        assert_eq!(scope.index_of(b'c').unwrap(), 2);
    }

    #[test]
    fn test_letters_presets_skip_punctuation() {
        let all = AlphabetScope::new(ScopePreset::LettersAll, None);
        assert_eq!(all.len(), 52);
        assert!(all.index_of(b'[').is_err());

        let digits = AlphabetScope::new(ScopePreset::LettersDigits, None);
        assert_eq!(digits.len(), 62);
        assert_eq!(digits.symbol(0), b'0');

        assert_eq!(AlphabetScope::new(ScopePreset::LettersLower, None).len(), 26);
        assert_eq!(AlphabetScope::new(ScopePreset::LettersHigher, None).len(), 26);
    }

    #[test]
    fn test_printable_excludes_controls() {
        let scope = AlphabetScope::new(ScopePreset::Printable, None);
        // 33..=126, 161..=172, 174..=255
        assert_eq!(scope.len(), 94 + 12 + 82);
        assert!(scope.index_of(0x7F).is_err());
        assert!(scope.index_of(0xA0).is_err());
        assert!(scope.index_of(0xAD).is_err());
        assert!(scope.index_of(b' ').is_err());
    }

    #[test]
    fn test_default_extras_are_appended() {
        let scope = AlphabetScope::with_preset(ScopePreset::Test);
        assert_eq!(scope.symbols(), b"abcdef\n\t ");
        assert_eq!(scope.index_of(b' ').unwrap(), 8);
    }

    #[test]
    fn test_duplicate_extras_keep_first_index() {
        let scope = AlphabetScope::new(ScopePreset::Test, Some(b"ab".to_vec()));
        assert_eq!(scope.len(), 8);
        assert_eq!(scope.index_of(b'a').unwrap(), 0);
        assert!(scope.has_duplicates());
    }

    #[test]
    fn test_full_preset_skips_extras_it_already_holds() {
        let scope = AlphabetScope::with_preset(ScopePreset::Full);
        assert_eq!(scope.len(), 255);
        assert_eq!(scope.extra_symbols(), Some(&[][..]));
        assert!(!scope.has_duplicates());
        assert!(!AlphabetScope::default().has_duplicates());
    }

    #[test]
    fn test_default_scopes_have_unique_symbols() {
        for preset in [
            ScopePreset::Full,
            ScopePreset::LettersDigits,
            ScopePreset::LettersAll,
            ScopePreset::LettersLower,
            ScopePreset::LettersHigher,
            ScopePreset::Printable,
            ScopePreset::Test,
        ] {
            let scope = AlphabetScope::with_preset(preset);
            assert!(!scope.has_duplicates(), "{} has duplicates", preset.as_str());
            for (i, &symbol) in scope.symbols().iter().enumerate() {
                assert_eq!(scope.index_of(symbol).unwrap(), i);
            }
        }
    }

    #[test]
    fn test_missing_symbol_is_scope_error() {
        let scope = AlphabetScope::new(ScopePreset::Test, None);
        let err = scope.index_of(b'z').unwrap_err();
        assert!(matches!(err, ChainError::Scope { symbol: b'z' }));
    }

    #[test]
    fn test_scrambled_scope_is_a_permutation() {
        let scope = AlphabetScope::with_preset(ScopePreset::Printable);
        let scrambled = scope.scrambled(&Scrambler::new(11));

        assert_ne!(scope.symbols(), scrambled.symbols());
        let mut a = scope.symbols().to_vec();
        let mut b = scrambled.symbols().to_vec();
        a.sort_unstable();
        b.sort_unstable();
        assert_eq!(a, b);

        for (i, &symbol) in scrambled.symbols().iter().enumerate() {
            assert_eq!(scrambled.index_of(symbol).unwrap(), i);
        }
    }

    #[test]
    fn test_preset_parsing() {
        assert_eq!("printable".parse::<ScopePreset>().unwrap(), ScopePreset::Printable);
        assert_eq!(
            "Letters-Lower".parse::<ScopePreset>().unwrap(),
            ScopePreset::LettersLower
        );
        assert!("klingon".parse::<ScopePreset>().is_err());
    }
}
