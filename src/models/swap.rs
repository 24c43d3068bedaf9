use crate::error::{ChainError, Result};
use crate::helpers::Scrambler;
use crate::models::{CipherModel, Direction, Granularity};
use crate::registry::{attr_u64, attr_usize, Codec, Exportable, Identity, Kind};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Positional rearrangement strategy of a swap model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum SwapSetting {
    #[default]
    Reverse,
    Random,
    SectionReverse,
    SectionRandom,
}

impl SwapSetting {
    /// Numeric tag used in exported trees
    pub fn code(self) -> u64 {
        match self {
            Self::Reverse => 0,
            Self::Random => 1,
            Self::SectionReverse => 2,
            Self::SectionRandom => 3,
        }
    }

    pub fn from_code(code: u64) -> Result<Self> {
        match code {
            0 => Ok(Self::Reverse),
            1 => Ok(Self::Random),
            2 => Ok(Self::SectionReverse),
            3 => Ok(Self::SectionRandom),
            _ => Err(ChainError::UnsupportedSetting(format!("swap setting: {}", code))),
        }
    }

    pub fn needs_scrambler(self) -> bool {
        matches!(self, Self::Random | Self::SectionRandom)
    }

    pub fn is_sectioned(self) -> bool {
        matches!(self, Self::SectionReverse | Self::SectionRandom)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Reverse => "reverse",
            Self::Random => "random",
            Self::SectionReverse => "section-reverse",
            Self::SectionRandom => "section-random",
        }
    }
}

impl std::str::FromStr for SwapSetting {
    type Err = ChainError;
    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "reverse" => Ok(Self::Reverse),
            "random" => Ok(Self::Random),
            "section-reverse" | "sectionreverse" => Ok(Self::SectionReverse),
            "section-random" | "sectionrandom" => Ok(Self::SectionRandom),
            _ => Err(ChainError::UnsupportedSetting(format!("swap setting: {}", s))),
        }
    }
}

/// Swap the outer `k`-blocks and work inwards until fewer than `2k` remain.
///
/// Each block keeps its internal order, so the operation is its own inverse.
pub fn reverse_blocks<T>(data: &mut [T], k: usize) {
    if k == 0 {
        return;
    }
    let (mut start, mut end) = (0, data.len());
    while end - start >= 2 * k {
        for i in 0..k {
            data.swap(start + i, end - k + i);
        }
        start += k;
        end -= k;
    }
}

/// Apply `inner` to consecutive `k`-chunks while at least `2k` elements remain.
///
/// The tail left over (under `2k` elements) is not touched.
pub fn sectioned<T>(data: &mut [T], k: usize, mut inner: impl FnMut(&mut [T])) {
    if k == 0 {
        return;
    }
    let mut start = 0;
    while data.len() - start >= 2 * k {
        inner(&mut data[start..start + k]);
        start += k;
    }
}

/// Whole-buffer positional shuffling
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Swap {
    setting: SwapSetting,
    reverse_amount: usize,
    section_amount: usize,
    scrambler: Option<Scrambler>,
}

impl Swap {
    pub const NAME: &'static str = "model.swap";

    pub fn new(
        setting: SwapSetting,
        reverse_amount: usize,
        section_amount: usize,
        scrambler: Option<Scrambler>,
    ) -> Result<Self> {
        if reverse_amount < 1 {
            return Err(ChainError::Configuration(
                "reverse amount must be at least 1".into(),
            ));
        }
        if section_amount < 1 {
            return Err(ChainError::Configuration(
                "section amount must be at least 1".into(),
            ));
        }
        if setting.needs_scrambler() && scrambler.is_none() {
            return Err(ChainError::Configuration(format!(
                "swap setting {} requires a scrambler",
                setting.as_str()
            )));
        }

        if !setting.is_sectioned() && section_amount != 1 {
            tracing::warn!(
                setting = setting.as_str(),
                section_amount,
                "Section amount has no effect without a section setting"
            );
        }
        if setting == SwapSetting::Random && reverse_amount != 1 {
            tracing::warn!(
                reverse_amount,
                "Reverse amount has no effect with the random setting"
            );
        }

        Ok(Self {
            setting,
            reverse_amount,
            section_amount,
            scrambler,
        })
    }

    pub fn setting(&self) -> SwapSetting {
        self.setting
    }

    pub fn reverse_amount(&self) -> usize {
        self.reverse_amount
    }

    pub fn section_amount(&self) -> usize {
        self.section_amount
    }

    pub fn scrambler(&self) -> Option<&Scrambler> {
        self.scrambler.as_ref()
    }

    fn scramble_swap(&self, data: &mut [u8], direction: Direction) {
        if let Some(scrambler) = &self.scrambler {
            match direction {
                Direction::Encrypt => scrambler.scramble(data),
                Direction::Decrypt => scrambler.unscramble(data),
            }
        }
    }

    fn swap(&self, data: &[u8], direction: Direction) -> Vec<u8> {
        let mut content = data.to_vec();
        match self.setting {
            SwapSetting::Reverse => reverse_blocks(&mut content, self.reverse_amount),
            SwapSetting::Random => self.scramble_swap(&mut content, direction),
            SwapSetting::SectionReverse => sectioned(&mut content, self.section_amount, |chunk| {
                reverse_blocks(chunk, self.reverse_amount)
            }),
            SwapSetting::SectionRandom => sectioned(&mut content, self.section_amount, |chunk| {
                self.scramble_swap(chunk, direction)
            }),
        }
        content
    }
}

impl Default for Swap {
    fn default() -> Self {
        Self {
            setting: SwapSetting::Reverse,
            reverse_amount: 1,
            section_amount: 1,
            scrambler: None,
        }
    }
}

impl CipherModel for Swap {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn granularity(&self) -> Granularity {
        Granularity::Whole
    }

    fn encrypt(&mut self, data: &[u8]) -> Result<Vec<u8>> {
        Ok(self.swap(data, Direction::Encrypt))
    }

    fn decrypt(&mut self, data: &[u8]) -> Result<Vec<u8>> {
        Ok(self.swap(data, Direction::Decrypt))
    }
}

impl Exportable for Swap {
    const KIND: Kind = Kind::Swap;
    const ARITY: usize = 4;

    fn identity(&self) -> Identity {
        CipherModel::identity(self)
    }

    fn export_attributes(&self, codec: &Codec<'_>) -> Result<Vec<Value>> {
        Ok(vec![
            Value::from(self.setting.code()),
            Value::from(self.reverse_amount),
            Value::from(self.section_amount),
            codec.export_optional(self.scrambler.as_ref())?,
        ])
    }

    fn import_attributes(attributes: &[Value], codec: &Codec<'_>) -> Result<Self> {
        let setting = SwapSetting::from_code(attr_u64(attributes, 0, "swap setting")?)
            .map_err(|e| ChainError::Importer(e.to_string()))?;
        let reverse_amount = attr_usize(attributes, 1, "reverse amount")?;
        let section_amount = attr_usize(attributes, 2, "section amount")?;
        let scrambler = codec.import_optional(&attributes[3])?;
        Self::new(setting, reverse_amount, section_amount, scrambler)
            .map_err(|e| ChainError::Importer(format!("invalid swap: {}", e)))
    }
}
