use crate::error::Result;
use crate::helpers::{AlphabetScope, Scrambler};
use crate::models::{CipherModel, Direction, Granularity};
use crate::registry::{attr_i64, Codec, Exportable, Identity, Kind};
use serde_json::Value;

/// Additive shift of every symbol inside an alphabet scope
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Shift {
    amount: i64,
    scope: AlphabetScope,
    scrambler: Option<Scrambler>,
}

impl Shift {
    pub const NAME: &'static str = "model.shift";

    /// With a scrambler the scope order is permuted once, here
    pub fn new(amount: i64, scope: AlphabetScope, scrambler: Option<Scrambler>) -> Self {
        let scope = match &scrambler {
            Some(scrambler) => scope.scrambled(scrambler),
            None => scope,
        };
        Self {
            amount,
            scope,
            scrambler,
        }
    }

    pub fn amount(&self) -> i64 {
        self.amount
    }

    pub fn scope(&self) -> &AlphabetScope {
        &self.scope
    }

    pub fn scrambler(&self) -> Option<&Scrambler> {
        self.scrambler.as_ref()
    }

    fn shift(&self, data: &[u8], direction: Direction) -> Result<Vec<u8>> {
        let len = self.scope.len();
        let step = self.amount.rem_euclid(len as i64) as usize;
        let step = match direction {
            Direction::Encrypt => step,
            Direction::Decrypt => len - step,
        };

        data.iter()
            .map(|&symbol| {
                let index = self.scope.index_of(symbol)?;
                Ok(self.scope.symbol(index + step))
            })
            .collect()
    }
}

impl Default for Shift {
    fn default() -> Self {
        Self::new(0, AlphabetScope::default(), None)
    }
}

impl CipherModel for Shift {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn granularity(&self) -> Granularity {
        Granularity::Whole
    }

    fn encrypt(&mut self, data: &[u8]) -> Result<Vec<u8>> {
        self.shift(data, Direction::Encrypt)
    }

    fn decrypt(&mut self, data: &[u8]) -> Result<Vec<u8>> {
        self.shift(data, Direction::Decrypt)
    }
}

impl Exportable for Shift {
    const KIND: Kind = Kind::Shift;
    const ARITY: usize = 3;

    fn identity(&self) -> Identity {
        CipherModel::identity(self)
    }

    fn export_attributes(&self, codec: &Codec<'_>) -> Result<Vec<Value>> {
        // The scope exports its preset, so import rebuilds and re-scrambles it
        Ok(vec![
            Value::from(self.amount),
            codec.export(&self.scope)?,
            codec.export_optional(self.scrambler.as_ref())?,
        ])
    }

    fn import_attributes(attributes: &[Value], codec: &Codec<'_>) -> Result<Self> {
        let amount = attr_i64(attributes, 0, "shift amount")?;
        let scope = codec.import(&attributes[1])?;
        let scrambler = codec.import_optional(&attributes[2])?;
        Ok(Self::new(amount, scope, scrambler))
    }
}
