use crate::error::{ChainError, Result};
use crate::helpers::Scrambler;
use crate::registry::{attr_i64, attr_usize, Codec, Exportable, Identity, Kind};
use serde_json::Value;

/// Size of the canonical rotor (one per lowercase letter)
pub const DEFAULT_ROTOR_SIZE: usize = 26;

/// One disc of a rotor bank: a fixed permutation plus a turning position
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rotor {
    size: usize,
    initial_position: usize,
    position: usize,
    offset: i64,
    scrambler: Option<Scrambler>,
    table: Vec<usize>,
    /// `inverse[table[p]] == p`
    inverse: Vec<usize>,
}

impl Rotor {
    pub const NAME: &'static str = "enigma.rotor";

    /// Build a rotor of `size` contacts.
    ///
    /// The table starts as the identity, is scrambled when a scrambler is
    /// given, then rotated left by `offset` (negative offsets rotate right).
    pub fn new(
        size: usize,
        position: usize,
        offset: i64,
        scrambler: Option<Scrambler>,
    ) -> Result<Self> {
        if size == 0 {
            return Err(ChainError::Configuration(
                "rotor size must be at least 1".into(),
            ));
        }
        if position >= size {
            return Err(ChainError::Configuration(format!(
                "rotor position {} is outside a rotor of size {}",
                position, size
            )));
        }
        if offset.unsigned_abs() > size as u64 {
            return Err(ChainError::Configuration(format!(
                "rotor offset {} is larger than rotor size {}",
                offset, size
            )));
        }
        Ok(Self::assemble(size, position, offset, scrambler))
    }

    fn assemble(size: usize, position: usize, offset: i64, scrambler: Option<Scrambler>) -> Self {
        let mut rotor = Self {
            size,
            initial_position: position,
            position,
            offset,
            scrambler,
            table: Vec::new(),
            inverse: Vec::new(),
        };
        rotor.build_table();
        rotor
    }

    fn build_table(&mut self) {
        let mut table: Vec<usize> = (0..self.size).collect();
        if let Some(scrambler) = &self.scrambler {
            scrambler.scramble(&mut table);
        }
        if self.offset != 0 {
            table.rotate_left(self.offset.rem_euclid(self.size as i64) as usize);
        }

        let mut inverse = vec![0; self.size];
        for (contact, &value) in table.iter().enumerate() {
            inverse[value] = contact;
        }
        self.table = table;
        self.inverse = inverse;
    }

    pub fn forward(&self, input: usize) -> usize {
        self.table[(self.position + input) % self.size]
    }

    pub fn backward(&self, output: usize) -> usize {
        debug_assert!(output < self.size, "rotor output {} out of range", output);
        let contact = self.inverse[output];
        (contact + self.size - self.position) % self.size
    }

    /// Turn one step; true when the rotor wrapped back to position 0
    pub fn advance(&mut self) -> bool {
        self.position = (self.position + 1) % self.size;
        self.position == 0
    }

    /// Restore the construction position and rebuild the table from the same seed
    pub fn reset(&mut self) {
        self.position = self.initial_position;
        self.build_table();
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn initial_position(&self) -> usize {
        self.initial_position
    }

    pub fn offset(&self) -> i64 {
        self.offset
    }

    pub fn scrambler(&self) -> Option<&Scrambler> {
        self.scrambler.as_ref()
    }

    pub fn table(&self) -> &[usize] {
        &self.table
    }
}

impl Default for Rotor {
    fn default() -> Self {
        Self::assemble(DEFAULT_ROTOR_SIZE, 0, 0, None)
    }
}

impl Exportable for Rotor {
    const KIND: Kind = Kind::Rotor;
    const ARITY: usize = 4;

    fn identity(&self) -> Identity {
        Identity::helper(Self::NAME)
    }

    fn export_attributes(&self, codec: &Codec<'_>) -> Result<Vec<Value>> {
        Ok(vec![
            Value::from(self.size),
            Value::from(self.initial_position),
            Value::from(self.offset),
            codec.export_optional(self.scrambler.as_ref())?,
        ])
    }

    fn import_attributes(attributes: &[Value], codec: &Codec<'_>) -> Result<Self> {
        let size = attr_usize(attributes, 0, "rotor size")?;
        let position = attr_usize(attributes, 1, "rotor position")?;
        let offset = attr_i64(attributes, 2, "rotor offset")?;
        let scrambler = codec.import_optional(&attributes[3])?;
        Self::new(size, position, offset, scrambler)
            .map_err(|e| ChainError::Importer(format!("invalid rotor: {}", e)))
    }
}
