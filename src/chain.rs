//! Ordered composition of cipher models.
//!
//! ```text
//! encrypt:  data → model[0] → model[1] → … → model[n-1] → cipher
//! decrypt:  cipher → model[n-1] → … → model[0] → data
//! ```
//!
//! Char-granularity models receive the buffer one symbol at a time. Every
//! model is reset as soon as it has processed the buffer, so each call
//! starts from the configuration the chain was built with.

use crate::error::Result;
use crate::models::{CipherModel, Direction, Granularity, Model};
use crate::registry::{Node, TypeRegistry};
use serde_json::Value;

#[derive(Debug, Clone, Default)]
pub struct CipherChain {
    models: Vec<Model>,
}

impl CipherChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a model; the chain owns it from here on
    pub fn push(&mut self, model: impl Into<Model>) {
        let model = model.into();
        tracing::debug!(
            position = self.models.len(),
            model = model.name(),
            granularity = model.granularity().as_str(),
            "Added model to chain"
        );
        self.models.push(model);
    }

    /// Builder form of [`CipherChain::push`]
    pub fn with(mut self, model: impl Into<Model>) -> Self {
        self.push(model);
        self
    }

    /// Append an imported node, rejecting helpers that are not cipher models
    pub fn add_node(&mut self, node: Node) -> Result<()> {
        let model = node.into_model()?;
        self.push(model);
        Ok(())
    }

    pub fn models(&self) -> &[Model] {
        &self.models
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }

    pub fn encrypt(&mut self, data: &[u8]) -> Result<Vec<u8>> {
        let mut content = data.to_vec();
        for model in self.models.iter_mut() {
            content = Self::run(model, &content, Direction::Encrypt)?;
            model.reset();
        }
        tracing::debug!(models = self.models.len(), bytes = content.len(), "Encrypted buffer");
        Ok(content)
    }

    pub fn decrypt(&mut self, data: &[u8]) -> Result<Vec<u8>> {
        let mut content = data.to_vec();
        for model in self.models.iter_mut().rev() {
            content = Self::run(model, &content, Direction::Decrypt)?;
            model.reset();
        }
        tracing::debug!(models = self.models.len(), bytes = content.len(), "Decrypted buffer");
        Ok(content)
    }

    /// Reset every model, e.g. after a call failed halfway through the chain
    pub fn reset(&mut self) {
        for model in &mut self.models {
            model.reset();
        }
    }

    fn run(model: &mut Model, data: &[u8], direction: Direction) -> Result<Vec<u8>> {
        let granularity = model.granularity();
        let mut step = |chunk: &[u8]| match direction {
            Direction::Encrypt => model.encrypt(chunk),
            Direction::Decrypt => model.decrypt(chunk),
        };

        match granularity {
            Granularity::Whole => step(data),
            Granularity::Char => {
                let mut output = Vec::with_capacity(data.len());
                for symbol in data.chunks(1) {
                    output.extend(step(symbol)?);
                }
                Ok(output)
            }
        }
    }

    /// Flatten every model to a tagged tree, in chain order
    pub fn export(&self, registry: &TypeRegistry) -> Result<Vec<Value>> {
        self.models
            .iter()
            .map(|model| registry.export_model(model))
            .collect()
    }

    /// Rebuild a chain from exported model trees
    pub fn import(registry: &TypeRegistry, models: &[Value]) -> Result<Self> {
        let mut chain = Self::new();
        for tree in models {
            chain.add_node(registry.import(tree)?)?;
        }
        Ok(chain)
    }

    /// Human readable listing of the chain
    pub fn describe(&self) -> String {
        let mut output = String::new();
        output.push_str(&format!("Cipher chain with {} models\n", self.models.len()));
        output.push_str("==========================\n");

        for (i, model) in self.models.iter().enumerate() {
            let details = match model {
                Model::Shift(shift) => format!(
                    "amount {}, scope {} ({} symbols), scrambled: {}",
                    shift.amount(),
                    shift.scope().preset().as_str(),
                    shift.scope().len(),
                    shift.scrambler().is_some()
                ),
                Model::Swap(swap) => format!(
                    "setting {}, reverse amount {}, section amount {}",
                    swap.setting().as_str(),
                    swap.reverse_amount(),
                    swap.section_amount()
                ),
                Model::RotorBank(bank) => format!(
                    "{} rotors, scope {} ({} symbols), positions {:?}",
                    bank.rotors().len(),
                    bank.scope().preset().as_str(),
                    bank.scope().len(),
                    bank.positions()
                ),
            };
            output.push_str(&format!(
                "{:>3}. {} [{}] {}\n     {}\n",
                i,
                model.name(),
                model.granularity().as_str(),
                model.identity().identifier(),
                details
            ));
        }
        output
    }
}
