//! Persisted chain documents and the storage they are written through.
//!
//! A document is JSON of the shape
//! `{"date": <unix seconds>, "models": [[identifier, attr...], ...]}`.

use crate::chain::CipherChain;
use crate::error::{ChainError, Result};
use crate::registry::TypeRegistry;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

/// File extension appended to stored chain names
pub const CHAIN_EXTENSION: &str = "json";

/// Narrow read/write contract for persisting chain documents
pub trait Store {
    fn read(&self, name: &str) -> Result<String>;

    /// Returns `Ok(false)` without writing when `name` exists and `overwrite` is off
    fn write(&mut self, name: &str, text: &str, overwrite: bool) -> Result<bool>;
}

/// Chain documents stored as `<root>/<name>.json`
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn path_for(&self, name: &str) -> PathBuf {
        let suffix = format!(".{}", CHAIN_EXTENSION);
        if name.ends_with(&suffix) {
            self.root.join(name)
        } else {
            self.root.join(format!("{}{}", name, suffix))
        }
    }
}

impl Store for FileStore {
    fn read(&self, name: &str) -> Result<String> {
        let path = self.path_for(name);
        if !path.is_file() {
            return Err(ChainError::Storage(format!(
                "chain file {} not found",
                path.display()
            )));
        }
        Ok(fs::read_to_string(path)?)
    }

    fn write(&mut self, name: &str, text: &str, overwrite: bool) -> Result<bool> {
        let path = self.path_for(name);
        if path.exists() && !overwrite {
            return Ok(false);
        }
        fs::create_dir_all(&self.root)?;
        fs::write(&path, text)?;
        Ok(true)
    }
}

/// In-memory store for tests
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    files: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

impl Store for MemoryStore {
    fn read(&self, name: &str) -> Result<String> {
        self.files
            .get(name)
            .cloned()
            .ok_or_else(|| ChainError::Storage(format!("chain {} not found", name)))
    }

    fn write(&mut self, name: &str, text: &str, overwrite: bool) -> Result<bool> {
        if self.files.contains_key(name) && !overwrite {
            return Ok(false);
        }
        self.files.insert(name.to_string(), text.to_string());
        Ok(true)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChainDocument {
    /// Export time in seconds since the Unix epoch
    pub date: u64,
    pub models: Vec<Value>,
}

impl ChainDocument {
    pub fn from_chain(chain: &CipherChain, registry: &TypeRegistry) -> Result<Self> {
        let date = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or_default();
        Ok(Self {
            date,
            models: chain.export(registry)?,
        })
    }

    pub fn to_chain(&self, registry: &TypeRegistry) -> Result<CipherChain> {
        CipherChain::import(registry, &self.models)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }
}

/// Export `chain` and write it under `name`; `false` when an existing entry was kept
pub fn save_chain(
    store: &mut impl Store,
    registry: &TypeRegistry,
    chain: &CipherChain,
    name: &str,
    overwrite: bool,
) -> Result<bool> {
    let document = ChainDocument::from_chain(chain, registry)?;
    let written = store.write(name, &document.to_json()?, overwrite)?;
    tracing::debug!(name, written, models = document.models.len(), "Saved chain");
    Ok(written)
}

pub fn load_chain(store: &impl Store, registry: &TypeRegistry, name: &str) -> Result<CipherChain> {
    let document = ChainDocument::from_json(&store.read(name)?)?;
    let chain = document.to_chain(registry)?;
    tracing::debug!(name, models = chain.len(), date = document.date, "Loaded chain");
    Ok(chain)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::helpers::{AlphabetScope, ScopePreset, Scrambler};
    use crate::models::{Shift, Swap, SwapSetting};
    use tempfile::tempdir;

    fn sample_chain() -> CipherChain {
        CipherChain::new()
            .with(Shift::new(
                3,
                AlphabetScope::with_preset(ScopePreset::Printable),
                None,
            ))
            .with(Swap::new(SwapSetting::SectionRandom, 1, 4, Some(Scrambler::new(12))).unwrap())
    }

    #[test]
    fn test_memory_store_respects_overwrite() {
        let mut store = MemoryStore::new();
        assert!(store.write("a", "one", false).unwrap());
        assert!(!store.write("a", "two", false).unwrap());
        assert_eq!(store.read("a").unwrap(), "one");
        assert!(store.write("a", "two", true).unwrap());
        assert_eq!(store.read("a").unwrap(), "two");
        assert!(matches!(store.read("b"), Err(ChainError::Storage(_))));
    }

    #[test]
    fn test_file_store_appends_extension() {
        let dir = tempdir().unwrap();
        let mut store = FileStore::new(dir.path().join("saves"));
        assert!(store.write("test", "{}", false).unwrap());
        assert!(dir.path().join("saves").join("test.json").is_file());
        assert_eq!(store.read("test.json").unwrap(), "{}");
        assert!(!store.write("test", "[]", false).unwrap());
    }

    #[test]
    fn test_file_store_missing_file() {
        let dir = tempdir().unwrap();
        let store = FileStore::new(dir.path());
        assert!(matches!(store.read("nope"), Err(ChainError::Storage(_))));
    }

    #[test]
    fn test_document_shape() {
        let registry = TypeRegistry::with_builtin();
        let document = ChainDocument::from_chain(&sample_chain(), &registry).unwrap();
        let json: Value = serde_json::from_str(&document.to_json().unwrap()).unwrap();

        assert!(json["date"].is_u64());
        let models = json["models"].as_array().unwrap();
        assert_eq!(models.len(), 2);
        assert!(models[0][0].is_string());
        // shift: [id, amount, scope, scrambler]
        assert_eq!(models[0][1], Value::from(3));
        assert!(models[0][3].is_null());
    }

    #[test]
    fn test_save_and_load_through_memory_store() {
        let registry = TypeRegistry::with_builtin();
        let mut store = MemoryStore::new();
        let mut chain = sample_chain();
        let cipher = chain.encrypt(b"persist this buffer please").unwrap();

        assert!(save_chain(&mut store, &registry, &chain, "chain", false).unwrap());
        let mut loaded = load_chain(&store, &registry, "chain").unwrap();
        assert_eq!(loaded.decrypt(&cipher).unwrap(), b"persist this buffer please");
    }

    #[test]
    fn test_load_malformed_document() {
        let registry = TypeRegistry::with_builtin();
        let mut store = MemoryStore::new();
        store.write("bad", "not json", false).unwrap();
        assert!(matches!(
            load_chain(&store, &registry, "bad"),
            Err(ChainError::Json(_))
        ));

        store
            .write("unknown", r#"{"date": 0, "models": [["ffff", 1]]}"#, false)
            .unwrap();
        assert!(matches!(
            load_chain(&store, &registry, "unknown"),
            Err(ChainError::Importer(_))
        ));
    }
}
