//! Identifier-keyed type registry and the recursive tagged-tree codec.
//!
//! Every exportable type flattens to a JSON array `[identifier, attr...]`.
//! Attributes are primitives, `null` for an absent helper, nested nodes for
//! composed helpers, or arrays of nested nodes. The identifier is derived
//! from the type's name and granularity, never from the data it transforms,
//! so any instance of a type maps to the same registry entry.

use crate::error::{ChainError, Result};
use crate::helpers::{AlphabetScope, Scrambler};
use crate::models::{Granularity, Model, Rotor, RotorBank, Shift, Swap};
use serde_json::Value;
use sha3::{Digest, Sha3_256};
use std::collections::HashMap;
use std::fmt;

/// Deepest node nesting accepted by export and import
pub const MAX_DEPTH: usize = 16;

/// Hex characters kept from the identity digest
const IDENTIFIER_LEN: usize = 32;

/// Closed set of types the registry can reconstruct
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    Scrambler,
    Scope,
    Rotor,
    Shift,
    Swap,
    RotorBank,
}

impl Kind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Scrambler => "scrambler",
            Self::Scope => "scope",
            Self::Rotor => "rotor",
            Self::Shift => "shift",
            Self::Swap => "swap",
            Self::RotorBank => "rotor bank",
        }
    }

    /// Whether instances of this kind can be added to a chain
    pub fn is_cipher_model(self) -> bool {
        matches!(self, Self::Shift | Self::Swap | Self::RotorBank)
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a type's registry identifier is derived from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Identity {
    pub name: &'static str,
    /// `None` for helpers, which are never fed data by a chain
    pub granularity: Option<Granularity>,
}

impl Identity {
    pub fn helper(name: &'static str) -> Self {
        Self {
            name,
            granularity: None,
        }
    }

    pub fn model(name: &'static str, granularity: Granularity) -> Self {
        Self {
            name,
            granularity: Some(granularity),
        }
    }

    pub fn identifier(&self) -> String {
        let mut hasher = Sha3_256::new();
        hasher.update(self.name.as_bytes());
        if let Some(granularity) = self.granularity {
            hasher.update(granularity.as_str().as_bytes());
        }
        let mut identifier = hex::encode(hasher.finalize());
        identifier.truncate(IDENTIFIER_LEN);
        identifier
    }
}

/// A type that can be flattened to and rebuilt from a tagged tree.
///
/// `export_attributes` and `import_attributes` must agree on the positional
/// order of attributes, and both must produce exactly `ARITY` of them.
pub trait Exportable: Default + Sized {
    const KIND: Kind;
    const ARITY: usize;

    fn identity(&self) -> Identity;

    fn export_attributes(&self, codec: &Codec<'_>) -> Result<Vec<Value>>;

    fn import_attributes(attributes: &[Value], codec: &Codec<'_>) -> Result<Self>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Registration {
    pub kind: Kind,
    pub arity: usize,
    pub name: &'static str,
}

/// Any value an imported tree can resolve to
#[derive(Debug, Clone)]
pub enum Node {
    Scrambler(Scrambler),
    Scope(AlphabetScope),
    Rotor(Rotor),
    Model(Model),
}

impl Node {
    pub fn kind(&self) -> Kind {
        match self {
            Self::Scrambler(_) => Kind::Scrambler,
            Self::Scope(_) => Kind::Scope,
            Self::Rotor(_) => Kind::Rotor,
            Self::Model(model) => model.kind(),
        }
    }

    /// The cipher model inside this node, or a contract error for helpers
    pub fn into_model(self) -> Result<Model> {
        match self {
            Self::Model(model) => Ok(model),
            other => Err(ChainError::Contract(format!(
                "{} is a helper and cannot process data on its own",
                other.kind()
            ))),
        }
    }
}

impl From<Model> for Node {
    fn from(model: Model) -> Self {
        Self::Model(model)
    }
}

impl From<Scrambler> for Node {
    fn from(scrambler: Scrambler) -> Self {
        Self::Scrambler(scrambler)
    }
}

impl From<AlphabetScope> for Node {
    fn from(scope: AlphabetScope) -> Self {
        Self::Scope(scope)
    }
}

impl From<Rotor> for Node {
    fn from(rotor: Rotor) -> Self {
        Self::Rotor(rotor)
    }
}

/// Identifier to type table, built explicitly and passed by reference
#[derive(Debug, Clone, Default)]
pub struct TypeRegistry {
    entries: HashMap<String, Registration>,
}

impl TypeRegistry {
    /// Empty registry; nothing can be exported or imported until registered
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with every built-in helper and cipher model
    pub fn with_builtin() -> Self {
        let mut registry = Self::new();
        registry.register::<Scrambler>();
        registry.register::<AlphabetScope>();
        registry.register::<Rotor>();
        registry.register::<Shift>();
        registry.register::<Swap>();
        registry.register::<RotorBank>();
        registry
    }

    /// Register `T` under the identifier of its canonical instance
    pub fn register<T: Exportable>(&mut self) -> String {
        let identity = T::default().identity();
        let identifier = identity.identifier();
        tracing::debug!(
            identifier = %identifier,
            name = identity.name,
            kind = %T::KIND,
            arity = T::ARITY,
            "Registered type"
        );
        self.entries.insert(
            identifier.clone(),
            Registration {
                kind: T::KIND,
                arity: T::ARITY,
                name: identity.name,
            },
        );
        identifier
    }

    pub fn lookup(&self, identifier: &str) -> Option<&Registration> {
        self.entries.get(identifier)
    }

    pub fn contains(&self, identifier: &str) -> bool {
        self.entries.contains_key(identifier)
    }

    /// Number of attributes a node with this identifier carries
    pub fn arity(&self, identifier: &str) -> Option<usize> {
        self.lookup(identifier).map(|registration| registration.arity)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn export<T: Exportable>(&self, value: &T) -> Result<Value> {
        Codec::new(self).export(value)
    }

    pub fn export_model(&self, model: &Model) -> Result<Value> {
        let codec = Codec::new(self);
        match model {
            Model::Shift(shift) => codec.export(shift),
            Model::Swap(swap) => codec.export(swap),
            Model::RotorBank(bank) => codec.export(bank),
        }
    }

    pub fn export_node(&self, node: &Node) -> Result<Value> {
        let codec = Codec::new(self);
        match node {
            Node::Scrambler(scrambler) => codec.export(scrambler),
            Node::Scope(scope) => codec.export(scope),
            Node::Rotor(rotor) => codec.export(rotor),
            Node::Model(model) => self.export_model(model),
        }
    }

    /// Rebuild whatever the tree describes
    pub fn import(&self, tree: &Value) -> Result<Node> {
        Codec::new(self).import_node(tree)
    }

    /// Rebuild a tree that must describe a `T`
    pub fn import_as<T: Exportable>(&self, tree: &Value) -> Result<T> {
        Codec::new(self).import(tree)
    }
}

/// Registry handle carrying the current nesting depth
#[derive(Debug, Clone, Copy)]
pub struct Codec<'a> {
    registry: &'a TypeRegistry,
    depth: usize,
}

impl<'a> Codec<'a> {
    fn new(registry: &'a TypeRegistry) -> Self {
        Self { registry, depth: 0 }
    }

    fn nested(&self) -> Option<Codec<'a>> {
        (self.depth < MAX_DEPTH).then(|| Codec {
            registry: self.registry,
            depth: self.depth + 1,
        })
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn export<T: Exportable>(&self, value: &T) -> Result<Value> {
        let identity = value.identity();
        let identifier = identity.identifier();
        let registration = self.registry.lookup(&identifier).ok_or_else(|| {
            ChainError::Exporter(format!(
                "{} ({}) is not registered",
                identity.name, identifier
            ))
        })?;
        if registration.kind != T::KIND {
            return Err(ChainError::Exporter(format!(
                "identifier {} is registered as {}, not {}",
                identifier,
                registration.kind,
                T::KIND
            )));
        }

        let nested = self.nested().ok_or_else(|| {
            ChainError::Exporter(format!("nesting deeper than {} levels", MAX_DEPTH))
        })?;
        let attributes = value.export_attributes(&nested)?;
        if attributes.len() != registration.arity {
            return Err(ChainError::Exporter(format!(
                "{} produced {} attributes, expected {}",
                identity.name,
                attributes.len(),
                registration.arity
            )));
        }

        let mut node = Vec::with_capacity(attributes.len() + 1);
        node.push(Value::from(identifier));
        node.extend(attributes);
        Ok(Value::Array(node))
    }

    pub fn export_optional<T: Exportable>(&self, value: Option<&T>) -> Result<Value> {
        match value {
            Some(value) => self.export(value),
            None => Ok(Value::Null),
        }
    }

    pub fn export_list<T: Exportable>(&self, values: &[T]) -> Result<Value> {
        values
            .iter()
            .map(|value| self.export(value))
            .collect::<Result<Vec<_>>>()
            .map(Value::Array)
    }

    /// Resolve a node's registration and attribute slice
    fn open<'v>(&self, tree: &'v Value) -> Result<(Registration, &'v [Value], Codec<'a>)> {
        let nested = self.nested().ok_or_else(|| {
            ChainError::Importer(format!("nesting deeper than {} levels", MAX_DEPTH))
        })?;
        let items = tree.as_array().ok_or_else(|| {
            ChainError::Importer(format!("expected [identifier, ...], found {}", tree))
        })?;
        let (head, attributes) = items
            .split_first()
            .ok_or_else(|| ChainError::Importer("empty model entry".into()))?;
        let identifier = head.as_str().ok_or_else(|| {
            ChainError::Importer(format!("identifier must be a string, found {}", head))
        })?;
        let registration = *self
            .registry
            .lookup(identifier)
            .ok_or_else(|| ChainError::Importer(format!("unknown identifier {}", identifier)))?;
        if attributes.len() != registration.arity {
            return Err(ChainError::Importer(format!(
                "{} expects {} attributes, found {}",
                registration.name,
                registration.arity,
                attributes.len()
            )));
        }
        Ok((registration, attributes, nested))
    }

    pub fn import<T: Exportable>(&self, tree: &Value) -> Result<T> {
        let (registration, attributes, nested) = self.open(tree)?;
        if registration.kind != T::KIND {
            return Err(ChainError::Importer(format!(
                "expected {}, found {}",
                T::KIND,
                registration.kind
            )));
        }
        T::import_attributes(attributes, &nested)
    }

    pub fn import_optional<T: Exportable>(&self, tree: &Value) -> Result<Option<T>> {
        match tree {
            Value::Null => Ok(None),
            tree => self.import(tree).map(Some),
        }
    }

    pub fn import_list<T: Exportable>(&self, tree: &Value) -> Result<Vec<T>> {
        let items = tree.as_array().ok_or_else(|| {
            ChainError::Importer(format!("expected a list of {} nodes, found {}", T::KIND, tree))
        })?;
        items.iter().map(|item| self.import(item)).collect()
    }

    pub fn import_node(&self, tree: &Value) -> Result<Node> {
        let (registration, attributes, nested) = self.open(tree)?;
        let node = match registration.kind {
            Kind::Scrambler => Node::Scrambler(Scrambler::import_attributes(attributes, &nested)?),
            Kind::Scope => Node::Scope(AlphabetScope::import_attributes(attributes, &nested)?),
            Kind::Rotor => Node::Rotor(Rotor::import_attributes(attributes, &nested)?),
            Kind::Shift => Node::Model(Model::Shift(Shift::import_attributes(
                attributes, &nested,
            )?)),
            Kind::Swap => Node::Model(Model::Swap(Swap::import_attributes(attributes, &nested)?)),
            Kind::RotorBank => Node::Model(Model::RotorBank(RotorBank::import_attributes(
                attributes, &nested,
            )?)),
        };
        Ok(node)
    }
}

fn attribute<'v>(attributes: &'v [Value], index: usize, field: &str) -> Result<&'v Value> {
    attributes
        .get(index)
        .ok_or_else(|| ChainError::Importer(format!("missing attribute {}", field)))
}

pub(crate) fn attr_u64(attributes: &[Value], index: usize, field: &str) -> Result<u64> {
    let value = attribute(attributes, index, field)?;
    value.as_u64().ok_or_else(|| {
        ChainError::Importer(format!("{} must be an unsigned integer, found {}", field, value))
    })
}

pub(crate) fn attr_i64(attributes: &[Value], index: usize, field: &str) -> Result<i64> {
    let value = attribute(attributes, index, field)?;
    value.as_i64().ok_or_else(|| {
        ChainError::Importer(format!("{} must be an integer, found {}", field, value))
    })
}

pub(crate) fn attr_usize(attributes: &[Value], index: usize, field: &str) -> Result<usize> {
    let value = attr_u64(attributes, index, field)?;
    usize::try_from(value)
        .map_err(|_| ChainError::Importer(format!("{} is out of range: {}", field, value)))
}

pub(crate) fn attr_str<'v>(attributes: &'v [Value], index: usize, field: &str) -> Result<&'v str> {
    let value = attribute(attributes, index, field)?;
    value
        .as_str()
        .ok_or_else(|| ChainError::Importer(format!("{} must be a string, found {}", field, value)))
}
