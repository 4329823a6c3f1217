//! Immutable operation trees and their wire serialization.
//!
//! A mutation is one or more [`EntityOperation`] trees batched into a
//! [`MutationRequest`]; the request body serializes as
//! `{ "mutate": [ ... ] }`. Backends apply the operations sequentially and
//! may reference earlier entries, so maps here preserve insertion order on
//! the wire ([`OrderedMap`]) and relation lists are never reordered.

use std::marker::PhantomData;

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A map that serializes its entries in insertion order.
///
/// `serde_json`'s default object representation sorts keys, which would
/// reorder relation entries between building and dispatch. This Vec-backed
/// map keeps the declaration order end to end. Inserting an existing key
/// replaces the value in place without moving the entry.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderedMap<V> {
    entries: Vec<(String, V)>,
}

impl<V> OrderedMap<V> {
    /// Empty map.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Insert an entry, replacing in place if the key already exists.
    pub fn insert(&mut self, key: impl Into<String>, value: V) {
        let key = key.into();
        if let Some(entry) = self.entries.iter_mut().find(|(k, _)| *k == key) {
            entry.1 = value;
        } else {
            self.entries.push((key, value));
        }
    }

    /// Look up a value by key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&V> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &V)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Keys in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }
}

impl<V> Default for OrderedMap<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> FromIterator<(String, V)> for OrderedMap<V> {
    fn from_iter<I: IntoIterator<Item = (String, V)>>(iter: I) -> Self {
        let mut map = Self::new();
        for (k, v) in iter {
            map.insert(k, v);
        }
        map
    }
}

impl<V: Serialize> Serialize for OrderedMap<V> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (k, v) in &self.entries {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

struct OrderedMapVisitor<V>(PhantomData<fn() -> V>);

impl<'de, V: Deserialize<'de>> Visitor<'de> for OrderedMapVisitor<V> {
    type Value = OrderedMap<V>;

    fn expecting(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("a JSON object")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
        let mut map = OrderedMap::new();
        while let Some((key, value)) = access.next_entry::<String, V>()? {
            map.insert(key, value);
        }
        Ok(map)
    }
}

impl<'de, V: Deserialize<'de>> Deserialize<'de> for OrderedMap<V> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(OrderedMapVisitor(PhantomData))
    }
}

/// Scalar attribute values keyed by attribute name.
pub type AttributeMap = OrderedMap<serde_json::Value>;

/// Relation operations keyed by relation name.
pub type RelationMap = OrderedMap<RelationTarget>;

/// Kind of a root entity operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityOperationKind {
    Create,
    Update,
}

impl EntityOperationKind {
    /// Wire verb, also used in error messages.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Update => "update",
        }
    }
}

impl std::fmt::Display for EntityOperationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind of a relation operation.
///
/// `create` and `add` are distinct wire verbs with identical semantics: both
/// instantiate a new related entity and link it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RelationOperationKind {
    Create,
    Add,
    Attach,
    Detach,
    Update,
}

impl RelationOperationKind {
    /// Wire verb, also used in error messages.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Add => "add",
            Self::Attach => "attach",
            Self::Detach => "detach",
            Self::Update => "update",
        }
    }

    /// Whether this operation instantiates a new related entity.
    #[must_use]
    pub const fn creates_entity(self) -> bool {
        matches!(self, Self::Create | Self::Add)
    }

    /// Whether this operation identifies an existing entity by key.
    #[must_use]
    pub const fn requires_key(self) -> bool {
        matches!(self, Self::Attach | Self::Detach | Self::Update)
    }

    /// Whether this operation carries attributes.
    #[must_use]
    pub const fn carries_attributes(self) -> bool {
        matches!(self, Self::Create | Self::Add | Self::Update)
    }
}

impl std::fmt::Display for RelationOperationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One action applied to a relation slot of a parent entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelationOperation {
    pub operation: RelationOperationKind,
    /// Identifies the existing related entity for `attach`/`detach`/`update`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    /// New or changed attribute values for `create`/`add`/`update`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attributes: Option<AttributeMap>,
    /// Further nesting: the related entity's own relation operations.
    #[serde(default, skip_serializing_if = "OrderedMap::is_empty")]
    pub relations: RelationMap,
}

/// A relation slot holds one operation (to-one) or an ordered list (to-many).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RelationTarget {
    One(RelationOperation),
    Many(Vec<RelationOperation>),
}

/// The root unit of a mutation: a create or update of one entity, plus its
/// relation operations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityOperation {
    pub operation: EntityOperationKind,
    /// Identifies the existing entity; present iff `operation` is `update`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    /// Always on the wire, `{}` for an update that only touches relations.
    #[serde(default)]
    pub attributes: AttributeMap,
    #[serde(default, skip_serializing_if = "OrderedMap::is_empty")]
    pub relations: RelationMap,
}

/// The serialized wire payload: an ordered batch of root operations sent as
/// one request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MutationRequest {
    pub mutate: Vec<EntityOperation>,
}

impl From<Vec<EntityOperation>> for MutationRequest {
    fn from(mutate: Vec<EntityOperation>) -> Self {
        Self { mutate }
    }
}
