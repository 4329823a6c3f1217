//! Entity type descriptors and the schema registry.
//!
//! Descriptors carry just enough metadata for the draft compiler to restrict
//! attribute names, relation names, and relation cardinality per entity type.
//! They are pure data: building or querying a registry has no side effects.
//!
//! The registry is supplied by the embedding application (a shared model
//! registry, generated code, or a hand-written module such as
//! `graft_client::models::user_management_schema`); this crate only consumes
//! it.

use serde::{Deserialize, Serialize};

/// Whether a relation points at one related entity or an ordered list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Cardinality {
    /// To-one: the relation slot holds a single operation.
    One,
    /// To-many: the relation slot holds an ordered list of operations.
    Many,
}

impl Cardinality {
    /// Human-readable name, used in error messages.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::One => "to-one",
            Self::Many => "to-many",
        }
    }
}

impl std::fmt::Display for Cardinality {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A declared scalar attribute of an entity type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeDescriptor {
    /// Attribute name as it appears on the wire.
    pub name: String,
    /// Required attributes must be present when creating the entity.
    /// Updates may always supply a partial subset.
    pub required: bool,
}

/// A declared relation from one entity type to another.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationDescriptor {
    /// Relation name as it appears on the wire.
    pub name: String,
    /// Name of the target entity type in the registry.
    pub target: String,
    /// To-one or to-many.
    pub cardinality: Cardinality,
}

/// Attribute and relation declarations for one entity type.
///
/// Built fluently:
///
/// ```rust
/// use graft_core::EntityDescriptor;
///
/// let department = EntityDescriptor::new("department")
///     .required_attribute("name")
///     .required_attribute("code")
///     .to_one("site", "site");
/// assert!(department.attribute_descriptor("code").is_some());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityDescriptor {
    name: String,
    attributes: Vec<AttributeDescriptor>,
    relations: Vec<RelationDescriptor>,
}

impl EntityDescriptor {
    /// Start a descriptor for the named entity type.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
            relations: Vec::new(),
        }
    }

    /// Declare an optional scalar attribute.
    #[must_use]
    pub fn attribute(mut self, name: impl Into<String>) -> Self {
        self.attributes.push(AttributeDescriptor {
            name: name.into(),
            required: false,
        });
        self
    }

    /// Declare a scalar attribute that must be present on create.
    #[must_use]
    pub fn required_attribute(mut self, name: impl Into<String>) -> Self {
        self.attributes.push(AttributeDescriptor {
            name: name.into(),
            required: true,
        });
        self
    }

    /// Declare a to-one relation to `target`.
    #[must_use]
    pub fn to_one(self, name: impl Into<String>, target: impl Into<String>) -> Self {
        self.relation_with(name, target, Cardinality::One)
    }

    /// Declare a to-many relation to `target`.
    #[must_use]
    pub fn to_many(self, name: impl Into<String>, target: impl Into<String>) -> Self {
        self.relation_with(name, target, Cardinality::Many)
    }

    fn relation_with(
        mut self,
        name: impl Into<String>,
        target: impl Into<String>,
        cardinality: Cardinality,
    ) -> Self {
        self.relations.push(RelationDescriptor {
            name: name.into(),
            target: target.into(),
            cardinality,
        });
        self
    }

    /// Entity type name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Look up a declared attribute by name.
    #[must_use]
    pub fn attribute_descriptor(&self, name: &str) -> Option<&AttributeDescriptor> {
        self.attributes.iter().find(|a| a.name == name)
    }

    /// Look up a declared relation by name.
    #[must_use]
    pub fn relation_descriptor(&self, name: &str) -> Option<&RelationDescriptor> {
        self.relations.iter().find(|r| r.name == name)
    }

    /// All declared attributes, in declaration order.
    #[must_use]
    pub fn attributes(&self) -> &[AttributeDescriptor] {
        &self.attributes
    }

    /// All declared relations, in declaration order.
    #[must_use]
    pub fn relations(&self) -> &[RelationDescriptor] {
        &self.relations
    }

    /// Attributes that must be present when creating this entity.
    pub fn required_attributes(&self) -> impl Iterator<Item = &AttributeDescriptor> {
        self.attributes.iter().filter(|a| a.required)
    }
}

/// Arena of entity descriptors indexed by type name.
///
/// The draft compiler resolves every entity and relation-target name through
/// a registry, so a name outside the declared schema fails at build time
/// rather than as a server-side error.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaRegistry {
    entities: Vec<EntityDescriptor>,
}

impl SchemaRegistry {
    /// Empty registry.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entities: Vec::new(),
        }
    }

    /// Add a descriptor. A descriptor with the same name replaces the
    /// previous one.
    #[must_use]
    pub fn register(mut self, descriptor: EntityDescriptor) -> Self {
        self.entities.retain(|e| e.name != descriptor.name);
        self.entities.push(descriptor);
        self
    }

    /// Look up an entity descriptor by type name.
    #[must_use]
    pub fn entity(&self, name: &str) -> Option<&EntityDescriptor> {
        self.entities.iter().find(|e| e.name == name)
    }

    /// Registered entity type names, in registration order.
    pub fn entity_names(&self) -> impl Iterator<Item = &str> {
        self.entities.iter().map(|e| e.name.as_str())
    }
}
