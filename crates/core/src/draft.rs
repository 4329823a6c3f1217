//! Draft builders: assemble an operation tree, then compile it against a
//! schema.
//!
//! An [`EntityDraft`] is the Rust rendition of the "attributes with relations
//! mixed in" object the wire contract grew out of: scalar attributes and
//! relation operations are declared in one fluent chain, and compilation
//! splits them into the `attributes`/`relations` halves of an
//! [`EntityOperation`].
//!
//! Drafts are unvalidated. [`EntityOperation::create`] and
//! [`EntityOperation::update`] compile a draft and immediately validate the
//! resulting tree against a [`SchemaRegistry`], so every schema violation
//! surfaces at the builder call site.
//!
//! ```rust
//! use graft_core::{EntityDescriptor, EntityDraft, EntityOperation, SchemaRegistry, relation};
//!
//! let registry = SchemaRegistry::new()
//!     .register(
//!         EntityDescriptor::new("user")
//!             .required_attribute("firstname")
//!             .to_one("department", "department"),
//!     )
//!     .register(EntityDescriptor::new("department").required_attribute("code"));
//!
//! let operation = EntityOperation::create(
//!     &registry,
//!     "user",
//!     EntityDraft::new()
//!         .attribute("firstname", "Alice")
//!         .relation("department", relation::add(EntityDraft::new().attribute("code", "mlk"))),
//! )?;
//! assert_eq!(operation.relations.len(), 1);
//! # Ok::<(), graft_core::BuildError>(())
//! ```

use serde_json::Value;

use crate::error::BuildError;
use crate::operation::{
    AttributeMap, EntityOperation, EntityOperationKind, RelationMap, RelationOperation,
    RelationOperationKind, RelationTarget,
};
use crate::schema::SchemaRegistry;

/// Unvalidated attributes plus relation drafts for one entity.
#[derive(Debug, Clone, Default)]
pub struct EntityDraft {
    attributes: Vec<(String, Value)>,
    relations: Vec<(String, RelationSlot)>,
}

#[derive(Debug, Clone)]
enum RelationSlot {
    One(RelationDraft),
    Many(Vec<RelationDraft>),
}

impl EntityDraft {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            attributes: Vec::new(),
            relations: Vec::new(),
        }
    }

    /// Set a scalar attribute.
    #[must_use]
    pub fn attribute(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attributes.push((name.into(), value.into()));
        self
    }

    /// Set a to-one relation slot.
    #[must_use]
    pub fn relation(mut self, name: impl Into<String>, draft: RelationDraft) -> Self {
        self.relations.push((name.into(), RelationSlot::One(draft)));
        self
    }

    /// Set a to-many relation slot with an ordered list of operations.
    #[must_use]
    pub fn relation_list(
        mut self,
        name: impl Into<String>,
        drafts: impl IntoIterator<Item = RelationDraft>,
    ) -> Self {
        self.relations.push((
            name.into(),
            RelationSlot::Many(drafts.into_iter().collect()),
        ));
        self
    }

    /// Split into the wire halves, preserving declaration order.
    fn split(self) -> (AttributeMap, RelationMap) {
        let mut attributes = AttributeMap::new();
        for (name, value) in self.attributes {
            attributes.insert(name, value);
        }
        let mut relations = RelationMap::new();
        for (name, slot) in self.relations {
            let target = match slot {
                RelationSlot::One(draft) => RelationTarget::One(draft.into_operation()),
                RelationSlot::Many(drafts) => RelationTarget::Many(
                    drafts.into_iter().map(RelationDraft::into_operation).collect(),
                ),
            };
            relations.insert(name, target);
        }
        (attributes, relations)
    }
}

/// One unvalidated relation operation, produced by the [`relation`]
/// constructors.
///
/// The constructors make key/attribute misuse unrepresentable ([`attach`]
/// takes only a key, [`create`] only a draft); schema checks run when the
/// parent draft is compiled. Directly constructed [`RelationOperation`]
/// values go through the same checks via [`EntityOperation::validate`].
///
/// [`attach`]: relation::attach
/// [`create`]: relation::create
#[derive(Debug, Clone)]
pub struct RelationDraft {
    operation: RelationOperationKind,
    key: Option<String>,
    entity: Option<EntityDraft>,
}

impl RelationDraft {
    fn into_operation(self) -> RelationOperation {
        let carries_attributes = self.operation.carries_attributes();
        let (attributes, relations) = match self.entity {
            Some(draft) => {
                let (attributes, relations) = draft.split();
                (Some(attributes), relations)
            }
            None => (None, RelationMap::new()),
        };
        RelationOperation {
            operation: self.operation,
            key: self.key,
            // update with no attribute changes still carries `attributes: {}`
            attributes: if carries_attributes {
                Some(attributes.unwrap_or_default())
            } else {
                attributes
            },
            relations,
        }
    }
}

/// Constructors for relation operations.
pub mod relation {
    use super::{EntityDraft, RelationDraft, RelationOperationKind};

    /// Instantiate a new related entity from `entity` and link it.
    #[must_use]
    pub fn create(entity: EntityDraft) -> RelationDraft {
        RelationDraft {
            operation: RelationOperationKind::Create,
            key: None,
            entity: Some(entity),
        }
    }

    /// Same semantics as [`create`] under the `add` wire verb.
    #[must_use]
    pub fn add(entity: EntityDraft) -> RelationDraft {
        RelationDraft {
            operation: RelationOperationKind::Add,
            key: None,
            entity: Some(entity),
        }
    }

    /// Link an existing related entity identified by `key`.
    #[must_use]
    pub fn attach(key: impl Into<String>) -> RelationDraft {
        RelationDraft {
            operation: RelationOperationKind::Attach,
            key: Some(key.into()),
            entity: None,
        }
    }

    /// Unlink the related entity identified by `key`.
    #[must_use]
    pub fn detach(key: impl Into<String>) -> RelationDraft {
        RelationDraft {
            operation: RelationOperationKind::Detach,
            key: Some(key.into()),
            entity: None,
        }
    }

    /// Modify the existing related entity identified by `key`, keeping the
    /// link.
    #[must_use]
    pub fn update(key: impl Into<String>, entity: EntityDraft) -> RelationDraft {
        RelationDraft {
            operation: RelationOperationKind::Update,
            key: Some(key.into()),
            entity: Some(entity),
        }
    }
}

impl EntityOperation {
    /// Compile a draft into a validated `create` root operation.
    ///
    /// # Errors
    ///
    /// Returns a [`BuildError`] when the draft violates the schema declared
    /// for `entity`: unknown attribute or relation names, a missing required
    /// attribute, a cardinality mismatch, or an invalid nested operation
    /// shape.
    pub fn create(
        registry: &SchemaRegistry,
        entity: &str,
        draft: EntityDraft,
    ) -> Result<Self, BuildError> {
        let (attributes, relations) = draft.split();
        let operation = Self {
            operation: EntityOperationKind::Create,
            key: None,
            attributes,
            relations,
        };
        operation.validate(registry, entity)?;
        Ok(operation)
    }

    /// Compile a draft into a validated `update` root operation for the
    /// entity identified by `key`. Attributes may be a partial subset.
    ///
    /// # Errors
    ///
    /// Returns a [`BuildError`] for an empty key or any schema violation in
    /// the draft.
    pub fn update(
        registry: &SchemaRegistry,
        entity: &str,
        key: impl Into<String>,
        draft: EntityDraft,
    ) -> Result<Self, BuildError> {
        let (attributes, relations) = draft.split();
        let operation = Self {
            operation: EntityOperationKind::Update,
            key: Some(key.into()),
            attributes,
            relations,
        };
        operation.validate(registry, entity)?;
        Ok(operation)
    }
}
