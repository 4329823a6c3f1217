//! Schema validation walk over operation trees.
//!
//! Compiled drafts and directly constructed [`EntityOperation`] values go
//! through the same checks, so a hand-assembled tree cannot smuggle a shape
//! the builders would have rejected.

use serde_json::Value;

use crate::error::BuildError;
use crate::operation::{
    AttributeMap, EntityOperation, EntityOperationKind, RelationMap, RelationOperation,
    RelationTarget,
};
use crate::schema::{Cardinality, EntityDescriptor, SchemaRegistry};

impl EntityOperation {
    /// Check this tree against the schema declared for `entity`.
    ///
    /// The builder entry points call this on every compiled draft; call it
    /// directly when assembling [`EntityOperation`] values by hand.
    ///
    /// # Errors
    ///
    /// Returns the first [`BuildError`] found in a depth-first walk.
    pub fn validate(&self, registry: &SchemaRegistry, entity: &str) -> Result<(), BuildError> {
        let descriptor = registry
            .entity(entity)
            .ok_or_else(|| BuildError::UnknownEntity {
                name: entity.to_string(),
            })?;

        match self.operation {
            EntityOperationKind::Create => {
                if self.key.is_some() {
                    return Err(shape("create", "key is not allowed"));
                }
            }
            EntityOperationKind::Update => match self.key.as_deref() {
                None => return Err(shape("update", "key is required")),
                Some("") => {
                    return Err(BuildError::EmptyKey {
                        entity: descriptor.name().to_string(),
                        operation: "update".to_string(),
                    });
                }
                Some(_) => {}
            },
        }

        check_attributes(descriptor, self.operation.as_str(), &self.attributes)?;
        if self.operation == EntityOperationKind::Create {
            check_required(descriptor, &self.attributes)?;
        }
        check_relations(registry, descriptor, &self.relations)
    }
}

fn shape(operation: &str, reason: impl Into<String>) -> BuildError {
    BuildError::InvalidOperationShape {
        operation: operation.to_string(),
        reason: reason.into(),
    }
}

fn check_attributes(
    descriptor: &EntityDescriptor,
    operation: &str,
    attributes: &AttributeMap,
) -> Result<(), BuildError> {
    for (name, value) in attributes.iter() {
        if descriptor.attribute_descriptor(name).is_none() {
            return Err(BuildError::UnknownAttribute {
                entity: descriptor.name().to_string(),
                attribute: name.to_string(),
            });
        }
        // relation payloads must go through relation operations
        if matches!(value, Value::Object(_) | Value::Array(_)) {
            return Err(shape(
                operation,
                format!("attribute {name} must be a scalar value"),
            ));
        }
    }
    Ok(())
}

fn check_required(
    descriptor: &EntityDescriptor,
    attributes: &AttributeMap,
) -> Result<(), BuildError> {
    for attribute in descriptor.required_attributes() {
        if attributes.get(&attribute.name).is_none() {
            return Err(BuildError::MissingAttribute {
                entity: descriptor.name().to_string(),
                attribute: attribute.name.clone(),
            });
        }
    }
    Ok(())
}

fn check_relations(
    registry: &SchemaRegistry,
    descriptor: &EntityDescriptor,
    relations: &RelationMap,
) -> Result<(), BuildError> {
    for (name, target) in relations.iter() {
        let Some(relation) = descriptor.relation_descriptor(name) else {
            return Err(BuildError::UnknownRelation {
                entity: descriptor.name().to_string(),
                relation: name.to_string(),
            });
        };

        match (target, relation.cardinality) {
            (RelationTarget::One(_), Cardinality::Many)
            | (RelationTarget::Many(_), Cardinality::One) => {
                return Err(BuildError::CardinalityMismatch {
                    entity: descriptor.name().to_string(),
                    relation: name.to_string(),
                    expected: relation.cardinality.as_str(),
                    actual: match target {
                        RelationTarget::One(_) => "single",
                        RelationTarget::Many(_) => "list",
                    },
                });
            }
            _ => {}
        }

        match target {
            RelationTarget::One(operation) => {
                check_relation_operation(registry, &relation.target, operation)?;
            }
            RelationTarget::Many(operations) => {
                for operation in operations {
                    check_relation_operation(registry, &relation.target, operation)?;
                }
            }
        }
    }
    Ok(())
}

fn check_relation_operation(
    registry: &SchemaRegistry,
    target_entity: &str,
    operation: &RelationOperation,
) -> Result<(), BuildError> {
    let descriptor =
        registry
            .entity(target_entity)
            .ok_or_else(|| BuildError::UnknownEntity {
                name: target_entity.to_string(),
            })?;
    let kind = operation.operation;

    if kind.requires_key() {
        match operation.key.as_deref() {
            None => return Err(shape(kind.as_str(), "key is required")),
            Some("") => {
                return Err(BuildError::EmptyKey {
                    entity: descriptor.name().to_string(),
                    operation: kind.as_str().to_string(),
                });
            }
            Some(_) => {}
        }
    } else if operation.key.is_some() {
        return Err(shape(kind.as_str(), "key is not allowed"));
    }

    if kind.carries_attributes() {
        let Some(attributes) = &operation.attributes else {
            return Err(shape(kind.as_str(), "attributes are required"));
        };
        check_attributes(descriptor, kind.as_str(), attributes)?;
        if kind.creates_entity() {
            check_required(descriptor, attributes)?;
        }
    } else {
        if operation.attributes.is_some() {
            return Err(shape(kind.as_str(), "attributes are not allowed"));
        }
        if !operation.relations.is_empty() {
            return Err(shape(kind.as_str(), "nested relations are not allowed"));
        }
    }

    check_relations(registry, descriptor, &operation.relations)
}
