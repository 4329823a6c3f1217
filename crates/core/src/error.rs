//! Build-time error types.

use thiserror::Error;

/// Errors raised while assembling an operation tree.
///
/// All of these surface synchronously at the offending builder call, before
/// any request is dispatched.
#[derive(Debug, Error)]
pub enum BuildError {
    /// The `key`/`attributes` combination contradicts the operation kind,
    /// e.g. `attach` with attributes or `create` with a key.
    #[error("invalid {operation} operation: {reason}")]
    InvalidOperationShape { operation: String, reason: String },

    /// No descriptor registered under this entity type name.
    #[error("unknown entity type: {name}")]
    UnknownEntity { name: String },

    /// An attribute name outside the entity's declared attribute set.
    #[error("unknown attribute {attribute} on entity {entity}")]
    UnknownAttribute { entity: String, attribute: String },

    /// A relation name outside the entity's declared relation set.
    #[error("unknown relation {relation} on entity {entity}")]
    UnknownRelation { entity: String, relation: String },

    /// A create operation omitted an attribute the entity requires.
    #[error("missing required attribute {attribute} on entity {entity}")]
    MissingAttribute { entity: String, attribute: String },

    /// A key-bearing operation was given an empty identifier.
    #[error("empty key for {operation} operation on entity {entity}")]
    EmptyKey { entity: String, operation: String },

    /// A single operation was supplied for a to-many relation, or a list for
    /// a to-one relation.
    #[error("relation {relation} on entity {entity} is {expected}, got a {actual} value")]
    CardinalityMismatch {
        entity: String,
        relation: String,
        expected: &'static str,
        actual: &'static str,
    },

    /// `mutate()` was invoked with no root operation constructed.
    #[error("mutation request contains no operations")]
    EmptyMutation,
}
