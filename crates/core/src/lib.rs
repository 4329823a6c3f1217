//! Graft Core - schema model and mutation operation trees.
//!
//! This crate provides the pure, I/O-free half of Graft:
//! - [`schema`] - per-entity attribute/relation descriptors and the registry
//!   that indexes them
//! - [`operation`] - immutable operation trees and their wire serialization
//! - [`draft`] - the builder API that assembles and validates operation trees
//!
//! # Architecture
//!
//! The core crate contains only types and build logic - no I/O, no HTTP
//! clients. Everything here runs synchronously; a whole operation tree is
//! assembled and validated before the client crate dispatches it as a single
//! request.
//!
//! Validation happens at construction time: an operation tree that violates
//! its entity's declared schema (unknown attribute, missing required
//! attribute, a `key` on a creating operation) is rejected with a
//! [`BuildError`] at the offending builder call, never at dispatch.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod draft;
pub mod error;
pub mod operation;
pub mod schema;
mod validate;

pub use draft::{EntityDraft, RelationDraft, relation};
pub use error::BuildError;
pub use operation::{
    AttributeMap, EntityOperation, EntityOperationKind, MutationRequest, OrderedMap,
    RelationMap, RelationOperation, RelationOperationKind, RelationTarget,
};
pub use schema::{
    AttributeDescriptor, Cardinality, EntityDescriptor, RelationDescriptor, SchemaRegistry,
};
