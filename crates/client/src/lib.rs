//! Graft Client - REST query/mutation facades over an injected transport.
//!
//! # Architecture
//!
//! - `graft-core` builds and validates operation trees; this crate dispatches
//!   them
//! - The HTTP layer is a [`Transport`] handle constructed once at process
//!   start and injected into every facade - no global client, no import-order
//!   effects
//! - Responses pass through a [`Validator`] before reaching the caller
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//!
//! use graft_client::{HttpConfig, HttpTransport};
//! use graft_client::models::{user_mutation, user_query};
//! use graft_core::{EntityDraft, relation};
//!
//! let transport = Arc::new(HttpTransport::new(HttpConfig::new("https://dummyjson.com")?)?);
//!
//! let users = user_mutation(transport.clone());
//! let created = users
//!     .create_entity(
//!         EntityDraft::new()
//!             .attribute("firstname", "Alice")
//!             .attribute("lastname", "Doe")
//!             .attribute("email", "alice@example.com")
//!             .relation("department", relation::attach("mlk")),
//!     )?
//!     .mutate()
//!     .await?;
//!
//! let found = user_query(transport).get(&created.id).await?;
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod error;
pub mod models;
pub mod mutation;
pub mod query;
pub mod transport;
pub mod validate;

pub use config::{ConfigError, HttpConfig};
pub use error::{ApiError, Result};
pub use mutation::{Mutation, PendingMutation};
pub use query::{Query, SearchFilters};
pub use transport::{HttpTransport, Transport};
pub use validate::{JsonValidator, Validator};
