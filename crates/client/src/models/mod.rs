//! User-management domain models and their schema declarations.
//!
//! The read models mirror the backend's wire shapes field for field; the
//! [`user_management_schema`] registry declares the writable attribute and
//! relation sets the mutation builder validates against. Keys (`id` fields)
//! are not writable attributes - the `key` slot of an operation carries them.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use graft_core::{EntityDescriptor, SchemaRegistry};

use crate::mutation::Mutation;
use crate::query::Query;
use crate::transport::Transport;

/// A role granted to a user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Role {
    pub id: i64,
    pub name: String,
    pub guard_name: String,
    pub translate_name: String,
    pub pivot: Vec<Value>,
}

/// A physical site users and departments belong to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Site {
    pub id: String,
    pub name: String,
}

/// Per-record authorization flags computed server-side.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Gates {
    pub authorized_to_update: bool,
    pub authorized_to_delete: bool,
}

/// A client company.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Client {
    pub id: String,
    pub name: String,
    // wire field name, as the backend spells it
    pub addresse: String,
}

/// A contact person at a client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contact {
    pub id: String,
    pub firstname: String,
    pub lastname: String,
    pub email: String,
    pub phone: Option<String>,
    pub position: Option<String>,
    pub client_id: String,
}

/// A department within a site.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Department {
    pub id: String,
    pub name: String,
    pub code: String,
    pub site_id: String,
}

/// A user account, as returned by the user-management API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub site_id: String,
    pub manager_id: Option<String>,
    pub customer_id: Option<String>,
    pub firstname: String,
    pub lastname: String,
    pub email: String,
    pub phone_number: Option<String>,
    pub timezone: String,
    pub language: String,
    pub remember_me: i64,
    pub cgu_accepted_at: String,
    pub last_authenticated_at: String,
    pub unique_identifier: Option<String>,
    pub released_at: Option<String>,
    pub number_managers_can_validate: Option<i64>,
    pub is_level_one_manager: bool,
    pub profession_id: Option<i64>,
    pub demo_request_at: Option<String>,
    pub fcm_token: Option<String>,
    pub enter_date: Option<String>,
    pub role_id: i64,
    pub count_unread_articles: i64,
    pub has_same_circuit_in_conges: bool,
    pub has_same_circuit_in_ndf: bool,
    pub has_managed: bool,
    pub has_access_to_demo: bool,
    pub gates: Gates,
    pub roles: Vec<Role>,
    pub permissions: Vec<Value>,
    pub applications: Vec<Value>,
    pub site: Site,
    pub auto_user: Option<Value>,
    pub profiles: Vec<Value>,
    pub divisions: Vec<Value>,
    pub profession: Option<Value>,
    pub direct_manager: Option<Value>,
}

/// Paging envelope returned by the `/users` collection endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UsersPage {
    pub users: Vec<User>,
    pub total: Option<i64>,
    pub skip: Option<i64>,
    pub limit: Option<i64>,
}

/// Writable attribute and relation declarations for the user-management
/// domain.
#[must_use]
pub fn user_management_schema() -> SchemaRegistry {
    SchemaRegistry::new()
        .register(
            EntityDescriptor::new("user")
                .required_attribute("firstname")
                .required_attribute("lastname")
                .required_attribute("email")
                .attribute("phone_number")
                .attribute("timezone")
                .attribute("language")
                .to_one("site", "site")
                .to_one("department", "department")
                .to_one("manager", "user")
                .to_many("roles", "role"),
        )
        .register(
            EntityDescriptor::new("department")
                .required_attribute("name")
                .required_attribute("code")
                .to_one("site", "site"),
        )
        .register(EntityDescriptor::new("site").required_attribute("name"))
        .register(
            EntityDescriptor::new("client")
                .required_attribute("name")
                .attribute("addresse")
                .to_one("site", "site")
                .to_many("contacts", "contact"),
        )
        .register(
            EntityDescriptor::new("contact")
                .required_attribute("firstname")
                .required_attribute("lastname")
                .required_attribute("email")
                .attribute("phone")
                .attribute("position")
                .to_one("client", "client"),
        )
        .register(
            EntityDescriptor::new("role")
                .required_attribute("name")
                .attribute("guard_name")
                .attribute("translate_name"),
        )
}

/// Read facade for `/users`.
#[must_use]
pub fn user_query(transport: Arc<dyn Transport>) -> Query<User, UsersPage> {
    Query::new(transport, "/users")
}

/// Write facade for `/users`.
#[must_use]
pub fn user_mutation(transport: Arc<dyn Transport>) -> Mutation<User> {
    Mutation::new(
        transport,
        "/users",
        Arc::new(user_management_schema()),
        "user",
    )
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_schema_declares_all_entities() {
        let registry = user_management_schema();
        for name in ["user", "department", "site", "client", "contact", "role"] {
            assert!(registry.entity(name).is_some(), "missing entity {name}");
        }
    }

    #[test]
    fn test_user_relations() {
        let registry = user_management_schema();
        let user = registry.entity("user").unwrap();
        assert_eq!(
            user.relation_descriptor("department").unwrap().target,
            "department"
        );
        assert_eq!(user.relation_descriptor("manager").unwrap().target, "user");
        assert_eq!(
            user.relation_descriptor("roles").unwrap().cardinality,
            graft_core::Cardinality::Many
        );
    }

    #[test]
    fn test_user_deserializes_from_wire_payload() {
        let user: User = serde_json::from_value(json!({
            "id": "USR-1",
            "site_id": "SITE-1",
            "manager_id": null,
            "customer_id": null,
            "firstname": "Alice",
            "lastname": "Doe",
            "email": "alice@example.com",
            "phone_number": null,
            "timezone": "Europe/Paris",
            "language": "fr",
            "remember_me": 0,
            "cgu_accepted_at": "2024-01-01T00:00:00Z",
            "last_authenticated_at": "2024-06-01T00:00:00Z",
            "unique_identifier": null,
            "released_at": null,
            "number_managers_can_validate": 2,
            "is_level_one_manager": false,
            "profession_id": null,
            "demo_request_at": null,
            "fcm_token": null,
            "enter_date": null,
            "role_id": 3,
            "count_unread_articles": 0,
            "has_same_circuit_in_conges": false,
            "has_same_circuit_in_ndf": false,
            "has_managed": true,
            "has_access_to_demo": false,
            "gates": { "authorized_to_update": true, "authorized_to_delete": false },
            "roles": [{
                "id": 3,
                "name": "manager",
                "guard_name": "web",
                "translate_name": "Manager",
                "pivot": []
            }],
            "permissions": [],
            "applications": [],
            "site": { "id": "SITE-1", "name": "HQ" },
            "auto_user": null,
            "profiles": [],
            "divisions": [],
            "profession": null,
            "direct_manager": null
        }))
        .unwrap();

        assert_eq!(user.firstname, "Alice");
        assert_eq!(user.site.name, "HQ");
        assert_eq!(user.roles.len(), 1);
        assert!(user.gates.authorized_to_update);
    }

    #[test]
    fn test_users_page_tolerates_missing_paging_fields() {
        let page: UsersPage = serde_json::from_value(json!({ "users": [] })).unwrap();
        assert!(page.users.is_empty());
        assert!(page.total.is_none());
    }
}
