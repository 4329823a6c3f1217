//! End-to-end tests: draft -> operation tree -> wire body -> transport.
//!
//! A recording mock stands in for the HTTP layer so every test can assert
//! the exact request path, body shape, and call count.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use graft_client::models::user_mutation;
use graft_client::{ApiError, Mutation, Query, SearchFilters, Transport};
use graft_core::{
    AttributeMap, BuildError, EntityDescriptor, EntityDraft, EntityOperation,
    EntityOperationKind, MutationRequest, RelationMap, RelationOperation, RelationOperationKind,
    RelationTarget, SchemaRegistry, relation,
};
use serde::Deserialize;
use serde_json::{Value, json};

// ============================================================================
// Mock transport
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
struct RecordedCall {
    method: &'static str,
    path: String,
    body: Option<Value>,
}

struct MockTransport {
    response: Value,
    status: u16,
    calls: Mutex<Vec<RecordedCall>>,
}

impl MockTransport {
    fn ok(response: Value) -> Arc<Self> {
        Arc::new(Self {
            response,
            status: 200,
            calls: Mutex::new(Vec::new()),
        })
    }

    fn failing(status: u16) -> Arc<Self> {
        Arc::new(Self {
            response: Value::Null,
            status,
            calls: Mutex::new(Vec::new()),
        })
    }

    fn record(&self, method: &'static str, path: &str, body: Option<Value>) -> Result<Value, ApiError> {
        self.calls.lock().expect("mock poisoned").push(RecordedCall {
            method,
            path: path.to_string(),
            body,
        });
        if !(200..300).contains(&self.status) {
            return Err(ApiError::Transport {
                status: self.status,
                message: "mock failure".to_string(),
            });
        }
        Ok(self.response.clone())
    }

    fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().expect("mock poisoned").clone()
    }

    fn call_count(&self) -> usize {
        self.calls.lock().expect("mock poisoned").len()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn get(&self, path: &str) -> Result<Value, ApiError> {
        self.record("GET", path, None)
    }

    async fn post(&self, path: &str, body: &Value) -> Result<Value, ApiError> {
        self.record("POST", path, Some(body.clone()))
    }
}

// ============================================================================
// Test schema
// ============================================================================

/// A small user-management schema where `firstname` is the only required
/// user attribute, matching the backend the wire scenarios were captured
/// against.
fn registry() -> Arc<SchemaRegistry> {
    Arc::new(
        SchemaRegistry::new()
            .register(
                EntityDescriptor::new("user")
                    .required_attribute("firstname")
                    .attribute("lastname")
                    .to_one("department", "department")
                    .to_many("roles", "role"),
            )
            .register(
                EntityDescriptor::new("department")
                    .required_attribute("code")
                    .attribute("name"),
            )
            .register(EntityDescriptor::new("role").required_attribute("name"))
            .register(
                EntityDescriptor::new("contact")
                    .required_attribute("firstname")
                    .to_one("client", "client"),
            )
            .register(
                EntityDescriptor::new("client")
                    .required_attribute("name")
                    .to_one("site", "site"),
            )
            .register(EntityDescriptor::new("site").required_attribute("name")),
    )
}

fn users_mutation(transport: Arc<MockTransport>) -> Mutation<Value> {
    Mutation::new(transport, "/users", registry(), "user")
}

// ============================================================================
// Mutation dispatch
// ============================================================================

#[tokio::test]
async fn test_create_with_relation_add_dispatches_expected_body() {
    let transport = MockTransport::ok(json!({ "id": "USR-9" }));
    let client = users_mutation(transport.clone());

    let result = client
        .create_entity(
            EntityDraft::new().attribute("firstname", "Alice").relation(
                "department",
                relation::add(EntityDraft::new().attribute("code", "mlk")),
            ),
        )
        .expect("valid draft")
        .mutate()
        .await
        .expect("mutation succeeds");

    assert_eq!(result, json!({ "id": "USR-9" }));

    let calls = transport.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].method, "POST");
    assert_eq!(calls[0].path, "/users");
    assert_eq!(
        calls[0].body,
        Some(json!({
            "mutate": [{
                "operation": "create",
                "attributes": { "firstname": "Alice" },
                "relations": {
                    "department": { "operation": "add", "attributes": { "code": "mlk" } }
                }
            }]
        }))
    );
}

#[tokio::test]
async fn test_update_with_detach_dispatches_expected_body() {
    let transport = MockTransport::ok(json!({ "id": "USR-1" }));
    let client = users_mutation(transport.clone());

    client
        .update_entity(
            "USR-1",
            EntityDraft::new().relation("department", relation::detach("mlk")),
        )
        .expect("valid draft")
        .mutate()
        .await
        .expect("mutation succeeds");

    assert_eq!(
        transport.calls()[0].body,
        Some(json!({
            "mutate": [{
                "operation": "update",
                "key": "USR-1",
                "attributes": {},
                "relations": {
                    "department": { "operation": "detach", "key": "mlk" }
                }
            }]
        }))
    );
}

#[tokio::test]
async fn test_nested_add_preserves_depth() {
    let transport = MockTransport::ok(Value::Null);
    let contacts: Mutation<Value> = Mutation::new(transport.clone(), "/contacts", registry(), "contact");

    contacts
        .create_entity(
            EntityDraft::new().attribute("firstname", "Marc").relation(
                "client",
                relation::add(EntityDraft::new().attribute("name", "ACME").relation(
                    "site",
                    relation::add(EntityDraft::new().attribute("name", "HQ")),
                )),
            ),
        )
        .expect("valid draft")
        .mutate()
        .await
        .expect("mutation succeeds");

    let body = transport.calls()[0].body.clone().expect("posted body");
    assert_eq!(
        body["mutate"][0]["relations"]["client"]["relations"]["site"],
        json!({ "operation": "add", "attributes": { "name": "HQ" } })
    );
}

#[tokio::test]
async fn test_multi_root_batch_is_one_request() {
    let transport = MockTransport::ok(Value::Null);
    let client = users_mutation(transport.clone());

    client
        .create_entity(EntityDraft::new().attribute("firstname", "Alice"))
        .expect("valid create")
        .update_entity("USR-2", EntityDraft::new().attribute("lastname", "Doe"))
        .expect("valid update")
        .mutate()
        .await
        .expect("mutation succeeds");

    let calls = transport.calls();
    assert_eq!(calls.len(), 1);
    let body = calls[0].body.clone().expect("posted body");
    let roots = body["mutate"].as_array().expect("mutate list");
    assert_eq!(roots.len(), 2);
    assert_eq!(roots[0]["operation"], "create");
    assert_eq!(roots[1]["operation"], "update");
}

// ============================================================================
// Build-time failures never reach the transport
// ============================================================================

#[tokio::test]
async fn test_attach_with_attributes_is_rejected_before_dispatch() {
    let transport = MockTransport::ok(Value::Null);
    let client = users_mutation(transport.clone());

    // Hand-built tree: the draft constructors cannot express this shape.
    let mut attributes = AttributeMap::new();
    attributes.insert("code", json!("mlk"));
    let mut relations = RelationMap::new();
    relations.insert(
        "department",
        RelationTarget::One(RelationOperation {
            operation: RelationOperationKind::Attach,
            key: Some("X".to_string()),
            attributes: Some(attributes),
            relations: RelationMap::new(),
        }),
    );
    let root = EntityOperation {
        operation: EntityOperationKind::Update,
        key: Some("USR-1".to_string()),
        attributes: AttributeMap::new(),
        relations,
    };

    let err = client.batch().operation(root).unwrap_err();
    assert!(matches!(
        err,
        BuildError::InvalidOperationShape { ref operation, .. } if operation == "attach"
    ));
    assert_eq!(transport.call_count(), 0);
}

#[tokio::test]
async fn test_empty_batch_is_rejected_before_dispatch() {
    let transport = MockTransport::ok(Value::Null);
    let client = users_mutation(transport.clone());

    let err = client.batch().mutate().await.unwrap_err();
    assert!(matches!(
        err,
        ApiError::Build(BuildError::EmptyMutation)
    ));
    assert_eq!(transport.call_count(), 0);
}

#[tokio::test]
async fn test_unknown_attribute_is_rejected_before_dispatch() {
    let transport = MockTransport::ok(Value::Null);
    let client = users_mutation(transport.clone());

    let err = client
        .create_entity(
            EntityDraft::new()
                .attribute("firstname", "Alice")
                .attribute("shoe_size", 43),
        )
        .unwrap_err();
    assert!(matches!(err, BuildError::UnknownAttribute { .. }));
    assert_eq!(transport.call_count(), 0);
}

// ============================================================================
// Wire round-trip
// ============================================================================

#[test]
fn test_request_round_trips_through_wire_format() {
    let client = users_mutation(MockTransport::ok(Value::Null));
    let request = client
        .create_entity(
            EntityDraft::new()
                .attribute("firstname", "Alice")
                .relation(
                    "department",
                    relation::add(EntityDraft::new().attribute("code", "mlk")),
                )
                .relation_list(
                    "roles",
                    vec![relation::attach("admin"), relation::detach("guest")],
                ),
        )
        .expect("valid draft")
        .request()
        .expect("non-empty batch");

    let wire = serde_json::to_string(&request).expect("serializes");
    let back: MutationRequest = serde_json::from_str(&wire).expect("parses");
    assert_eq!(back, request);
}

// ============================================================================
// Runtime failures
// ============================================================================

#[tokio::test]
async fn test_transport_failure_propagates() {
    let transport = MockTransport::failing(500);
    let client = users_mutation(transport.clone());

    let err = client
        .create_entity(EntityDraft::new().attribute("firstname", "Alice"))
        .expect("valid draft")
        .mutate()
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::Transport { status: 500, .. }));
    assert_eq!(transport.call_count(), 1);
}

#[tokio::test]
async fn test_response_shape_mismatch_is_validation_failure() {
    #[derive(Debug, Deserialize)]
    struct Created {
        #[allow(dead_code)]
        id: String,
    }

    let transport = MockTransport::ok(json!({ "uuid": "not-the-expected-field" }));
    let client: Mutation<Created> = Mutation::new(transport, "/users", registry(), "user");

    let err = client
        .create_entity(EntityDraft::new().attribute("firstname", "Alice"))
        .expect("valid draft")
        .mutate()
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::Validation(_)));
}

// ============================================================================
// Query facade
// ============================================================================

#[derive(Debug, Deserialize, PartialEq)]
struct DepartmentModel {
    id: String,
    code: String,
}

#[tokio::test]
async fn test_get_fetches_and_validates_one_entity() {
    let transport = MockTransport::ok(json!({ "id": "DEP-1", "code": "mlk" }));
    let departments: Query<DepartmentModel> = Query::new(transport.clone(), "/departments");

    let department = departments.get("DEP-1").await.expect("entity found");
    assert_eq!(department.code, "mlk");

    let calls = transport.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].method, "GET");
    assert_eq!(calls[0].path, "/departments/DEP-1");
}

#[tokio::test]
async fn test_get_maps_missing_entity_to_not_found() {
    let transport = MockTransport::failing(404);
    let departments: Query<DepartmentModel> = Query::new(transport, "/departments");

    let err = departments.get("DEP-404").await.unwrap_err();
    assert!(matches!(err, ApiError::NotFound(path) if path == "/departments/DEP-404"));
}

#[tokio::test]
async fn test_search_renders_filters_in_declaration_order() {
    let transport = MockTransport::ok(json!({ "users": [] }));
    let users: Query<Value> = Query::new(transport.clone(), "/users");

    let _page = users
        .search(
            &SearchFilters::new()
                .filter("lastname", "Doe")
                .filter("firstname", "Alice"),
        )
        .await
        .expect("search succeeds");

    assert_eq!(
        transport.calls()[0].path,
        "/users/search?lastname=Doe&firstname=Alice"
    );
}

#[tokio::test]
async fn test_details_fetches_collection_endpoint() {
    let transport = MockTransport::ok(json!({ "users": [], "total": 0 }));
    let users: Query<Value> = Query::new(transport.clone(), "/users");

    let _page = users.details().await.expect("details succeeds");
    assert_eq!(transport.calls()[0].path, "/users");
}

// ============================================================================
// Domain facade
// ============================================================================

#[tokio::test]
async fn test_user_mutation_enforces_domain_required_set() {
    let transport = MockTransport::ok(Value::Null);
    let users = user_mutation(transport.clone());

    // the user-management schema requires firstname, lastname and email
    let err = users
        .create_entity(EntityDraft::new().attribute("firstname", "Alice"))
        .unwrap_err();
    assert!(matches!(
        err,
        BuildError::MissingAttribute { ref attribute, .. } if attribute == "lastname"
    ));
    assert_eq!(transport.call_count(), 0);
}
