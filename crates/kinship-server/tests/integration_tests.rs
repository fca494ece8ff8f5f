//! Integration tests for the HTTP API

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use kinship_server::{
    config::ServerConfig,
    handlers::{
        create_router, AppState, CreateTreeResponse, DashboardResponse, EditorTreeResponse,
        HealthCheckResponse, RelationsResponse, ShareResponse, SharedTreeResponse, OWNER_HEADER,
    },
};
use kinship_domain::{ConnectionType, Position, TreeId};
use kinship_store::SqliteStore;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use tower::ServiceExt; // for oneshot

/// Helper to create a router over a fresh in-memory store
fn create_test_app() -> Router {
    let store = SqliteStore::new(":memory:").unwrap();
    let mut config = ServerConfig::default_test_config();
    config.base_url = "https://kinship.example".to_string();
    create_router(AppState::new(store, config))
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Vec<u8>) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, body.to_vec())
}

async fn get_json<T: DeserializeOwned>(app: &Router, uri: &str) -> (StatusCode, T) {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    let (status, body) = send(app, request).await;
    (status, serde_json::from_slice(&body).unwrap())
}

async fn post_json<T: DeserializeOwned>(app: &Router, uri: &str, body: Value) -> (StatusCode, T) {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    let (status, body) = send(app, request).await;
    (status, serde_json::from_slice(&body).unwrap())
}

fn family_form() -> Value {
    json!({
        "name": "Sharma Family",
        "members": [
            { "id": "m1", "name": "Ramesh", "dateOfBirth": "1960-04-12", "relationId": "pita" },
            { "id": "m2", "name": "Suresh", "dateOfBirth": "1990-08-30", "relationId": "putra" },
            { "id": "m3", "name": "Kavita", "dateOfBirth": "1993-11-02", "relationId": "bhai" },
            { "name": "Anil", "dateOfBirth": "1988-01-20", "relationId": "pati" },
            { "id": "m5", "name": "Priya", "dateOfBirth": "1989-05-05", "relationId": "patni" }
        ]
    })
}

async fn create_family(app: &Router) -> TreeId {
    let (status, created): (_, CreateTreeResponse) =
        post_json(app, "/api/forms", family_form()).await;
    assert_eq!(status, StatusCode::OK);
    assert!(created.success);
    created.tree_id
}

#[tokio::test]
async fn test_health_check_endpoint() {
    let app = create_test_app();
    let (status, health): (_, HealthCheckResponse) = get_json(&app, "/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(health.status, "healthy");
    assert_eq!(health.relations, 16);
}

#[tokio::test]
async fn test_relations_by_category() {
    let app = create_test_app();

    let (status, all): (_, RelationsResponse) = get_json(&app, "/api/relations").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(all.relations.len(), 16);

    let (_, spouses): (_, RelationsResponse) =
        get_json(&app, "/api/relations?category=spouse").await;
    let ids: Vec<&str> = spouses.relations.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids, vec!["pati", "patni"]);

    let (status, body): (_, Value) = get_json(&app, "/api/relations?category=cousin").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn test_create_tree_validation() {
    let app = create_test_app();

    let (status, body): (_, Value) =
        post_json(&app, "/api/forms", json!({ "name": "", "members": [] })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Missing required fields");

    let (status, _): (_, Value) = post_json(&app, "/api/forms", json!({ "name": "No members" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

async fn post_raw(app: &Router, uri: &str, body: &str) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    let (status, body) = send(app, request).await;
    (status, serde_json::from_slice(&body).unwrap())
}

#[tokio::test]
async fn test_create_tree_null_members() {
    let app = create_test_app();

    let (status, body): (_, Value) =
        post_json(&app, "/api/forms", json!({ "name": "F", "members": null })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "Missing required fields");

    let (status, body): (_, Value) =
        post_json(&app, "/api/forms", json!({ "name": null, "members": [] })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Missing required fields");
}

#[tokio::test]
async fn test_malformed_bodies_use_error_envelope() {
    let app = create_test_app();

    // Member without a name fails deserialization
    let (status, body) = post_raw(
        &app,
        "/api/forms",
        r#"{"name":"F","members":[{"relationId":"pita"}]}"#,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert!(body["error"].as_str().unwrap().contains("name"));

    for uri in ["/api/forms", "/api/editor", "/api/share"] {
        let (status, body) = post_raw(&app, uri, "not json").await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{}", uri);
        assert_eq!(body["success"], false, "{}", uri);
        assert!(body["error"].is_string(), "{}", uri);
    }
}

#[tokio::test]
async fn test_editor_infers_connections() {
    let app = create_test_app();
    let tree_id = create_family(&app).await;

    let (status, loaded): (_, EditorTreeResponse) =
        get_json(&app, &format!("/api/editor?treeId={}", tree_id)).await;
    assert_eq!(status, StatusCode::OK);

    let tree = loaded.tree;
    assert_eq!(tree.id, tree_id);
    assert_eq!(tree.members.len(), 5);

    // Missing member ids are generated at creation
    assert!(tree.members[3].id.starts_with("member-"));
    let anil = tree.members[3].id.clone();

    // Grid layout: three per row
    assert_eq!(tree.members[0].position, Some(Position { x: 0.0, y: 0.0 }));
    assert_eq!(tree.members[4].position, Some(Position { x: 300.0, y: 200.0 }));

    let summary: Vec<(String, String, ConnectionType)> = tree
        .connections
        .iter()
        .map(|c| (c.from.clone(), c.to.clone(), c.connection_type))
        .collect();

    assert_eq!(
        summary,
        vec![
            ("m1".to_string(), "m2".to_string(), ConnectionType::ParentChild),
            (anil.clone(), "m5".to_string(), ConnectionType::Spouse),
            ("m5".to_string(), anil, ConnectionType::Spouse),
        ]
    );
}

#[tokio::test]
async fn test_editor_errors() {
    let app = create_test_app();

    let (status, body): (_, Value) = get_json(&app, "/api/editor").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Tree ID required");

    let (status, _): (_, Value) = get_json(&app, "/api/editor?treeId=not-a-tree").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body): (_, Value) =
        get_json(&app, &format!("/api/editor?treeId={}", TreeId::new())).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Tree not found");
}

#[tokio::test]
async fn test_editor_save_replaces_members() {
    let app = create_test_app();
    let tree_id = create_family(&app).await;

    let save = json!({
        "treeId": tree_id.to_string(),
        "members": [
            { "id": "m1", "name": "Ramesh", "dateOfBirth": "1960-04-12", "relationId": "mata" },
            { "id": "m2", "name": "Suresh", "dateOfBirth": "1990-08-30", "relationId": "putri" }
        ],
        "connections": [
            { "id": "m1-m2", "from": "m1", "to": "m2", "type": "related" }
        ]
    });
    let (status, body): (_, Value) = post_json(&app, "/api/editor", save).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);

    let (_, loaded): (_, EditorTreeResponse) =
        get_json(&app, &format!("/api/editor?treeId={}", tree_id)).await;
    assert_eq!(loaded.tree.members.len(), 2);
    assert_eq!(loaded.tree.connections.len(), 1);
    assert_eq!(loaded.tree.connections[0].id, "m1-m2");
    assert_eq!(loaded.tree.connections[0].connection_type, ConnectionType::ParentChild);

    let missing = json!({ "treeId": TreeId::new().to_string(), "members": [] });
    let (status, _): (_, Value) = post_json(&app, "/api/editor", missing).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_share_round_trip() {
    let app = create_test_app();
    let tree_id = create_family(&app).await;

    let (status, share): (_, ShareResponse) =
        post_json(&app, "/api/share", json!({ "treeId": tree_id.to_string() })).await;
    assert_eq!(status, StatusCode::OK);
    assert!(share.share_id.starts_with("share-"));
    assert_eq!(
        share.share_url,
        format!("https://kinship.example/shared/{}", share.share_id)
    );

    let (status, shared): (_, SharedTreeResponse) =
        get_json(&app, &format!("/api/share?shareId={}", share.share_id)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(shared.tree.id, tree_id);
    assert_eq!(shared.tree.name, "Sharma Family");
    assert_eq!(shared.tree.members.len(), 5);
    // Shared view carries stored editor edges, none saved yet
    assert!(shared.tree.connections.is_empty());
}

#[tokio::test]
async fn test_share_errors() {
    let app = create_test_app();

    let (status, _): (_, Value) = post_json(&app, "/api/share", json!({})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body): (_, Value) =
        post_json(&app, "/api/share", json!({ "treeId": TreeId::new().to_string() })).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Tree not found");

    let (status, _): (_, Value) = get_json(&app, "/api/share").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body): (_, Value) = get_json(&app, "/api/share?shareId=share-nope").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Share not found");
}

#[tokio::test]
async fn test_dashboard_lists_owner_trees() {
    let app = create_test_app();
    let first = create_family(&app).await;

    let request = Request::builder()
        .method("POST")
        .uri("/api/forms")
        .header("content-type", "application/json")
        .header(OWNER_HEADER, "someone-else")
        .body(Body::from(family_form().to_string()))
        .unwrap();
    let (status, _) = send(&app, request).await;
    assert_eq!(status, StatusCode::OK);

    let (status, dashboard): (_, DashboardResponse) = get_json(&app, "/api/dashboard").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(dashboard.trees.len(), 1);
    assert_eq!(dashboard.trees[0].id, first);
    assert_eq!(dashboard.trees[0].member_count, 5);

    let request = Request::builder()
        .uri("/api/dashboard")
        .header(OWNER_HEADER, "someone-else")
        .body(Body::empty())
        .unwrap();
    let (_, body) = send(&app, request).await;
    let other: DashboardResponse = serde_json::from_slice(&body).unwrap();
    assert_eq!(other.trees.len(), 1);
    assert_ne!(other.trees[0].id, first);
}

#[tokio::test]
async fn test_delete_tree() {
    let app = create_test_app();
    let tree_id = create_family(&app).await;

    let request = Request::builder()
        .method("DELETE")
        .uri(format!("/api/editor?treeId={}", tree_id))
        .body(Body::empty())
        .unwrap();
    let (status, _) = send(&app, request).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _): (_, Value) =
        get_json(&app, &format!("/api/editor?treeId={}", tree_id)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[test]
fn test_server_config_from_toml() {
    let toml = r#"
        bind_address = "0.0.0.0"
        bind_port = 9000
        base_url = "https://kinship.example"
    "#;

    let config: ServerConfig = toml::from_str(toml).unwrap();
    assert_eq!(config.bind_port, 9000);
    assert_eq!(config.database_path, "kinship.db"); // Default
    assert_eq!(config.default_owner, "user-1"); // Default
    assert_eq!(config.layout.columns, 3); // Default
}

#[test]
fn test_server_config_from_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("kinship.toml");
    std::fs::write(
        &path,
        "bind_address = \"127.0.0.1\"\nbind_port = 3100\nbase_url = \"\"\n",
    )
    .unwrap();

    // base_url is required
    assert!(ServerConfig::from_file(&path).is_err());
}
