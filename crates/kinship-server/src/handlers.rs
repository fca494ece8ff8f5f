//! HTTP request handlers for the family tree API.
//!
//! Implements tree creation, the editor load/save endpoints, share links,
//! the dashboard listing and the relation catalogue using axum.

use crate::config::ServerConfig;
use crate::error::AppError;
use axum::{
    extract::{rejection::JsonRejection, Query, State},
    http::HeaderMap,
    response::Json,
    routing::{get, post},
    Router as AxumRouter,
};
use kinship_domain::traits::{ShareStore, Taxonomy, TreeStore};
use kinship_domain::{
    build_connections, Connection, EditorEdge, Member, NewTree, Relation, RelationCategory,
    RelationTaxonomy, TreeId, TreeSummary, TreeUpdate,
};
use kinship_store::{SqliteStore, StoreError};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};
use tracing::{debug, info, warn};

/// Header naming the tree owner
pub const OWNER_HEADER: &str = "x-owner-id";

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Tree, user and share storage
    pub store: Arc<Mutex<SqliteStore>>,
    /// Relation table used for connection inference
    pub taxonomy: Arc<RelationTaxonomy>,
    /// Server settings (base URL, default owner, layout)
    pub config: Arc<ServerConfig>,
}

impl AppState {
    /// Create state around an opened store and the standard taxonomy
    pub fn new(store: SqliteStore, config: ServerConfig) -> Self {
        Self {
            store: Arc::new(Mutex::new(store)),
            taxonomy: Arc::new(RelationTaxonomy::standard()),
            config: Arc::new(config),
        }
    }

    /// Run one store operation under the lock
    ///
    /// The guard never outlives the closure, so it is not held across an await.
    fn with_store<T>(
        &self,
        op: impl FnOnce(&mut SqliteStore) -> Result<T, StoreError>,
    ) -> Result<T, AppError> {
        let mut store = self
            .store
            .lock()
            .map_err(|_| AppError::Internal("Store lock poisoned".to_string()))?;
        Ok(op(&mut *store)?)
    }

    fn owner_id(&self, headers: &HeaderMap) -> String {
        headers
            .get(OWNER_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| self.config.default_owner.clone())
    }
}

fn parse_tree_id(raw: Option<&str>) -> Result<TreeId, AppError> {
    let raw = raw
        .filter(|s| !s.is_empty())
        .ok_or_else(|| AppError::BadRequest("Tree ID required".to_string()))?;
    raw.parse()
        .map_err(|_| AppError::BadRequest(format!("Invalid tree ID: {}", raw)))
}

/// Health check response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthCheckResponse {
    /// Overall health status
    pub status: String,
    /// Number of relations in the taxonomy
    pub relations: usize,
}

/// Query string for `GET /api/relations`
#[derive(Debug, Deserialize)]
pub struct RelationsQuery {
    /// Optional category filter
    pub category: Option<String>,
}

/// Relation catalogue response
#[derive(Debug, Serialize, Deserialize)]
pub struct RelationsResponse {
    /// Always `true`
    pub success: bool,
    /// Matching relations in declaration order
    pub relations: Vec<Relation>,
}

/// Body of `POST /api/forms`
#[derive(Debug, Deserialize)]
pub struct CreateTreeRequest {
    /// Tree display name
    pub name: Option<String>,
    /// Initial members; ids are generated where missing
    pub members: Option<Vec<Member>>,
}

/// Response of `POST /api/forms`
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTreeResponse {
    /// Always `true`
    pub success: bool,
    /// Id of the new tree
    pub tree_id: TreeId,
    /// Confirmation message
    pub message: String,
}

/// Query string carrying a tree id
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TreeQuery {
    /// Tree id
    pub tree_id: Option<String>,
}

/// A tree as the editor sees it: laid out, with inferred connections
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditorTree {
    /// Tree id
    pub id: TreeId,
    /// Owning user
    pub owner_id: String,
    /// Display name
    pub name: String,
    /// Members with grid positions
    pub members: Vec<Member>,
    /// Connections inferred from member relations
    pub connections: Vec<Connection>,
    /// Creation time (Unix milliseconds)
    pub created_at: u64,
    /// Last modification time (Unix milliseconds)
    pub updated_at: u64,
}

/// Response of `GET /api/editor`
#[derive(Debug, Serialize, Deserialize)]
pub struct EditorTreeResponse {
    /// Always `true`
    pub success: bool,
    /// The tree
    pub tree: EditorTree,
}

/// Body of `POST /api/editor`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveTreeRequest {
    /// Tree to save
    pub tree_id: Option<String>,
    /// Replacement member list
    pub members: Option<Vec<Member>>,
    /// Replacement editor edges
    pub connections: Option<Vec<EditorEdge>>,
}

/// Generic acknowledgement
#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    /// Always `true`
    pub success: bool,
    /// Confirmation message
    pub message: String,
}

/// Body of `POST /api/share`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShareRequest {
    /// Tree to share
    pub tree_id: Option<String>,
}

/// Response of `POST /api/share`
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShareResponse {
    /// Always `true`
    pub success: bool,
    /// Public URL of the link
    pub share_url: String,
    /// Share id
    pub share_id: String,
}

/// Query string for `GET /api/share`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShareQuery {
    /// Share id
    pub share_id: Option<String>,
}

/// A tree as seen through a share link: stored edges, no owner details
#[derive(Debug, Serialize, Deserialize)]
pub struct SharedTree {
    /// Tree id
    pub id: TreeId,
    /// Display name
    pub name: String,
    /// Members as saved
    pub members: Vec<Member>,
    /// Editor edges as saved
    pub connections: Vec<EditorEdge>,
}

/// Response of `GET /api/share`
#[derive(Debug, Serialize, Deserialize)]
pub struct SharedTreeResponse {
    /// Always `true`
    pub success: bool,
    /// The shared tree
    pub tree: SharedTree,
}

/// Response of `GET /api/dashboard`
#[derive(Debug, Serialize, Deserialize)]
pub struct DashboardResponse {
    /// Always `true`
    pub success: bool,
    /// The owner's trees, oldest first
    pub trees: Vec<TreeSummary>,
}

/// GET /health
async fn health_check(State(state): State<AppState>) -> Json<HealthCheckResponse> {
    Json(HealthCheckResponse {
        status: "healthy".to_string(),
        relations: state.taxonomy.len(),
    })
}

/// GET /api/relations - relation catalogue, optionally by category
async fn list_relations(
    State(state): State<AppState>,
    Query(query): Query<RelationsQuery>,
) -> Result<Json<RelationsResponse>, AppError> {
    let relations: Vec<Relation> = match query.category.as_deref() {
        Some(raw) => {
            let category = RelationCategory::parse(raw)
                .ok_or_else(|| AppError::BadRequest(format!("Unknown category: {}", raw)))?;
            state
                .taxonomy
                .filter_by_category(category)
                .into_iter()
                .cloned()
                .collect()
        }
        None => state.taxonomy.relations().to_vec(),
    };

    Ok(Json(RelationsResponse {
        success: true,
        relations,
    }))
}

/// POST /api/forms - create a tree from the intake form
async fn create_tree(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<CreateTreeRequest>, JsonRejection>,
) -> Result<Json<CreateTreeResponse>, AppError> {
    let Json(request) = payload?;
    let (Some(name), Some(mut members)) = (request.name, request.members) else {
        return Err(AppError::BadRequest("Missing required fields".to_string()));
    };
    if name.trim().is_empty() || members.is_empty() {
        return Err(AppError::BadRequest("Missing required fields".to_string()));
    }

    let owner_id = state.owner_id(&headers);
    for member in &mut members {
        member.ensure_id();
    }

    let member_count = members.len();
    let tree_id =
        state.with_store(|store| store.create_tree(NewTree::new(owner_id.as_str(), name, members)))?;

    info!(%tree_id, owner = %owner_id, member_count, "Created family tree");

    Ok(Json(CreateTreeResponse {
        success: true,
        tree_id,
        message: "Family tree created successfully".to_string(),
    }))
}

/// GET /api/editor?treeId= - load a tree with layout and inferred connections
async fn load_editor_tree(
    State(state): State<AppState>,
    Query(query): Query<TreeQuery>,
) -> Result<Json<EditorTreeResponse>, AppError> {
    let tree_id = parse_tree_id(query.tree_id.as_deref())?;

    let tree = state
        .with_store(|store| store.find_tree(tree_id))?
        .ok_or_else(|| AppError::NotFound("Tree not found".to_string()))?;

    let mut members = tree.members;
    state.config.layout.apply(&mut members);
    let connections = build_connections(&members, state.taxonomy.as_ref());

    debug!(
        %tree_id,
        members = members.len(),
        connections = connections.len(),
        "Inferred connections"
    );

    Ok(Json(EditorTreeResponse {
        success: true,
        tree: EditorTree {
            id: tree.id,
            owner_id: tree.owner_id,
            name: tree.name,
            members,
            connections,
            created_at: tree.created_at,
            updated_at: tree.updated_at,
        },
    }))
}

/// POST /api/editor - save members and editor edges
async fn save_editor_tree(
    State(state): State<AppState>,
    payload: Result<Json<SaveTreeRequest>, JsonRejection>,
) -> Result<Json<MessageResponse>, AppError> {
    let Json(request) = payload?;
    let tree_id = parse_tree_id(request.tree_id.as_deref())?;

    let mut members = request.members;
    if let Some(members) = members.as_mut() {
        for member in members.iter_mut() {
            member.ensure_id();
        }
    }

    let update = TreeUpdate {
        name: None,
        members,
        connections: request.connections,
    };

    let updated = state.with_store(|store| store.update_tree(tree_id, update))?;
    if !updated {
        return Err(AppError::NotFound("Tree not found".to_string()));
    }

    info!(%tree_id, "Saved family tree");

    Ok(Json(MessageResponse {
        success: true,
        message: "Family tree saved successfully".to_string(),
    }))
}

/// DELETE /api/editor?treeId= - delete a tree
async fn delete_tree(
    State(state): State<AppState>,
    Query(query): Query<TreeQuery>,
) -> Result<Json<MessageResponse>, AppError> {
    let tree_id = parse_tree_id(query.tree_id.as_deref())?;

    let deleted = state.with_store(|store| store.delete_tree(tree_id))?;
    if !deleted {
        return Err(AppError::NotFound("Tree not found".to_string()));
    }

    info!(%tree_id, "Deleted family tree");

    Ok(Json(MessageResponse {
        success: true,
        message: "Family tree deleted".to_string(),
    }))
}

/// POST /api/share - create a read-only link
async fn create_share(
    State(state): State<AppState>,
    payload: Result<Json<ShareRequest>, JsonRejection>,
) -> Result<Json<ShareResponse>, AppError> {
    let Json(request) = payload?;
    let tree_id = parse_tree_id(request.tree_id.as_deref())?;

    let link = state
        .with_store(|store| store.create_share(tree_id))
        .map_err(|e| match e {
            AppError::Store(StoreError::NotFound(_)) => {
                AppError::NotFound("Tree not found".to_string())
            }
            other => other,
        })?;

    info!(%tree_id, share_id = %link.share_id, "Created share link");

    Ok(Json(ShareResponse {
        success: true,
        share_url: state.config.share_url(&link.share_id),
        share_id: link.share_id,
    }))
}

/// GET /api/share?shareId= - view a shared tree
async fn get_shared_tree(
    State(state): State<AppState>,
    Query(query): Query<ShareQuery>,
) -> Result<Json<SharedTreeResponse>, AppError> {
    let share_id = query
        .share_id
        .filter(|s| !s.is_empty())
        .ok_or_else(|| AppError::BadRequest("Share ID required".to_string()))?;

    let link = state
        .with_store(|store| store.find_share(&share_id))?
        .ok_or_else(|| AppError::NotFound("Share not found".to_string()))?;

    let tree = state
        .with_store(|store| store.find_tree(link.tree_id))?
        .ok_or_else(|| {
            warn!(%share_id, tree_id = %link.tree_id, "Share link points at a missing tree");
            AppError::NotFound("Tree not found".to_string())
        })?;

    Ok(Json(SharedTreeResponse {
        success: true,
        tree: SharedTree {
            id: tree.id,
            name: tree.name,
            members: tree.members,
            connections: tree.connections,
        },
    }))
}

/// GET /api/dashboard - the owner's trees
async fn dashboard(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<DashboardResponse>, AppError> {
    let owner_id = state.owner_id(&headers);
    let trees = state.with_store(|store| store.find_trees_by_owner(&owner_id))?;

    Ok(Json(DashboardResponse {
        success: true,
        trees: trees.iter().map(|tree| tree.summary()).collect(),
    }))
}

/// Create the axum router with all routes
pub fn create_router(state: AppState) -> AxumRouter {
    AxumRouter::new()
        .route("/health", get(health_check))
        .route("/api/relations", get(list_relations))
        .route("/api/forms", post(create_tree))
        .route(
            "/api/editor",
            get(load_editor_tree)
                .post(save_editor_tree)
                .delete(delete_tree),
        )
        .route("/api/share", get(get_shared_tree).post(create_share))
        .route("/api/dashboard", get(dashboard))
        .with_state(state)
}
