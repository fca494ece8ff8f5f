//! Stored documents: family trees, users and share links

use crate::member::Member;
use crate::{TreeId, UserId};
use serde::{Deserialize, Serialize};

/// A free-form edge drawn by the user in the editor
///
/// Unlike [`Connection`](crate::Connection), these are stored verbatim and
/// their `type` is arbitrary text (e.g. "related").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditorEdge {
    /// Edge id chosen by the editor
    pub id: String,
    /// Source member id
    pub from: String,
    /// Target member id
    pub to: String,
    /// Free-text label
    #[serde(rename = "type")]
    pub kind: String,
}

/// A family tree document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FamilyTree {
    /// Unique identifier
    pub id: TreeId,
    /// Owning user
    pub owner_id: String,
    /// Display name
    pub name: String,
    /// Members, replaced wholesale on every save
    pub members: Vec<Member>,
    /// Editor-drawn edges
    pub connections: Vec<EditorEdge>,
    /// Creation time (Unix milliseconds)
    pub created_at: u64,
    /// Last modification time (Unix milliseconds)
    pub updated_at: u64,
}

impl FamilyTree {
    /// Dashboard view of this tree
    pub fn summary(&self) -> TreeSummary {
        TreeSummary {
            id: self.id,
            name: self.name.clone(),
            member_count: self.members.len(),
            created_at: self.created_at,
            last_modified: self.updated_at,
        }
    }
}

/// A tree about to be created
#[derive(Debug, Clone, PartialEq)]
pub struct NewTree {
    /// Owning user
    pub owner_id: String,
    /// Display name
    pub name: String,
    /// Initial members
    pub members: Vec<Member>,
    /// Initial editor edges (usually empty)
    pub connections: Vec<EditorEdge>,
}

impl NewTree {
    /// Create a tree with members and no edges
    pub fn new(owner_id: impl Into<String>, name: impl Into<String>, members: Vec<Member>) -> Self {
        Self {
            owner_id: owner_id.into(),
            name: name.into(),
            members,
            connections: Vec::new(),
        }
    }
}

/// Partial update of a stored tree; `None` fields are left alone
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TreeUpdate {
    /// New display name
    pub name: Option<String>,
    /// Replacement member list
    pub members: Option<Vec<Member>>,
    /// Replacement editor edges
    pub connections: Option<Vec<EditorEdge>>,
}

impl TreeUpdate {
    /// Whether the update changes nothing
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.members.is_none() && self.connections.is_none()
    }
}

/// Dashboard listing entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TreeSummary {
    /// Tree id
    pub id: TreeId,
    /// Display name
    pub name: String,
    /// Number of members
    pub member_count: usize,
    /// Creation time (Unix milliseconds)
    pub created_at: u64,
    /// Last modification time (Unix milliseconds)
    pub last_modified: u64,
}

/// A registered user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    /// Unique identifier
    pub id: UserId,
    /// Login email, unique
    pub email: String,
    /// Opaque credential hash
    pub password_hash: String,
    /// Registration time (Unix milliseconds)
    pub created_at: u64,
}

/// Read-only link to a tree
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShareLink {
    /// Public share id
    pub share_id: String,
    /// Tree the link points at
    pub tree_id: TreeId,
    /// Creation time (Unix milliseconds)
    pub created_at: u64,
}

impl ShareLink {
    /// Generate a fresh `share-<uuid>` id
    pub fn generate_id() -> String {
        format!("share-{}", uuid::Uuid::now_v7().simple())
    }
}
