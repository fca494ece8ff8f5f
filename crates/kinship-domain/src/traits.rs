//! Trait definitions for external interactions
//!
//! These traits define the boundaries between domain logic and infrastructure.
//! Store implementations live in `kinship-store`.

use crate::relation::{Relation, RelationCategory};
use crate::tree::{FamilyTree, NewTree, ShareLink, TreeUpdate, User};
use crate::{TreeId, UserId};

/// Read-only access to a relation table
///
/// Implemented by [`RelationTaxonomy`](crate::RelationTaxonomy); tests may
/// supply their own tables.
pub trait Taxonomy {
    /// Resolve a relation id; unknown or empty ids yield `None`
    fn lookup(&self, relation_id: &str) -> Option<&Relation>;

    /// All relations in a category, in declaration order
    fn filter_by_category(&self, category: RelationCategory) -> Vec<&Relation>;
}

/// Trait for storing and retrieving family tree documents
///
/// Implemented by the infrastructure layer (kinship-store)
pub trait TreeStore {
    /// Error type for store operations
    type Error;

    /// Persist a new tree and return its id
    fn create_tree(&mut self, tree: NewTree) -> Result<TreeId, Self::Error>;

    /// Get a tree by ID
    fn find_tree(&self, id: TreeId) -> Result<Option<FamilyTree>, Self::Error>;

    /// All trees owned by a user, oldest first
    fn find_trees_by_owner(&self, owner_id: &str) -> Result<Vec<FamilyTree>, Self::Error>;

    /// Apply a partial update; returns `false` if the tree does not exist
    fn update_tree(&mut self, id: TreeId, update: TreeUpdate) -> Result<bool, Self::Error>;

    /// Delete a tree; returns `false` if the tree does not exist
    fn delete_tree(&mut self, id: TreeId) -> Result<bool, Self::Error>;
}

/// Trait for storing user credentials
///
/// Credentials are opaque here: hashing and verification belong to the caller.
pub trait UserStore {
    /// Error type for store operations
    type Error;

    /// Register a user; fails if the email is already taken
    fn create_user(&mut self, email: &str, password_hash: &str) -> Result<UserId, Self::Error>;

    /// Find a user by email address
    fn find_user_by_email(&self, email: &str) -> Result<Option<User>, Self::Error>;

    /// Find a user by ID
    fn find_user_by_id(&self, id: UserId) -> Result<Option<User>, Self::Error>;
}

/// Trait for read-only share links
pub trait ShareStore {
    /// Error type for store operations
    type Error;

    /// Create a new share link pointing at a tree
    fn create_share(&mut self, tree_id: TreeId) -> Result<ShareLink, Self::Error>;

    /// Resolve a share id
    fn find_share(&self, share_id: &str) -> Result<Option<ShareLink>, Self::Error>;
}
