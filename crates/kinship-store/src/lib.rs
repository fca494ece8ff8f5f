//! Kinship Storage Layer
//!
//! Implements the `TreeStore`, `UserStore` and `ShareStore` traits on top of
//! SQLite.
//!
//! # Architecture
//!
//! - One row per family tree; the member list and editor edges are JSON
//!   documents in that row and are replaced wholesale on update
//! - Users keyed by UUIDv7 with a unique email
//! - Share links map a public share id to a tree id
//!
//! # Examples
//!
//! ```no_run
//! use kinship_store::SqliteStore;
//!
//! let store = SqliteStore::new(":memory:").unwrap();
//! // Store is now ready for tree operations
//! ```

#![warn(missing_docs)]

use kinship_domain::traits::{ShareStore, TreeStore, UserStore};
use kinship_domain::{
    now_millis, FamilyTree, NewTree, ShareLink, TreeId, TreeUpdate, User, UserId,
};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::Path;
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Error, Debug)]
pub enum StoreError {
    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Member or edge document could not be encoded
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Record not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Invalid data format
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// Unique key already taken
    #[error("Duplicate record: {0}")]
    Duplicate(String),
}

const TREE_COLUMNS: &str =
    "id, owner_id, name, members, connections, created_at, updated_at";

/// SQLite-based implementation of the kinship stores
///
/// # Thread Safety
///
/// SQLite connections are not thread-safe. Share a store between threads
/// behind a mutex, or give each thread its own instance.
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Create a new SqliteStore with the given database path
    ///
    /// Use `:memory:` for an in-memory database (useful for testing).
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use kinship_store::SqliteStore;
    ///
    /// let store = SqliteStore::new("kinship.db").unwrap();
    /// ```
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let conn = Connection::open(path)?;
        let mut store = Self { conn };
        store.initialize_schema()?;
        Ok(store)
    }

    /// Initialize the database schema
    fn initialize_schema(&mut self) -> Result<(), StoreError> {
        let schema = include_str!("schema.sql");
        self.conn.execute_batch(schema)?;
        Ok(())
    }

    /// Map a JSON or id decoding failure onto a rusqlite column error
    fn conversion_error<E>(column: usize, err: E) -> rusqlite::Error
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        rusqlite::Error::FromSqlConversionFailure(column, rusqlite::types::Type::Text, Box::new(err))
    }

    /// Read a Unix-millisecond column, rejecting negative values
    fn timestamp(row: &Row<'_>, column: usize) -> rusqlite::Result<u64> {
        let raw: i64 = row.get(column)?;
        u64::try_from(raw).map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(column, rusqlite::types::Type::Integer, Box::new(e))
        })
    }

    /// Convert a `trees` row (selected with `TREE_COLUMNS`) into a FamilyTree
    fn row_to_tree(row: &Row<'_>) -> rusqlite::Result<FamilyTree> {
        let id: String = row.get(0)?;
        let members: String = row.get(3)?;
        let connections: String = row.get(4)?;

        Ok(FamilyTree {
            id: id.parse().map_err(|e| Self::conversion_error(0, e))?,
            owner_id: row.get(1)?,
            name: row.get(2)?,
            members: serde_json::from_str(&members).map_err(|e| Self::conversion_error(3, e))?,
            connections: serde_json::from_str(&connections)
                .map_err(|e| Self::conversion_error(4, e))?,
            created_at: Self::timestamp(row, 5)?,
            updated_at: Self::timestamp(row, 6)?,
        })
    }

    fn row_to_user(row: &Row<'_>) -> rusqlite::Result<User> {
        let id: String = row.get(0)?;
        Ok(User {
            id: id.parse().map_err(|e| Self::conversion_error(0, e))?,
            email: row.get(1)?,
            password_hash: row.get(2)?,
            created_at: Self::timestamp(row, 3)?,
        })
    }

    fn row_to_share(row: &Row<'_>) -> rusqlite::Result<ShareLink> {
        let tree_id: String = row.get(1)?;
        Ok(ShareLink {
            share_id: row.get(0)?,
            tree_id: tree_id.parse().map_err(|e| Self::conversion_error(1, e))?,
            created_at: Self::timestamp(row, 2)?,
        })
    }
}

impl TreeStore for SqliteStore {
    type Error = StoreError;

    fn create_tree(&mut self, tree: NewTree) -> Result<TreeId, Self::Error> {
        if tree.name.trim().is_empty() {
            return Err(StoreError::InvalidData("Tree name cannot be empty".to_string()));
        }

        let id = TreeId::new();
        let now = now_millis() as i64;
        let members = serde_json::to_string(&tree.members)?;
        let connections = serde_json::to_string(&tree.connections)?;

        self.conn.execute(
            "INSERT INTO trees (id, owner_id, name, members, connections, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                id.to_string(),
                &tree.owner_id,
                &tree.name,
                &members,
                &connections,
                now,
                now,
            ],
        )?;

        Ok(id)
    }

    fn find_tree(&self, id: TreeId) -> Result<Option<FamilyTree>, Self::Error> {
        let tree = self
            .conn
            .query_row(
                &format!("SELECT {} FROM trees WHERE id = ?1", TREE_COLUMNS),
                params![id.to_string()],
                Self::row_to_tree,
            )
            .optional()?;

        Ok(tree)
    }

    fn find_trees_by_owner(&self, owner_id: &str) -> Result<Vec<FamilyTree>, Self::Error> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM trees WHERE owner_id = ?1 ORDER BY created_at, rowid",
            TREE_COLUMNS
        ))?;

        let trees = stmt
            .query_map(params![owner_id], Self::row_to_tree)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(trees)
    }

    fn update_tree(&mut self, id: TreeId, update: TreeUpdate) -> Result<bool, Self::Error> {
        let mut sql = String::from("UPDATE trees SET updated_at = ?");
        let mut params: Vec<Box<dyn rusqlite::ToSql>> = vec![Box::new(now_millis() as i64)];

        if let Some(name) = update.name {
            sql.push_str(", name = ?");
            params.push(Box::new(name));
        }

        if let Some(members) = &update.members {
            sql.push_str(", members = ?");
            params.push(Box::new(serde_json::to_string(members)?));
        }

        if let Some(connections) = &update.connections {
            sql.push_str(", connections = ?");
            params.push(Box::new(serde_json::to_string(connections)?));
        }

        sql.push_str(" WHERE id = ?");
        params.push(Box::new(id.to_string()));

        let param_refs: Vec<&dyn rusqlite::ToSql> = params.iter().map(|p| p.as_ref()).collect();
        let changed = self.conn.execute(&sql, &param_refs[..])?;

        Ok(changed > 0)
    }

    fn delete_tree(&mut self, id: TreeId) -> Result<bool, Self::Error> {
        let id = id.to_string();
        let changed = self
            .conn
            .execute("DELETE FROM trees WHERE id = ?1", params![&id])?;

        // Links to a deleted tree would only ever resolve to "Tree not found"
        self.conn
            .execute("DELETE FROM shares WHERE tree_id = ?1", params![&id])?;

        Ok(changed > 0)
    }
}

impl UserStore for SqliteStore {
    type Error = StoreError;

    fn create_user(&mut self, email: &str, password_hash: &str) -> Result<UserId, Self::Error> {
        if email.trim().is_empty() || password_hash.is_empty() {
            return Err(StoreError::InvalidData(
                "Email and password hash are required".to_string(),
            ));
        }

        let exists: bool = self
            .conn
            .query_row(
                "SELECT 1 FROM users WHERE email = ?1",
                params![email],
                |_| Ok(true),
            )
            .optional()?
            .unwrap_or(false);

        if exists {
            return Err(StoreError::Duplicate(email.to_string()));
        }

        let id = UserId::new();
        self.conn.execute(
            "INSERT INTO users (id, email, password_hash, created_at) VALUES (?1, ?2, ?3, ?4)",
            params![id.to_string(), email, password_hash, now_millis() as i64],
        )?;

        Ok(id)
    }

    fn find_user_by_email(&self, email: &str) -> Result<Option<User>, Self::Error> {
        let user = self
            .conn
            .query_row(
                "SELECT id, email, password_hash, created_at FROM users WHERE email = ?1",
                params![email],
                Self::row_to_user,
            )
            .optional()?;

        Ok(user)
    }

    fn find_user_by_id(&self, id: UserId) -> Result<Option<User>, Self::Error> {
        let user = self
            .conn
            .query_row(
                "SELECT id, email, password_hash, created_at FROM users WHERE id = ?1",
                params![id.to_string()],
                Self::row_to_user,
            )
            .optional()?;

        Ok(user)
    }
}

impl ShareStore for SqliteStore {
    type Error = StoreError;

    fn create_share(&mut self, tree_id: TreeId) -> Result<ShareLink, Self::Error> {
        let exists: bool = self
            .conn
            .query_row(
                "SELECT 1 FROM trees WHERE id = ?1",
                params![tree_id.to_string()],
                |_| Ok(true),
            )
            .optional()?
            .unwrap_or(false);

        if !exists {
            return Err(StoreError::NotFound(format!("tree {}", tree_id)));
        }

        let link = ShareLink {
            share_id: ShareLink::generate_id(),
            tree_id,
            created_at: now_millis(),
        };

        self.conn.execute(
            "INSERT INTO shares (share_id, tree_id, created_at) VALUES (?1, ?2, ?3)",
            params![&link.share_id, link.tree_id.to_string(), link.created_at as i64],
        )?;

        Ok(link)
    }

    fn find_share(&self, share_id: &str) -> Result<Option<ShareLink>, Self::Error> {
        let link = self
            .conn
            .query_row(
                "SELECT share_id, tree_id, created_at FROM shares WHERE share_id = ?1",
                params![share_id],
                Self::row_to_share,
            )
            .optional()?;

        Ok(link)
    }
}
