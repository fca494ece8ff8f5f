//! Kinship Domain Layer
//!
//! This crate contains the core model of a family tree and the relationship
//! inference engine that turns a flat member list into a typed graph.
//! It performs no I/O and defines the trait interfaces that the storage
//! and HTTP layers implement or consume.
//!
//! ## Key Concepts
//!
//! - **Relation**: a kinship role (father, wife, maternal grandmother...) with a coarse category
//! - **Taxonomy**: the immutable table of known relations
//! - **Member**: a person in a tree, tagged with a relation to the tree's implicit root
//! - **Connection**: a typed edge inferred from two members' relation categories
//! - **Family tree**: the stored document (members plus editor-drawn edges)
//!
//! ## Inferring connections
//!
//! ```
//! use kinship_domain::{build_connections, ConnectionType, Member, RelationTaxonomy};
//!
//! let taxonomy = RelationTaxonomy::standard();
//! let members = vec![
//!     Member::new("m1", "Ramesh", "1960-04-12", "pita"),
//!     Member::new("m2", "Suresh", "1990-08-30", "putra"),
//! ];
//!
//! let connections = build_connections(&members, &taxonomy);
//! assert_eq!(connections.len(), 1);
//! assert_eq!(connections[0].connection_type, ConnectionType::ParentChild);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod connection;
pub mod ids;
pub mod layout;
pub mod member;
pub mod relation;
pub mod traits;
pub mod tree;

// Re-exports for convenience
pub use connection::{build_connections, Connection, ConnectionBuilder, ConnectionType, MirrorPolicy};
pub use ids::{IdError, TreeId, UserId};
pub use layout::GridLayout;
pub use member::{Member, Position};
pub use relation::{Gender, Relation, RelationCategory, RelationTaxonomy, TaxonomyError};
pub use traits::Taxonomy;
pub use tree::{EditorEdge, FamilyTree, NewTree, ShareLink, TreeSummary, TreeUpdate, User};

/// Current wall-clock time in milliseconds since the Unix epoch.
///
/// Returns 0 if the system clock is set before the epoch.
pub fn now_millis() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
