//! Connection inference (pairwise classification of members)
//!
//! Members only know their relation to the tree's owner, so edges between
//! members are inferred from category combinations:
//!
//! - parent + child -> parent-child (directed, parent to child)
//! - spouse + spouse of differing gender -> spouse
//! - sibling + sibling -> sibling
//!
//! Every ordered pair is examined, so symmetric edges (spouse, sibling) are
//! discovered once in each orientation. [`MirrorPolicy`] controls whether both
//! orientations are kept.
//!
//! This is a heuristic over relation-to-root data. Two parent-category members
//! are never linked to each other, and trees spanning more than two
//! generations or several marriages will be approximated, not modelled.

use crate::member::Member;
use crate::relation::{Relation, RelationCategory};
use crate::traits::Taxonomy;
use serde::{Deserialize, Serialize};

/// Type of inferred connection between two members
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ConnectionType {
    /// `from` is a parent of `to`
    ParentChild,

    /// The two members are married
    Spouse,

    /// The two members are siblings
    Sibling,
}

impl ConnectionType {
    /// Get the wire name of the connection type
    pub fn as_str(&self) -> &'static str {
        match self {
            ConnectionType::ParentChild => "parent-child",
            ConnectionType::Spouse => "spouse",
            ConnectionType::Sibling => "sibling",
        }
    }

    /// Whether `from`/`to` order carries meaning
    pub fn is_directed(&self) -> bool {
        matches!(self, ConnectionType::ParentChild)
    }
}

/// A derived edge between two members
///
/// Connections are recomputed from members and the taxonomy every time a
/// tree is viewed; they are never the stored source of truth.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Connection {
    /// `"{from}-{to}"`, deterministic for an ordered member pair
    pub id: String,

    /// Source member id (the parent, for parent-child)
    pub from: String,

    /// Target member id (the child, for parent-child)
    pub to: String,

    /// Kind of connection
    #[serde(rename = "type")]
    pub connection_type: ConnectionType,
}

impl Connection {
    /// Create a connection, deriving its id from the ordered pair
    pub fn new(from: impl Into<String>, to: impl Into<String>, connection_type: ConnectionType) -> Self {
        let from = from.into();
        let to = to.into();
        Self {
            id: format!("{}-{}", from, to),
            from,
            to,
            connection_type,
        }
    }
}

/// What to do with the second orientation of a symmetric edge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MirrorPolicy {
    /// Emit spouse and sibling edges in both orientations, as (a,b) and (b,a)
    #[default]
    Preserve,

    /// Emit spouse and sibling edges once, in the orientation discovered
    /// first (earlier member in the input as `from`)
    Collapse,
}

/// Builds the connection list for a set of members
///
/// # Examples
///
/// ```
/// use kinship_domain::{ConnectionBuilder, Member, MirrorPolicy, RelationTaxonomy};
///
/// let taxonomy = RelationTaxonomy::standard();
/// let members = vec![
///     Member::new("a", "Arjun", "1985-02-01", "pati"),
///     Member::new("b", "Meera", "1987-06-15", "patni"),
/// ];
///
/// let mirrored = ConnectionBuilder::new(&taxonomy).build(&members);
/// assert_eq!(mirrored.len(), 2);
///
/// let collapsed = ConnectionBuilder::new(&taxonomy)
///     .mirror_policy(MirrorPolicy::Collapse)
///     .build(&members);
/// assert_eq!(collapsed.len(), 1);
/// assert_eq!(collapsed[0].id, "a-b");
/// ```
#[derive(Debug)]
pub struct ConnectionBuilder<'t, T: Taxonomy + ?Sized> {
    taxonomy: &'t T,
    mirror_policy: MirrorPolicy,
}

impl<'t, T: Taxonomy + ?Sized> ConnectionBuilder<'t, T> {
    /// Create a builder over the given taxonomy
    pub fn new(taxonomy: &'t T) -> Self {
        Self {
            taxonomy,
            mirror_policy: MirrorPolicy::default(),
        }
    }

    /// Choose how symmetric edges are emitted
    pub fn mirror_policy(mut self, policy: MirrorPolicy) -> Self {
        self.mirror_policy = policy;
        self
    }

    /// Classify every ordered pair of members and collect the edges
    ///
    /// Members with an empty or unknown relation id are skipped. Output is in
    /// discovery order: outer member, then inner member, then rule order
    /// (parent-child, spouse, sibling). Never fails.
    pub fn build(&self, members: &[Member]) -> Vec<Connection> {
        // Resolve once per member; the pairwise pass only compares.
        let resolved: Vec<Option<&Relation>> = members
            .iter()
            .map(|m| self.taxonomy.lookup(&m.relation_id))
            .collect();

        let mut connections = Vec::new();

        for (i, (first, first_rel)) in members.iter().zip(&resolved).enumerate() {
            let Some(first_rel) = first_rel else { continue };

            for (j, (second, second_rel)) in members.iter().zip(&resolved).enumerate() {
                if i == j {
                    continue;
                }
                let Some(second_rel) = second_rel else { continue };

                let symmetric_allowed = self.mirror_policy == MirrorPolicy::Preserve || i < j;

                for connection_type in classify(first_rel, second_rel) {
                    if connection_type.is_directed() || symmetric_allowed {
                        connections.push(Connection::new(
                            first.id.as_str(),
                            second.id.as_str(),
                            connection_type,
                        ));
                    }
                }
            }
        }

        connections
    }
}

/// Infer connections with the default (mirror-preserving) policy
pub fn build_connections<T: Taxonomy + ?Sized>(members: &[Member], taxonomy: &T) -> Vec<Connection> {
    ConnectionBuilder::new(taxonomy).build(members)
}

/// Every rule that matches the ordered relation pair, in rule order
fn classify(first: &Relation, second: &Relation) -> impl Iterator<Item = ConnectionType> {
    let parent_child =
        first.category == RelationCategory::Parent && second.category == RelationCategory::Child;
    let spouse = first.category == RelationCategory::Spouse
        && second.category == RelationCategory::Spouse
        && first.gender != second.gender;
    let sibling =
        first.category == RelationCategory::Sibling && second.category == RelationCategory::Sibling;

    [
        (parent_child, ConnectionType::ParentChild),
        (spouse, ConnectionType::Spouse),
        (sibling, ConnectionType::Sibling),
    ]
    .into_iter()
    .filter_map(|(matched, connection_type)| matched.then_some(connection_type))
}
