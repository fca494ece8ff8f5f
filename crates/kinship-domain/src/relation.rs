//! Relation taxonomy: the static table of kinship roles.
//!
//! Every member of a tree carries a relation id that says how that person
//! relates to the tree's owner. The taxonomy resolves those ids to a
//! [`Relation`], whose [`RelationCategory`] drives connection inference.

use crate::traits::Taxonomy;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;

/// Coarse kinship class of a relation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RelationCategory {
    /// Mother, father
    Parent,
    /// Son, daughter
    Child,
    /// Brother, sister
    Sibling,
    /// Husband, wife
    Spouse,
    /// Paternal and maternal grandparents
    Grandparent,
    /// Grandson, granddaughter
    Grandchild,
    /// Uncles, aunts and everyone further out
    Extended,
}

impl RelationCategory {
    /// All categories in declaration order
    pub const ALL: [RelationCategory; 7] = [
        RelationCategory::Parent,
        RelationCategory::Child,
        RelationCategory::Sibling,
        RelationCategory::Spouse,
        RelationCategory::Grandparent,
        RelationCategory::Grandchild,
        RelationCategory::Extended,
    ];

    /// Get the category name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            RelationCategory::Parent => "parent",
            RelationCategory::Child => "child",
            RelationCategory::Sibling => "sibling",
            RelationCategory::Spouse => "spouse",
            RelationCategory::Grandparent => "grandparent",
            RelationCategory::Grandchild => "grandchild",
            RelationCategory::Extended => "extended",
        }
    }

    /// Parse a category from a string (case-insensitive)
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.to_lowercase();
        Self::ALL.into_iter().find(|c| c.as_str() == s)
    }
}

impl std::str::FromStr for RelationCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("Invalid relation category: {}", s))
    }
}

/// Gender attached to a relation or a member
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    /// Male
    Male,
    /// Female
    Female,
}

/// A single kinship role in the taxonomy
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Relation {
    /// Unique key, referenced by `Member::relation_id`
    pub id: String,

    /// English display name
    pub label: String,

    /// Display name in the secondary language
    pub localized_label: String,

    /// Coarse category used by connection inference
    pub category: RelationCategory,

    /// Gender, absent for gender-neutral relations
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<Gender>,
}

impl Relation {
    /// Create a new relation
    pub fn new(
        id: impl Into<String>,
        label: impl Into<String>,
        localized_label: impl Into<String>,
        category: RelationCategory,
        gender: Option<Gender>,
    ) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            localized_label: localized_label.into(),
            category,
            gender,
        }
    }
}

/// Errors raised while assembling a taxonomy
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TaxonomyError {
    /// Two relations share the same id
    #[error("Duplicate relation id: {0}")]
    DuplicateId(String),

    /// A relation has an empty id
    #[error("Relation id cannot be empty")]
    EmptyId,
}

// (id, label, localized label, category, gender)
type Row = (&'static str, &'static str, &'static str, RelationCategory, Gender);

const STANDARD_RELATIONS: &[Row] = &[
    ("mata", "Mother", "माता", RelationCategory::Parent, Gender::Female),
    ("pita", "Father", "पिता", RelationCategory::Parent, Gender::Male),
    ("putra", "Son", "पुत्र", RelationCategory::Child, Gender::Male),
    ("putri", "Daughter", "पुत्री", RelationCategory::Child, Gender::Female),
    ("bhai", "Brother", "भाई", RelationCategory::Sibling, Gender::Male),
    ("bahan", "Sister", "बहन", RelationCategory::Sibling, Gender::Female),
    ("pati", "Husband", "पति", RelationCategory::Spouse, Gender::Male),
    ("patni", "Wife", "पत्नी", RelationCategory::Spouse, Gender::Female),
    ("dada", "Paternal Grandfather", "दादा", RelationCategory::Grandparent, Gender::Male),
    ("dadi", "Paternal Grandmother", "दादी", RelationCategory::Grandparent, Gender::Female),
    ("nana", "Maternal Grandfather", "नाना", RelationCategory::Grandparent, Gender::Male),
    ("nani", "Maternal Grandmother", "नानी", RelationCategory::Grandparent, Gender::Female),
    ("chacha", "Father's Brother", "चाचा", RelationCategory::Extended, Gender::Male),
    ("chachi", "Father's Brother's Wife", "चाची", RelationCategory::Extended, Gender::Female),
    ("mama", "Mother's Brother", "मामा", RelationCategory::Extended, Gender::Male),
    ("mami", "Mother's Brother's Wife", "मामी", RelationCategory::Extended, Gender::Female),
];

/// Immutable relation table
///
/// Built once at process start and shared by reference (or `Arc`) with
/// everything that needs to resolve relation ids. Declaration order is kept
/// so category listings come back in a stable, human-chosen order.
///
/// # Examples
///
/// ```
/// use kinship_domain::{RelationCategory, RelationTaxonomy, Taxonomy};
///
/// let taxonomy = RelationTaxonomy::standard();
/// assert_eq!(taxonomy.lookup("pita").unwrap().label, "Father");
/// assert!(taxonomy.lookup("unknown-id").is_none());
///
/// let parents = taxonomy.filter_by_category(RelationCategory::Parent);
/// assert_eq!(parents.len(), 2);
/// ```
#[derive(Debug, Clone)]
pub struct RelationTaxonomy {
    relations: Vec<Relation>,
}

impl RelationTaxonomy {
    /// Build a taxonomy from a custom relation list
    ///
    /// # Errors
    /// Returns error if any id is empty or appears more than once
    pub fn new(relations: Vec<Relation>) -> Result<Self, TaxonomyError> {
        let mut seen = HashSet::with_capacity(relations.len());
        for relation in &relations {
            if relation.id.is_empty() {
                return Err(TaxonomyError::EmptyId);
            }
            if !seen.insert(relation.id.as_str()) {
                return Err(TaxonomyError::DuplicateId(relation.id.clone()));
            }
        }

        Ok(Self { relations })
    }

    /// The standard sixteen-entry kinship table
    pub fn standard() -> Self {
        let relations = STANDARD_RELATIONS
            .iter()
            .map(|&(id, label, localized, category, gender)| {
                Relation::new(id, label, localized, category, Some(gender))
            })
            .collect();

        Self { relations }
    }

    /// All relations in declaration order
    pub fn relations(&self) -> &[Relation] {
        &self.relations
    }

    /// Number of relations in the table
    pub fn len(&self) -> usize {
        self.relations.len()
    }

    /// Whether the table is empty
    pub fn is_empty(&self) -> bool {
        self.relations.is_empty()
    }
}

impl Default for RelationTaxonomy {
    fn default() -> Self {
        Self::standard()
    }
}

impl Taxonomy for RelationTaxonomy {
    fn lookup(&self, relation_id: &str) -> Option<&Relation> {
        self.relations.iter().find(|r| r.id == relation_id)
    }

    fn filter_by_category(&self, category: RelationCategory) -> Vec<&Relation> {
        self.relations
            .iter()
            .filter(|r| r.category == category)
            .collect()
    }
}
