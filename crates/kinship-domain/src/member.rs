//! Member module - a person in a family tree

use crate::relation::Gender;
use serde::{Deserialize, Serialize};

/// 2D layout coordinate owned by the presentation layer
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    /// Horizontal offset
    pub x: f64,
    /// Vertical offset
    pub y: f64,
}

/// A person-node in a family tree
///
/// `relation_id` expresses this person's relation to the tree's owner, not
/// to any other member. Only `id` and `relation_id` take part in connection
/// inference; the remaining fields are display attributes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Member {
    /// Unique within a tree, never reassigned
    #[serde(default)]
    pub id: String,

    /// Display name
    pub name: String,

    /// Date of birth as entered by the user
    pub date_of_birth: String,

    /// Key into the relation taxonomy; may be empty
    #[serde(default)]
    pub relation_id: String,

    /// Gender of the person
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<Gender>,

    /// Profile picture URL or data URI
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_picture: Option<String>,

    /// Place of birth
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub birth_place: Option<String>,

    /// Editor canvas position
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<Position>,
}

impl Member {
    /// Create a member with the required attributes
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        date_of_birth: impl Into<String>,
        relation_id: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            date_of_birth: date_of_birth.into(),
            relation_id: relation_id.into(),
            gender: None,
            profile_picture: None,
            birth_place: None,
            position: None,
        }
    }

    /// Set the member's gender
    pub fn with_gender(mut self, gender: Gender) -> Self {
        self.gender = Some(gender);
        self
    }

    /// Set the member's birth place
    pub fn with_birth_place(mut self, birth_place: impl Into<String>) -> Self {
        self.birth_place = Some(birth_place.into());
        self
    }

    /// Assign a fresh `member-<uuid>` id if none was supplied
    ///
    /// Returns `true` when an id was generated.
    pub fn ensure_id(&mut self) -> bool {
        if !self.id.is_empty() {
            return false;
        }
        self.id = format!("member-{}", uuid::Uuid::now_v7());
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ensure_id_generates_once() {
        let mut member = Member::new("", "Asha", "1992-01-01", "bahan");
        assert!(member.ensure_id());
        assert!(member.id.starts_with("member-"));

        let assigned = member.id.clone();
        assert!(!member.ensure_id());
        assert_eq!(member.id, assigned);
    }

    #[test]
    fn test_ensure_id_keeps_supplied() {
        let mut member = Member::new("m7", "Asha", "1992-01-01", "bahan");
        assert!(!member.ensure_id());
        assert_eq!(member.id, "m7");
    }

    #[test]
    fn test_deserialize_minimal_member() {
        let member: Member =
            serde_json::from_str(r#"{"name":"Asha","dateOfBirth":"1992-01-01"}"#).unwrap();
        assert!(member.id.is_empty());
        assert!(member.relation_id.is_empty());
        assert!(member.position.is_none());
    }

    #[test]
    fn test_serialize_skips_absent_optionals() {
        let member = Member::new("m1", "Asha", "1992-01-01", "bahan").with_gender(Gender::Female);
        let json = serde_json::to_value(&member).unwrap();
        assert_eq!(json["relationId"], "bahan");
        assert_eq!(json["gender"], "female");
        assert!(json.get("birthPlace").is_none());
        assert!(json.get("position").is_none());
    }
}
