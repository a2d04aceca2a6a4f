use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::ObjectType;

/// Matches the width of the `tag.name` column
pub const MAX_TAG_NAME_LENGTH: usize = 250;

/// Provenance of a tag
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum TagKind {
    /// Created explicitly by a user or API call
    Custom,
    /// Derived from the object's type
    Type,
    /// Derived from the object's owners
    Owner,
    /// Derived from users who favorited the object
    FavoritedBy,
}

impl std::fmt::Display for TagKind {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            TagKind::Custom => write!(f, "custom"),
            TagKind::Type => write!(f, "type"),
            TagKind::Owner => write!(f, "owner"),
            TagKind::FavoritedBy => write!(f, "favorited_by"),
        }
    }
}

impl std::str::FromStr for TagKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "custom" => Ok(TagKind::Custom),
            "type" => Ok(TagKind::Type),
            "owner" => Ok(TagKind::Owner),
            "favorited_by" => Ok(TagKind::FavoritedBy),
            _ => Err(format!("Unknown tag kind: {}", s)),
        }
    }
}

/// A named label, unique per (name, kind)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Tag {
    pub id: i32,
    pub name: String,
    pub kind: TagKind,
    pub description: Option<String>,
    pub created_on: DateTime<Utc>,
    pub changed_on: DateTime<Utc>,
}

/// An object whose type has already been resolved
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TaggableObject {
    pub object_type: ObjectType,
    pub object_id: i64,
}

impl TaggableObject {
    pub fn new(object_type: ObjectType, object_id: i64) -> Self {
        Self {
            object_type,
            object_id,
        }
    }
}

impl std::fmt::Display for TaggableObject {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}:{}", self.object_type, self.object_id)
    }
}

/// Association between a tag and an object
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TaggedObject {
    pub tag_id: i32,
    pub object_type: ObjectType,
    pub object_id: i64,
}

impl TaggedObject {
    pub fn object(&self) -> TaggableObject {
        TaggableObject::new(self.object_type, self.object_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tag_kind_round_trips_through_text() {
        for kind in [TagKind::Custom, TagKind::Type, TagKind::Owner, TagKind::FavoritedBy] {
            assert_eq!(kind.to_string().parse::<TagKind>(), Ok(kind));
        }
        assert!("system".parse::<TagKind>().is_err());
    }
}
