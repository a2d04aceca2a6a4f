use serde::{Deserialize, Serialize};

/// Categories of resources that can carry tags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObjectType {
    Query,
    Chart,
    Dashboard,
    Dataset,
}

impl ObjectType {
    pub const ALL: [ObjectType; 4] = [
        ObjectType::Query,
        ObjectType::Chart,
        ObjectType::Dashboard,
        ObjectType::Dataset,
    ];

    /// Stable numeric code used by clients that send integers
    pub fn code(self) -> i64 {
        match self {
            ObjectType::Query => 1,
            ObjectType::Chart => 2,
            ObjectType::Dashboard => 3,
            ObjectType::Dataset => 4,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            ObjectType::Query => "query",
            ObjectType::Chart => "chart",
            ObjectType::Dashboard => "dashboard",
            ObjectType::Dataset => "dataset",
        }
    }

    pub fn from_code(code: i64) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.code() == code)
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            // saved queries are stored under the query type
            "saved_query" => Some(ObjectType::Query),
            _ => Self::ALL.into_iter().find(|t| t.name() == name),
        }
    }
}

impl std::fmt::Display for ObjectType {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl std::str::FromStr for ObjectType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_name(s).ok_or_else(|| format!("Unknown object type: {}", s))
    }
}

/// Loosely-typed object type as received from callers.
///
/// Integers are matched against [`ObjectType::code`], strings against the
/// canonical names. `Typed` is for in-process callers that already hold an
/// [`ObjectType`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ObjectTypeToken {
    Code(i64),
    Name(String),
    Typed(ObjectType),
}

impl std::fmt::Display for ObjectTypeToken {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            ObjectTypeToken::Code(code) => write!(f, "{}", code),
            ObjectTypeToken::Name(name) => write!(f, "{}", name),
            ObjectTypeToken::Typed(object_type) => write!(f, "{}", object_type),
        }
    }
}

impl From<ObjectType> for ObjectTypeToken {
    fn from(object_type: ObjectType) -> Self {
        ObjectTypeToken::Typed(object_type)
    }
}

impl From<&str> for ObjectTypeToken {
    fn from(name: &str) -> Self {
        ObjectTypeToken::Name(name.to_string())
    }
}

impl From<String> for ObjectTypeToken {
    fn from(name: String) -> Self {
        ObjectTypeToken::Name(name)
    }
}

impl From<i64> for ObjectTypeToken {
    fn from(code: i64) -> Self {
        ObjectTypeToken::Code(code)
    }
}

impl ObjectTypeToken {
    /// Parse a path segment: digits are codes, anything else is a name
    pub fn parse_segment(segment: &str) -> Self {
        match segment.parse::<i64>() {
            Ok(code) => ObjectTypeToken::Code(code),
            Err(_) => ObjectTypeToken::Name(segment.to_string()),
        }
    }
}

/// Resolve a caller-supplied token to a known object type.
///
/// Never fails: `None` means the token names no member of [`ObjectType`].
pub fn to_object_type(token: &ObjectTypeToken) -> Option<ObjectType> {
    match token {
        ObjectTypeToken::Typed(object_type) => Some(*object_type),
        ObjectTypeToken::Code(code) => ObjectType::from_code(*code),
        ObjectTypeToken::Name(name) => ObjectType::from_name(name),
    }
}
