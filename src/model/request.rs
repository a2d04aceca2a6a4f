use serde::{Deserialize, Serialize};

use crate::model::ObjectTypeToken;

/// An (object type, object id) pair as supplied by a caller.
///
/// On the wire this is a two-element array, e.g. `["chart", 42]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "(ObjectTypeToken, i64)", into = "(ObjectTypeToken, i64)")]
pub struct ObjectReference {
    pub object_type: ObjectTypeToken,
    pub object_id: i64,
}

impl ObjectReference {
    pub fn new(object_type: impl Into<ObjectTypeToken>, object_id: i64) -> Self {
        Self {
            object_type: object_type.into(),
            object_id,
        }
    }
}

impl From<(ObjectTypeToken, i64)> for ObjectReference {
    fn from((object_type, object_id): (ObjectTypeToken, i64)) -> Self {
        Self {
            object_type,
            object_id,
        }
    }
}

impl From<ObjectReference> for (ObjectTypeToken, i64) {
    fn from(reference: ObjectReference) -> Self {
        (reference.object_type, reference.object_id)
    }
}

/// Input for tagging one object with several tags
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TagRequest {
    pub object: ObjectReference,
    pub tags: Vec<String>,
}

/// Input for tagging many objects with one tag
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BulkTagRequest {
    pub name: String,
    #[serde(default)]
    pub objects_to_tag: Vec<ObjectReference>,
    #[serde(default)]
    pub description: Option<String>,
    /// Create all associations in one gateway call
    #[serde(default)]
    pub bulk_create: bool,
}

impl BulkTagRequest {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            objects_to_tag: Vec::new(),
            description: None,
            bulk_create: false,
        }
    }

    pub fn with_objects(mut self, objects_to_tag: Vec<ObjectReference>) -> Self {
        self.objects_to_tag = objects_to_tag;
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn bulk(mut self, bulk_create: bool) -> Self {
        self.bulk_create = bulk_create;
        self
    }
}
