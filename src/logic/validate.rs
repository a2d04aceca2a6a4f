use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::logic::error::TagCommandError;
use crate::model::{
    to_object_type, ObjectReference, ObjectType, ObjectTypeToken, MAX_TAG_NAME_LENGTH,
};

/// Object ids equal to this value mean "no object"
pub const UNSET_OBJECT_ID: i64 = 0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvalidField {
    ObjectId,
    ObjectType,
    Name,
    Tags,
}

/// One problem found in a request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationFailure {
    pub field: InvalidField,
    pub message: String,
    /// The offending value, when there is one
    pub value: Option<serde_json::Value>,
    /// Position of the offending item in a list input
    pub index: Option<usize>,
    /// Position of the request in a multi-tag call
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entry: Option<usize>,
}

/// Collects every failure of a request before anything is reported
#[derive(Debug, Default)]
pub struct ValidationErrors {
    failures: Vec<ValidationFailure>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(
        &mut self,
        field: InvalidField,
        message: impl Into<String>,
        value: Option<serde_json::Value>,
        index: Option<usize>,
    ) {
        self.failures.push(ValidationFailure {
            field,
            message: message.into(),
            value,
            index,
            entry: None,
        });
    }

    /// Take over another request's failures, marking them with its position
    pub fn extend_for_entry(&mut self, entry: usize, failures: Vec<ValidationFailure>) {
        self.failures.extend(failures.into_iter().map(|f| ValidationFailure {
            entry: Some(entry),
            ..f
        }));
    }

    pub fn is_empty(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn len(&self) -> usize {
        self.failures.len()
    }

    pub fn check_object_id(&mut self, object_id: i64, index: Option<usize>) {
        if object_id == UNSET_OBJECT_ID {
            self.push(
                InvalidField::ObjectId,
                "object id is required",
                Some(json!(object_id)),
                index,
            );
        } else if object_id < 0 {
            self.push(
                InvalidField::ObjectId,
                format!("object id must be a positive integer, got {}", object_id),
                Some(json!(object_id)),
                index,
            );
        }
    }

    pub fn check_object_type(
        &mut self,
        token: &ObjectTypeToken,
        index: Option<usize>,
    ) -> Option<ObjectType> {
        let resolved = to_object_type(token);
        if resolved.is_none() {
            self.push(
                InvalidField::ObjectType,
                format!("invalid object type {}", token),
                serde_json::to_value(token).ok(),
                index,
            );
        }
        resolved
    }

    pub fn check_object(&mut self, object: &ObjectReference, index: Option<usize>) {
        self.check_object_id(object.object_id, index);
        self.check_object_type(&object.object_type, index);
    }

    pub fn check_tag_name(&mut self, field: InvalidField, name: &str, index: Option<usize>) {
        let trimmed = name.trim();
        if trimmed.is_empty() {
            self.push(field, "tag name cannot be empty", Some(json!(name)), index);
        } else if trimmed.chars().count() > MAX_TAG_NAME_LENGTH {
            self.push(
                field,
                format!("tag name cannot be longer than {} characters", MAX_TAG_NAME_LENGTH),
                Some(json!(name)),
                index,
            );
        }
    }

    pub fn into_failures(self) -> Vec<ValidationFailure> {
        self.failures
    }

    /// `Ok` when nothing was collected, otherwise one error carrying every failure
    pub fn into_result(self) -> Result<(), TagCommandError> {
        if self.failures.is_empty() {
            Ok(())
        } else {
            Err(TagCommandError::Invalid(self.failures))
        }
    }
}
