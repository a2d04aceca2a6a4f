use crate::logic::validate::ValidationFailure;
use crate::store::StoreError;

pub const TAG_INVALID_MESSAGE: &str = "Tag parameters are invalid.";
pub const TAG_CREATE_FAILED_MESSAGE: &str = "Tag could not be created.";

/// Errors surfaced by the tag commands
#[derive(Debug, thiserror::Error)]
pub enum TagCommandError {
    /// The request was rejected before any change was made
    #[error("Tag parameters are invalid.")]
    Invalid(Vec<ValidationFailure>),

    /// Storage rejected the change; the cause is kept for diagnostics only
    #[error("{}", .message.as_deref().unwrap_or(TAG_CREATE_FAILED_MESSAGE))]
    CreateFailed {
        message: Option<String>,
        #[source]
        source: Option<StoreError>,
    },
}

impl TagCommandError {
    pub fn create_failed(source: StoreError) -> Self {
        TagCommandError::CreateFailed {
            message: None,
            source: Some(source),
        }
    }

    pub fn create_failed_with_message(message: impl Into<String>) -> Self {
        TagCommandError::CreateFailed {
            message: Some(message.into()),
            source: None,
        }
    }

    /// Validation failures, empty for create failures
    pub fn failures(&self) -> &[ValidationFailure] {
        match self {
            TagCommandError::Invalid(failures) => failures,
            TagCommandError::CreateFailed { .. } => &[],
        }
    }
}
