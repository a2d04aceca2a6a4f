use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;

use crate::logic::{
    BulkCreateCustomTagsCommand, CreateCustomTagCommand, CreateCustomTagWithRelationshipsCommand,
    TagCommandError, ValidationFailure, TAG_INVALID_MESSAGE,
};
use crate::model::{BulkTagRequest, ObjectTypeToken};
use crate::store::traits::TagStore;

pub type AppState<S> = Arc<S>;

type ApiResult = Result<(StatusCode, Json<Value>), (StatusCode, Json<ErrorResponse>)>;

/// Simple health check endpoint
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: String,
}

pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        timestamp: chrono::Utc::now().to_rfc3339(),
    })
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub message: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<ValidationFailure>,
}

impl ErrorResponse {
    pub fn new(message: &str) -> Self {
        Self {
            message: message.to_string(),
            errors: Vec::new(),
        }
    }
}

/// Invalid input is a 422 with every failure listed; create failures are
/// an opaque 500.
pub fn error_response(err: TagCommandError) -> (StatusCode, Json<ErrorResponse>) {
    match err {
        TagCommandError::Invalid(failures) => (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(ErrorResponse {
                message: TAG_INVALID_MESSAGE.to_string(),
                errors: failures,
            }),
        ),
        TagCommandError::CreateFailed { .. } => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse::new(&err.to_string())),
        ),
    }
}

fn created() -> (StatusCode, Json<Value>) {
    (StatusCode::CREATED, Json(json!({})))
}

#[derive(Debug, Deserialize)]
pub struct AddTagsRequest {
    pub tags: Vec<String>,
}

/// Attach custom tags to one object
pub async fn add_tags<S: TagStore>(
    State(store): State<AppState<S>>,
    Path((object_type, object_id)): Path<(String, i64)>,
    Json(body): Json<AddTagsRequest>,
) -> ApiResult {
    let command = CreateCustomTagCommand::new(
        store.as_ref(),
        ObjectTypeToken::parse_segment(&object_type),
        object_id,
        body.tags,
    );
    command.run().await.map_err(error_response)?;
    Ok(created())
}

/// Create or reuse a custom tag and attach it to the listed objects
pub async fn create_tag<S: TagStore>(
    State(store): State<AppState<S>>,
    Json(request): Json<BulkTagRequest>,
) -> ApiResult {
    let command = CreateCustomTagWithRelationshipsCommand::new(store.as_ref(), request.bulk(false));
    command.run().await.map_err(error_response)?;
    Ok(created())
}

#[derive(Debug, Deserialize)]
pub struct BulkCreateRequest {
    pub tags: Vec<BulkTagRequest>,
}

/// Same as [`create_tag`] for several tags, inserting each tag's
/// relationships in one statement. All tags are stored or none are.
pub async fn bulk_create_tags<S: TagStore>(
    State(store): State<AppState<S>>,
    Json(body): Json<BulkCreateRequest>,
) -> ApiResult {
    let requests = body.tags.into_iter().map(|r| r.bulk(true)).collect();
    let command = BulkCreateCustomTagsCommand::new(store.as_ref(), requests);
    command.run().await.map_err(error_response)?;
    Ok(created())
}
