use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use crate::api::handlers;
use crate::store::traits::TagStore;

pub fn create_router<S: TagStore + 'static>() -> Router<Arc<S>> {
    Router::new()
        // Health check
        .route("/health", get(handlers::health_check))
        // Tag one object with several tags
        .route(
            "/api/v1/tag/:object_type/:object_id/",
            post(handlers::add_tags::<S>),
        )
        // Tag many objects with one tag
        .route("/api/v1/tag/", post(handlers::create_tag::<S>))
        .route("/api/v1/tag/bulk_create", post(handlers::bulk_create_tags::<S>))
}
