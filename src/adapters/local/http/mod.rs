//! HTTP inbound adapter.
//!
//! Exposes the persisted document as a single resource:
//! `GET /api/db` reads it whole, `POST /api/db` overwrites it whole.

mod get;
mod post;

use crate::ports::storage::DocumentStorage;
use axum::{http::StatusCode, routing, Json, Router};
use serde_json::{json, Value};
use std::sync::Arc;

/// Route serving the document resource.
pub const DOCUMENT_ROUTE: &str = "/api/db";

#[derive(Clone)]
pub struct DocumentEndpoint {
    pub storage: Arc<dyn DocumentStorage>,
    /// Storage key the resource is persisted under
    pub key: String,
}

impl DocumentEndpoint {
    pub fn new(storage: Arc<dyn DocumentStorage>, key: impl Into<String>) -> Self {
        Self {
            storage,
            key: key.into(),
        }
    }
}

pub fn router(endpoint: DocumentEndpoint) -> Router {
    Router::new()
        .route(DOCUMENT_ROUTE, routing::get(get::handle).post(post::handle))
        .with_state(endpoint)
}

type Failure = (StatusCode, Json<Value>);

fn failure(message: &str) -> Failure {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "error": message })),
    )
}
