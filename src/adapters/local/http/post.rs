use super::{failure, DocumentEndpoint, Failure};
use axum::{body::Bytes, extract::State, Json};
use serde_json::{json, Value};

const WRITE_FAILED: &str = "Failed to write database";

pub async fn handle(
    State(endpoint): State<DocumentEndpoint>,
    body: Bytes,
) -> Result<Json<Value>, Failure> {
    let document: Value = serde_json::from_slice(&body).map_err(|e| {
        tracing::error!(error = %e, "Rejected database write: body is not JSON");
        failure(WRITE_FAILED)
    })?;

    let pretty = serde_json::to_vec_pretty(&document).map_err(|e| {
        tracing::error!(error = %e, "Failed to serialize database");
        failure(WRITE_FAILED)
    })?;

    if let Err(e) = endpoint.storage.write(&endpoint.key, &pretty).await {
        tracing::error!(key = %endpoint.key, error = %e, "Failed to write database");
        return Err(failure(WRITE_FAILED));
    }

    tracing::debug!(key = %endpoint.key, bytes = pretty.len(), "Database overwritten");
    Ok(Json(json!({ "success": true })))
}
