use super::{failure, DocumentEndpoint, Failure};
use axum::{extract::State, Json};
use serde_json::Value;

const READ_FAILED: &str = "Failed to read database";

pub async fn handle(State(endpoint): State<DocumentEndpoint>) -> Result<Json<Value>, Failure> {
    let bytes = match endpoint.storage.read(&endpoint.key).await {
        Ok(Some(bytes)) => bytes,
        Ok(None) => {
            tracing::error!(key = %endpoint.key, "Failed to read database: nothing stored");
            return Err(failure(READ_FAILED));
        }
        Err(e) => {
            tracing::error!(key = %endpoint.key, error = %e, "Failed to read database");
            return Err(failure(READ_FAILED));
        }
    };

    serde_json::from_slice(&bytes).map(Json).map_err(|e| {
        tracing::error!(key = %endpoint.key, error = %e, "Stored database is not valid JSON");
        failure(READ_FAILED)
    })
}
