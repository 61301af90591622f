//! Client for the document endpoint served by `vidshelf-server`.

use crate::adapters::local::http::DOCUMENT_ROUTE;
use crate::error::StorageError;
use crate::ports::storage::DocumentStorage;
use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use std::time::Duration;

/// Talks to a single remote document resource.
///
/// The endpoint has no notion of keys, so only `key` is addressable; any
/// other key reads as absent and cannot be written.
#[derive(Clone, Debug)]
pub struct RemoteStorage {
    client: reqwest::Client,
    url: String,
    key: String,
}

impl RemoteStorage {
    pub fn new(base_url: &str, key: impl Into<String>) -> Result<Self, StorageError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()?;
        Ok(Self {
            client,
            url: format!("{}{}", base_url.trim_end_matches('/'), DOCUMENT_ROUTE),
            key: key.into(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    async fn failure(response: reqwest::Response) -> StorageError {
        let status = response.status().as_u16();
        let message = match response.json::<serde_json::Value>().await {
            Ok(body) => body
                .get("error")
                .and_then(|e| e.as_str())
                .unwrap_or("unexpected response")
                .to_string(),
            Err(e) => e.to_string(),
        };
        StorageError::Remote { status, message }
    }
}

#[async_trait]
impl DocumentStorage for RemoteStorage {
    async fn read(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError> {
        if key != self.key {
            return Ok(None);
        }
        let response = self.client.get(&self.url).send().await?;
        if !response.status().is_success() {
            return Err(Self::failure(response).await);
        }
        Ok(Some(response.bytes().await?.to_vec()))
    }

    async fn write(&self, key: &str, bytes: &[u8]) -> Result<(), StorageError> {
        if key != self.key {
            return Err(StorageError::Unsupported(
                "the remote endpoint only stores the current document",
            ));
        }
        let response = self
            .client
            .post(&self.url)
            .header(CONTENT_TYPE, "application/json")
            .body(bytes.to_vec())
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(Self::failure(response).await);
        }
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), StorageError> {
        if key != self.key {
            return Ok(());
        }
        Err(StorageError::Unsupported(
            "the remote endpoint has no delete verb",
        ))
    }
}
