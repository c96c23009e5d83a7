//! Durable object storage client for generated images.

use async_trait::async_trait;
use serde::Deserialize;
use uuid::Uuid;

use crate::error::{parse_response, ProviderError};

/// A durably stored image.
#[derive(Debug, Clone, Deserialize)]
pub struct StoredObject {
    /// Public serving URL.
    pub url: String,
    /// Storage key for later retrieval or deletion.
    pub key: String,
}

/// Storage backend that re-homes transient provider outputs.
#[async_trait]
pub trait ObjectStorage: Send + Sync {
    /// Copy the image at `source_url` into durable storage under a key
    /// derived from the batch.
    async fn store(&self, batch_id: Uuid, source_url: &str) -> Result<StoredObject, ProviderError>;
}

/// REST client for the storage service.
///
/// Sends `POST {base}/v1/objects` asking the service to ingest the image
/// at the given URL; expects a JSON body matching [`StoredObject`].
pub struct HttpObjectStorage {
    client: reqwest::Client,
    base_url: String,
}

impl HttpObjectStorage {
    pub fn new(base_url: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url,
        }
    }

    pub fn with_client(client: reqwest::Client, base_url: String) -> Self {
        Self { client, base_url }
    }
}

#[async_trait]
impl ObjectStorage for HttpObjectStorage {
    async fn store(&self, batch_id: Uuid, source_url: &str) -> Result<StoredObject, ProviderError> {
        let body = serde_json::json!({
            "source_url": source_url,
            "key_prefix": format!("batches/{batch_id}"),
        });
        let response = self
            .client
            .post(format!("{}/v1/objects", self.base_url))
            .json(&body)
            .send()
            .await?;

        parse_response(response).await
    }
}
