//! Visual analyst client: re-derives garment attributes from an image.

use async_trait::async_trait;

use atelier_core::profile::GarmentAttributes;

use crate::error::{parse_response, ProviderError};

/// A vision service that describes a fashion image as structured
/// garment attributes.
#[async_trait]
pub trait VisualAnalyst: Send + Sync {
    /// Analyze one image and return its detected attributes.
    async fn analyze(&self, image_url: &str) -> Result<GarmentAttributes, ProviderError>;
}

/// REST client for the visual analysis service.
///
/// Sends `POST {base}/v1/analyze` with the image URL and expects a JSON
/// body matching [`GarmentAttributes`].
pub struct HttpVisualAnalyst {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl HttpVisualAnalyst {
    pub fn new(base_url: String, api_key: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url,
            api_key,
        }
    }

    /// Reuse an existing [`reqwest::Client`] for connection pooling.
    pub fn with_client(client: reqwest::Client, base_url: String, api_key: String) -> Self {
        Self {
            client,
            base_url,
            api_key,
        }
    }
}

#[async_trait]
impl VisualAnalyst for HttpVisualAnalyst {
    async fn analyze(&self, image_url: &str) -> Result<GarmentAttributes, ProviderError> {
        let body = serde_json::json!({ "image_url": image_url });
        let response = self
            .client
            .post(format!("{}/v1/analyze", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        parse_response(response).await
    }
}
