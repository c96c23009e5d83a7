//! Image generation provider client.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::{parse_response, ProviderError};

/// One prompt submitted to the image model.
#[derive(Debug, Clone, Serialize)]
pub struct GenerationRequest {
    pub positive_prompt: String,
    pub negative_prompt: String,
    pub seed: i64,
}

/// A successfully generated image.
#[derive(Debug, Clone, Deserialize)]
pub struct GeneratedImage {
    /// Provider-hosted URL of the raw output. Transient; the pipeline
    /// re-homes the bytes into durable storage.
    pub image_url: String,
    /// Name of the model/provider that produced the image.
    pub provider: String,
    /// Billed cost of this single call, in cents.
    pub cost_cents: i64,
}

/// An image generation backend.
#[async_trait]
pub trait GenerationProvider: Send + Sync {
    /// Generate a single image from an assembled prompt.
    async fn generate(&self, request: &GenerationRequest) -> Result<GeneratedImage, ProviderError>;
}

/// REST client for an image generation service.
///
/// Sends `POST {base}/v1/generations` with the prompt payload and expects
/// a JSON body matching [`GeneratedImage`].
pub struct HttpGenerationProvider {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl HttpGenerationProvider {
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
impl GenerationProvider for HttpGenerationProvider {
    async fn generate(&self, request: &GenerationRequest) -> Result<GeneratedImage, ProviderError> {
        let response = self
            .client
            .post(format!("{}/v1/generations", self.base_url))
            .bearer_auth(&self.api_key)
            .json(request)
            .send()
            .await?;

        let image: GeneratedImage = parse_response(response).await?;
        if image.image_url.is_empty() {
            return Err(ProviderError::InvalidResponse(
                "generation response missing image_url".to_string(),
            ));
        }
        tracing::debug!(
            provider = %image.provider,
            cost_cents = image.cost_cents,
            "generated image"
        );
        Ok(image)
    }
}
