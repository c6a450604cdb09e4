use std::time::Duration;

use async_trait::async_trait;
use base64::Engine;

use crate::adapters::gvision::wire::{BatchAnnotateRequest, BatchAnnotateResponse};
use crate::application::ports::VisionPort;
use crate::domain::detection::{Detection, Feature};
use crate::domain::errors::{DomainError, DomainResult};

pub const DEFAULT_ENDPOINT: &str = "https://vision.googleapis.com";

/// Cómo se autentica la petición.
#[derive(Clone)]
pub enum Credentials {
    /// Clave de API enviada como `?key=`.
    ApiKey(String),
    /// Token OAuth de cuenta de servicio (`Authorization: Bearer`).
    Bearer(String),
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Credentials::ApiKey(_) => f.write_str("ApiKey(***)"),
            Credentials::Bearer(_) => f.write_str("Bearer(***)"),
        }
    }
}

/// Cliente REST de Google Cloud Vision.
pub struct GoogleVisionClient {
    client: reqwest::Client,
    url: String,
    credentials: Credentials,
}

impl GoogleVisionClient {
    pub fn new(endpoint: &str, credentials: Credentials, timeout: Duration) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            url: format!("{}/v1/images:annotate", endpoint.trim_end_matches('/')),
            credentials,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl VisionPort for GoogleVisionClient {
    async fn annotate(&self, jpeg: &[u8], feature: Feature, max_results: u32) -> DomainResult<Vec<Detection>> {
        let content = base64::engine::general_purpose::STANDARD.encode(jpeg);
        let body = BatchAnnotateRequest::single(content, feature, max_results);

        let request = self.client.post(&self.url).json(&body);
        let request = match &self.credentials {
            Credentials::ApiKey(key) => request.query(&[("key", key)]),
            Credentials::Bearer(token) => request.bearer_auth(token),
        };

        let response = request
            .send()
            .await
            .map_err(|e| DomainError::Vision(format!("petición fallida: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(DomainError::Vision(format!("HTTP {status}: {error_text}")));
        }

        let parsed: BatchAnnotateResponse = response
            .json()
            .await
            .map_err(|e| DomainError::Vision(format!("respuesta ilegible: {e}")))?;

        let detections = parsed.into_detections(feature)?;
        tracing::debug!("👁️ {} -> {} detecciones", feature.wire_name(), detections.len());
        Ok(detections)
    }
}
