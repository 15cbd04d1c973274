//! Gemini embedding client.

use crate::{MemoryError, Result};
use reqwest::Client;
use serde_json::json;
use std::time::Duration;
use tracing::trace;

const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

pub struct EmbeddingClient {
    client: Client,
    api_key: String,
    api_base: String,
    model: String,
}

impl EmbeddingClient {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            api_base: DEFAULT_API_BASE.to_string(),
            model: model.into(),
        }
    }

    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }

    /// Embed one text into a vector.
    pub async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        trace!("embedding {} chars with {}", text.len(), self.model);

        let url = format!(
            "{}/models/{}:embedContent",
            self.api_base, self.model
        );

        let body = json!({
            "model": format!("models/{}", self.model),
            "content": { "parts": [{ "text": text }] }
        });

        let response = self
            .client
            .post(&url)
            .query(&[("key", &self.api_key)])
            .json(&body)
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await?;

        let status = response.status();
        let data: serde_json::Value = response.json().await?;

        if !status.is_success() {
            let message = data["error"]["message"]
                .as_str()
                .unwrap_or("unknown error")
                .to_string();
            return Err(MemoryError::Api(message));
        }

        let values = data["embedding"]["values"]
            .as_array()
            .ok_or(MemoryError::EmptyEmbedding)?;

        let vector: Vec<f32> = values
            .iter()
            .filter_map(|v| v.as_f64().map(|f| f as f32))
            .collect();

        if vector.is_empty() {
            return Err(MemoryError::EmptyEmbedding);
        }

        Ok(vector)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_construction() {
        let client = EmbeddingClient::new("key", "text-embedding-004");
        assert_eq!(client.model, "text-embedding-004");
        assert_eq!(client.api_base, DEFAULT_API_BASE);

        let client = client.with_api_base("http://localhost:9999");
        assert_eq!(client.api_base, "http://localhost:9999");
    }
}
