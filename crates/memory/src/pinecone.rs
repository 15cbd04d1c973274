//! Pinecone index client (REST data plane).

use crate::{MemoryError, Result};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::time::Duration;
use tracing::{debug, trace};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// One vector plus the chunk text it was computed from
#[derive(Debug, Clone, Serialize)]
pub struct VectorRecord {
    pub id: String,
    pub values: Vec<f32>,
    pub metadata: ChunkMetadata,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkMetadata {
    pub text: String,
    pub source: String,
}

/// A query match with its original chunk text
#[derive(Debug, Clone)]
pub struct ScoredChunk {
    pub id: String,
    pub score: f32,
    pub text: String,
}

pub struct PineconeClient {
    client: Client,
    api_key: String,
    /// Data-plane host of the index, e.g. "idx-abc123.svc.us-east-1.pinecone.io"
    index_host: String,
}

impl PineconeClient {
    pub fn new(api_key: impl Into<String>, index_host: impl Into<String>) -> Self {
        let mut index_host = index_host.into();
        if let Some(rest) = index_host.strip_prefix("https://") {
            index_host = rest.to_string();
        }
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            index_host,
        }
    }

    /// Insert or overwrite a batch of vectors.
    pub async fn upsert(&self, records: &[VectorRecord]) -> Result<()> {
        if records.is_empty() {
            return Ok(());
        }
        debug!("upserting {} vectors to {}", records.len(), self.index_host);

        let url = format!("https://{}/vectors/upsert", self.index_host);
        let body = json!({ "vectors": records });

        let response = self
            .client
            .post(&url)
            .header("Api-Key", &self.api_key)
            .json(&body)
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(MemoryError::Api(format!("upsert failed ({}): {}", status, text)));
        }
        Ok(())
    }

    /// Nearest-neighbor query; returns matches with their chunk text.
    pub async fn query(&self, vector: &[f32], top_k: u32) -> Result<Vec<ScoredChunk>> {
        trace!("querying {} for top {}", self.index_host, top_k);

        let url = format!("https://{}/query", self.index_host);
        let body = json!({
            "vector": vector,
            "topK": top_k,
            "includeMetadata": true
        });

        let response = self
            .client
            .post(&url)
            .header("Api-Key", &self.api_key)
            .json(&body)
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await?;

        let status = response.status();
        let data: serde_json::Value = response.json().await?;

        if !status.is_success() {
            let message = data["message"]
                .as_str()
                .unwrap_or("unknown error")
                .to_string();
            return Err(MemoryError::Api(message));
        }

        let matches = data["matches"].as_array().cloned().unwrap_or_default();
        let chunks = matches
            .iter()
            .filter_map(|m| {
                let text = m["metadata"]["text"].as_str()?;
                Some(ScoredChunk {
                    id: m["id"].as_str().unwrap_or("").to_string(),
                    score: m["score"].as_f64().unwrap_or(0.0) as f32,
                    text: text.to_string(),
                })
            })
            .collect();

        Ok(chunks)
    }
}
