//! Long-term memory plumbing.
//!
//! Two consumers share this crate: the memory tool at runtime (semantic
//! search over the owner's documents) and the offline ingest pipeline that
//! populates the index. Neither shares state with the agent loop beyond the
//! external vector store itself.

use std::sync::Arc;
use thiserror::Error;

pub mod chunk;
pub mod embeddings;
pub mod ingest;
pub mod pinecone;

pub use chunk::split_into_chunks;
pub use embeddings::EmbeddingClient;
pub use ingest::{IngestReport, Ingestor};
pub use pinecone::{PineconeClient, ScoredChunk, VectorRecord};

/// Memory subsystem errors
#[derive(Error, Debug)]
pub enum MemoryError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("invalid json: {0}")]
    Json(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("api error: {0}")]
    Api(String),

    #[error("embedding response missing values")]
    EmptyEmbedding,
}

pub type Result<T> = std::result::Result<T, MemoryError>;

/// Embedding + vector index behind one search surface.
pub struct MemoryStore {
    embeddings: Arc<EmbeddingClient>,
    index: Arc<PineconeClient>,
}

impl MemoryStore {
    pub fn new(embeddings: Arc<EmbeddingClient>, index: Arc<PineconeClient>) -> Self {
        Self { embeddings, index }
    }

    /// Semantic search: embed the query, return the text of the closest chunks.
    pub async fn search(&self, query: &str, top_k: u32) -> Result<Vec<String>> {
        let vector = self.embeddings.embed(query).await?;
        let matches = self.index.query(&vector, top_k).await?;
        Ok(matches.into_iter().map(|m| m.text).collect())
    }

    pub fn embeddings(&self) -> Arc<EmbeddingClient> {
        self.embeddings.clone()
    }

    pub fn index(&self) -> Arc<PineconeClient> {
        self.index.clone()
    }
}
