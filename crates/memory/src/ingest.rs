//! Offline memory populator.
//!
//! Reads documents from a folder, splits them into overlapping chunks,
//! embeds each chunk and upserts the vectors into the index the memory tool
//! queries at runtime. Runs independently of live turns.

use crate::chunk::split_into_chunks;
use crate::pinecone::{ChunkMetadata, VectorRecord};
use crate::{EmbeddingClient, PineconeClient, Result};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};

const UPSERT_BATCH: usize = 50;

/// Outcome of one ingest run
#[derive(Debug, Default)]
pub struct IngestReport {
    pub documents: usize,
    pub chunks: usize,
}

pub struct Ingestor {
    embeddings: Arc<EmbeddingClient>,
    index: Arc<PineconeClient>,
    chunk_size: usize,
    chunk_overlap: usize,
}

impl Ingestor {
    pub fn new(
        embeddings: Arc<EmbeddingClient>,
        index: Arc<PineconeClient>,
        chunk_size: usize,
        chunk_overlap: usize,
    ) -> Self {
        Self {
            embeddings,
            index,
            chunk_size,
            chunk_overlap,
        }
    }

    /// Ingest every .txt/.md file under `dir` (recursive).
    pub async fn ingest_dir(&self, dir: &Path) -> Result<IngestReport> {
        let files = collect_documents(dir).await?;
        if files.is_empty() {
            warn!("no documents found in {:?}", dir);
            return Ok(IngestReport::default());
        }

        info!("ingesting {} documents from {:?}", files.len(), dir);

        let mut report = IngestReport::default();
        let mut batch: Vec<VectorRecord> = Vec::new();

        for path in &files {
            let text = tokio::fs::read_to_string(path).await?;
            let source = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| "unknown".to_string());

            let chunks = split_into_chunks(&text, self.chunk_size, self.chunk_overlap);
            for (i, chunk) in chunks.into_iter().enumerate() {
                let vector = self.embeddings.embed(&chunk).await?;
                batch.push(VectorRecord {
                    id: format!("{}-{}", source, i),
                    values: vector,
                    metadata: ChunkMetadata {
                        text: chunk,
                        source: source.clone(),
                    },
                });
                report.chunks += 1;

                if batch.len() >= UPSERT_BATCH {
                    self.index.upsert(&batch).await?;
                    batch.clear();
                }
            }
            report.documents += 1;
        }

        self.index.upsert(&batch).await?;
        info!(
            "ingest complete: {} documents, {} chunks",
            report.documents, report.chunks
        );
        Ok(report)
    }
}

/// Collect .txt and .md files under a folder, recursively, in sorted order.
pub async fn collect_documents(dir: &Path) -> std::io::Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    let mut pending = vec![dir.to_path_buf()];

    while let Some(current) = pending.pop() {
        let mut entries = match tokio::fs::read_dir(&current).await {
            Ok(entries) => entries,
            Err(e) => {
                warn!("skipping {:?}: {}", current, e);
                continue;
            }
        };

        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.is_dir() {
                pending.push(path);
            } else if matches!(
                path.extension().and_then(|e| e.to_str()),
                Some("txt") | Some("md")
            ) {
                files.push(path);
            }
        }
    }

    files.sort();
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_collect_documents_filters_and_recurses() {
        let dir = tempfile::tempdir().unwrap();
        let sub = dir.path().join("notes");
        tokio::fs::create_dir(&sub).await.unwrap();

        tokio::fs::write(dir.path().join("resume.txt"), "resume")
            .await
            .unwrap();
        tokio::fs::write(sub.join("bio.md"), "bio").await.unwrap();
        tokio::fs::write(dir.path().join("photo.png"), [0u8; 4])
            .await
            .unwrap();

        let files = collect_documents(dir.path()).await.unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();

        assert_eq!(files.len(), 2);
        assert!(names.contains(&"resume.txt".to_string()));
        assert!(names.contains(&"bio.md".to_string()));
    }

    #[tokio::test]
    async fn test_collect_documents_missing_dir_is_empty() {
        let files = collect_documents(Path::new("/nonexistent/twinbot-data"))
            .await
            .unwrap();
        assert!(files.is_empty());
    }
}
