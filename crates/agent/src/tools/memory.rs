//! Personal memory recall over the vector index.

use crate::registry::Tool;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;
use twinbot_memory::MemoryStore;

const NO_MEMORY_TEXT: &str = "No specific personal memory found.";

pub struct MemoryRecallTool {
    store: Arc<MemoryStore>,
    top_k: u32,
}

impl MemoryRecallTool {
    pub fn new(store: Arc<MemoryStore>, top_k: u32) -> Self {
        Self { store, top_k }
    }
}

#[async_trait]
impl Tool for MemoryRecallTool {
    fn name(&self) -> &str {
        "check_my_memory"
    }

    fn description(&self) -> &str {
        "ALWAYS use this FIRST. Search here for Pooya's personal opinions, \
         past projects, resume, biography, or specific advice he has written."
    }

    async fn call(&self, query: &str) -> String {
        debug!("memory recall for {:?}", query);
        match self.store.search(query, self.top_k).await {
            Ok(chunks) if chunks.is_empty() => NO_MEMORY_TEXT.to_string(),
            Ok(chunks) => chunks.join("\n\n"),
            Err(e) => format!("Error reading memory: {}", e),
        }
    }
}
