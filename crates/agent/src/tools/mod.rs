//! Built-in tools.

pub mod github;
pub mod memory;
pub mod web;

pub use github::GithubActivityTool;
pub use memory::MemoryRecallTool;
pub use web::WebSearchTool;

use crate::registry::ToolRegistry;
use std::sync::Arc;
use twinbot_config::Config;
use twinbot_memory::MemoryStore;

/// Wire up the standard tool set in its advertised order:
/// memory first, then the open web, then GitHub.
pub fn build_registry(config: &Config, store: Arc<MemoryStore>) -> ToolRegistry {
    ToolRegistry::new(vec![
        Arc::new(MemoryRecallTool::new(store, config.memory.top_k)),
        Arc::new(WebSearchTool::new(
            &config.tools.tavily_api_key,
            config.tools.web_max_results,
        )),
        Arc::new(GithubActivityTool::new(&config.tools.github_token)),
    ])
}
