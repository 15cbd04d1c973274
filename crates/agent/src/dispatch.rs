//! Concurrent tool dispatch.
//!
//! Takes the batch of tool-call requests from one assistant message and
//! produces exactly one textual result per request, in request order. A
//! request can never go unanswered: unknown tools, slow tools and failing
//! tools all come back as text for the model to read on the next invocation.

use crate::registry::ToolRegistry;
use futures::future::join_all;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;
use tracing::{debug, warn};
use twinbot_provider::ToolCall;

/// Outcome of one tool-call request
#[derive(Debug, Clone)]
pub struct ToolResult {
    pub tool_call_id: String,
    pub tool_name: String,
    pub text: String,
}

pub struct ToolDispatcher {
    registry: Arc<ToolRegistry>,
    call_timeout: Duration,
}

impl ToolDispatcher {
    pub fn new(registry: Arc<ToolRegistry>, call_timeout: Duration) -> Self {
        Self {
            registry,
            call_timeout,
        }
    }

    /// Run every request concurrently and return one result per request,
    /// in the order the requests arrived.
    pub async fn execute(&self, requests: &[ToolCall]) -> Vec<ToolResult> {
        debug!("dispatching {} tool calls", requests.len());
        join_all(requests.iter().map(|request| self.execute_one(request))).await
    }

    async fn execute_one(&self, request: &ToolCall) -> ToolResult {
        let query = query_text(&request.arguments);

        let text = match self.registry.get(&request.name) {
            Some(tool) => match timeout(self.call_timeout, tool.call(&query)).await {
                Ok(text) => text,
                Err(_) => {
                    warn!("tool {} timed out after {:?}", request.name, self.call_timeout);
                    format!(
                        "Error connecting to {}: timed out after {}s",
                        request.name,
                        self.call_timeout.as_secs()
                    )
                }
            },
            None => {
                warn!("model requested unknown tool {}", request.name);
                format!("Tool '{}' is unavailable.", request.name)
            }
        };

        ToolResult {
            tool_call_id: request.id.clone(),
            tool_name: request.name.clone(),
            text,
        }
    }
}

/// Pull the free-text query out of a tool-call argument value.
///
/// Accepts the canonical `{"query": "..."}` object, a bare JSON string, or
/// anything else stringified as a last resort. Never fails.
pub fn query_text(arguments: &Value) -> String {
    match arguments {
        Value::Object(map) => match map.get("query").and_then(|q| q.as_str()) {
            Some(query) => query.to_string(),
            None => arguments.to_string(),
        },
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
