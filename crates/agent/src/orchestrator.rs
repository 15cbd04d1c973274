//! The turn loop.
//!
//! One user message in, exactly one non-empty reply out. The loop alternates
//! between two working phases: REASONING (one model invocation) and
//! DISPATCHING (run the requested tool batch), until the model answers in
//! plain text, the step bound is hit, or the model invocation itself fails.
//! Tool failures never end a turn; only the model call can.

use crate::dispatch::ToolDispatcher;
use crate::prompt::PromptBuilder;
use crate::registry::ToolRegistry;
use crate::state::ConversationState;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};
use twinbot_config::Config;
use twinbot_provider::{ChatParams, Message, Provider, ToolCall, ToolCallDef};

/// Reply when the model invocation itself fails.
pub const INTERNAL_ERROR_REPLY: &str =
    "Sorry, I encountered an internal error. Please try again.";

/// Reply when a final model message carries no usable text.
pub const NO_TEXT_REPLY: &str = "I'm thinking, but I couldn't formulate a text response.";

/// Reply when the step bound or the turn deadline cuts the loop short.
pub const FALLBACK_REPLY: &str =
    "I could not finish working on that in time. Please try asking again.";

const DEFAULT_TOOL_TIMEOUT: Duration = Duration::from_secs(30);

/// Where the loop stands after each transition
enum TurnPhase {
    Reasoning,
    Dispatching(Vec<ToolCall>),
    Done(String),
    Failed,
}

/// Everything about a turn that comes from configuration.
#[derive(Debug, Clone)]
pub struct TurnOptions {
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,
    pub recursion_limit: u32,
    pub turn_timeout: Duration,
    pub tool_timeout: Duration,
}

impl TurnOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            model: config.model.model.clone(),
            max_tokens: config.model.max_tokens,
            temperature: config.model.temperature,
            recursion_limit: config.agent.recursion_limit,
            turn_timeout: Duration::from_secs(config.agent.turn_timeout_s),
            tool_timeout: Duration::from_secs(config.tools.timeout_s),
        }
    }
}

impl Default for TurnOptions {
    fn default() -> Self {
        Self {
            model: String::new(),
            max_tokens: 4096,
            temperature: 0.7,
            recursion_limit: 10,
            turn_timeout: Duration::from_secs(120),
            tool_timeout: DEFAULT_TOOL_TIMEOUT,
        }
    }
}

/// The synchronous turn boundary transports call into.
///
/// Implementations must always return a non-empty reply and must not panic;
/// concurrency across users is the transport's business, not the loop's.
#[async_trait]
pub trait TurnRunner: Send + Sync {
    async fn run_turn(&self, user_text: &str) -> String;
}

pub struct Orchestrator {
    provider: Arc<dyn Provider>,
    registry: Arc<ToolRegistry>,
    dispatcher: ToolDispatcher,
    prompt: PromptBuilder,
    options: TurnOptions,
}

impl Orchestrator {
    pub fn new(
        provider: Arc<dyn Provider>,
        registry: Arc<ToolRegistry>,
        prompt: PromptBuilder,
        options: TurnOptions,
    ) -> Self {
        let dispatcher = ToolDispatcher::new(registry.clone(), options.tool_timeout);
        Self {
            provider,
            registry,
            dispatcher,
            prompt,
            options,
        }
    }

    /// Run one full turn under the overall deadline.
    pub async fn run_turn(&self, user_text: &str) -> String {
        match tokio::time::timeout(self.options.turn_timeout, self.run_loop(user_text)).await {
            Ok(reply) => reply,
            Err(_) => {
                warn!(
                    "turn abandoned after {:?} deadline",
                    self.options.turn_timeout
                );
                FALLBACK_REPLY.to_string()
            }
        }
    }

    async fn run_loop(&self, user_text: &str) -> String {
        let mut state = ConversationState::seeded(self.prompt.build(), user_text);
        let mut steps: u32 = 0;
        let mut phase = TurnPhase::Reasoning;

        loop {
            phase = match phase {
                TurnPhase::Reasoning => {
                    steps += 1;
                    if steps > self.options.recursion_limit {
                        info!("step bound {} reached", self.options.recursion_limit);
                        TurnPhase::Done(FALLBACK_REPLY.to_string())
                    } else {
                        self.reason(&mut state, steps).await
                    }
                }
                TurnPhase::Dispatching(requests) => {
                    let results = self.dispatcher.execute(&requests).await;
                    for result in results {
                        state.append(Message::tool(
                            result.tool_call_id,
                            result.tool_name,
                            result.text,
                        ));
                    }
                    TurnPhase::Reasoning
                }
                TurnPhase::Done(reply) => return reply,
                TurnPhase::Failed => return INTERNAL_ERROR_REPLY.to_string(),
            };
        }
    }

    /// One model invocation; decides the next phase from the response shape.
    async fn reason(&self, state: &mut ConversationState, steps: u32) -> TurnPhase {
        debug!("model invocation {} of {}", steps, self.options.recursion_limit);

        let params = ChatParams {
            model: self.options.model.clone(),
            messages: state.snapshot(),
            tools: self.registry.signatures(),
            max_tokens: self.options.max_tokens,
            temperature: self.options.temperature,
        };

        let response = match self.provider.chat(params).await {
            Ok(response) => response,
            Err(e) => {
                error!("model invocation failed: {}", e);
                return TurnPhase::Failed;
            }
        };

        if response.has_tool_calls() {
            let defs = response
                .tool_calls
                .iter()
                .map(|tc| ToolCallDef::new(&tc.id, &tc.name, tc.arguments.clone()))
                .collect();
            state.append(Message::assistant_with_calls(response.content.clone(), defs));

            // Last allowed invocation spent its budget asking for tools;
            // stop here rather than start work the loop cannot finish.
            if steps >= self.options.recursion_limit {
                info!("step bound {} reached", self.options.recursion_limit);
                return TurnPhase::Done(FALLBACK_REPLY.to_string());
            }
            return TurnPhase::Dispatching(response.tool_calls);
        }

        let reply = extract_reply(response.content.as_deref());
        state.append(Message::assistant(reply.clone()));
        TurnPhase::Done(reply)
    }
}

#[async_trait]
impl TurnRunner for Orchestrator {
    async fn run_turn(&self, user_text: &str) -> String {
        Orchestrator::run_turn(self, user_text).await
    }
}

/// Turn a final model message into the reply text. Total: blank or missing
/// content falls back to a fixed line, and already-extracted text passes
/// through unchanged.
pub fn extract_reply(content: Option<&str>) -> String {
    match content {
        Some(text) if !text.trim().is_empty() => text.to_string(),
        _ => NO_TEXT_REPLY.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_reply_passes_text_through() {
        assert_eq!(extract_reply(Some("an answer")), "an answer");
    }

    #[test]
    fn test_extract_reply_falls_back_on_blank() {
        assert_eq!(extract_reply(None), NO_TEXT_REPLY);
        assert_eq!(extract_reply(Some("")), NO_TEXT_REPLY);
        assert_eq!(extract_reply(Some("   \n")), NO_TEXT_REPLY);
    }

    #[test]
    fn test_extract_reply_is_idempotent() {
        let first = extract_reply(None);
        let second = extract_reply(Some(&first));
        assert_eq!(first, second);
    }

    #[test]
    fn test_turn_options_default() {
        let options = TurnOptions::default();
        assert_eq!(options.recursion_limit, 10);
        assert_eq!(options.turn_timeout, Duration::from_secs(120));
    }
}
