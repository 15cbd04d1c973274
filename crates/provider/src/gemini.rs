//! Gemini provider.
//!
//! Talks to Google's OpenAI-compatible chat-completions endpoint so the
//! message and tool-call wire shapes stay uniform with the rest of the port.

use crate::*;
use reqwest::Client;
use serde_json::json;
use std::time::Duration;
use tracing::{debug, trace, warn};

const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/openai";
const DEFAULT_MODEL: &str = "gemini-2.5-flash";

/// Transport-level retries owned by the port, not the orchestrator.
const MAX_TRANSPORT_RETRIES: u32 = 2;
const RETRY_BACKOFF_MS: u64 = 500;

pub struct GeminiProvider {
    client: Client,
    api_key: String,
    api_base: String,
    default_model: String,
}

impl GeminiProvider {
    pub fn new(api_key: impl Into<String>, api_base: Option<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            api_base: api_base.unwrap_or_else(|| DEFAULT_API_BASE.to_string()),
            default_model: DEFAULT_MODEL.to_string(),
        }
    }

    fn build_request(&self, params: &ChatParams) -> serde_json::Value {
        let messages: Vec<serde_json::Value> = params
            .messages
            .iter()
            .map(|m| {
                let mut obj = json!({ "role": &m.role });
                if let Some(content) = &m.content {
                    obj["content"] = json!(content);
                }
                if let Some(tool_calls) = &m.tool_calls {
                    obj["tool_calls"] = json!(tool_calls);
                }
                if let Some(tool_call_id) = &m.tool_call_id {
                    obj["tool_call_id"] = json!(tool_call_id);
                }
                if let Some(name) = &m.name {
                    obj["name"] = json!(name);
                }
                obj
            })
            .collect();

        let mut body = json!({
            "model": params.model,
            "messages": messages,
            "max_tokens": params.max_tokens,
            "temperature": params.temperature,
        });

        if !params.tools.is_empty() {
            body["tools"] = json!(params.tools);
            body["tool_choice"] = json!("auto");
        }

        body
    }

    fn parse_response(&self, json: serde_json::Value) -> Result<ChatResponse> {
        let choice = json["choices"]
            .get(0)
            .ok_or(ProviderError::InvalidResponse)?;
        let message = &choice["message"];
        let content = content_text(&message["content"]);
        let finish_reason = choice["finish_reason"]
            .as_str()
            .unwrap_or("stop")
            .to_string();

        let mut tool_calls = Vec::new();
        if let Some(calls) = message["tool_calls"].as_array() {
            for call in calls {
                let function = &call["function"];
                // Arguments arrive as a JSON-encoded string; some backends
                // send a bare object instead.
                let args = function["arguments"]
                    .as_str()
                    .and_then(|s| serde_json::from_str(s).ok())
                    .unwrap_or_else(|| function["arguments"].clone());

                tool_calls.push(ToolCall {
                    id: call["id"].as_str().unwrap_or("").to_string(),
                    name: function["name"].as_str().unwrap_or("").to_string(),
                    arguments: args,
                });
            }
        }

        Ok(ChatResponse {
            content,
            tool_calls,
            finish_reason,
        })
    }

    async fn send_once(&self, body: &serde_json::Value) -> Result<ChatResponse> {
        let url = format!("{}/chat/completions", self.api_base);

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(body)
            .send()
            .await?;

        let status = response.status();
        let json: serde_json::Value = response.json().await?;

        if !status.is_success() {
            let error = json["error"]["message"]
                .as_str()
                .unwrap_or("unknown error")
                .to_string();
            if status.as_u16() == 429 {
                return Err(ProviderError::RateLimited);
            }
            return Err(ProviderError::Api(error));
        }

        self.parse_response(json)
    }
}

#[async_trait::async_trait]
impl Provider for GeminiProvider {
    async fn chat(&self, params: ChatParams) -> Result<ChatResponse> {
        if self.api_key.is_empty() {
            return Err(ProviderError::NoApiKey);
        }

        trace!("invoking {} at {}", params.model, self.api_base);
        let body = self.build_request(&params);

        let mut attempt = 0;
        loop {
            match self.send_once(&body).await {
                Ok(response) => {
                    debug!(
                        "model response: {} tool calls, finish_reason={}",
                        response.tool_calls.len(),
                        response.finish_reason
                    );
                    return Ok(response);
                }
                Err(e @ (ProviderError::Request(_) | ProviderError::RateLimited))
                    if attempt < MAX_TRANSPORT_RETRIES =>
                {
                    attempt += 1;
                    warn!("model call failed ({}), retry {}/{}", e, attempt, MAX_TRANSPORT_RETRIES);
                    tokio::time::sleep(Duration::from_millis(RETRY_BACKOFF_MS * attempt as u64))
                        .await;
                }
                Err(e) => return Err(e),
            }
        }
    }

    fn default_model(&self) -> String {
        self.default_model.clone()
    }

    fn is_configured(&self) -> bool {
        !self.api_key.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn provider() -> GeminiProvider {
        GeminiProvider::new("test-key", None)
    }

    #[test]
    fn test_new_defaults() {
        let p = provider();
        assert_eq!(p.api_base, DEFAULT_API_BASE);
        assert_eq!(p.default_model(), "gemini-2.5-flash");
        assert!(p.is_configured());
    }

    #[test]
    fn test_not_configured_without_key() {
        let p = GeminiProvider::new("", None);
        assert!(!p.is_configured());
    }

    #[test]
    fn test_custom_api_base() {
        let p = GeminiProvider::new("key", Some("https://proxy.local/v1".to_string()));
        assert_eq!(p.api_base, "https://proxy.local/v1");
    }

    #[test]
    fn test_build_request_basic() {
        let params = ChatParams {
            model: "gemini-2.5-flash".to_string(),
            messages: vec![Message::system("persona"), Message::user("hello")],
            tools: vec![],
            max_tokens: 1024,
            temperature: 0.7,
        };

        let request = provider().build_request(&params);

        assert_eq!(request["model"], "gemini-2.5-flash");
        assert_eq!(request["max_tokens"], 1024);
        assert!(request.get("tools").is_none());
        assert!(request.get("tool_choice").is_none());

        let messages = request["messages"].as_array().unwrap();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0]["role"], "system");
        assert_eq!(messages[1]["content"], "hello");
    }

    #[test]
    fn test_build_request_advertises_tools() {
        let params = ChatParams {
            model: "gemini-2.5-flash".to_string(),
            messages: vec![Message::user("what is pooya coding?")],
            tools: vec![ToolSignature::new(
                "check_github_activity",
                "Latest repositories",
                query_schema("What to look for"),
            )],
            ..ChatParams::default()
        };

        let request = provider().build_request(&params);

        let tools = request["tools"].as_array().unwrap();
        assert_eq!(tools.len(), 1);
        assert_eq!(tools[0]["type"], "function");
        assert_eq!(tools[0]["function"]["name"], "check_github_activity");
        assert_eq!(request["tool_choice"], "auto");
    }

    #[test]
    fn test_build_request_tool_result_message() {
        let params = ChatParams {
            messages: vec![Message::tool("call_1", "check_my_memory", "resume text")],
            ..ChatParams::default()
        };

        let request = provider().build_request(&params);
        let messages = request["messages"].as_array().unwrap();
        assert_eq!(messages[0]["role"], "tool");
        assert_eq!(messages[0]["tool_call_id"], "call_1");
        assert_eq!(messages[0]["name"], "check_my_memory");
        assert_eq!(messages[0]["content"], "resume text");
    }

    #[test]
    fn test_build_request_assistant_with_tool_calls() {
        let msg = Message {
            role: "assistant".to_string(),
            content: None,
            tool_calls: Some(vec![ToolCallDef::new(
                "call_1",
                "web_search",
                json!({"query": "weather padova"}),
            )]),
            tool_call_id: None,
            name: None,
        };
        let params = ChatParams {
            messages: vec![msg],
            ..ChatParams::default()
        };

        let request = provider().build_request(&params);
        let messages = request["messages"].as_array().unwrap();
        assert!(messages[0].get("tool_calls").is_some());
        assert!(messages[0].get("content").is_none());
    }

    #[test]
    fn test_parse_response_final_text() {
        let response = provider()
            .parse_response(json!({
                "choices": [{
                    "message": { "role": "assistant", "content": "hi there" },
                    "finish_reason": "stop"
                }]
            }))
            .unwrap();

        assert_eq!(response.content, Some("hi there".to_string()));
        assert!(!response.has_tool_calls());
        assert_eq!(response.finish_reason, "stop");
    }

    #[test]
    fn test_parse_response_segmented_content() {
        let response = provider()
            .parse_response(json!({
                "choices": [{
                    "message": {
                        "role": "assistant",
                        "content": [{"type": "text", "text": "segmented"}]
                    },
                    "finish_reason": "stop"
                }]
            }))
            .unwrap();

        assert_eq!(response.content, Some("segmented".to_string()));
    }

    #[test]
    fn test_parse_response_tool_calls_with_string_arguments() {
        let response = provider()
            .parse_response(json!({
                "choices": [{
                    "message": {
                        "role": "assistant",
                        "content": null,
                        "tool_calls": [{
                            "id": "call_abc",
                            "type": "function",
                            "function": {
                                "name": "check_my_memory",
                                "arguments": "{\"query\": \"resume\"}"
                            }
                        }]
                    },
                    "finish_reason": "tool_calls"
                }]
            }))
            .unwrap();

        assert_eq!(response.content, None);
        assert_eq!(response.tool_calls.len(), 1);
        assert_eq!(response.tool_calls[0].id, "call_abc");
        assert_eq!(response.tool_calls[0].name, "check_my_memory");
        assert_eq!(response.tool_calls[0].arguments, json!({"query": "resume"}));
    }

    #[test]
    fn test_parse_response_tool_calls_with_object_arguments() {
        let response = provider()
            .parse_response(json!({
                "choices": [{
                    "message": {
                        "role": "assistant",
                        "tool_calls": [{
                            "id": "call_1",
                            "function": {
                                "name": "web_search",
                                "arguments": {"query": "news"}
                            }
                        }]
                    },
                    "finish_reason": "tool_calls"
                }]
            }))
            .unwrap();

        assert_eq!(response.tool_calls[0].arguments, json!({"query": "news"}));
    }

    #[test]
    fn test_parse_response_empty_choices_is_invalid() {
        let result = provider().parse_response(json!({ "choices": [] }));
        assert!(matches!(result, Err(ProviderError::InvalidResponse)));
    }

    #[test]
    fn test_parse_response_missing_choices_is_invalid() {
        let result = provider().parse_response(json!({}));
        assert!(matches!(result, Err(ProviderError::InvalidResponse)));
    }

    #[tokio::test]
    async fn test_chat_without_key_fails_fast() {
        let p = GeminiProvider::new("", None);
        let result = p.chat(ChatParams::default()).await;
        assert!(matches!(result, Err(ProviderError::NoApiKey)));
    }
}
