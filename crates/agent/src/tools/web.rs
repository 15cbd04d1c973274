//! Live web search via Tavily.

use crate::registry::Tool;
use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};
use std::time::Duration;
use tracing::debug;

const API_URL: &str = "https://api.tavily.com/search";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(20);

pub struct WebSearchTool {
    client: Client,
    api_key: String,
    max_results: u32,
}

impl WebSearchTool {
    pub fn new(api_key: impl Into<String>, max_results: u32) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            max_results,
        }
    }

    async fn search(&self, query: &str) -> Result<String, reqwest::Error> {
        let body = json!({
            "api_key": self.api_key,
            "query": query,
            "max_results": self.max_results,
        });

        let response = self
            .client
            .post(API_URL)
            .json(&body)
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await?
            .error_for_status()?;

        let data: Value = response.json().await?;
        Ok(render_results(&data, query))
    }
}

#[async_trait]
impl Tool for WebSearchTool {
    fn name(&self) -> &str {
        "web_search"
    }

    fn description(&self) -> &str {
        "Use this to search the internet for live info (Weather, News) or \
         public info about Pooya (LinkedIn/Instagram)."
    }

    async fn call(&self, query: &str) -> String {
        debug!("web search for {:?}", query);
        match self.search(query).await {
            Ok(text) => text,
            Err(e) => format!("Error connecting to web_search: {}", e),
        }
    }
}

fn render_results(data: &Value, query: &str) -> String {
    let lines: Vec<String> = data["results"]
        .as_array()
        .map(|list| {
            list.iter()
                .filter_map(|result| {
                    let content = result["content"].as_str()?;
                    let title = result["title"].as_str().unwrap_or("untitled");
                    let url = result["url"].as_str().unwrap_or("");
                    Some(format!("{} ({})\n{}", title, url, content))
                })
                .collect()
        })
        .unwrap_or_default();

    if lines.is_empty() {
        format!("No results found for: {}", query)
    } else {
        lines.join("\n\n")
    }
}
