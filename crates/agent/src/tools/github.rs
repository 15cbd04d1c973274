//! Latest GitHub activity.

use crate::registry::Tool;
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

const API_URL: &str = "https://api.github.com/user/repos";
const USER_AGENT: &str = "twinbot";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);
const REPO_COUNT: u32 = 3;

pub struct GithubActivityTool {
    client: Client,
    token: String,
}

impl GithubActivityTool {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            token: token.into(),
        }
    }

    async fn latest_repos(&self) -> Result<String, reqwest::Error> {
        let response = self
            .client
            .get(API_URL)
            .query(&[
                ("sort", "updated"),
                ("direction", "desc"),
                ("per_page", &REPO_COUNT.to_string()),
            ])
            .header("Authorization", format!("Bearer {}", self.token))
            .header("Accept", "application/vnd.github+json")
            .header("User-Agent", USER_AGENT)
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await?
            .error_for_status()?;

        let repos: Value = response.json().await?;
        Ok(render_repos(&repos))
    }
}

#[async_trait]
impl Tool for GithubActivityTool {
    fn name(&self) -> &str {
        "check_github_activity"
    }

    fn description(&self) -> &str {
        "Use this to see what Pooya is coding RIGHT NOW. \
         Returns his latest repositories."
    }

    // The owner's recent repos are the answer whatever the query says.
    async fn call(&self, _query: &str) -> String {
        debug!("fetching latest github repos");
        match self.latest_repos().await {
            Ok(text) => text,
            Err(e) => format!("Error connecting to GitHub: {}", e),
        }
    }
}

fn render_repos(repos: &Value) -> String {
    let lines: Vec<String> = repos
        .as_array()
        .map(|list| {
            list.iter()
                .map(|repo| {
                    let name = repo["name"].as_str().unwrap_or("unknown");
                    let url = repo["html_url"].as_str().unwrap_or("");
                    let desc = repo["description"].as_str().unwrap_or("No description");
                    format!("Repo: {} | URL: {} | Desc: {}", name, url, desc)
                })
                .collect()
        })
        .unwrap_or_default();

    if lines.is_empty() {
        "No recent public repositories found.".to_string()
    } else {
        lines.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_render_repos_formats_lines() {
        let repos = json!([
            {"name": "twinbot", "html_url": "https://github.com/p/twinbot", "description": "a bot"},
            {"name": "dots", "html_url": "https://github.com/p/dots", "description": null}
        ]);
        let text = render_repos(&repos);
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(
            lines[0],
            "Repo: twinbot | URL: https://github.com/p/twinbot | Desc: a bot"
        );
        assert!(lines[1].ends_with("Desc: No description"));
    }

    #[test]
    fn test_render_repos_empty_list() {
        assert_eq!(render_repos(&json!([])), "No recent public repositories found.");
        assert_eq!(render_repos(&json!(null)), "No recent public repositories found.");
    }
}
