//! GitHub API read adapter for listing open pull requests

use async_trait::async_trait;
use pr_announcer_domain::{AnnouncementItem, FetchError, SourceFetcher};
use reqwest::Client;
use reqwest::header::{ACCEPT, USER_AGENT};
use serde::Deserialize;

/// Default public API root
pub const GITHUB_API_URL: &str = "https://api.github.com";

const GITHUB_V3_MEDIA_TYPE: &str = "application/vnd.github.v3+json";

/// Source fetcher returning the open pull requests of one repository
pub struct GitHubSource {
    client: Client,
    base_url: String,
    owner: String,
    repo: String,
    per_page: u32,
    user_agent: String,
}

impl GitHubSource {
    pub fn new(owner: impl Into<String>, repo: impl Into<String>) -> Self {
        Self::with_base_url(GITHUB_API_URL.to_string(), owner, repo)
    }

    pub fn with_base_url(
        base_url: String,
        owner: impl Into<String>,
        repo: impl Into<String>,
    ) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            owner: owner.into(),
            repo: repo.into(),
            per_page: 100,
            user_agent: "pr-announcer".to_string(),
        }
    }

    pub fn with_per_page(mut self, per_page: u32) -> Self {
        self.per_page = per_page;
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    fn pulls_url(&self) -> String {
        format!(
            "{}/repos/{}/{}/pulls?per_page={}",
            self.base_url, self.owner, self.repo, self.per_page
        )
    }
}

#[derive(Deserialize)]
struct PullRequest {
    number: PullNumber,
    html_url: String,
    user: GitHubUser,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum PullNumber {
    Numeric(u64),
    Text(String),
}

impl PullNumber {
    fn into_id(self) -> String {
        match self {
            PullNumber::Numeric(n) => n.to_string(),
            PullNumber::Text(s) => s,
        }
    }
}

#[derive(Deserialize)]
struct GitHubUser {
    login: String,
}

#[async_trait]
impl SourceFetcher for GitHubSource {
    async fn fetch_items(&self) -> Result<Vec<AnnouncementItem>, FetchError> {
        let url = self.pulls_url();

        tracing::info!(owner = %self.owner, repo = %self.repo, "Fetching open pull requests");

        let response = self
            .client
            .get(&url)
            .header(ACCEPT, GITHUB_V3_MEDIA_TYPE)
            .header(USER_AGENT, &self.user_agent)
            .send()
            .await
            .map_err(|e| FetchError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(FetchError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| FetchError::Network(e.to_string()))?;

        let pulls: Vec<PullRequest> =
            serde_json::from_str(&body).map_err(|e| FetchError::Parse(e.to_string()))?;

        let items: Vec<AnnouncementItem> = pulls
            .into_iter()
            .map(|pr| AnnouncementItem::new(pr.number.into_id(), pr.html_url, pr.user.login))
            .collect();

        tracing::info!(count = items.len(), "Fetched pull requests");

        Ok(items)
    }
}
