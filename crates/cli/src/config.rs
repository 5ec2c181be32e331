//! Configuration loading and management

use anyhow::{Context, Result};
use pr_announcer_adapters::github::GITHUB_API_URL;
use pr_announcer_adapters::twitter::UPDATE_STATUS_URL;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Top-level configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub general: GeneralConfig,

    #[serde(default)]
    pub github: GitHubConfig,

    #[serde(default)]
    pub twitter: TwitterConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    #[serde(default = "default_ledger_path")]
    pub ledger_path: PathBuf,

    #[serde(default)]
    pub dry_run: bool,

    #[serde(default = "default_log_level")]
    pub log_level: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitHubConfig {
    #[serde(default = "default_github_api_base_url")]
    pub api_base_url: String,

    #[serde(default)]
    pub owner: String,

    #[serde(default)]
    pub repo: String,

    #[serde(default = "default_per_page")]
    pub per_page: u32,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TwitterConfig {
    #[serde(default = "default_twitter_endpoint")]
    pub endpoint: String,

    #[serde(default = "default_consumer_key_env")]
    pub consumer_key_env: String,

    #[serde(default = "default_consumer_secret_env")]
    pub consumer_secret_env: String,

    #[serde(default = "default_access_token_env")]
    pub access_token_env: String,

    #[serde(default = "default_access_token_secret_env")]
    pub access_token_secret_env: String,
}

// Default value functions
fn default_ledger_path() -> PathBuf {
    PathBuf::from("./RunHistory.xml")
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_github_api_base_url() -> String {
    GITHUB_API_URL.to_string()
}

fn default_per_page() -> u32 {
    100
}

fn default_user_agent() -> String {
    "pr-announcer".to_string()
}

fn default_twitter_endpoint() -> String {
    UPDATE_STATUS_URL.to_string()
}

fn default_consumer_key_env() -> String {
    "TwitterApiKey".to_string()
}

fn default_consumer_secret_env() -> String {
    "TwitterApiKeySecret".to_string()
}

fn default_access_token_env() -> String {
    "TwitterAccessToken".to_string()
}

fn default_access_token_secret_env() -> String {
    "TwitterAccessTokenSecret".to_string()
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            ledger_path: default_ledger_path(),
            dry_run: false,
            log_level: default_log_level(),
        }
    }
}

impl Default for GitHubConfig {
    fn default() -> Self {
        Self {
            api_base_url: default_github_api_base_url(),
            owner: String::new(),
            repo: String::new(),
            per_page: default_per_page(),
            user_agent: default_user_agent(),
        }
    }
}

impl Default for TwitterConfig {
    fn default() -> Self {
        Self {
            endpoint: default_twitter_endpoint(),
            consumer_key_env: default_consumer_key_env(),
            consumer_secret_env: default_consumer_secret_env(),
            access_token_env: default_access_token_env(),
            access_token_secret_env: default_access_token_secret_env(),
        }
    }
}

impl AppConfig {
    /// Load configuration from file and environment
    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        let mut builder = config::Config::builder();

        // Try default config path if none specified
        let default_path = PathBuf::from("./config.toml");
        let path = config_path.unwrap_or(&default_path);

        if path.exists() {
            builder = builder.add_source(config::File::from(path));
        } else if config_path.is_some() {
            // User specified a path that doesn't exist
            anyhow::bail!("Config file not found: {}", path.display());
        }

        // Add environment variable overrides
        builder = builder.add_source(
            config::Environment::with_prefix("PR_ANNOUNCER")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build().context("Failed to build configuration")?;

        config
            .try_deserialize()
            .context("Failed to deserialize configuration")
    }

    /// Generate example configuration as TOML string
    pub fn example_toml() -> String {
        r#"# pr-announcer configuration

[general]
ledger_path = "./RunHistory.xml"
dry_run = false
log_level = "info"

[github]
api_base_url = "https://api.github.com"
owner = "your-org"
repo = "your-repo"
per_page = 100
user_agent = "pr-announcer"

[twitter]
endpoint = "https://api.twitter.com/1.1/statuses/update.json"
# Names of the environment variables holding the OAuth 1.0a credentials
consumer_key_env = "TwitterApiKey"
consumer_secret_env = "TwitterApiKeySecret"
access_token_env = "TwitterAccessToken"
access_token_secret_env = "TwitterAccessTokenSecret"
"#
        .to_string()
    }
}
