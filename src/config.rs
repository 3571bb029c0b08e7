//! Client configuration (`taskerrand.toml`).
//!
//! Layered: file → environment → CLI flags.
//!
//! ```toml
//! [api]
//! base_url = "http://localhost:8000"
//! timeout_secs = 30
//!
//! [auth]
//! token_command = "gcloud auth print-identity-token"
//! display_name = "Ana Cruz"
//!
//! [poll]
//! interval_secs = 5
//!
//! [views]
//! page_size = 20
//! pagination_threshold = 40
//! browse_truncate = 150
//! dashboard_truncate = 100
//!
//! [web]
//! base_url = "http://localhost:5500"
//! ```

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use crate::api::ApiClient;
use crate::auth::{AuthBridge, CommandTokenProvider, Identity, StaticTokenProvider, TokenProvider};
use crate::models::Id;
use crate::views::ViewConfig;

pub const CONFIG_FILE: &str = "taskerrand.toml";
pub const ENV_API_URL: &str = "TASKERRAND_API_URL";
pub const ENV_TOKEN: &str = "TASKERRAND_TOKEN";
pub const ENV_TOKEN_COMMAND: &str = "TASKERRAND_TOKEN_COMMAND";
pub const ENV_CONFIG: &str = "TASKERRAND_CONFIG";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ApiSection {
    #[serde(default = "default_api_url")]
    pub base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_api_url() -> String {
    "http://localhost:8000".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

impl Default for ApiSection {
    fn default() -> Self {
        Self {
            base_url: default_api_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct AuthSection {
    /// Static bearer token.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    /// Shell command printing a fresh token; takes precedence over `token`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_command: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PollSection {
    #[serde(default = "default_poll_secs")]
    pub interval_secs: u64,
}

fn default_poll_secs() -> u64 {
    5
}

impl Default for PollSection {
    fn default() -> Self {
        Self {
            interval_secs: default_poll_secs(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ViewsSection {
    #[serde(default = "default_page_size")]
    pub page_size: usize,
    #[serde(default = "default_pagination_threshold")]
    pub pagination_threshold: usize,
    #[serde(default = "default_browse_truncate")]
    pub browse_truncate: usize,
    #[serde(default = "default_dashboard_truncate")]
    pub dashboard_truncate: usize,
}

fn default_page_size() -> usize {
    20
}

fn default_pagination_threshold() -> usize {
    40
}

fn default_browse_truncate() -> usize {
    150
}

fn default_dashboard_truncate() -> usize {
    100
}

impl Default for ViewsSection {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
            pagination_threshold: default_pagination_threshold(),
            browse_truncate: default_browse_truncate(),
            dashboard_truncate: default_dashboard_truncate(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WebSection {
    #[serde(default = "default_web_url")]
    pub base_url: String,
}

fn default_web_url() -> String {
    "http://localhost:5500".to_string()
}

impl Default for WebSection {
    fn default() -> Self {
        Self {
            base_url: default_web_url(),
        }
    }
}

/// Parsed `taskerrand.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ClientConfig {
    #[serde(default)]
    pub api: ApiSection,
    #[serde(default)]
    pub auth: AuthSection,
    #[serde(default)]
    pub poll: PollSection,
    #[serde(default)]
    pub views: ViewsSection,
    #[serde(default)]
    pub web: WebSection,
}

impl ClientConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse taskerrand.toml")
    }

    /// Load `path`, or defaults when it does not exist.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            Ok(Self::default())
        }
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        let content = toml::to_string_pretty(self).context("Failed to serialize taskerrand.toml")?;
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;
        Ok(())
    }

    /// Overlay environment values. `get` abstracts `std::env::var` for tests.
    pub fn apply_env(&mut self, get: impl Fn(&str) -> Option<String>) {
        let non_empty = |key: &str| get(key).filter(|v| !v.trim().is_empty());
        if let Some(url) = non_empty(ENV_API_URL) {
            self.api.base_url = url;
        }
        if let Some(token) = non_empty(ENV_TOKEN) {
            self.auth.token = Some(token);
        }
        if let Some(cmd) = non_empty(ENV_TOKEN_COMMAND) {
            self.auth.token_command = Some(cmd);
        }
    }

    /// Problems worth reporting before any request is made.
    pub fn validate(&self) -> Vec<String> {
        let mut problems = Vec::new();
        if !self.api.base_url.starts_with("http://") && !self.api.base_url.starts_with("https://") {
            problems.push(format!(
                "api.base_url must start with http:// or https:// (got '{}')",
                self.api.base_url
            ));
        }
        if self.poll.interval_secs == 0 {
            problems.push("poll.interval_secs must be at least 1".to_string());
        }
        if self.views.page_size == 0 {
            problems.push("views.page_size must be at least 1".to_string());
        }
        problems
    }

    pub fn view_config(&self) -> ViewConfig {
        ViewConfig {
            page_size: self.views.page_size.max(1),
            pagination_threshold: self.views.pagination_threshold,
            browse_truncate: self.views.browse_truncate,
            dashboard_truncate: self.views.dashboard_truncate,
        }
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll.interval_secs.max(1))
    }

    fn identity(&self) -> Identity {
        Identity {
            display_name: self.auth.display_name.clone(),
            photo_url: self.auth.photo_url.clone(),
        }
    }

    /// Token source: the command when set, else the static token.
    pub fn token_provider(&self) -> Arc<dyn TokenProvider> {
        match &self.auth.token_command {
            Some(cmd) => Arc::new(CommandTokenProvider::new(cmd.clone(), self.identity())),
            None => Arc::new(StaticTokenProvider::new(
                self.auth.token.clone(),
                self.identity(),
            )),
        }
    }

    pub fn api_client(&self) -> Result<ApiClient> {
        let auth = AuthBridge::new(self.token_provider());
        ApiClient::new(
            &self.api.base_url,
            auth,
            Duration::from_secs(self.api.timeout_secs),
        )
        .context("Failed to build HTTP client")
    }

    /// Browser link to a task's detail page.
    pub fn task_url(&self, task_id: &Id) -> String {
        format!(
            "{}/task-detail.html?id={}",
            self.web.base_url.trim_end_matches('/'),
            task_id
        )
    }
}

/// `<config_dir>/taskerrand/taskerrand.toml`.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("taskerrand").join(CONFIG_FILE))
}

/// `--config`, then `$TASKERRAND_CONFIG`, then the platform default.
pub fn resolve_config_path(cli: Option<&Path>) -> Option<PathBuf> {
    cli.map(Path::to_path_buf)
        .or_else(|| std::env::var(ENV_CONFIG).ok().map(PathBuf::from))
        .or_else(default_config_path)
}
