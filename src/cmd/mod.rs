//! CLI command implementations.
//!
//! | Module          | Commands handled                                  |
//! |-----------------|---------------------------------------------------|
//! | `account`       | `Whoami`, `Logout`, `Profile`                     |
//! | `tasks`         | `Browse`, `Search`, `Dashboard`, `User`, `Task`   |
//! | `post`          | `Post`, `Edit`                                    |
//! | `chat`          | `Chat`, `Messages`                                |
//! | `notifications` | `Notifications`                                   |
//! | `report`        | `Report`                                          |
//! | `admin`         | `Admin`                                           |
//! | `config`        | `Config`                                          |

pub mod account;
pub mod admin;
pub mod chat;
pub mod config;
pub mod notifications;
pub mod post;
pub mod report;
pub mod tasks;

pub use account::{cmd_logout, cmd_profile, cmd_whoami};
pub use admin::cmd_admin;
pub use chat::{cmd_chat, cmd_messages};
pub use config::cmd_config;
pub use notifications::cmd_notifications;
pub use post::{cmd_edit, cmd_post};
pub use report::cmd_report;
pub use tasks::{cmd_browse, cmd_dashboard, cmd_search, cmd_task, cmd_user};

use std::path::{Path, PathBuf};

use anyhow::Result;
use taskerrand::api::ApiClient;
use taskerrand::config::{ClientConfig, resolve_config_path};
use taskerrand::errors::{ApiError, AuthError, SessionError};
use taskerrand::models::Id;

/// Everything a command needs: effective config and an authenticated client.
pub struct Ctx {
    pub config: ClientConfig,
    pub config_path: Option<PathBuf>,
    pub api: ApiClient,
}

impl Ctx {
    pub fn load(cli_config: Option<&Path>, api_url: Option<&str>) -> Result<Self> {
        let config_path = resolve_config_path(cli_config);
        let mut config = match &config_path {
            Some(path) => ClientConfig::load_or_default(path)?,
            None => ClientConfig::default(),
        };
        config.apply_env(|key| std::env::var(key).ok());
        if let Some(url) = api_url {
            config.api.base_url = url.to_string();
        }
        for problem in config.validate() {
            tracing::warn!("{}", problem);
        }
        let api = config.api_client()?;
        Ok(Self {
            config,
            config_path,
            api,
        })
    }
}

/// Numeric ids travel as numbers, anything else as text.
pub fn parse_id(raw: &str) -> Id {
    let trimmed = raw.trim();
    match trimmed.parse::<i64>() {
        Ok(n) => Id::Num(n),
        Err(_) => Id::Text(trimmed.to_string()),
    }
}

/// Ask before an irreversible action unless `--yes` was given.
pub fn confirm(prompt: &str, yes: bool) -> bool {
    if yes {
        return true;
    }
    dialoguer::Confirm::new()
        .with_prompt(prompt)
        .default(false)
        .interact()
        .unwrap_or(false)
}

fn auth_message() -> String {
    "Not signed in. Set TASKERRAND_TOKEN or [auth] token_command in taskerrand.toml.".to_string()
}

/// User-facing text for a failed command.
pub fn describe_error(err: &anyhow::Error) -> String {
    let api = err
        .downcast_ref::<ApiError>()
        .or_else(|| match err.downcast_ref::<SessionError>() {
            Some(SessionError::Api(api)) => Some(api),
            _ => None,
        });
    if let Some(api) = api {
        return match api {
            ApiError::Unauthenticated(_) => auth_message(),
            ApiError::Forbidden(msg) => format!("{} (redirecting to dashboard)", msg),
            other => other.to_string(),
        };
    }
    if err.downcast_ref::<AuthError>().is_some() {
        return auth_message();
    }
    format!("{:#}", err)
}
