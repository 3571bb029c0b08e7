//! Configuration view and initialization commands: `taskerrand config`.

use std::path::Path;

use anyhow::{Result, bail};
use taskerrand::config::{ClientConfig, resolve_config_path};
use taskerrand::ui::icons::WARN;

use crate::ConfigCommands;

fn redact(token: &Option<String>) -> &'static str {
    match token {
        Some(t) if !t.trim().is_empty() => "\"********\"",
        _ => "(unset)",
    }
}

fn print_values(config: &ClientConfig) {
    println!("[api]");
    println!("  base_url = \"{}\"", config.api.base_url);
    println!("  timeout_secs = {}", config.api.timeout_secs);
    println!();
    println!("[auth]");
    println!("  token = {}", redact(&config.auth.token));
    if let Some(cmd) = &config.auth.token_command {
        println!("  token_command = \"{}\"", cmd);
    }
    if let Some(name) = &config.auth.display_name {
        println!("  display_name = \"{}\"", name);
    }
    println!();
    println!("[poll]");
    println!("  interval_secs = {}", config.poll.interval_secs);
    println!();
    println!("[views]");
    println!("  page_size = {}", config.views.page_size);
    println!(
        "  pagination_threshold = {}",
        config.views.pagination_threshold
    );
    println!("  browse_truncate = {}", config.views.browse_truncate);
    println!("  dashboard_truncate = {}", config.views.dashboard_truncate);
    println!();
    println!("[web]");
    println!("  base_url = \"{}\"", config.web.base_url);
    println!();
}

pub fn cmd_config(cli_config: Option<&Path>, command: Option<ConfigCommands>) -> Result<()> {
    let config_path = resolve_config_path(cli_config);

    match command {
        None | Some(ConfigCommands::Show) => {
            println!();
            println!("Taskerrand Configuration");
            println!("========================");
            println!();

            let mut config = match &config_path {
                Some(path) if path.exists() => {
                    println!("Config file: {}", path.display());
                    ClientConfig::load(path)?
                }
                Some(path) => {
                    println!("No config file at {} (using defaults)", path.display());
                    ClientConfig::default()
                }
                None => {
                    println!("No config directory available (using defaults)");
                    ClientConfig::default()
                }
            };
            println!();

            println!("Effective values (with env overrides):");
            config.apply_env(|key| std::env::var(key).ok());
            print_values(&config);

            let warnings = config.validate();
            if !warnings.is_empty() {
                println!("Configuration warnings:");
                for warning in warnings {
                    println!("  {}{}", WARN, warning);
                }
                println!();
            }
        }
        Some(ConfigCommands::Init { force }) => {
            let Some(path) = config_path else {
                bail!("Could not determine a config directory; pass --config <path>");
            };
            if path.exists() && !force {
                println!("Config already exists at {}", path.display());
                println!("Use --force to overwrite it.");
                return Ok(());
            }

            ClientConfig::default().save(&path)?;

            println!("Created {}", path.display());
            println!();
            println!("You can now customize:");
            println!("  - [api] base_url, timeout_secs");
            println!("  - [auth] token_command (prints an ID token on stdout)");
            println!("  - [poll] interval_secs");
            println!();
        }
    }

    Ok(())
}
