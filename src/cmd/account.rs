//! Account commands: `whoami`, `logout`, `profile`.

use anyhow::{Context, Result};
use console::style;
use taskerrand::config::ClientConfig;
use taskerrand::form::ProfileForm;
use taskerrand::ui::icons::CHECK;
use taskerrand::ui::render;

use super::Ctx;

pub async fn cmd_whoami(ctx: &Ctx) -> Result<()> {
    let identity = ctx.api.auth().require_signed_in()?;
    let user = ctx.api.current_user().await?;
    print!("{}", render::profile(&user));
    if let Some(photo) = &identity.photo_url {
        println!("Photo: {}", photo);
    }
    Ok(())
}

/// Invalidate the session and drop the stored static token.
pub async fn cmd_logout(ctx: &Ctx) -> Result<()> {
    ctx.api.auth().logout().await?;

    if let Some(path) = ctx.config_path.as_deref().filter(|p| p.exists()) {
        let mut file_cfg = ClientConfig::load(path)?;
        if file_cfg.auth.token.take().is_some() {
            file_cfg
                .save(path)
                .with_context(|| format!("Failed to update {}", path.display()))?;
            println!("Removed stored token from {}", path.display());
        }
    }
    if std::env::var(taskerrand::config::ENV_TOKEN).is_ok() {
        println!(
            "{}",
            style("TASKERRAND_TOKEN is still set in the environment").yellow()
        );
    }
    println!("{}Signed out", CHECK);
    Ok(())
}

/// Show the profile, or update it when any field is given.
pub async fn cmd_profile(
    ctx: &Ctx,
    first_name: Option<&str>,
    last_name: Option<&str>,
    address: Option<&str>,
) -> Result<()> {
    let user = ctx.api.current_user().await?;
    if first_name.is_none() && last_name.is_none() && address.is_none() {
        print!("{}", render::profile(&user));
        return Ok(());
    }

    let mut form = ProfileForm::from_user(&user);
    if let Some(v) = first_name {
        form.first_name = v.to_string();
    }
    if let Some(v) = last_name {
        form.last_name = v.to_string();
    }
    if let Some(v) = address {
        form.address = v.to_string();
    }
    let updated = form.submit(&ctx.api).await?;
    println!("{}Profile updated successfully!", CHECK);
    print!("{}", render::profile(&updated));
    Ok(())
}
