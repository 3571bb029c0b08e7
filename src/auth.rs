//! Identity bridge.
//!
//! Sign-in happens elsewhere (the identity provider). The bridge only answers
//! "who is signed in" and hands out a bearer token on demand. Tokens are not
//! cached here: every API request asks the provider again, so short-lived
//! tokens are refreshed by whatever issues them.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use tokio::process::Command;

use crate::errors::AuthError;

/// Display identity of the signed-in account.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Identity {
    pub display_name: Option<String>,
    pub photo_url: Option<String>,
}

impl Identity {
    pub fn label(&self) -> &str {
        self.display_name.as_deref().unwrap_or("Signed in")
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthState {
    SignedIn(Identity),
    SignedOut,
}

/// Source of bearer tokens.
#[async_trait]
pub trait TokenProvider: Send + Sync {
    /// Identity of the current account, or `None` when nobody is signed in.
    fn identity(&self) -> Option<Identity>;

    /// A fresh token for one request.
    async fn token(&self) -> Result<String, AuthError>;

    /// Invalidate the provider-side session. Default: nothing to invalidate.
    async fn sign_out(&self) -> Result<(), AuthError> {
        Ok(())
    }
}

/// A fixed token, e.g. from `TASKERRAND_TOKEN`.
pub struct StaticTokenProvider {
    token: Option<String>,
    identity: Identity,
}

impl StaticTokenProvider {
    pub fn new(token: Option<String>, identity: Identity) -> Self {
        let token = token.filter(|t| !t.trim().is_empty());
        Self { token, identity }
    }
}

#[async_trait]
impl TokenProvider for StaticTokenProvider {
    fn identity(&self) -> Option<Identity> {
        self.token.as_ref().map(|_| self.identity.clone())
    }

    async fn token(&self) -> Result<String, AuthError> {
        self.token.clone().ok_or(AuthError::SignedOut)
    }
}

/// Runs a shell command that prints a fresh ID token on stdout.
pub struct CommandTokenProvider {
    command: String,
    identity: Identity,
}

impl CommandTokenProvider {
    pub fn new(command: impl Into<String>, identity: Identity) -> Self {
        Self {
            command: command.into(),
            identity,
        }
    }

    fn shell(&self) -> Command {
        #[cfg(windows)]
        {
            let mut cmd = Command::new("cmd");
            cmd.arg("/C").arg(&self.command);
            cmd
        }
        #[cfg(not(windows))]
        {
            let mut cmd = Command::new("sh");
            cmd.arg("-c").arg(&self.command);
            cmd
        }
    }
}

#[async_trait]
impl TokenProvider for CommandTokenProvider {
    fn identity(&self) -> Option<Identity> {
        Some(self.identity.clone())
    }

    async fn token(&self) -> Result<String, AuthError> {
        let output = self
            .shell()
            .output()
            .await
            .map_err(AuthError::CommandSpawn)?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(AuthError::TokenUnavailable(format!(
                "token command exited with {}: {}",
                output.status,
                stderr.trim()
            )));
        }

        let token = String::from_utf8_lossy(&output.stdout).trim().to_string();
        if token.is_empty() {
            return Err(AuthError::TokenUnavailable(
                "token command printed nothing".to_string(),
            ));
        }
        Ok(token)
    }
}

/// First characters of a token, for trace logs.
pub fn token_preview(token: &str) -> String {
    let prefix: String = token.chars().take(8).collect();
    format!("{}...", prefix)
}

/// Gate in front of every authenticated call.
#[derive(Clone)]
pub struct AuthBridge {
    provider: Arc<dyn TokenProvider>,
    signed_out: Arc<AtomicBool>,
}

impl AuthBridge {
    pub fn new(provider: Arc<dyn TokenProvider>) -> Self {
        Self {
            provider,
            signed_out: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn state(&self) -> AuthState {
        if self.signed_out.load(Ordering::SeqCst) {
            return AuthState::SignedOut;
        }
        match self.provider.identity() {
            Some(identity) => AuthState::SignedIn(identity),
            None => AuthState::SignedOut,
        }
    }

    /// The signed-in identity, or `SignedOut` (callers send the user back to sign-in).
    pub fn require_signed_in(&self) -> Result<Identity, AuthError> {
        match self.state() {
            AuthState::SignedIn(identity) => Ok(identity),
            AuthState::SignedOut => Err(AuthError::SignedOut),
        }
    }

    pub async fn token(&self) -> Result<String, AuthError> {
        self.require_signed_in()?;
        let token = self.provider.token().await?;
        tracing::trace!(token = %token_preview(&token), "obtained bearer token");
        Ok(token)
    }

    /// Invalidate the session. Later `token()` calls fail with `SignedOut`.
    pub async fn logout(&self) -> Result<(), AuthError> {
        self.provider.sign_out().await?;
        self.signed_out.store(true, Ordering::SeqCst);
        tracing::info!("signed out");
        Ok(())
    }
}
