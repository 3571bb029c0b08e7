//! Lazy id → display-name lookups.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::api::ApiClient;
use crate::models::{Id, User};

/// Resolves user ids to display names, one request per id per session.
///
/// Lookups are best-effort: a failed fetch yields the caller's fallback and is
/// not cached, so a later call may still succeed.
#[derive(Clone, Default)]
pub struct NameCache {
    names: Arc<Mutex<HashMap<Id, String>>>,
}

impl NameCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a user already in hand.
    pub fn prime(&self, user: &User) {
        if let Ok(mut names) = self.names.lock() {
            names.insert(user.id.clone(), user.display_name());
        }
    }

    pub fn cached(&self, id: &Id) -> Option<String> {
        self.names.lock().ok().and_then(|n| n.get(id).cloned())
    }

    pub async fn resolve_or(&self, api: &ApiClient, id: &Id, fallback: &str) -> String {
        if let Some(name) = self.cached(id) {
            return name;
        }
        match api.user(id).await {
            Ok(user) => {
                self.prime(&user);
                user.display_name()
            }
            Err(e) => {
                tracing::warn!(user_id = %id, error = %e, "name lookup failed");
                fallback.to_string()
            }
        }
    }

    /// Resolve with the generic "User" fallback.
    pub async fn resolve(&self, api: &ApiClient, id: &Id) -> String {
        self.resolve_or(api, id, "User").await
    }
}
