//! Notification bell and dropdown.
//!
//! Every page embeds the same panel, so its behavior is parameterized by
//! [`PanelConfig`] instead of being re-implemented per view.

use crate::api::ApiClient;
use crate::errors::ApiError;
use crate::models::{Id, Notification};
use crate::timefmt::{self, DateStyle};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PanelConfig {
    /// Offer a "View" action for notifications that reference a task.
    pub show_view: bool,
    /// Ctrl/Cmd + View opens the task in a new tab.
    pub open_in_new_tab_on_modifier: bool,
    pub date_style: DateStyle,
}

impl Default for PanelConfig {
    fn default() -> Self {
        Self {
            show_view: true,
            open_in_new_tab_on_modifier: true,
            date_style: DateStyle::DateTime,
        }
    }
}

/// Modifier keys held while activating "View".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Modifiers {
    pub ctrl: bool,
    pub meta: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Navigation {
    pub task_id: Id,
    pub new_tab: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelEvent {
    BellClicked,
    OutsideClicked,
    InsideClicked,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NotificationEntry {
    pub id: Id,
    pub title: String,
    pub message: String,
    pub timestamp: String,
    pub unread: bool,
    pub has_view: bool,
    pub has_delete: bool,
}

#[derive(Debug, Default)]
pub struct NotificationPanel {
    config: PanelConfig,
    items: Vec<Notification>,
    open: bool,
}

impl NotificationPanel {
    pub fn new(config: PanelConfig) -> Self {
        Self {
            config,
            items: Vec::new(),
            open: false,
        }
    }

    /// Replace the list with the backend's.
    pub async fn load(&mut self, api: &ApiClient) -> Result<(), ApiError> {
        self.items = api.notifications().await?;
        tracing::debug!(count = self.items.len(), "notifications loaded");
        Ok(())
    }

    pub fn set_items(&mut self, items: Vec<Notification>) {
        self.items = items;
    }

    pub fn items(&self) -> &[Notification] {
        &self.items
    }

    pub fn unread_count(&self) -> usize {
        self.items.iter().filter(|n| !n.seen).count()
    }

    /// Badge text; hidden when nothing is unread.
    pub fn badge(&self) -> Option<usize> {
        match self.unread_count() {
            0 => None,
            n => Some(n),
        }
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn entries(&self) -> Vec<NotificationEntry> {
        self.items
            .iter()
            .map(|n| NotificationEntry {
                id: n.id.clone(),
                title: n.title.clone(),
                message: n.message.clone(),
                timestamp: timefmt::format_opt(n.created_at.as_deref(), self.config.date_style),
                unread: !n.seen,
                has_view: self.config.show_view && n.task_id.is_some(),
                has_delete: true,
            })
            .collect()
    }

    /// Mark read (only if unread), close the dropdown and return where to go.
    ///
    /// Returns `Ok(None)` for an unknown id or one with no task.
    pub async fn view(
        &mut self,
        api: &ApiClient,
        id: &Id,
        modifiers: Modifiers,
    ) -> Result<Option<Navigation>, ApiError> {
        let Some(idx) = self.items.iter().position(|n| n.id.matches(id)) else {
            return Ok(None);
        };
        if !self.items[idx].seen {
            api.mark_notification_read(id).await?;
            self.items[idx].seen = true;
        }
        self.open = false;

        let new_tab = self.config.open_in_new_tab_on_modifier && (modifiers.ctrl || modifiers.meta);
        Ok(self.items[idx].task_id.clone().map(|task_id| Navigation { task_id, new_tab }))
    }

    /// Delete on the backend, then drop it locally.
    pub async fn delete(&mut self, api: &ApiClient, id: &Id) -> Result<(), ApiError> {
        api.delete_notification(id).await?;
        self.remove_local(id);
        Ok(())
    }

    fn remove_local(&mut self, id: &Id) {
        self.items.retain(|n| !n.id.matches(id));
    }

    /// Dropdown state machine. Returns whether the event was consumed.
    pub fn handle(&mut self, event: PanelEvent) -> bool {
        match event {
            PanelEvent::BellClicked => {
                self.open = !self.open;
                true
            }
            PanelEvent::OutsideClicked => {
                self.open = false;
                false
            }
            PanelEvent::InsideClicked => true,
        }
    }
}
