//! Per-task chat between poster and seeker.

use crate::api::ApiClient;
use crate::errors::{SessionError, ValidationError};
use crate::models::{Id, Message};
use crate::names::NameCache;
use crate::timefmt::{self, DateStyle};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Alignment {
    Sent,
    Received,
}

/// One rendered chat line.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatLine {
    pub id: Id,
    pub sender_name: String,
    pub content: String,
    pub timestamp: String,
    pub alignment: Alignment,
}

/// Keys the input box reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Enter,
    Other,
}

pub struct MessagePanel {
    api: ApiClient,
    task_id: Id,
    viewer_id: Id,
    names: NameCache,
}

impl MessagePanel {
    pub fn new(api: ApiClient, task_id: Id, viewer_id: Id, names: NameCache) -> Self {
        Self {
            api,
            task_id,
            viewer_id,
            names,
        }
    }

    pub fn task_id(&self) -> &Id {
        &self.task_id
    }

    /// Fetch and render the full history.
    pub async fn load(&self) -> Result<Vec<ChatLine>, SessionError> {
        let messages = self.api.task_messages(&self.task_id).await?;
        let mut lines = Vec::with_capacity(messages.len());
        for message in messages {
            lines.push(self.render(message).await);
        }
        Ok(lines)
    }

    async fn render(&self, message: Message) -> ChatLine {
        let alignment = if message.sender_id.matches(&self.viewer_id) {
            Alignment::Sent
        } else {
            Alignment::Received
        };
        let sender_name = self.names.resolve(&self.api, &message.sender_id).await;
        ChatLine {
            id: message.id,
            sender_name,
            timestamp: timefmt::format_opt(message.created_at.as_deref(), DateStyle::DateTime),
            content: message.content,
            alignment,
        }
    }

    /// Send trimmed `content`, then reload the history.
    ///
    /// Blank input is rejected without touching the network.
    pub async fn send(&self, content: &str) -> Result<Vec<ChatLine>, SessionError> {
        let content = content.trim();
        if content.is_empty() {
            return Err(ValidationError::EmptyMessage.into());
        }
        self.api.send_message(&self.task_id, content).await?;
        tracing::debug!(task_id = %self.task_id, "message sent");
        self.load().await
    }

    /// Input handler: Enter submits, every other key is ignored.
    pub async fn handle_key(
        &self,
        input: &str,
        key: Key,
    ) -> Option<Result<Vec<ChatLine>, SessionError>> {
        match key {
            Key::Enter => Some(self.send(input).await),
            Key::Other => None,
        }
    }
}
