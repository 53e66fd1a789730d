//! Push notification handling.
//!
//! Inbound push messages are turned into local notifications and handed to
//! a [`NotificationSink`]. A message may carry a data payload, a notification
//! payload, or both; each renders independently, data first.

use std::collections::HashMap;
use std::sync::Mutex;

use serde::Deserialize;
use tracing::{debug, info};

use lookoot_core::{UserId, validation};

use crate::db::UserRepository;
use crate::error::Result;
use crate::remote::DocumentStore;

/// Display payload of a push message.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct NotificationPayload {
    pub title: Option<String>,
    pub body: Option<String>,
}

/// A push message as delivered by the messaging service.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct PushMessage {
    pub from: Option<String>,
    pub data: HashMap<String, String>,
    pub notification: Option<NotificationPayload>,
}

/// A notification ready to show on the device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalNotification {
    pub title: String,
    pub body: String,
}

impl PushMessage {
    /// Local notifications this message should produce.
    ///
    /// A data payload needs both `title` and `message` to render.
    #[must_use]
    pub fn render(&self) -> Vec<LocalNotification> {
        let mut rendered = Vec::new();
        if let (Some(title), Some(message)) = (self.data.get("title"), self.data.get("message")) {
            rendered.push(LocalNotification {
                title: title.clone(),
                body: message.clone(),
            });
        }
        if let Some(payload) = &self.notification {
            rendered.push(LocalNotification {
                title: payload.title.clone().unwrap_or_default(),
                body: payload.body.clone().unwrap_or_default(),
            });
        }
        rendered
    }
}

/// Where local notifications are shown.
pub trait NotificationSink: Send + Sync {
    fn show(&self, notification: LocalNotification);
}

/// Sink that records notifications, for tests and the CLI.
#[derive(Debug, Default)]
pub struct MemorySink {
    shown: Mutex<Vec<LocalNotification>>,
}

impl MemorySink {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn shown(&self) -> Vec<LocalNotification> {
        self.shown
            .lock()
            .map(|shown| shown.clone())
            .unwrap_or_default()
    }
}

impl NotificationSink for MemorySink {
    fn show(&self, notification: LocalNotification) {
        if let Ok(mut shown) = self.shown.lock() {
            shown.push(notification);
        }
    }
}

/// Render `message` to `sink`, returning how many notifications were shown.
pub fn handle_push(message: &PushMessage, sink: &dyn NotificationSink) -> usize {
    debug!(from = ?message.from, has_data = !message.data.is_empty(), "Push message received");
    let rendered = message.render();
    let count = rendered.len();
    for notification in rendered {
        sink.show(notification);
    }
    count
}

/// Messaging token registration.
pub struct NotificationService<'a> {
    users: UserRepository<'a>,
}

impl<'a> NotificationService<'a> {
    #[must_use]
    pub const fn new(store: &'a dyn DocumentStore) -> Self {
        Self {
            users: UserRepository::new(store),
        }
    }

    /// Store the device's messaging token on the user document.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Validation` for a blank token and
    /// `AppError::Database` if the user does not exist.
    pub async fn register_token(&self, uid: &UserId, token: &str) -> Result<()> {
        validation::required("Messaging token", token)?;
        self.users.set_messaging_token(uid, token.trim()).await?;
        info!(user_id = %uid, "Registered messaging token");
        Ok(())
    }
}
