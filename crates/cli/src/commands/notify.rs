//! Render a push message the way the device would.

use std::path::Path;

use tracing::info;

use lookoot_client::services::NotificationSink;
use lookoot_client::services::notifications::{LocalNotification, PushMessage, handle_push};

/// Prints notifications to stdout.
struct StdoutSink;

impl NotificationSink for StdoutSink {
    #[allow(clippy::print_stdout)]
    fn show(&self, notification: LocalNotification) {
        println!("{}: {}", notification.title, notification.body);
    }
}

/// Read a JSON push message from `file_path` and show its notifications.
///
/// # Errors
///
/// Returns an error if the file is missing or is not a push message.
pub async fn push(file_path: &str) -> Result<(), Box<dyn std::error::Error>> {
    let path = Path::new(file_path);
    if !path.exists() {
        return Err(format!("File not found: {file_path}").into());
    }

    let content = tokio::fs::read_to_string(path).await?;
    let message: PushMessage = serde_json::from_str(&content)?;
    let shown = handle_push(&message, &StdoutSink);
    info!(shown, "Push message handled");
    Ok(())
}
