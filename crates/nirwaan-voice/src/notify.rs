//! Where user-facing notifications go.

use nirwaan_types::{Notification, Severity};
use tokio::sync::mpsc;

/// Receives notifications the presentation layer should show the user.
pub trait NotificationSink: Send + Sync {
    fn notify(&self, notification: Notification);
}

/// Forwards notifications to a channel; a closed channel drops them.
impl NotificationSink for mpsc::UnboundedSender<Notification> {
    fn notify(&self, notification: Notification) {
        let _ = self.send(notification);
    }
}

/// Writes notifications to the log. Useful when nothing renders toasts.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl NotificationSink for LogSink {
    fn notify(&self, notification: Notification) {
        match notification.severity {
            Severity::Info => tracing::info!(
                title = %notification.title,
                "{}",
                notification.description
            ),
            Severity::Warning | Severity::Destructive => tracing::warn!(
                title = %notification.title,
                "{}",
                notification.description
            ),
        }
    }
}
