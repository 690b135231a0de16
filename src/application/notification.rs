use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard};
use std::time::{Duration, Instant};

use crate::domain::AppError;

pub const DEFAULT_NOTIFICATION_TIMEOUT: Duration = Duration::from_millis(3000);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationType {
    Info,
    Warning,
    Error,
}

#[derive(Debug, Clone)]
pub struct Notification {
    pub id: u64,
    pub message: String,
    pub kind: NotificationType,
    pub created_at: Instant,
    pub timeout: Duration,
}

/// User-visible, non-blocking alerts
pub trait Notifier: Send + Sync {
    fn show(&self, message: String, kind: NotificationType);
}

/// Report an error once: log it, then show `message`, extended with the
/// server's own explanation when there is one.
pub fn handle_error(notifier: &dyn Notifier, error: &AppError, message: &str) {
    tracing::error!(error = %error, "{}", message);

    let text = match error.server_message() {
        Some(server_message) => format!("{}: {}", message, server_message),
        None => message.to_string(),
    };
    notifier.show(text, NotificationType::Error);
}

#[derive(Debug, Default)]
pub struct NotificationCenter {
    next_id: AtomicU64,
    notifications: Mutex<VecDeque<Notification>>,
}

impl NotificationCenter {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, VecDeque<Notification>> {
        self.notifications
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn active(&self) -> Vec<Notification> {
        self.lock().iter().cloned().collect()
    }

    pub fn dismiss(&self, id: u64) {
        self.lock().retain(|n| n.id != id);
    }

    /// Drop every notification whose timeout has elapsed at `now`
    pub fn expire(&self, now: Instant) {
        self.lock()
            .retain(|n| now.saturating_duration_since(n.created_at) < n.timeout);
    }
}

impl Notifier for NotificationCenter {
    fn show(&self, message: String, kind: NotificationType) {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.lock().push_back(Notification {
            id,
            message,
            kind,
            created_at: Instant::now(),
            timeout: DEFAULT_NOTIFICATION_TIMEOUT,
        });
    }
}
