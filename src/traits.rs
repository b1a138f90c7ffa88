//! Abstractions for user-facing side effects.
//!
//! `Notifier` is the toast boundary: exports and refreshes report their
//! outcome through it, and tests swap in `MockNotifier`.

use std::sync::{Arc, Mutex, PoisonError};

use anyhow::Result;

/// Trait for abstracting transient user notifications.
pub trait Notifier: Send + Sync {
    /// Show a notification with the given title and body.
    fn notify(&self, title: &str, body: &str) -> Result<()>;
}

/// Notifier that only writes to the log, for headless use.
#[derive(Debug, Clone, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, title: &str, body: &str) -> Result<()> {
        tracing::info!(target: "lexboard::toast", "{}: {}", title, body);
        Ok(())
    }
}

/// Desktop toast notifications through notify-rust.
#[cfg(feature = "desktop")]
#[derive(Debug, Clone, Default)]
pub struct SystemNotifier;

#[cfg(feature = "desktop")]
impl Notifier for SystemNotifier {
    fn notify(&self, title: &str, body: &str) -> Result<()> {
        notify_rust::Notification::new()
            .summary(title)
            .body(body)
            .appname("Lexboard")
            .timeout(notify_rust::Timeout::Milliseconds(4000))
            .show()?;
        Ok(())
    }
}

/// Mock notifier for testing that records the title of every notification.
#[derive(Debug, Clone, Default)]
pub struct MockNotifier {
    titles: Arc<Mutex<Vec<String>>>,
}

impl MockNotifier {
    /// Create a new mock notifier.
    pub fn new() -> Self {
        Self::default()
    }

    /// Titles only, in the order they were shown.
    pub fn titles(&self) -> Vec<String> {
        self.titles
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl Notifier for MockNotifier {
    fn notify(&self, title: &str, body: &str) -> Result<()> {
        tracing::trace!(title, body, "mock notification");
        self.titles
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(title.to_string());
        Ok(())
    }
}
