//! Toast notifications
//!
//! Transient messages surfaced after user actions. The controller only sees the
//! [`Notifier`] trait so it can run without a terminal attached.

/// Title shown when a refresh completes
pub const SUCCESS_TITLE: &str = "Process success.";

/// Title shown for every refresh failure
pub const FAILURE_TITLE: &str = "Something went wrong.";

/// A single toast
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub title: String,
    pub description: Option<String>,
}

impl Notification {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn success() -> Self {
        Self::new(SUCCESS_TITLE)
    }

    pub fn failure() -> Self {
        Self::new(FAILURE_TITLE)
    }
}

/// Fire-and-forget notification sink
pub trait Notifier: Send + Sync {
    fn notify(&self, notification: Notification);
}

/// Prints toasts to the terminal
#[derive(Debug, Clone)]
pub struct ConsoleNotifier {
    enabled: bool,
}

impl ConsoleNotifier {
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }

    fn render(notification: &Notification) -> String {
        match &notification.description {
            Some(description) => format!("{}\n  {}", notification.title, description),
            None => notification.title.clone(),
        }
    }
}

impl Notifier for ConsoleNotifier {
    fn notify(&self, notification: Notification) {
        tracing::info!(
            title = %notification.title,
            description = notification.description.as_deref().unwrap_or(""),
            "Notification"
        );
        if self.enabled {
            println!("{}", Self::render(&notification));
        }
    }
}

/// Records every toast, for tests
#[cfg(test)]
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    sent: std::sync::Mutex<Vec<Notification>>,
}

#[cfg(test)]
impl RecordingNotifier {
    pub fn sent(&self) -> Vec<Notification> {
        self.sent.lock().map(|s| s.clone()).unwrap_or_default()
    }
}

#[cfg(test)]
impl Notifier for RecordingNotifier {
    fn notify(&self, notification: Notification) {
        if let Ok(mut sent) = self.sent.lock() {
            sent.push(notification);
        }
    }
}
