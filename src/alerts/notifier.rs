//! Alert notification system
//!
//! Provides the notification channels alerts are dispatched through:
//! terminal, log, and a webhook push relay.

use super::types::AlertSeverity;
use crate::error::DispatchError;
use serde::Serialize;
use std::io::{self, Write};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Notification channel trait
///
/// Dispatch is best-effort. Callers log failures and carry on.
pub trait Notifier: Send + Sync {
    /// Show a notification to the user
    fn show(&self, title: &str, body: &str, severity: AlertSeverity) -> Result<(), DispatchError>;

    /// Channel name for identification
    fn name(&self) -> &str;

    /// Deliveries accepted by `show` that have not finished yet
    fn pending(&self) -> usize {
        0
    }
}

impl<N: Notifier + ?Sized> Notifier for Arc<N> {
    fn show(&self, title: &str, body: &str, severity: AlertSeverity) -> Result<(), DispatchError> {
        (**self).show(title, body, severity)
    }

    fn name(&self) -> &str {
        (**self).name()
    }

    fn pending(&self) -> usize {
        (**self).pending()
    }
}

/// Wait until `notifier` has no deliveries in flight, at most `timeout`
///
/// Returns `false` if deliveries were still pending at the deadline.
pub async fn drain(notifier: &dyn Notifier, timeout: Duration) -> bool {
    let deadline = tokio::time::Instant::now() + timeout;
    while notifier.pending() > 0 {
        if tokio::time::Instant::now() >= deadline {
            return false;
        }
        tokio::time::sleep(Duration::from_millis(25)).await;
    }
    true
}

/// Terminal/console notifier
///
/// Outputs alerts to stdout/stderr with colored formatting
pub struct TerminalNotifier {
    /// Use stderr instead of stdout
    use_stderr: bool,
    /// Use colors (ANSI escape codes)
    use_colors: bool,
}

impl TerminalNotifier {
    /// Create a new terminal notifier
    pub fn new() -> Self {
        Self {
            use_stderr: true,
            use_colors: Self::supports_color(),
        }
    }

    /// Create a notifier that uses stdout
    pub fn stdout() -> Self {
        Self {
            use_stderr: false,
            use_colors: Self::supports_color(),
        }
    }

    /// Create a notifier without colors
    pub fn no_color() -> Self {
        Self {
            use_stderr: true,
            use_colors: false,
        }
    }

    fn supports_color() -> bool {
        std::env::var("TERM")
            .map(|term| term != "dumb")
            .unwrap_or(false)
            && std::env::var_os("NO_COLOR").is_none()
    }

    fn format_line(&self, title: &str, body: &str, severity: AlertSeverity) -> String {
        format!(
            "[{}] {} {}: {}",
            chrono::Local::now().format("%H:%M:%S"),
            self.format_severity(severity),
            title,
            body
        )
    }

    /// Format severity with colors
    fn format_severity(&self, severity: AlertSeverity) -> String {
        if !self.use_colors {
            return format!("{}", severity);
        }

        let color_code = match severity {
            AlertSeverity::Info => "\x1b[36m",            // Cyan
            AlertSeverity::Warning => "\x1b[33m",         // Yellow
            AlertSeverity::Critical => "\x1b[31m",        // Red
            AlertSeverity::Emergency => "\x1b[35m\x1b[1m", // Bold Magenta
        };

        format!("{}{}\x1b[0m", color_code, severity)
    }
}

impl Default for TerminalNotifier {
    fn default() -> Self {
        Self::new()
    }
}

impl Notifier for TerminalNotifier {
    fn show(&self, title: &str, body: &str, severity: AlertSeverity) -> Result<(), DispatchError> {
        let line = self.format_line(title, body, severity);

        let result = if self.use_stderr {
            writeln!(io::stderr().lock(), "{}", line)
        } else {
            writeln!(io::stdout().lock(), "{}", line)
        };

        result.map_err(|e| DispatchError::DispatchFailure {
            notifier: self.name().to_string(),
            message: e.to_string(),
        })
    }

    fn name(&self) -> &str {
        "terminal"
    }
}

/// Notifier that writes through the `log` facade
#[derive(Debug, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn show(&self, title: &str, body: &str, severity: AlertSeverity) -> Result<(), DispatchError> {
        let level = match severity {
            AlertSeverity::Info => log::Level::Info,
            AlertSeverity::Warning => log::Level::Warn,
            AlertSeverity::Critical | AlertSeverity::Emergency => log::Level::Error,
        };
        log::log!(level, "{}: {}", title, body);
        Ok(())
    }

    fn name(&self) -> &str {
        "log"
    }
}

#[derive(Debug, Serialize)]
struct WebhookPayload<'a> {
    title: &'a str,
    body: &'a str,
    severity: AlertSeverity,
}

/// Push relay notifier
///
/// POSTs `{title, body, severity}` as JSON to a relay URL. The request runs
/// detached on the current tokio runtime, so `show` succeeds once the
/// request is handed off. A relay that rejects the notification or cannot
/// be reached is only logged; use [`drain`] to wait for delivery.
pub struct WebhookNotifier {
    client: reqwest::Client,
    url: String,
    in_flight: Arc<AtomicUsize>,
}

/// Counts one detached request until it is dropped
struct InFlight(Arc<AtomicUsize>);

impl InFlight {
    fn new(counter: &Arc<AtomicUsize>) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        Self(Arc::clone(counter))
    }
}

impl Drop for InFlight {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

impl WebhookNotifier {
    /// Create a notifier posting to `url`
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, DispatchError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| DispatchError::DispatchFailure {
                notifier: "webhook".to_string(),
                message: e.to_string(),
            })?;

        Ok(Self {
            client,
            url: url.into(),
            in_flight: Arc::new(AtomicUsize::new(0)),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

impl Notifier for WebhookNotifier {
    fn show(&self, title: &str, body: &str, severity: AlertSeverity) -> Result<(), DispatchError> {
        let handle = tokio::runtime::Handle::try_current()
            .map_err(|_| DispatchError::RuntimeUnavailable(self.name().to_string()))?;

        let request = self.client.post(&self.url).json(&WebhookPayload {
            title,
            body,
            severity,
        });
        let url = self.url.clone();
        let guard = InFlight::new(&self.in_flight);

        handle.spawn(async move {
            let _guard = guard;
            match request.send().await {
                Ok(response) if response.status().is_success() => {
                    log::debug!("Webhook {} accepted notification", url);
                }
                Ok(response) => {
                    log::warn!("Webhook {} rejected notification: {}", url, response.status());
                }
                Err(e) => log::warn!("Webhook {} unreachable: {}", url, e),
            }
        });

        Ok(())
    }

    fn name(&self) -> &str {
        "webhook"
    }

    fn pending(&self) -> usize {
        self.in_flight.load(Ordering::SeqCst)
    }
}

/// Notification manager
///
/// Fans a notification out to multiple channels. Every channel is tried;
/// the first failure, if any, is reported.
pub struct NotificationManager {
    notifiers: Vec<Box<dyn Notifier>>,
}

impl NotificationManager {
    /// Create a new notification manager
    pub fn new() -> Self {
        Self {
            notifiers: Vec::new(),
        }
    }

    /// Add a notifier
    pub fn add_notifier(&mut self, notifier: Box<dyn Notifier>) {
        self.notifiers.push(notifier);
    }

    /// Get number of active notifiers
    pub fn notifier_count(&self) -> usize {
        self.notifiers.len()
    }
}

impl Default for NotificationManager {
    fn default() -> Self {
        let mut manager = Self::new();
        manager.add_notifier(Box::new(TerminalNotifier::new()));
        manager
    }
}

impl Notifier for NotificationManager {
    fn show(&self, title: &str, body: &str, severity: AlertSeverity) -> Result<(), DispatchError> {
        let mut first_error = None;
        for notifier in &self.notifiers {
            if let Err(e) = notifier.show(title, body, severity) {
                log::warn!("Failed to notify via {}: {}", notifier.name(), e);
                first_error.get_or_insert(e);
            }
        }
        first_error.map_or(Ok(()), Err)
    }

    fn name(&self) -> &str {
        "manager"
    }

    fn pending(&self) -> usize {
        self.notifiers.iter().map(|n| n.pending()).sum()
    }
}
