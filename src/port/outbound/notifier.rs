//! Notifier port for arbitrage alerts.
//!
//! The pipeline formats the message; a [`Notifier`] only delivers it.

use async_trait::async_trait;
use tracing::info;

use crate::error::DeliveryError;

/// Delivers formatted alert text.
///
/// # Implementation Notes
///
/// - Implementations must be thread-safe (`Send + Sync`)
/// - The caller bounds every `send` with a timeout and never retries, so a
///   slow or failing sink cannot stall the refresh loop or duplicate alerts
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Deliver a single message.
    async fn send(&self, message: &str) -> Result<(), DeliveryError>;

    /// Notifier name for logging.
    fn name(&self) -> &'static str;
}

/// Registry of notifiers (composite pattern).
///
/// Delivers each message to every registered notifier in order. Every
/// notifier is attempted; the first error is returned.
pub struct NotifierRegistry {
    notifiers: Vec<Box<dyn Notifier>>,
}

impl NotifierRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self { notifiers: vec![] }
    }

    /// Register a notifier.
    pub fn register(&mut self, notifier: Box<dyn Notifier>) {
        self.notifiers.push(notifier);
    }

    /// Names of the registered notifiers.
    #[must_use]
    pub fn names(&self) -> Vec<&'static str> {
        self.notifiers.iter().map(|n| n.name()).collect()
    }

    /// Number of registered notifiers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.notifiers.len()
    }

    /// Check if registry is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.notifiers.is_empty()
    }
}

impl Default for NotifierRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Notifier for NotifierRegistry {
    async fn send(&self, message: &str) -> Result<(), DeliveryError> {
        let mut first_error = None;
        for notifier in &self.notifiers {
            if let Err(err) = notifier.send(message).await {
                first_error.get_or_insert(err);
            }
        }
        first_error.map_or(Ok(()), Err)
    }

    fn name(&self) -> &'static str {
        "registry"
    }
}

/// A no-op notifier for testing or when notifications are disabled.
pub struct NullNotifier;

#[async_trait]
impl Notifier for NullNotifier {
    async fn send(&self, _message: &str) -> Result<(), DeliveryError> {
        Ok(())
    }

    fn name(&self) -> &'static str {
        "null"
    }
}

/// A notifier that writes alerts to the log via tracing.
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn send(&self, message: &str) -> Result<(), DeliveryError> {
        info!(message = %message, "Arbitrage alert");
        Ok(())
    }

    fn name(&self) -> &'static str {
        "log"
    }
}
