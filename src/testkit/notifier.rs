//! Notifier doubles.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use crate::error::DeliveryError;
use crate::port::outbound::notifier::Notifier;

/// Thread-safe message collector for notification assertions in tests.
#[derive(Clone, Default)]
pub struct RecordingNotifier {
    messages: Arc<Mutex<Vec<String>>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.messages.lock().expect("lock notifier messages").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn messages(&self) -> Vec<String> {
        self.messages.lock().expect("lock notifier messages").clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send(&self, message: &str) -> Result<(), DeliveryError> {
        self.messages
            .lock()
            .expect("lock notifier messages")
            .push(message.to_string());
        Ok(())
    }

    fn name(&self) -> &'static str {
        "recording"
    }
}

/// Notifier whose every send fails with a transport error.
pub struct FailingNotifier;

#[async_trait]
impl Notifier for FailingNotifier {
    async fn send(&self, _message: &str) -> Result<(), DeliveryError> {
        Err(DeliveryError::Transport("sink unavailable".into()))
    }

    fn name(&self) -> &'static str {
        "failing"
    }
}

/// Notifier that never finishes within `delay`; exercises the send timeout.
pub struct StalledNotifier {
    pub delay: Duration,
}

#[async_trait]
impl Notifier for StalledNotifier {
    async fn send(&self, _message: &str) -> Result<(), DeliveryError> {
        tokio::time::sleep(self.delay).await;
        Ok(())
    }

    fn name(&self) -> &'static str {
        "stalled"
    }
}
