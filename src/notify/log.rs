//! Notifier that only writes alerts to the log.

use async_trait::async_trait;

use super::Notifier;
use crate::error::NotifyError;

/// Fallback [`Notifier`] used when no external channel is configured.
///
/// Alerts are emitted at `ERROR` level under the `alert` target so they
/// can be routed separately with an `EnvFilter` directive.
#[derive(Debug, Clone, Default)]
pub struct LogNotifier;

impl LogNotifier {
    /// Creates a new log notifier.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Notifier for LogNotifier {
    async fn send(&self, message: &str) -> Result<(), NotifyError> {
        tracing::error!(target: "alert", %message, "escalated failure");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn never_fails() {
        let notifier = LogNotifier::new();
        tokio_test::assert_ok!(notifier.send("boom").await);
    }
}
