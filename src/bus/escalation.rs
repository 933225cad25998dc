//! Failure escalation: log, then forward to the notification sink.
//!
//! Escalation is terminal. A failure of the sink itself is logged and
//! dropped, never escalated again.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use tokio::time;

use crate::error::{BusError, NotifyError};
use crate::notify::Notifier;

/// Forwards bus failures to a [`Notifier`] under an independent deadline.
#[derive(Clone)]
pub struct Escalator {
    notifier: Arc<dyn Notifier>,
    timeout: Duration,
}

impl Escalator {
    /// Creates an escalator bounding every notification by `timeout`.
    #[must_use]
    pub fn new(notifier: Arc<dyn Notifier>, timeout: Duration) -> Self {
        Self { notifier, timeout }
    }

    /// Logs `err` and sends it to the notifier.
    ///
    /// The notification deadline is always fresh and does not depend on
    /// the bus shutdown state.
    pub async fn escalate(&self, err: &BusError) {
        tracing::warn!(error = %err, "can't handle event");

        let message = err.to_string();
        let outcome = match time::timeout(self.timeout, self.notifier.send(&message)).await {
            Ok(result) => result,
            Err(_elapsed) => Err(NotifyError::TimedOut(self.timeout)),
        };

        if let Err(notify_err) = outcome {
            tracing::warn!(error = %notify_err, "can't send notification");
        }
    }
}

impl fmt::Debug for Escalator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Escalator")
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::bus::test_support::{FailingNotifier, HangingNotifier, RecordingNotifier};

    fn stopped() -> BusError {
        BusError::Stopped {
            event: "Event(data, usd, RUB, 2022-03-04)".to_string(),
        }
    }

    #[tokio::test]
    async fn forwards_rendered_error() {
        let notifier = Arc::new(RecordingNotifier::default());
        let escalator = Escalator::new(
            Arc::clone(&notifier) as Arc<dyn Notifier>,
            Duration::from_secs(1),
        );

        escalator.escalate(&stopped()).await;

        let messages = notifier.messages();
        assert_eq!(messages.len(), 1);
        assert_eq!(
            messages.first().map(String::as_str),
            Some("stopped before handling event Event(data, usd, RUB, 2022-03-04)")
        );
    }

    #[tokio::test]
    async fn sink_failure_is_swallowed() {
        let notifier = Arc::new(FailingNotifier::default());
        let escalator = Escalator::new(
            Arc::clone(&notifier) as Arc<dyn Notifier>,
            Duration::from_secs(1),
        );

        escalator.escalate(&stopped()).await;
        escalator.escalate(&stopped()).await;

        assert_eq!(notifier.attempts(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn hanging_sink_is_abandoned_after_timeout() {
        let notifier = Arc::new(HangingNotifier);
        let escalator = Escalator::new(notifier, Duration::from_secs(30));

        let started = time::Instant::now();
        escalator.escalate(&stopped()).await;
        assert_eq!(started.elapsed(), Duration::from_secs(30));
    }
}
