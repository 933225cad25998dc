//! Publishing side of the bus.
//!
//! The inbox sender lives behind a read/write lock together with the
//! stopped flag: `None` means stopped. Every publish holds the read lock
//! for its whole check-then-send sequence, and the shutdown transition
//! takes the write lock to drop the sender, which closes the inbox. A
//! send can therefore never race with the close.

use std::fmt;
use std::sync::Arc;

use tokio::sync::{RwLock, mpsc};
use tokio_util::sync::CancellationToken;

use super::Escalator;
use crate::domain::Event;
use crate::error::BusError;

/// Shared slot holding the inbox sender while the bus is running.
pub(crate) type InboxSlot = Arc<RwLock<Option<mpsc::Sender<Event>>>>;

/// Cloneable handle for publishing events into the bus.
///
/// Safe to use from many tasks at once, including from inside handlers.
#[derive(Clone)]
pub struct Publisher {
    inbox: InboxSlot,
    stopping: CancellationToken,
    escalator: Arc<Escalator>,
}

impl Publisher {
    pub(crate) fn new(inbox: InboxSlot, stopping: CancellationToken, escalator: Arc<Escalator>) -> Self {
        Self {
            inbox,
            stopping,
            escalator,
        }
    }

    /// Publishes `event` to every interested handler.
    ///
    /// Waits until the inbox accepts the event. If the bus is stopped, or
    /// stops while this call is waiting, the event is dropped and the
    /// rejection is logged and escalated. The caller never sees an error.
    pub async fn publish(&self, event: Event) {
        let _ = self.try_publish(event).await;
    }

    /// Returns `true` once the bus no longer accepts events.
    pub async fn is_stopped(&self) -> bool {
        self.stopping.is_cancelled() || self.inbox.read().await.is_none()
    }

    /// Like [`Publisher::publish`], but also reports a rejection to the
    /// caller after escalating it. The only error is [`BusError::Stopped`].
    pub(crate) async fn try_publish(&self, event: Event) -> Result<(), BusError> {
        let result = self.send(event).await;
        if let Err(err) = &result {
            self.escalator.escalate(err).await;
        }
        result
    }

    async fn send(&self, event: Event) -> Result<(), BusError> {
        let inbox = self.inbox.read().await;
        let Some(sender) = inbox.as_ref() else {
            return Err(BusError::Stopped {
                event: event.to_string(),
            });
        };

        // The wait for capacity is cancelled by shutdown so that a blocked
        // publisher releases its read lock and the bus can close the inbox.
        let permit = tokio::select! {
            biased;
            () = self.stopping.cancelled() => None,
            permit = sender.reserve() => permit.ok(),
        };

        match permit {
            Some(permit) => {
                tracing::debug!(%event, "event published");
                permit.send(event);
                Ok(())
            }
            None => Err(BusError::Stopped {
                event: event.to_string(),
            }),
        }
    }
}

impl fmt::Debug for Publisher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Publisher")
            .field("stopping", &self.stopping.is_cancelled())
            .finish_non_exhaustive()
    }
}
