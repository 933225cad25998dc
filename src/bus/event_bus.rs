//! The event bus: registration, the inbox loop, and concurrent dispatch.
//!
//! ```text
//! Publisher::publish ──► inbox (mpsc) ──► run loop ──► dispatch task per event
//!                                                        ├─► handler task (deadline)
//!                                                        └─► handler task (deadline)
//!                                                               │ failure
//!                                                               ▼
//!                                                           Escalator ──► Notifier
//! ```
//!
//! Shutdown is driven by an external [`CancellationToken`]. The loop stops
//! accepting events, the inbox is closed under the write lock, events
//! already accepted are still dispatched, and `run` returns only after
//! every dispatch task has finished.

use std::collections::HashMap;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{RwLock, mpsc};
use tokio::task::JoinSet;
use tokio::time;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;

use super::publisher::InboxSlot;
use super::{Escalator, Publisher};
use crate::config::BusConfig;
use crate::domain::{Event, EventHandler, HandlerContext};
use crate::error::BusError;
use crate::notify::Notifier;

type Handlers = Arc<[Arc<dyn EventHandler>]>;

/// In-process publish/subscribe bus with bounded, concurrent fan-out.
///
/// Built once at startup: register handlers with [`EventBus::subscribe`],
/// hand out [`Publisher`]s, then move the bus into [`EventBus::run`].
/// Because `run` consumes the bus it can only ever be started once, and
/// no handler can be registered after dispatching begins.
pub struct EventBus {
    config: BusConfig,
    handlers: Vec<Arc<dyn EventHandler>>,
    inbox: InboxSlot,
    receiver: mpsc::Receiver<Event>,
    stopping: CancellationToken,
    escalator: Arc<Escalator>,
}

impl EventBus {
    /// Creates a bus escalating failures to `notifier`.
    #[must_use]
    pub fn new(config: BusConfig, notifier: Arc<dyn Notifier>) -> Self {
        let (sender, receiver) = mpsc::channel(config.inbox_capacity.max(1));
        let escalator = Arc::new(Escalator::new(notifier, config.escalation_timeout));

        Self {
            config,
            handlers: Vec::new(),
            inbox: Arc::new(RwLock::new(Some(sender))),
            receiver,
            stopping: CancellationToken::new(),
            escalator,
        }
    }

    /// Registers a handler. Handlers are consulted in registration order.
    pub fn subscribe(&mut self, handler: impl EventHandler + 'static) {
        tracing::info!(handler = handler.name(), "registered handler");
        self.handlers.push(Arc::new(handler));
    }

    /// Returns a new publishing handle.
    #[must_use]
    pub fn publisher(&self) -> Publisher {
        Publisher::new(
            Arc::clone(&self.inbox),
            self.stopping.clone(),
            Arc::clone(&self.escalator),
        )
    }

    /// Names of the registered handlers, in registration order.
    #[must_use]
    pub fn handler_names(&self) -> Vec<String> {
        self.handlers.iter().map(|h| h.name().to_string()).collect()
    }

    /// Runs the dispatch loop until `shutdown` is cancelled.
    ///
    /// Each received event is dispatched on its own tracked task and the
    /// loop moves on immediately. On cancellation the bus is marked
    /// stopped, the inbox is closed, remaining accepted events are
    /// dispatched, and the call waits for all dispatch work to finish.
    /// Handlers already running are not cancelled; they end on their own
    /// or at their deadline.
    ///
    /// # Errors
    ///
    /// Never fails today; handler and escalation failures are contained.
    pub async fn run(self, shutdown: CancellationToken) -> Result<(), BusError> {
        let Self {
            config,
            handlers,
            inbox,
            mut receiver,
            stopping,
            escalator,
        } = self;
        let handlers: Handlers = handlers.into();
        let tracker = TaskTracker::new();
        let dispatcher = Dispatcher {
            handlers,
            escalator,
            handle_timeout: config.handle_timeout,
        };

        tracing::info!("event bus started");

        loop {
            tokio::select! {
                biased;
                () = shutdown.cancelled() => break,
                event = receiver.recv() => {
                    let Some(event) = event else { break };
                    tracker.spawn(dispatcher.clone().dispatch(event));
                }
            }
        }

        stopping.cancel();
        inbox.write().await.take();

        // Events accepted before the inbox closed still get delivered.
        while let Some(event) = receiver.recv().await {
            tracker.spawn(dispatcher.clone().dispatch(event));
        }

        tracker.close();
        tracing::info!(in_flight = tracker.len(), "event bus draining");
        tracker.wait().await;

        tracing::info!("event bus stopped");
        Ok(())
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("config", &self.config)
            .field("handlers", &self.handler_names())
            .finish_non_exhaustive()
    }
}

/// Everything a dispatch task needs, cheap to clone per event.
#[derive(Clone)]
struct Dispatcher {
    handlers: Handlers,
    escalator: Arc<Escalator>,
    handle_timeout: Duration,
}

impl Dispatcher {
    /// Runs every matching handler concurrently and waits for all of them.
    async fn dispatch(self, event: Event) {
        tracing::info!(%event, "handling event");

        let event = Arc::new(event);
        let mut interested = Vec::with_capacity(self.handlers.len());
        for handler in self.handlers.iter() {
            match panic::catch_unwind(AssertUnwindSafe(|| handler.matches(&event))) {
                Ok(true) => interested.push(handler),
                Ok(false) => {}
                Err(_) => {
                    let err = BusError::HandlerPanicked {
                        handler: handler.name().to_string(),
                        event: event.to_string(),
                    };
                    self.escalator.escalate(&err).await;
                }
            }
        }

        let mut tasks = JoinSet::new();
        let mut names = HashMap::new();
        for handler in interested {
            let task = invoke(
                Arc::clone(handler),
                Arc::clone(&event),
                Arc::clone(&self.escalator),
                self.handle_timeout,
            );
            let abort = tasks.spawn(task);
            names.insert(abort.id(), handler.name().to_string());
        }

        while let Some(joined) = tasks.join_next_with_id().await {
            let Err(join_err) = joined else { continue };
            if join_err.is_panic() {
                let handler = names.remove(&join_err.id()).unwrap_or_default();
                let err = BusError::HandlerPanicked {
                    handler,
                    event: event.to_string(),
                };
                self.escalator.escalate(&err).await;
            }
        }
    }
}

/// Invokes one handler under a fresh deadline and escalates its failure.
async fn invoke(
    handler: Arc<dyn EventHandler>,
    event: Arc<Event>,
    escalator: Arc<Escalator>,
    timeout: Duration,
) {
    let ctx = HandlerContext::with_timeout(timeout);
    let handling = handler.handle(ctx.clone(), Arc::clone(&event));
    let outcome = time::timeout_at(ctx.deadline(), handling).await;

    let err = match outcome {
        Ok(Ok(())) => {
            tracing::debug!(handler = handler.name(), %event, "event handled");
            return;
        }
        Ok(Err(err)) => BusError::handler_failed(handler.name(), &event.to_string(), &err),
        Err(_elapsed) => {
            ctx.cancel();
            BusError::HandlerTimeout {
                handler: handler.name().to_string(),
                event: event.to_string(),
                timeout,
            }
        }
    };

    escalator.escalate(&err).await;
}
