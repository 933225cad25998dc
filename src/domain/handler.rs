//! Handler contract for event consumers.
//!
//! Every consumer implements [`EventHandler`]: a cheap synchronous
//! predicate deciding interest in an event and a bounded-time async
//! reaction to it. The bus invokes [`EventHandler::handle`] on its own
//! task with a fresh [`HandlerContext`] per invocation.

use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::{self, Instant, error::Elapsed};
use tokio_util::sync::CancellationToken;

use super::{Event, Filter};

const FAR_FUTURE: Duration = Duration::from_secs(86_400 * 365 * 30);

/// Consumer of bus events.
///
/// `handle` may run concurrently with itself when publishes overlap, so
/// implementations must be safe for concurrent invocation and manage
/// their own resources (connections, repositories).
#[async_trait]
pub trait EventHandler: Send + Sync {
    /// Human-readable handler name used in registration and failure logs.
    fn name(&self) -> &str;

    /// Returns `true` if the handler is interested in `event`.
    ///
    /// Must be cheap and free of side effects.
    fn matches(&self, event: &Event) -> bool;

    /// Reacts to `event`.
    ///
    /// Implementations should honor [`HandlerContext::deadline`]; the bus
    /// abandons the invocation and cancels the context once it passes.
    ///
    /// # Errors
    ///
    /// Any error is logged and escalated by the bus. There is no retry.
    async fn handle(&self, ctx: HandlerContext, event: Arc<Event>) -> anyhow::Result<()>;
}

/// Per-invocation handling context: a deadline plus a cancellation token.
///
/// The context is not derived from the bus shutdown signal: a handler
/// already dispatched keeps running after shutdown is requested until it
/// finishes or its own deadline passes.
#[derive(Debug, Clone)]
pub struct HandlerContext {
    deadline: Instant,
    token: CancellationToken,
}

impl HandlerContext {
    /// Creates a context that expires `timeout` from now.
    ///
    /// A timeout too large to represent as an instant is capped at roughly
    /// thirty years, which in practice means no deadline.
    #[must_use]
    pub fn with_timeout(timeout: Duration) -> Self {
        let now = Instant::now();
        let deadline = now
            .checked_add(timeout)
            .unwrap_or_else(|| now + FAR_FUTURE);
        Self {
            deadline,
            token: CancellationToken::new(),
        }
    }

    /// Instant after which the invocation is abandoned.
    #[must_use]
    pub const fn deadline(&self) -> Instant {
        self.deadline
    }

    /// Time left until the deadline, zero if it already passed.
    #[must_use]
    pub fn remaining(&self) -> Duration {
        self.deadline.saturating_duration_since(Instant::now())
    }

    /// Returns `true` once the bus has cancelled the invocation.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Completes when the bus cancels the invocation.
    pub async fn cancelled(&self) {
        self.token.cancelled().await;
    }

    /// Runs `fut` until it completes or the deadline passes.
    ///
    /// # Errors
    ///
    /// Returns [`Elapsed`] if the deadline passed first.
    pub async fn bounded<F: Future>(&self, fut: F) -> Result<F::Output, Elapsed> {
        time::timeout_at(self.deadline, fut).await
    }

    pub(crate) fn cancel(&self) {
        self.token.cancel();
    }
}

/// Adapts a [`Filter`] and an async closure into an [`EventHandler`].
pub struct FilteredHandler<F> {
    name: String,
    filter: Filter,
    handle: F,
}

impl<F> FilteredHandler<F> {
    /// Creates a handler that runs `handle` for every event matching `filter`.
    #[must_use]
    pub fn new<Fut>(name: impl Into<String>, filter: Filter, handle: F) -> Self
    where
        F: Fn(HandlerContext, Arc<Event>) -> Fut,
        Fut: Future<Output = anyhow::Result<()>>,
    {
        Self {
            name: name.into(),
            filter,
            handle,
        }
    }

    /// The filter routing events to this handler.
    #[must_use]
    pub const fn filter(&self) -> &Filter {
        &self.filter
    }
}

impl<F> fmt::Debug for FilteredHandler<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FilteredHandler")
            .field("name", &self.name)
            .field("filter", &self.filter)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl<F, Fut> EventHandler for FilteredHandler<F>
where
    F: Fn(HandlerContext, Arc<Event>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn matches(&self, event: &Event) -> bool {
        self.filter.matches(event)
    }

    async fn handle(&self, ctx: HandlerContext, event: Arc<Event>) -> anyhow::Result<()> {
        (self.handle)(ctx, event).await
    }
}
