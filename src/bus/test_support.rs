//! Recording handlers and notifiers shared by the bus tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use crate::domain::{Event, EventHandler, Filter, HandlerContext, QualifiedId};
use crate::error::NotifyError;
use crate::notify::Notifier;

/// What a [`ProbeHandler`] does when invoked.
#[derive(Debug, Clone, Copy)]
pub enum Behavior {
    Succeed,
    Fail,
    Panic,
}

/// Handler counting its invocations, optionally slow or failing.
#[derive(Debug)]
pub struct ProbeHandler {
    name: String,
    filter: Filter,
    behavior: Behavior,
    delay: Duration,
    calls: Arc<AtomicUsize>,
    completed: Arc<AtomicUsize>,
}

impl ProbeHandler {
    pub fn new(name: &str, filter: Filter, behavior: Behavior) -> Self {
        Self {
            name: name.to_string(),
            filter,
            behavior,
            delay: Duration::ZERO,
            calls: Arc::new(AtomicUsize::new(0)),
            completed: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Counter of started invocations, shared with the handler.
    pub fn calls(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.calls)
    }

    /// Counter of invocations that ran to completion.
    pub fn completed(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.completed)
    }
}

#[async_trait]
impl EventHandler for ProbeHandler {
    fn name(&self) -> &str {
        &self.name
    }

    fn matches(&self, event: &Event) -> bool {
        self.filter.matches(event)
    }

    #[allow(clippy::panic)]
    async fn handle(&self, _ctx: HandlerContext, _event: Arc<Event>) -> anyhow::Result<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.completed.fetch_add(1, Ordering::SeqCst);
        match self.behavior {
            Behavior::Succeed => Ok(()),
            Behavior::Fail => Err(anyhow::anyhow!("boom")),
            Behavior::Panic => panic!("handler exploded"),
        }
    }
}

/// Notifier keeping every message it was asked to send.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    messages: Mutex<Vec<String>>,
}

impl RecordingNotifier {
    pub fn messages(&self) -> Vec<String> {
        self.messages.lock().map(|m| m.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send(&self, message: &str) -> Result<(), NotifyError> {
        if let Ok(mut messages) = self.messages.lock() {
            messages.push(message.to_string());
        }
        Ok(())
    }
}

/// Notifier that always fails, counting attempts.
#[derive(Debug, Default)]
pub struct FailingNotifier {
    attempts: AtomicUsize,
}

impl FailingNotifier {
    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Notifier for FailingNotifier {
    async fn send(&self, _message: &str) -> Result<(), NotifyError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        Err(NotifyError::Rejected {
            status: 502,
            body: "bad gateway".to_string(),
        })
    }
}

/// Notifier that never completes.
#[derive(Debug)]
pub struct HangingNotifier;

#[async_trait]
impl Notifier for HangingNotifier {
    async fn send(&self, _message: &str) -> Result<(), NotifyError> {
        std::future::pending::<()>().await;
        Ok(())
    }
}

pub fn event(sub: &str, group: &str, id: &str) -> Event {
    Event::now(QualifiedId::new(sub, group, id), serde_json::Value::Null)
}
