//! In-memory journal of recently dispatched events.
//!
//! [`EventJournal`] is subscribed like any other handler. It logs every
//! event it receives and keeps the most recent ones in a bounded ring so
//! operators can inspect recent traffic over HTTP.

use std::collections::VecDeque;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::{Event, EventHandler, Filter, HandlerContext};

/// Default number of events retained by the journal.
pub const DEFAULT_JOURNAL_CAPACITY: usize = 100;

/// Bounded, shareable log of recently dispatched events.
///
/// Clones share the same storage, so one clone can be subscribed to the
/// bus while another is handed to the HTTP layer.
#[derive(Debug, Clone)]
pub struct EventJournal {
    filter: Filter,
    capacity: usize,
    entries: Arc<RwLock<VecDeque<Event>>>,
}

impl EventJournal {
    /// Creates a journal recording events matching `filter`.
    ///
    /// A zero `capacity` still records the most recent event.
    #[must_use]
    pub fn new(filter: Filter, capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            filter,
            capacity,
            entries: Arc::new(RwLock::new(VecDeque::with_capacity(capacity))),
        }
    }

    /// Returns recorded events, newest first.
    pub async fn recent(&self) -> Vec<Event> {
        self.entries.read().await.iter().rev().cloned().collect()
    }

    /// Returns the number of recorded events.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    /// Returns `true` if nothing has been recorded yet.
    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

impl Default for EventJournal {
    fn default() -> Self {
        Self::new(Filter::any(), DEFAULT_JOURNAL_CAPACITY)
    }
}

#[async_trait]
impl EventHandler for EventJournal {
    fn name(&self) -> &str {
        "journal"
    }

    fn matches(&self, event: &Event) -> bool {
        self.filter.matches(event)
    }

    async fn handle(&self, _ctx: HandlerContext, event: Arc<Event>) -> anyhow::Result<()> {
        tracing::info!(target: "events", %event, payload = %event.payload, "event observed");

        let mut entries = self.entries.write().await;
        if entries.len() == self.capacity {
            entries.pop_front();
        }
        entries.push_back(Event::clone(&event));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::domain::QualifiedId;

    fn event(id: &str) -> Arc<Event> {
        Arc::new(Event::now(
            QualifiedId::new("data", "securities", id),
            serde_json::json!({ "ticker": id }),
        ))
    }

    fn ctx() -> HandlerContext {
        HandlerContext::with_timeout(Duration::from_secs(1))
    }

    #[tokio::test]
    async fn keeps_newest_first() {
        let journal = EventJournal::default();
        assert!(journal.is_empty().await);

        for id in ["AKRN", "GAZP"] {
            tokio_test::assert_ok!(journal.handle(ctx(), event(id)).await);
        }

        let recent = journal.recent().await;
        let ids: Vec<&str> = recent.iter().map(|e| e.id.id.as_str()).collect();
        assert_eq!(ids, vec!["GAZP", "AKRN"]);
    }

    #[tokio::test]
    async fn evicts_oldest_beyond_capacity() {
        let journal = EventJournal::new(Filter::any(), 2);
        for id in ["AKRN", "GAZP", "UPRO"] {
            tokio_test::assert_ok!(journal.handle(ctx(), event(id)).await);
        }

        assert_eq!(journal.len().await, 2);
        let recent = journal.recent().await;
        assert!(recent.iter().all(|e| e.id.id != "AKRN"));
    }

    #[tokio::test]
    async fn clones_share_storage() {
        let journal = EventJournal::default();
        let subscribed = journal.clone();
        tokio_test::assert_ok!(subscribed.handle(ctx(), event("AKRN")).await);
        assert_eq!(journal.len().await, 1);
    }

    #[test]
    fn matches_through_filter() {
        let journal = EventJournal::new(Filter::any().with_group("usd"), 10);
        assert!(!journal.matches(&event("AKRN")));
        assert_eq!(journal.name(), "journal");
    }
}
