//! Escalation sinks: where the bus sends failures it cannot recover from.
//!
//! The bus only depends on the [`Notifier`] trait. The deadline of every
//! notification is enforced by the caller, so implementations just send.

pub mod log;
pub mod telegram;

use async_trait::async_trait;

use crate::error::NotifyError;

pub use log::LogNotifier;
pub use telegram::TelegramNotifier;

/// External alerting channel.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Delivers a text alert.
    ///
    /// # Errors
    ///
    /// Returns a [`NotifyError`] if the alert could not be delivered.
    async fn send(&self, message: &str) -> Result<(), NotifyError>;
}
