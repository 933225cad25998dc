//! Event bus: inbox, dispatch loop, publishing handle, and escalation.

pub mod escalation;
pub mod event_bus;
pub mod publisher;

#[cfg(test)]
pub(crate) mod test_support;

pub use escalation::Escalator;
pub use event_bus::EventBus;
pub use publisher::Publisher;
