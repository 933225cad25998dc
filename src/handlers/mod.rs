//! Built-in event handlers shipped with the service.
//!
//! Domain reactors live with their own repositories and are registered
//! by the composition root; only generic infrastructure handlers are here.

pub mod journal;

pub use journal::EventJournal;
