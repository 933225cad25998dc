//! Domain layer: event model, routing filters, and the handler contract.
//!
//! Pure value types plus the [`EventHandler`] trait implemented by every
//! consumer. No I/O happens here.

pub mod event;
pub mod filter;
pub mod handler;
pub mod qualified_id;

pub use event::Event;
pub use filter::Filter;
pub use handler::{EventHandler, FilteredHandler, HandlerContext};
pub use qualified_id::QualifiedId;
