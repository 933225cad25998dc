//! # poptimizer-bus
//!
//! In-process event bus decoupling producers of domain-change
//! notifications ("new trading date available", "securities list
//! updated") from the handlers reacting to them.
//!
//! Publishing never blocks the whole system: each accepted event is
//! fanned out to every matching handler concurrently, each handler runs
//! under its own deadline, failures are logged and escalated to an
//! external notifier, and shutdown drains all in-flight work.
//!
//! ## Architecture
//!
//! ```text
//! Producers (domain handlers, HTTP)
//!     │
//!     ├── Publisher (bus/)        ── read lock + cancellable send
//!     │
//!     ├── EventBus run loop (bus/) ── one tracked task per event
//!     │       └── handler tasks    ── JoinSet, deadline per invocation
//!     │
//!     ├── Escalator (bus/)        ── log + Notifier under its own timeout
//!     │
//!     └── Notifier (notify/)      ── Telegram or log
//! ```

pub mod api;
pub mod app_state;
pub mod bus;
pub mod config;
pub mod domain;
pub mod error;
pub mod handlers;
pub mod notify;
pub mod server;
