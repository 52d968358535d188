//! `pavlov-bridge` — a client-side telemetry bridge for the Pavlov TV
//! replay viewer's local HTTP API.
//!
//! The crate continuously polls six independent, read-only endpoints
//! (match events, match status, player locations, killfeed, replay time,
//! pause state), forwards every result to a [`sink::Sink`], and derives a
//! three-state connection-health state machine
//! ([`state::ConnectionState`]) from the most recent successful response
//! and a process-liveness probe. It also exposes command callers (load
//! replay, set time, set pause) and a master replay-catalog pagination
//! helper, neither of which participates in the poll loop.
//!
//! The polling engine and connection-health monitor — [`engine::Engine`],
//! [`supervisor::Supervisor`], and the generic [`poller::Poller`] — are
//! the core of this crate; everything else is plumbing around a network
//! client.

pub mod catalog;
pub mod commands;
pub mod dit;
pub mod endpoint;
pub mod engine;
pub mod error;
pub mod http;
pub mod poller;
pub mod process;
mod shared;
pub mod result;
pub mod sink;
pub mod state;
pub mod supervisor;

pub use engine::Engine;
pub use error::{BridgeError, CatalogError, CommandError};
pub use result::PollResult;
pub use sink::{NopSink, Sink};
pub use state::ConnectionState;
