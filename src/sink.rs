//! The sink ("buffer") — the single fan-in consumer for every poller and
//! the supervisor. Grounded directly on bb8's `ErrorSink<E>`: a plain,
//! object-safe, `Send + Sync` trait, not an async one, so it can be
//! invoked from the poller's synchronous dispatch step without pulling in
//! `async-trait`.

use std::fmt;

use crate::endpoint::{EventsPayload, KillfeedPayload, LocationsPayload, PausePayload, StatusPayload, TimePayload};
use crate::result::PollResult;
use crate::state::ConnectionState;

/// Receives typed updates and connection-state transitions. Implementations
/// must be safe to call from multiple pollers concurrently; none of the
/// methods is optional, so a caller cannot silently miss a payload kind.
pub trait Sink: Send + Sync + fmt::Debug {
    fn on_state(&self, state: ConnectionState);
    fn on_events(&self, result: PollResult<EventsPayload>);
    fn on_status(&self, result: PollResult<StatusPayload>);
    fn on_locations(&self, result: PollResult<LocationsPayload>);
    fn on_killfeed(&self, result: PollResult<KillfeedPayload>);
    fn on_time(&self, result: PollResult<TimePayload>);
    fn on_pause(&self, result: PollResult<PausePayload>);
}

/// A sink that drops every update. Used as the engine's default so
/// `Engine::new` never has to special-case "no sink configured".
#[derive(Debug, Default, Clone, Copy)]
pub struct NopSink;

impl Sink for NopSink {
    fn on_state(&self, _state: ConnectionState) {}
    fn on_events(&self, _result: PollResult<EventsPayload>) {}
    fn on_status(&self, _result: PollResult<StatusPayload>) {}
    fn on_locations(&self, _result: PollResult<LocationsPayload>) {}
    fn on_killfeed(&self, _result: PollResult<KillfeedPayload>) {}
    fn on_time(&self, _result: PollResult<TimePayload>) {}
    fn on_pause(&self, _result: PollResult<PausePayload>) {}
}
