//! The derived connection-health state machine.

/// Connection health as derived from the last successful poll response,
/// the process probe, and the two DIT thresholds. No total order is
/// defined between variants; equality is all callers need.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// Not running, not reachable, or silent for at least `disconnected_timeout`.
    Disconnected,
    /// The process is alive but its HTTP API has been silent for at least
    /// `unresponsive_timeout` (but less than `disconnected_timeout`).
    Unresponsive,
    /// A successful response was observed within `unresponsive_timeout`.
    Connected,
}

impl Default for ConnectionState {
    fn default() -> Self {
        ConnectionState::Disconnected
    }
}
