//! The DIT — Delays, Intervals, Timeouts — configuration record.
//!
//! Each field is independently readable/mutable at runtime under its own
//! lock, fine-grained so a poller reading its `interval` never contends
//! with the supervisor reading `monitor_interval`, or with another poller
//! entirely. This mirrors bb8's `Builder<M>`, generalized from
//! construct-time-only fields to runtime-mutable ones.

use std::time::Duration;

use parking_lot::Mutex;

/// Minimum floor between successive polls of the same endpoint.
pub const MIN_DELAY: Duration = Duration::from_millis(5);

/// `unresponsive_timeout` and `disconnected_timeout` share a single
/// cross-field invariant (`disconnected > unresponsive`) and must be
/// locked in a fixed order — `unresponsive` before `disconnected` — by
/// any code path that touches both, to prevent deadlock.
struct DisconnectLadder {
    unresponsive: Mutex<Duration>,
    disconnected: Mutex<Duration>,
}

impl DisconnectLadder {
    fn new(unresponsive: Duration, disconnected: Duration) -> Self {
        DisconnectLadder {
            unresponsive: Mutex::new(unresponsive),
            disconnected: Mutex::new(disconnected),
        }
    }

    fn unresponsive(&self) -> Duration {
        *self.unresponsive.lock()
    }

    fn disconnected(&self) -> Duration {
        *self.disconnected.lock()
    }

    /// Sets `unresponsive_timeout`, re-validating the invariant.
    fn set_unresponsive(&self, value: Duration) {
        let mut u = self.unresponsive.lock();
        let mut d = self.disconnected.lock();
        *u = value;
        if *d <= *u {
            *d = *u + Duration::from_millis(1000);
        }
    }

    /// Sets `disconnected_timeout`, re-validating the invariant.
    fn set_disconnected(&self, value: Duration) {
        let u = self.unresponsive.lock();
        let mut d = self.disconnected.lock();
        *d = if value <= *u { *u + Duration::from_millis(1000) } else { value };
    }
}

/// Per-kind interval/timeout pair. The set of kinds is closed and known at
/// compile time, so this is a struct of named fields rather than a map.
struct KindConfig {
    interval: Mutex<Duration>,
    timeout: Mutex<Duration>,
}

impl KindConfig {
    fn new(interval: Duration, timeout: Duration) -> Self {
        KindConfig {
            interval: Mutex::new(interval),
            timeout: Mutex::new(timeout),
        }
    }
}

/// All runtime-mutable intervals, timeouts, and thresholds.
pub struct Dit {
    monitor_interval: Mutex<Duration>,
    ladder: DisconnectLadder,
    events: KindConfig,
    status: KindConfig,
    locations: KindConfig,
    killfeed: KindConfig,
    time: KindConfig,
    pause: KindConfig,
}

impl Default for Dit {
    fn default() -> Self {
        Dit {
            monitor_interval: Mutex::new(Duration::from_millis(100)),
            ladder: DisconnectLadder::new(Duration::from_millis(5_000), Duration::from_millis(60_000)),
            events: KindConfig::new(Duration::from_millis(5_000), Duration::from_millis(1_000)),
            status: KindConfig::new(Duration::from_millis(1_000), Duration::from_millis(1_000)),
            locations: KindConfig::new(Duration::from_millis(500), Duration::from_millis(1_000)),
            killfeed: KindConfig::new(Duration::from_millis(1_250), Duration::from_millis(1_000)),
            time: KindConfig::new(Duration::from_millis(125), Duration::from_millis(1_000)),
            pause: KindConfig::new(Duration::from_millis(125), Duration::from_millis(1_000)),
        }
    }
}

impl Dit {
    pub fn monitor_interval(&self) -> Duration {
        *self.monitor_interval.lock()
    }

    pub fn set_monitor_interval(&self, value: Duration) {
        *self.monitor_interval.lock() = value;
    }

    pub fn unresponsive_timeout(&self) -> Duration {
        self.ladder.unresponsive()
    }

    pub fn set_unresponsive_timeout(&self, value: Duration) {
        self.ladder.set_unresponsive(value);
    }

    pub fn disconnected_timeout(&self) -> Duration {
        self.ladder.disconnected()
    }

    pub fn set_disconnected_timeout(&self, value: Duration) {
        self.ladder.set_disconnected(value);
    }

    fn kind(&self, name: KindName) -> &KindConfig {
        match name {
            KindName::Events => &self.events,
            KindName::Status => &self.status,
            KindName::Locations => &self.locations,
            KindName::Killfeed => &self.killfeed,
            KindName::Time => &self.time,
            KindName::Pause => &self.pause,
        }
    }

    pub fn interval_for(&self, name: KindName) -> Duration {
        *self.kind(name).interval.lock()
    }

    pub fn set_interval_for(&self, name: KindName, value: Duration) {
        *self.kind(name).interval.lock() = value;
    }

    pub fn timeout_for(&self, name: KindName) -> Duration {
        *self.kind(name).timeout.lock()
    }

    pub fn set_timeout_for(&self, name: KindName, value: Duration) {
        *self.kind(name).timeout.lock() = value;
    }
}

/// Identifies one of the six polled endpoint kinds, for indexing into [`Dit`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KindName {
    Events,
    Status,
    Locations,
    Killfeed,
    Time,
    Pause,
}
