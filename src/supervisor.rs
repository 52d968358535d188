//! The supervisor / monitor: owns the six pollers, derives connection
//! state each tick, and publishes transitions. Generalizes bb8's
//! `schedule_reaping` background task from "reap idle connections" to
//! "derive and publish connection state."

use std::sync::Arc;
use std::time::Instant;

use tokio::task::JoinSet;

use crate::endpoint::{Events, Killfeed, Locations, Pause, Status, Time};
use crate::poller::Poller;
use crate::shared::Shared;
use crate::state::ConnectionState;

/// Pure function: the connection-state ladder. Free function, not a
/// method, so it is unit-testable without constructing an `Engine`.
pub fn derive_state(
    now: Instant,
    last_response_at: Option<Instant>,
    should_run: bool,
    process_running: bool,
    unresponsive_timeout: std::time::Duration,
    disconnected_timeout: std::time::Duration,
) -> ConnectionState {
    let t = match last_response_at {
        None => return ConnectionState::Disconnected,
        Some(t) => t,
    };
    if !should_run {
        return ConnectionState::Disconnected;
    }
    if !process_running {
        return ConnectionState::Disconnected;
    }
    let age = now.saturating_duration_since(t);
    if age >= disconnected_timeout {
        ConnectionState::Disconnected
    } else if age >= unresponsive_timeout {
        ConnectionState::Unresponsive
    } else {
        ConnectionState::Connected
    }
}

pub struct Supervisor {
    shared: Arc<Shared>,
}

impl Supervisor {
    pub fn new(shared: Arc<Shared>) -> Self {
        Supervisor { shared }
    }

    /// Offloads the `sysinfo` process-table scan to the blocking thread
    /// pool: a full `refresh_all()` is a syscall-backed, potentially
    /// multi-millisecond operation, and the supervisor's tick loop is the
    /// only place it would otherwise run directly on the async executor.
    async fn probe_process_running(&self) -> bool {
        let shared = self.shared.clone();
        match tokio::task::spawn_blocking(move || shared.process_probe.is_running()).await {
            Ok(running) => running,
            Err(err) => {
                tracing::error!(?err, "process probe task panicked; treating process as not running");
                false
            }
        }
    }

    async fn current_state(&self) -> ConnectionState {
        let last_response_at = *self.shared.last_response_at.lock();
        let process_running = self.probe_process_running().await;
        derive_state(
            Instant::now(),
            last_response_at,
            self.shared.should_run(),
            process_running,
            self.shared.dit.unresponsive_timeout(),
            self.shared.dit.disconnected_timeout(),
        )
    }

    fn publish_if_changed(&self, current: ConnectionState) {
        let mut last_state = self.shared.last_state.lock();
        if *last_state != current {
            *last_state = current;
            drop(last_state);
            self.shared.dispatch_sink(|sink| sink.on_state(current));
        }
    }

    /// Runs until the engine's cancellation token fires, spawning all six
    /// pollers lazily on its first tick. Publishes a final, unconditional
    /// `Disconnected` on the way out.
    pub async fn run(self) {
        let token = self.shared.cancellation.clone();
        let mut pollers: JoinSet<()> = JoinSet::new();
        let mut started = false;

        loop {
            if !started {
                // Computed now, which is `Disconnected` if `last_response_at`
                // is unset, so the very first notification reflects reality
                // rather than defaulting to an assumed state.
                let initial = self.current_state().await;
                *self.shared.last_state.lock() = initial;
                self.shared.dispatch_sink(|sink| sink.on_state(initial));

                self.spawn_all(&mut pollers);
                started = true;
            } else {
                // Drain any poller that finished (panicked or returned) so a
                // dead poller is logged instead of silently leaking.
                while let Some(outcome) = pollers.try_join_next() {
                    if let Err(err) = outcome {
                        tracing::error!(?err, "a poller task died unexpectedly");
                    }
                }
            }

            let current = self.current_state().await;
            self.publish_if_changed(current);

            if !self.shared.should_run() {
                break;
            }

            tokio::select! {
                _ = tokio::time::sleep(self.shared.dit.monitor_interval()) => {}
                _ = token.cancelled() => break,
            }
        }

        pollers.abort_all();
        while pollers.join_next().await.is_some() {}

        self.shared.dispatch_sink(|sink| sink.on_state(ConnectionState::Disconnected));
    }

    fn spawn_all(&self, pollers: &mut JoinSet<()>) {
        macro_rules! spawn_kind {
            ($kind:ty) => {
                match Poller::<$kind>::new(self.shared.clone()) {
                    Ok(poller) => {
                        pollers.spawn(poller.run());
                    }
                    Err(err) => tracing::error!(?err, kind = <$kind>::NAME, "failed to build http context"),
                }
            };
        }
        use crate::endpoint::EndpointKind;
        spawn_kind!(Events);
        spawn_kind!(Status);
        spawn_kind!(Locations);
        spawn_kind!(Killfeed);
        spawn_kind!(Time);
        spawn_kind!(Pause);
    }
}
