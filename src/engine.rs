//! The connection engine facade: lifecycle, URL/sink setters, DIT access,
//! last-response/connection-status snapshots. A cheap `Clone` handle over
//! an `Arc<Shared>`, mirroring bb8's `Pool<M>`.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use tokio::sync::Mutex as AsyncMutex;
use tokio::task::JoinHandle;
use url::Url;

use crate::error::BridgeError;
use crate::process::{ProcessProbe, SysinfoProcessProbe};
use crate::shared::Shared;
use crate::sink::Sink;
use crate::state::ConnectionState;
use crate::supervisor::{derive_state, Supervisor};

const DEFAULT_BASE_URL: &str = "http://localhost:1234/";

fn validate_url(candidate: &str) -> Result<Url, BridgeError> {
    let url = Url::parse(candidate).map_err(|e| BridgeError::Validation(e.to_string()))?;
    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(BridgeError::Validation(format!("unsupported scheme: {}", url.scheme())));
    }
    if url.host_str().is_none() {
        return Err(BridgeError::Validation("url has no host".to_string()));
    }
    Ok(url)
}

/// Guards idempotent `start()`/`stop()`, and holds the supervisor's
/// `JoinHandle` across calls so `stop()` can join it.
struct Lifecycle {
    started: AtomicBool,
    supervisor_handle: AsyncMutex<Option<JoinHandle<()>>>,
}

/// The polling engine and connection-health monitor.
#[derive(Clone)]
pub struct Engine {
    shared: Arc<Shared>,
    lifecycle: Arc<Lifecycle>,
}

impl Engine {
    /// Builds an idle engine with the default base URL and a real
    /// `sysinfo`-backed process probe.
    pub fn new() -> Self {
        Self::with_process_probe(Box::new(SysinfoProcessProbe::default()))
    }

    pub fn with_process_probe(process_probe: Box<dyn ProcessProbe>) -> Self {
        let url = Url::parse(DEFAULT_BASE_URL).expect("default base url is valid");
        Engine {
            shared: Arc::new(Shared::new(url, process_probe)),
            lifecycle: Arc::new(Lifecycle { started: AtomicBool::new(false), supervisor_handle: AsyncMutex::new(None) }),
        }
    }

    /// Idempotent: spawns the supervisor the first time it is called, and
    /// is a no-op on every subsequent call.
    pub async fn start(&self) {
        if self.lifecycle.started.swap(true, Ordering::SeqCst) {
            return;
        }
        self.shared.enabled.store(true, Ordering::SeqCst);
        let supervisor = Supervisor::new(self.shared.clone());
        let handle = tokio::spawn(supervisor.run());
        *self.lifecycle.supervisor_handle.lock().await = Some(handle);
    }

    /// Sets `enabled=false`, wakes every worker via the shared
    /// cancellation token, joins the supervisor (which itself joins every
    /// poller before returning), then marks the engine as stopped. Safe
    /// to call multiple times.
    pub async fn stop(&self) {
        self.shared.enabled.store(false, Ordering::SeqCst);
        self.shared.cancellation.cancel();
        if let Some(handle) = self.lifecycle.supervisor_handle.lock().await.take() {
            let _ = handle.await;
        }
        self.lifecycle.started.store(false, Ordering::SeqCst);
    }

    pub fn url(&self) -> Url {
        self.shared.url.read().clone()
    }

    /// Validates against a URL pattern; on rejection the previous value is
    /// left observable and a `BridgeError::Validation` is returned.
    pub fn set_url(&self, candidate: &str) -> Result<(), BridgeError> {
        let url = validate_url(candidate)?;
        *self.shared.url.write() = url;
        Ok(())
    }

    pub fn sink(&self) -> Option<Arc<dyn Sink>> {
        self.shared.sink.load_full()
    }

    pub fn set_sink(&self, sink: Option<Arc<dyn Sink>>) {
        self.shared.sink.store(sink);
    }

    pub fn set_external_enabled_probe(&self, probe: Option<Box<dyn Fn() -> bool + Send + Sync>>) {
        *self.shared.external_enabled_probe.lock() = probe;
    }

    pub fn last_response_at(&self) -> Option<Instant> {
        *self.shared.last_response_at.lock()
    }

    pub fn should_run(&self) -> bool {
        self.shared.should_run()
    }

    /// Read-only snapshot of the derived state, useful for polling
    /// consumers in addition to the push notifications.
    pub fn connection_status(&self) -> ConnectionState {
        derive_state(
            Instant::now(),
            self.last_response_at(),
            self.should_run(),
            self.shared.process_probe.is_running(),
            self.shared.dit.unresponsive_timeout(),
            self.shared.dit.disconnected_timeout(),
        )
    }

    pub fn dit(&self) -> &crate::dit::Dit {
        &self.shared.dit
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::process::FakeProcessProbe;

    #[test]
    fn invalid_url_is_rejected_and_previous_kept() {
        let engine = Engine::with_process_probe(Box::new(FakeProcessProbe::new(true)));
        let before = engine.url();
        assert!(engine.set_url("not a url").is_err());
        assert_eq!(engine.url(), before);
        assert!(engine.set_url("http://example.com:9000/").is_ok());
        assert_eq!(engine.url().as_str(), "http://example.com:9000/");
    }

    #[tokio::test]
    async fn start_is_idempotent() {
        let engine = Engine::with_process_probe(Box::new(FakeProcessProbe::new(false)));
        engine.start().await;
        engine.start().await;
        engine.start().await;
        engine.stop().await;
    }

    #[tokio::test]
    async fn cold_start_with_no_response_is_disconnected() {
        let engine = Engine::with_process_probe(Box::new(FakeProcessProbe::new(false)));
        assert_eq!(engine.connection_status(), ConnectionState::Disconnected);
    }
}
