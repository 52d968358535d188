//! State shared between the engine facade, the supervisor, and every
//! poller. Analogous to bb8's `SharedPool<M>`: the thing every clone of
//! the facade handle and every background task points at through an `Arc`.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

use arc_swap::ArcSwapOption;
use parking_lot::{Mutex, RwLock};
use tokio_util::sync::CancellationToken;
use url::Url;

use crate::dit::Dit;
use crate::process::ProcessProbe;
use crate::sink::Sink;
use crate::state::ConnectionState;

pub struct Shared {
    pub url: RwLock<Url>,
    pub enabled: AtomicBool,
    pub external_enabled_probe: Mutex<Option<Box<dyn Fn() -> bool + Send + Sync>>>,
    pub last_response_at: Mutex<Option<Instant>>,
    pub last_state: Mutex<ConnectionState>,
    pub sink: ArcSwapOption<dyn Sink>,
    pub dit: Dit,
    pub process_probe: Box<dyn ProcessProbe>,
    pub cancellation: CancellationToken,
}

impl Shared {
    pub fn new(url: Url, process_probe: Box<dyn ProcessProbe>) -> Self {
        Shared {
            url: RwLock::new(url),
            enabled: AtomicBool::new(false),
            external_enabled_probe: Mutex::new(None),
            last_response_at: Mutex::new(None),
            last_state: Mutex::new(ConnectionState::Disconnected),
            sink: ArcSwapOption::from(None),
            dit: Dit::default(),
            process_probe,
            cancellation: CancellationToken::new(),
        }
    }

    /// `enabled && externalProbe?()`.
    pub fn should_run(&self) -> bool {
        if !self.enabled.load(Ordering::SeqCst) {
            return false;
        }
        match self.external_enabled_probe.lock().as_ref() {
            Some(probe) => probe(),
            None => true,
        }
    }

    pub fn record_success(&self, at: Instant) {
        let mut guard = self.last_response_at.lock();
        if guard.map(|prev| at >= prev).unwrap_or(true) {
            *guard = Some(at);
        }
    }

    pub fn dispatch_sink<F: FnOnce(&dyn Sink)>(&self, f: F) {
        // Loaded outside of any lock the sink might re-enter, to avoid
        // deadlock if the sink calls back into the engine; `ArcSwapOption::load`
        // is itself lock-free.
        let guard = self.sink.load();
        if let Some(sink) = guard.as_ref() {
            let sink = sink.clone();
            let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| f(sink.as_ref())));
            if let Err(panic) = result {
                tracing::error!(?panic, "sink panicked while handling an update");
            }
        }
    }
}
