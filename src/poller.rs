//! The generic poller: one worker per endpoint kind, driving it at a
//! bounded, self-correcting rate. Directly generalizes bb8's
//! `add_connection` loop, parameterized over [`EndpointKind`] the way
//! `add_connection` is parameterized over `M: ManageConnection`.

use std::marker::PhantomData;
use std::sync::Arc;
use std::time::Instant;

use crate::dit::MIN_DELAY;
use crate::endpoint::EndpointKind;
use crate::http::HttpContext;
use crate::shared::Shared;

/// Owns one dedicated [`HttpContext`] — never shared with another poller,
/// see `http.rs` module docs for why.
pub struct Poller<K: EndpointKind> {
    http: HttpContext,
    shared: Arc<Shared>,
    _kind: PhantomData<K>,
}

impl<K: EndpointKind> Poller<K> {
    pub fn new(shared: Arc<Shared>) -> Result<Self, crate::error::BridgeError> {
        Ok(Poller { http: HttpContext::new()?, shared, _kind: PhantomData })
    }

    /// Runs until the engine's cancellation token fires. Never returns an
    /// `Err`: transport/protocol/decode failures are single-poll failures
    /// reported through the sink, not loop-terminating conditions.
    pub async fn run(self) {
        let token = self.shared.cancellation.clone();
        loop {
            if !self.shared.should_run() {
                break;
            }

            let cycle_start = Instant::now();
            let base_url = self.shared.url.read().clone();
            let timeout = K::timeout(&self.shared.dit);

            let result = self.http.get(&base_url, K::PATH, &[], timeout).await;
            if result.ok {
                self.shared.record_success(Instant::now());
            }

            tracing::trace!(kind = K::NAME, ok = result.ok, status = ?result.status, "poll completed");
            self.shared.dispatch_sink(|sink| K::dispatch(sink, result));

            if !self.shared.should_run() {
                break;
            }

            let interval = K::interval(&self.shared.dit);
            let elapsed = cycle_start.elapsed();
            // `interval - elapsed` can go negative when a poll overruns its
            // own interval; in that case sleep for the overrun itself
            // (clamped to `MIN_DELAY`) rather than collapsing straight to
            // `MIN_DELAY`, so a slow endpoint backs off roughly in
            // proportion to how late it ran rather than busy-looping.
            let idle = if elapsed <= interval {
                let remaining = interval - elapsed;
                remaining.max(MIN_DELAY)
            } else {
                (elapsed - interval).max(MIN_DELAY)
            };

            tokio::select! {
                _ = tokio::time::sleep(idle) => {}
                _ = token.cancelled() => break,
            }
        }
        tracing::debug!(kind = K::NAME, "poller stopped");
    }
}
