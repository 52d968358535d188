//! `PollResult<T>` — the immutable record each poll produces.
//!
//! Named `PollResult` rather than `Result` to avoid shadowing
//! `std::result::Result` throughout the crate.

use std::time::Duration;

use crate::error::BridgeError;

/// `transport` is time spent inside the HTTP call, `processing` is JSON
/// deserialization time, `total` is transport + processing + bookkeeping.
#[derive(Debug, Clone, Copy, Default)]
pub struct Timings {
    pub transport: Duration,
    pub processing: Duration,
    pub total: Duration,
}

/// Immutable outcome of a single poll of one endpoint.
#[derive(Debug)]
pub struct PollResult<T> {
    /// True iff the HTTP status was 2xx and the body parsed into `T`,
    /// or the body was empty with a success status.
    pub ok: bool,
    pub status: Option<u16>,
    /// Human-readable string extracted from a generic `{info, data}` error envelope.
    pub info: Option<String>,
    pub error: Option<BridgeError>,
    pub data: Option<T>,
    pub raw_body: Option<String>,
    pub timings: Timings,
}

impl<T> PollResult<T> {
    pub fn success(data: Option<T>, status: u16, timings: Timings, raw_body: Option<String>) -> Self {
        PollResult {
            ok: true,
            status: Some(status),
            info: None,
            error: None,
            data,
            raw_body,
            timings,
        }
    }

    pub fn failure(error: BridgeError, status: Option<u16>, info: Option<String>, timings: Timings) -> Self {
        PollResult {
            ok: false,
            status,
            info,
            error: Some(error),
            data: None,
            raw_body: None,
            timings,
        }
    }
}
