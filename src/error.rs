//! Error kinds for the polling engine and its external-facing callers.
//!
//! `BridgeError` is what ends up in a [`crate::result::PollResult::error`].
//! It is deliberately not `Clone`: the underlying `reqwest::Error` isn't
//! either, so every site that needs a `BridgeError` builds one fresh from
//! the failure it observed rather than stashing and re-cloning the original.

use thiserror::Error;

/// Errors surfaced by the polling engine itself.
#[derive(Debug, Error)]
pub enum BridgeError {
    /// The configured URL failed validation; the previous value is kept.
    #[error("invalid url: {0}")]
    Validation(String),

    /// Connection refused, DNS failure, TLS failure, or request timeout.
    #[error("transport error: {0}")]
    Transport(String),

    /// A non-2xx response whose body did not decode as `{info, data}`.
    #[error("protocol error ({status}): {message}")]
    Protocol { status: u16, message: String },

    /// A 2xx response body that failed to parse into the expected payload.
    #[error("decode error: {0}")]
    Decode(String),
}

/// Errors from the command callers (load replay / set time / set pause).
/// These share the HTTP client shape but are not part of the poll loop.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error("invalid replay id: must not be empty or whitespace")]
    InvalidReplayId,

    #[error(transparent)]
    Bridge(#[from] BridgeError),
}

/// Errors from the master-catalog pagination loop.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error(transparent)]
    Bridge(#[from] BridgeError),
}
