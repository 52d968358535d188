//! The HTTP collaborator: GET/POST with a per-request timeout, user-agent
//! control, a cookie jar, and JSON (de)serialization. `reqwest` is the
//! concrete transport — it's the crate `enetx-rquest`'s `wreq` itself
//! forks, making it the natural upstream choice from this pack.
//!
//! One [`HttpContext`] per poller (see `poller.rs`): `reqwest::Client`
//! mutates its default-header state immediately before each call, so
//! sharing one client across pollers would need a lock spanning the whole
//! request. A dedicated client per kind removes that lock from the hot
//! path entirely.

use std::time::{Duration, Instant};

use reqwest::header::HeaderMap;
use serde::de::DeserializeOwned;
use serde::Serialize;
use url::Url;

use crate::error::BridgeError;
use crate::result::{PollResult, Timings};

pub const DEFAULT_USER_AGENT: &str = concat!("pavlov-bridge/", env!("CARGO_PKG_VERSION"));

/// A single query parameter. `None` emits just the bare key, with no `=`.
pub struct QueryParam {
    pub key: String,
    pub value: Option<String>,
}

impl QueryParam {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        QueryParam { key: key.into(), value: Some(value.into()) }
    }

    pub fn bare(key: impl Into<String>) -> Self {
        QueryParam { key: key.into(), value: None }
    }
}

/// A generic error envelope a non-2xx response may decode as.
#[derive(Debug, serde::Deserialize)]
struct ErrorEnvelope {
    #[serde(default)]
    info: Option<String>,
    #[serde(default)]
    data: Option<serde_json::Value>,
}

/// Per-poller HTTP context: a dedicated client plus an optional
/// header-configuration hook invoked immediately before each call.
pub struct HttpContext {
    client: reqwest::Client,
    header_hook: Option<Box<dyn Fn(&mut HeaderMap) + Send + Sync>>,
}

impl HttpContext {
    /// Builds a context with the given per-request timeout as the
    /// client's connect timeout ceiling; the actual request timeout is
    /// still applied per-call via `RequestBuilder::timeout`.
    pub fn new() -> Result<Self, BridgeError> {
        let client = reqwest::Client::builder()
            .user_agent(DEFAULT_USER_AGENT)
            .cookie_store(true)
            .build()
            .map_err(|e| BridgeError::Transport(e.to_string()))?;
        Ok(HttpContext { client, header_hook: None })
    }

    pub fn with_header_hook(mut self, hook: impl Fn(&mut HeaderMap) + Send + Sync + 'static) -> Self {
        self.header_hook = Some(Box::new(hook));
        self
    }

    fn build_url(base: &Url, path: &str, params: &[QueryParam]) -> Result<Url, BridgeError> {
        let mut url = base.join(path).map_err(|e| BridgeError::Validation(e.to_string()))?;
        if !params.is_empty() {
            // `Url::query_pairs_mut` cannot emit a valueless key, so the
            // bare-key case is built by hand.
            let mut pieces = Vec::with_capacity(params.len());
            for p in params {
                match &p.value {
                    Some(v) => pieces.push(format!(
                        "{}={}",
                        url::form_urlencoded::byte_serialize(p.key.as_bytes()).collect::<String>(),
                        url::form_urlencoded::byte_serialize(v.as_bytes()).collect::<String>()
                    )),
                    None => pieces.push(url::form_urlencoded::byte_serialize(p.key.as_bytes()).collect::<String>()),
                }
            }
            url.set_query(Some(&pieces.join("&")));
        }
        Ok(url)
    }

    /// Issues a single GET, enforcing `timeout`, returning a uniform
    /// [`PollResult`]. Empty success bodies yield `ok=true, data=None`.
    pub async fn get<T: DeserializeOwned>(
        &self,
        base: &Url,
        path: &str,
        params: &[QueryParam],
        timeout: Duration,
    ) -> PollResult<T> {
        let start = Instant::now();
        let url = match Self::build_url(base, path, params) {
            Ok(url) => url,
            Err(e) => return PollResult::failure(e, None, None, Timings::default()),
        };

        let mut builder = self.client.get(url).timeout(timeout);
        if let Some(hook) = &self.header_hook {
            let mut headers = HeaderMap::new();
            hook(&mut headers);
            builder = builder.headers(headers);
        }

        let transport_start = Instant::now();
        let response = match builder.send().await {
            Ok(resp) => resp,
            Err(e) => {
                let total = start.elapsed();
                return PollResult::failure(
                    BridgeError::Transport(e.to_string()),
                    None,
                    None,
                    Timings { transport: transport_start.elapsed(), processing: Duration::ZERO, total },
                );
            }
        };
        let transport = transport_start.elapsed();
        let status = response.status();
        let body = match response.text().await {
            Ok(body) => body,
            Err(e) => {
                let total = start.elapsed();
                return PollResult::failure(
                    BridgeError::Transport(e.to_string()),
                    Some(status.as_u16()),
                    None,
                    Timings { transport, processing: Duration::ZERO, total },
                );
            }
        };

        Self::finish(status.as_u16(), status.is_success(), body, start, transport)
    }

    /// Issues a single POST with a JSON body, otherwise identical to [`Self::get`].
    pub async fn post<B: Serialize, T: DeserializeOwned>(
        &self,
        base: &Url,
        path: &str,
        body: &B,
        timeout: Duration,
    ) -> PollResult<T> {
        let start = Instant::now();
        let url = match base.join(path) {
            Ok(url) => url,
            Err(e) => return PollResult::failure(BridgeError::Validation(e.to_string()), None, None, Timings::default()),
        };

        let mut builder = self.client.post(url).timeout(timeout).json(body);
        if let Some(hook) = &self.header_hook {
            let mut headers = HeaderMap::new();
            hook(&mut headers);
            builder = builder.headers(headers);
        }

        let transport_start = Instant::now();
        let response = match builder.send().await {
            Ok(resp) => resp,
            Err(e) => {
                let total = start.elapsed();
                return PollResult::failure(
                    BridgeError::Transport(e.to_string()),
                    None,
                    None,
                    Timings { transport: transport_start.elapsed(), processing: Duration::ZERO, total },
                );
            }
        };
        let transport = transport_start.elapsed();
        let status = response.status();
        let body = match response.text().await {
            Ok(body) => body,
            Err(e) => {
                let total = start.elapsed();
                return PollResult::failure(
                    BridgeError::Transport(e.to_string()),
                    Some(status.as_u16()),
                    None,
                    Timings { transport, processing: Duration::ZERO, total },
                );
            }
        };

        Self::finish(status.as_u16(), status.is_success(), body, start, transport)
    }

    fn finish<T: DeserializeOwned>(status: u16, success: bool, body: String, start: Instant, transport: Duration) -> PollResult<T> {
        let processing_start = Instant::now();
        if success {
            if body.trim().is_empty() {
                let total = start.elapsed();
                return PollResult::success(None, status, Timings { transport, processing: Duration::ZERO, total }, Some(body));
            }
            return match serde_json::from_str::<T>(&body) {
                Ok(data) => {
                    let processing = processing_start.elapsed();
                    let total = start.elapsed();
                    PollResult::success(Some(data), status, Timings { transport, processing, total }, Some(body))
                }
                Err(e) => {
                    let processing = processing_start.elapsed();
                    let total = start.elapsed();
                    PollResult::failure(
                        BridgeError::Decode(e.to_string()),
                        Some(status),
                        None,
                        Timings { transport, processing, total },
                    )
                }
            };
        }

        // Non-2xx: try to decode the generic `{info, data}` error envelope.
        let (info, message) = match serde_json::from_str::<ErrorEnvelope>(&body) {
            Ok(envelope) => {
                let message = envelope
                    .data
                    .as_ref()
                    .map(|d| d.to_string())
                    .unwrap_or_else(|| envelope.info.clone().unwrap_or_default());
                (envelope.info, message)
            }
            Err(_) => (None, body.clone()),
        };
        let processing = processing_start.elapsed();
        let total = start.elapsed();
        PollResult::failure(
            BridgeError::Protocol { status, message },
            Some(status),
            info,
            Timings { transport, processing, total },
        )
    }
}
