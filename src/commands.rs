//! Command-style endpoints: load replay, set time, set pause. These reuse
//! the HTTP client shape but do not participate in the poll loop — no
//! `EndpointKind`, no sink dispatch, no interval/timeout from the `Dit`.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::CommandError;
use crate::http::HttpContext;

const COMMAND_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Serialize)]
struct LoadReplayRequest<'a> {
    #[serde(rename = "Id")]
    id: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct LoadReplayResponse {
    #[serde(rename = "Successful")]
    pub successful: bool,
    #[serde(rename = "errorCode", default)]
    pub error_code: Option<String>,
    #[serde(rename = "errorMessage", default)]
    pub error_message: Option<String>,
}

#[derive(Debug, Serialize)]
struct SetTimeRequest {
    #[serde(rename = "MatchTime")]
    match_time: f64,
}

#[derive(Debug, Serialize)]
struct SetPauseRequest {
    #[serde(rename = "Paused")]
    paused: bool,
}

/// `POST LoadReplay { Id }`. Rejects an empty/whitespace-only id before
/// sending.
pub async fn load_replay(http: &HttpContext, base: &Url, id: &str) -> Result<LoadReplayResponse, CommandError> {
    if id.trim().is_empty() {
        return Err(CommandError::InvalidReplayId);
    }
    let result = http.post::<_, LoadReplayResponse>(base, "/LoadReplay", &LoadReplayRequest { id }, COMMAND_TIMEOUT).await;
    result.data.ok_or_else(|| CommandError::Bridge(result.error.unwrap_or(crate::error::BridgeError::Decode("empty body".into()))))
}

/// `POST MatchTime { MatchTime }`. Negative values are clamped to 0
/// before sending.
pub async fn set_time(http: &HttpContext, base: &Url, match_time: f64) -> Result<(), CommandError> {
    let clamped = if match_time < 0.0 { 0.0 } else { match_time };
    let result = http.post::<_, serde_json::Value>(base, "/MatchTime", &SetTimeRequest { match_time: clamped }, COMMAND_TIMEOUT).await;
    if result.ok {
        Ok(())
    } else {
        Err(CommandError::Bridge(result.error.unwrap_or(crate::error::BridgeError::Decode("empty body".into()))))
    }
}

/// `POST Pause { Paused }`.
pub async fn set_pause(http: &HttpContext, base: &Url, paused: bool) -> Result<(), CommandError> {
    let result = http.post::<_, serde_json::Value>(base, "/Pause", &SetPauseRequest { paused }, COMMAND_TIMEOUT).await;
    if result.ok {
        Ok(())
    } else {
        Err(CommandError::Bridge(result.error.unwrap_or(crate::error::BridgeError::Decode("empty body".into()))))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn empty_replay_id_is_rejected_without_a_request() {
        let http = HttpContext::new().unwrap();
        let base = Url::parse("http://localhost:1/").unwrap();
        let err = load_replay(&http, &base, "   ").await.unwrap_err();
        assert!(matches!(err, CommandError::InvalidReplayId));
    }
}
