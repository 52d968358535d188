//! Master replay catalog pagination: an offset loop over
//! `GET /find[/{urlencoded player name}]?offset=N`, out of the polling
//! engine's scope but sharing the same [`HttpContext`] shape.
//!
//! Re-sorting after every page returned would be O(n² log n) across the
//! full pagination; this crate sorts once, after the loop terminates —
//! see DESIGN.md.

use std::collections::HashSet;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Deserialize;
use url::Url;

use crate::error::CatalogError;
use crate::http::{HttpContext, QueryParam};

const CATALOG_TIMEOUT: Duration = Duration::from_secs(10);
pub const DEFAULT_CATALOG_BASE_URL: &str = "https://tv.vankrupt.net/";

#[derive(Debug, Clone, Deserialize)]
pub struct ReplaySummary {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default)]
    pub created: Option<DateTime<Utc>>,
    #[serde(rename = "secondsSince", default)]
    pub seconds_since: Option<f64>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl ReplaySummary {
    /// `Created = created` if present, else `now - secondsSince` if
    /// present, else `now`.
    fn effective_created(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        if let Some(created) = self.created {
            return created;
        }
        if let Some(seconds_since) = self.seconds_since {
            return now - chrono::Duration::milliseconds((seconds_since * 1000.0) as i64);
        }
        now
    }
}

#[derive(Debug, Deserialize)]
struct FindResponse {
    #[serde(default)]
    replays: Vec<ReplaySummary>,
    total: u64,
}

/// Fetches the full replay list for an optional player name, deduplicated
/// by `_id`, sorted once by derived `Created` descending after the loop
/// terminates. Pagination rule: increment `offset` by the count of
/// replays returned; stop when the returned list is empty or the
/// aggregate unique count reaches `total`.
pub async fn list_replays(http: &HttpContext, base: &Url, player_name: Option<&str>) -> Result<Vec<ReplaySummary>, CatalogError> {
    let path = match player_name {
        Some(name) => format!("/find/{}", url::form_urlencoded::byte_serialize(name.as_bytes()).collect::<String>()),
        None => "/find".to_string(),
    };

    let mut seen = HashSet::new();
    let mut collected: Vec<ReplaySummary> = Vec::new();
    let mut offset: u64 = 0;

    loop {
        let params = [QueryParam::new("offset", offset.to_string())];
        let result = http.get::<FindResponse>(base, &path, &params, CATALOG_TIMEOUT).await;
        let page = match result.data {
            Some(page) => page,
            None => {
                return Err(CatalogError::Bridge(
                    result.error.unwrap_or(crate::error::BridgeError::Decode("empty catalog page".into())),
                ))
            }
        };

        if page.replays.is_empty() {
            break;
        }

        offset += page.replays.len() as u64;
        for replay in page.replays {
            if seen.insert(replay.id.clone()) {
                collected.push(replay);
            }
        }

        if seen.len() as u64 >= page.total {
            break;
        }
    }

    let now = Utc::now();
    collected.sort_by(|a, b| b.effective_created(now).cmp(&a.effective_created(now)));
    Ok(collected)
}
