//! The six polled endpoint kinds, consolidated into one generic trait
//! instead of six duplicated poller bodies, directly generalizing bb8's
//! `ManageConnection` trait: here `EndpointKind` plays the role
//! `ManageConnection` plays for bb8's `Pool<M>` — the thing a generic
//! worker is parameterized over.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::dit::{Dit, KindName};
use crate::result::PollResult;
use crate::sink::Sink;

/// Binds a URL path, a payload type, a DIT interval/timeout accessor, and
/// a sink-dispatch method for one polled endpoint.
pub trait EndpointKind: Send + Sync + 'static {
    type Payload: serde::de::DeserializeOwned + Send + Sync + 'static;

    /// Human-readable name, used in tracing spans.
    const NAME: &'static str;
    /// Path appended to the engine's configured base URL.
    const PATH: &'static str;

    fn interval(dit: &Dit) -> Duration;
    fn timeout(dit: &Dit) -> Duration;
    fn dispatch(sink: &dyn Sink, result: PollResult<Self::Payload>);
}

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct EventsPayload {
    #[serde(default)]
    pub events: Vec<serde_json::Value>,
}

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct StatusPayload {
    #[serde(flatten)]
    pub fields: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct PlayerLocation {
    #[serde(rename = "UniqueId")]
    pub unique_id: String,
    #[serde(rename = "Location")]
    pub location: [f32; 3],
    #[serde(rename = "Rotation", default)]
    pub rotation: Option<[f32; 3]>,
}

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct LocationsPayload {
    #[serde(default)]
    pub players: Vec<PlayerLocation>,
}

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct KillfeedEntry {
    #[serde(rename = "Killer")]
    pub killer: String,
    #[serde(rename = "Victim")]
    pub victim: String,
    #[serde(rename = "Weapon", default)]
    pub weapon: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct KillfeedPayload {
    #[serde(default)]
    pub kills: Vec<KillfeedEntry>,
}

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct TimePayload {
    #[serde(rename = "MatchTime")]
    pub match_time: f64,
}

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct PausePayload {
    #[serde(rename = "Paused")]
    pub paused: bool,
}

macro_rules! endpoint_kind {
    ($marker:ident, $payload:ty, $name:expr, $path:expr, $kind_name:expr, $dispatch:ident) => {
        #[derive(Debug, Clone, Copy, Default)]
        pub struct $marker;

        impl EndpointKind for $marker {
            type Payload = $payload;
            const NAME: &'static str = $name;
            const PATH: &'static str = $path;

            fn interval(dit: &Dit) -> Duration {
                dit.interval_for($kind_name)
            }

            fn timeout(dit: &Dit) -> Duration {
                dit.timeout_for($kind_name)
            }

            fn dispatch(sink: &dyn Sink, result: PollResult<Self::Payload>) {
                sink.$dispatch(result);
            }
        }
    };
}

endpoint_kind!(Events, EventsPayload, "Events", "/MatchEvents", KindName::Events, on_events);
endpoint_kind!(Status, StatusPayload, "Status", "/MatchStatus", KindName::Status, on_status);
endpoint_kind!(Locations, LocationsPayload, "Locations", "/PlayersPos", KindName::Locations, on_locations);
endpoint_kind!(Killfeed, KillfeedPayload, "Killfeed", "/Killfeed", KindName::Killfeed, on_killfeed);
endpoint_kind!(Time, TimePayload, "Time", "/MatchTime", KindName::Time, on_time);
endpoint_kind!(Pause, PausePayload, "Pause", "/Pause", KindName::Pause, on_pause);
