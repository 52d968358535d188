//! End-to-end scenarios driving a real [`Engine`] against a
//! [`wiremock::MockServer`] standing in for the local Pavlov TV HTTP API,
//! and a [`FakeProcessProbe`] standing in for a real `sysinfo` scan.
//! Timings are scaled down from the crate's 5 s/60 s real-world defaults
//! via `Dit`'s per-field setters so the suite runs in well under a second
//! instead of waiting out real-world thresholds.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use pavlov_bridge::endpoint::{EventsPayload, KillfeedPayload, LocationsPayload, PausePayload, StatusPayload, TimePayload};
use pavlov_bridge::process::FakeProcessProbe;
use pavlov_bridge::result::PollResult;
use pavlov_bridge::state::ConnectionState;
use pavlov_bridge::{Engine, Sink};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[derive(Debug, Default)]
struct RecordingSink {
    states: Mutex<Vec<ConnectionState>>,
    time_calls: Mutex<Vec<PollResult<TimePayload>>>,
}

impl Sink for RecordingSink {
    fn on_state(&self, state: ConnectionState) {
        self.states.lock().unwrap().push(state);
    }
    fn on_events(&self, _result: PollResult<EventsPayload>) {}
    fn on_status(&self, _result: PollResult<StatusPayload>) {}
    fn on_locations(&self, _result: PollResult<LocationsPayload>) {}
    fn on_killfeed(&self, _result: PollResult<KillfeedPayload>) {}
    fn on_time(&self, result: PollResult<TimePayload>) {
        self.time_calls.lock().unwrap().push(result);
    }
    fn on_pause(&self, _result: PollResult<PausePayload>) {}
}

fn tiny_dit(engine: &Engine) {
    use pavlov_bridge::dit::KindName::*;
    let dit = engine.dit();
    dit.set_monitor_interval(Duration::from_millis(10));
    for kind in [Events, Status, Locations, Killfeed, Time, Pause] {
        dit.set_interval_for(kind, Duration::from_millis(20));
        dit.set_timeout_for(kind, Duration::from_millis(200));
    }
}

/// Cold start with the viewer not running and no server reachable: sink
/// gets a single `Disconnected` notification and no further state churn.
#[tokio::test]
async fn cold_start_with_viewer_not_running_stays_disconnected() {
    let engine = Engine::with_process_probe(Box::new(FakeProcessProbe::new(false)));
    tiny_dit(&engine);
    // Point at a closed local port so every request fails fast with a
    // transport error rather than hanging out to its timeout.
    engine.set_url("http://127.0.0.1:1").unwrap();
    let sink = Arc::new(RecordingSink::default());
    engine.set_sink(Some(sink.clone() as Arc<dyn Sink>));

    engine.start().await;
    tokio::time::sleep(Duration::from_millis(150)).await;
    engine.stop().await;

    let states = sink.states.lock().unwrap().clone();
    assert!(states.iter().all(|s| *s == ConnectionState::Disconnected));
    assert!(!sink.time_calls.lock().unwrap().is_empty());
    assert!(sink.time_calls.lock().unwrap().iter().all(|r| !r.ok));
}

/// Healthy steady state: sink receives `Connected` after the initial
/// `Disconnected`, and `OnTime` fires repeatedly with `ok=true` and
/// `data.match_time == 12.5`.
#[tokio::test]
async fn healthy_steady_state_reaches_connected_with_time_updates() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/MatchTime"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"MatchTime": 12.5})))
        .mount(&server)
        .await;
    for p in ["/MatchEvents", "/MatchStatus", "/PlayersPos", "/Killfeed", "/Pause"] {
        Mock::given(method("GET")).and(path(p)).respond_with(ResponseTemplate::new(200).set_body_string("")).mount(&server).await;
    }

    let engine = Engine::with_process_probe(Box::new(FakeProcessProbe::new(true)));
    tiny_dit(&engine);
    engine.set_url(&server.uri()).unwrap();
    let sink = Arc::new(RecordingSink::default());
    engine.set_sink(Some(sink.clone() as Arc<dyn Sink>));

    engine.start().await;
    tokio::time::sleep(Duration::from_millis(200)).await;
    engine.stop().await;

    let states = sink.states.lock().unwrap().clone();
    assert_eq!(states.first(), Some(&ConnectionState::Disconnected));
    assert!(states.contains(&ConnectionState::Connected));

    let time_calls = sink.time_calls.lock().unwrap();
    assert!(time_calls.len() >= 2);
    assert!(time_calls.iter().any(|r| r.ok && r.data.as_ref().map(|d| d.match_time) == Some(12.5)));
}

/// URL rejection: an invalid value is rejected, the previous value
/// remains observable, and a later valid value succeeds.
#[tokio::test]
async fn invalid_url_is_rejected_and_keeps_previous_value() {
    let engine = Engine::with_process_probe(Box::new(FakeProcessProbe::new(true)));
    let before = engine.url();
    assert!(engine.set_url("not a url").is_err());
    assert_eq!(engine.url(), before);
    assert!(engine.set_url("http://example.org/").is_ok());
    assert_eq!(engine.url().as_str(), "http://example.org/");
}

/// Transient unresponsiveness ladder: once replies stop arriving the
/// state degrades `Connected` -> `Unresponsive` -> `Disconnected` in that
/// order, with no flapping back to `Connected` in between.
#[tokio::test]
async fn lost_replies_degrade_through_unresponsive_to_disconnected() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/MatchTime"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"MatchTime": 1.0})))
        .mount(&server)
        .await;
    for p in ["/MatchEvents", "/MatchStatus", "/PlayersPos", "/Killfeed", "/Pause"] {
        Mock::given(method("GET")).and(path(p)).respond_with(ResponseTemplate::new(200).set_body_string("")).mount(&server).await;
    }

    let engine = Engine::with_process_probe(Box::new(FakeProcessProbe::new(true)));
    tiny_dit(&engine);
    engine.dit().set_unresponsive_timeout(Duration::from_millis(60));
    engine.dit().set_disconnected_timeout(Duration::from_millis(200));
    engine.set_url(&server.uri()).unwrap();
    let sink = Arc::new(RecordingSink::default());
    engine.set_sink(Some(sink.clone() as Arc<dyn Sink>));

    engine.start().await;
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert!(sink.states.lock().unwrap().contains(&ConnectionState::Connected));

    // Point every poller at a closed port so replies stop arriving, without
    // touching `enabled` (which would make `should_run()` false and mask the
    // timeout ladder under a different code path).
    engine.set_url("http://127.0.0.1:1").unwrap();

    tokio::time::sleep(Duration::from_millis(350)).await;
    engine.stop().await;

    let states = sink.states.lock().unwrap().clone();
    let first_unresponsive = states.iter().position(|s| *s == ConnectionState::Unresponsive);
    let first_disconnected_after = states
        .iter()
        .enumerate()
        .skip(first_unresponsive.unwrap_or(0) + 1)
        .find(|(_, s)| **s == ConnectionState::Disconnected)
        .map(|(i, _)| i);
    assert!(first_unresponsive.is_some(), "expected an Unresponsive state, got {states:?}");
    assert!(first_disconnected_after.is_some(), "expected Disconnected after Unresponsive, got {states:?}");
    // No Connected state reappears between the two.
    let between = &states[first_unresponsive.unwrap()..first_disconnected_after.unwrap()];
    assert!(!between.contains(&ConnectionState::Connected));
}

/// Recovery: once an endpoint resumes responding after a period of
/// disconnection, the state returns to `Connected`.
#[tokio::test]
async fn endpoint_recovery_returns_state_to_connected() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/MatchTime"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"MatchTime": 2.0})))
        .mount(&server)
        .await;
    for p in ["/MatchEvents", "/MatchStatus", "/PlayersPos", "/Killfeed", "/Pause"] {
        Mock::given(method("GET")).and(path(p)).respond_with(ResponseTemplate::new(200).set_body_string("")).mount(&server).await;
    }

    let engine = Engine::with_process_probe(Box::new(FakeProcessProbe::new(true)));
    tiny_dit(&engine);
    // Start pointed at a closed port: the engine comes up Disconnected.
    engine.set_url("http://127.0.0.1:1").unwrap();
    let sink = Arc::new(RecordingSink::default());
    engine.set_sink(Some(sink.clone() as Arc<dyn Sink>));

    engine.start().await;
    tokio::time::sleep(Duration::from_millis(60)).await;
    assert_eq!(sink.states.lock().unwrap().last(), Some(&ConnectionState::Disconnected));

    engine.set_url(&server.uri()).unwrap();
    tokio::time::sleep(Duration::from_millis(150)).await;
    engine.stop().await;

    assert!(sink.states.lock().unwrap().contains(&ConnectionState::Connected));
}

/// Shutdown during an in-flight call: `stop()` returns promptly and no
/// further sink invocations occur afterward.
#[tokio::test]
async fn shutdown_during_in_flight_call_returns_promptly() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/MatchTime"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_millis(150)).set_body_json(serde_json::json!({"MatchTime": 1.0})))
        .mount(&server)
        .await;
    for p in ["/MatchEvents", "/MatchStatus", "/PlayersPos", "/Killfeed", "/Pause"] {
        Mock::given(method("GET")).and(path(p)).respond_with(ResponseTemplate::new(200).set_body_string("")).mount(&server).await;
    }

    let engine = Engine::with_process_probe(Box::new(FakeProcessProbe::new(true)));
    tiny_dit(&engine);
    engine.dit().set_timeout_for(pavlov_bridge::dit::KindName::Time, Duration::from_millis(1_000));
    engine.set_url(&server.uri()).unwrap();
    let sink = Arc::new(RecordingSink::default());
    engine.set_sink(Some(sink.clone() as Arc<dyn Sink>));

    engine.start().await;
    tokio::time::sleep(Duration::from_millis(20)).await;

    let stop_started = std::time::Instant::now();
    engine.stop().await;
    assert!(stop_started.elapsed() < Duration::from_millis(1_100));

    let count_after_stop = sink.states.lock().unwrap().len();
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(sink.states.lock().unwrap().len(), count_after_stop, "no sink invocations after stop() returns");
    assert_eq!(sink.states.lock().unwrap().last(), Some(&ConnectionState::Disconnected));
}
