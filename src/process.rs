//! Process probe / launcher, grounded on `sysinfo` — the only pack
//! dependency on it, pulled in by `cloudwego-volo`'s benchmark crate for
//! process-table inspection.

use std::process::Command;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use sysinfo::System;

/// "Is the viewer process currently alive?" — polled by the supervisor
/// once per tick, never by a poller directly.
pub trait ProcessProbe: Send + Sync {
    fn is_running(&self) -> bool;
}

/// Default process names the real probe looks for.
pub const DEFAULT_PROCESS_NAMES: &[&str] = &["Pavlov.exe", "Pavlov-Win64-Shipping.exe", "GameThread"];

/// Scans the OS process table for any of a configurable set of names.
pub struct SysinfoProcessProbe {
    names: Vec<String>,
    system: Mutex<System>,
}

impl SysinfoProcessProbe {
    pub fn new(names: impl IntoIterator<Item = impl Into<String>>) -> Self {
        SysinfoProcessProbe {
            names: names.into_iter().map(Into::into).collect(),
            system: Mutex::new(System::new()),
        }
    }
}

impl Default for SysinfoProcessProbe {
    fn default() -> Self {
        Self::new(DEFAULT_PROCESS_NAMES.iter().copied())
    }
}

impl ProcessProbe for SysinfoProcessProbe {
    fn is_running(&self) -> bool {
        let mut system = self.system.lock().expect("sysinfo mutex poisoned");
        system.refresh_all();
        system.processes().values().any(|proc| {
            proc.name()
                .to_str()
                .map(|name| self.names.iter().any(|candidate| candidate.eq_ignore_ascii_case(name)))
                .unwrap_or(false)
        })
    }
}

/// Invokes `steam://rungameid/{steam_app_id}` via the platform URL opener,
/// then polls `probe` every 250 ms until it reports running, `timeout`
/// elapses, or `should_keep_waiting` returns false.
pub fn launch(
    probe: &dyn ProcessProbe,
    steam_app_id: u64,
    timeout: Duration,
    mut should_keep_waiting: impl FnMut() -> bool,
) -> bool {
    let url = format!("steam://rungameid/{steam_app_id}");
    let _ = open_url(&url);

    let start = Instant::now();
    loop {
        if probe.is_running() {
            return true;
        }
        if start.elapsed() >= timeout {
            return false;
        }
        if !should_keep_waiting() {
            return false;
        }
        std::thread::sleep(Duration::from_millis(250));
    }
}

/// Sends a terminate signal to each process matching `probe`'s configured
/// names plus any `extra_names`.
pub fn close(extra_names: &[&str]) {
    let mut system = System::new_all();
    system.refresh_all();
    let names: Vec<&str> = DEFAULT_PROCESS_NAMES.iter().copied().chain(extra_names.iter().copied()).collect();
    for process in system.processes().values() {
        let matches = process
            .name()
            .to_str()
            .map(|name| names.iter().any(|candidate| candidate.eq_ignore_ascii_case(name)))
            .unwrap_or(false);
        if matches {
            process.kill();
        }
    }
}

#[cfg(target_os = "windows")]
fn open_url(url: &str) -> std::io::Result<std::process::Child> {
    Command::new("cmd").args(["/C", "start", "", url]).spawn()
}

#[cfg(target_os = "macos")]
fn open_url(url: &str) -> std::io::Result<std::process::Child> {
    Command::new("open").arg(url).spawn()
}

#[cfg(not(any(target_os = "windows", target_os = "macos")))]
fn open_url(url: &str) -> std::io::Result<std::process::Child> {
    Command::new("xdg-open").arg(url).spawn()
}

/// A deterministic, in-memory probe for tests — no dependency on an
/// actual Pavlov process existing on the machine running the suite.
#[derive(Debug, Default)]
pub struct FakeProcessProbe(std::sync::atomic::AtomicBool);

impl FakeProcessProbe {
    pub fn new(running: bool) -> Self {
        FakeProcessProbe(std::sync::atomic::AtomicBool::new(running))
    }

    pub fn set_running(&self, running: bool) {
        self.0.store(running, std::sync::atomic::Ordering::SeqCst);
    }
}

impl ProcessProbe for FakeProcessProbe {
    fn is_running(&self) -> bool {
        self.0.load(std::sync::atomic::Ordering::SeqCst)
    }
}
