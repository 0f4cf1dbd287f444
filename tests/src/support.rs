//! Helpers shared by the integration tests: a scriptable engine and a
//! throwaway config root.

#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::fmt::Write as _;
use std::fs;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;
use std::time::Duration;

use portwatch_common::error::EngineError;
use portwatch_common::models::unit::ScanUnit;
use portwatch_core::engine::ScanEngine;
use tempfile::TempDir;

pub const UNIT: &str = "hr";

#[derive(Debug, Clone)]
pub struct FakeHost {
    pub addr: &'static str,
    pub up: bool,
    pub ports: Vec<(u16, &'static str, &'static str)>,
}

pub fn up(addr: &'static str, ports: &[(u16, &'static str, &'static str)]) -> FakeHost {
    FakeHost {
        addr,
        up: true,
        ports: ports.to_vec(),
    }
}

/// Writes canned nmap XML for each target it is asked to scan.
#[derive(Default)]
pub struct FakeEngine {
    results: HashMap<String, Vec<FakeHost>>,
    failing: HashSet<String>,
    delay: Duration,
    runs: AtomicUsize,
}

impl FakeEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_hosts(mut self, target: &str, hosts: Vec<FakeHost>) -> Self {
        self.results.insert(target.to_string(), hosts);
        self
    }

    /// The engine exits non-zero for `target`, after writing half a file.
    pub fn failing(mut self, target: &str) -> Self {
        self.failing.insert(target.to_string());
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn runs(&self) -> usize {
        self.runs.load(Ordering::SeqCst)
    }
}

impl ScanEngine for FakeEngine {
    fn command_line(&self, unit: &ScanUnit) -> String {
        format!("fake-nmap {} -oX {} {}", unit.options, unit.artifact.display(), unit.target)
    }

    fn run(&self, unit: &ScanUnit, _timeout: Option<Duration>) -> Result<(), EngineError> {
        thread::sleep(self.delay);

        if self.failing.contains(&unit.target) {
            fs::write(&unit.artifact, "<?xml version=\"1.0\"?><nmaprun><host>")
                .map_err(EngineError::Wait)?;
            self.runs.fetch_add(1, Ordering::SeqCst);
            return Err(EngineError::ExitStatus { code: Some(1) });
        }

        let hosts = self.results.get(&unit.target).cloned().unwrap_or_default();
        fs::write(&unit.artifact, render(&hosts)).map_err(EngineError::Wait)?;
        self.runs.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

fn render(hosts: &[FakeHost]) -> String {
    let mut xml = String::from(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<!DOCTYPE nmaprun>\n<nmaprun scanner=\"nmap\">\n",
    );
    for host in hosts {
        let state = if host.up { "up" } else { "down" };
        let _ = writeln!(xml, "<host><status state=\"{state}\"/>");
        let _ = writeln!(xml, "<address addr=\"{}\" addrtype=\"ipv4\"/><ports>", host.addr);
        for (port, state, service) in &host.ports {
            let _ = writeln!(
                xml,
                "<port protocol=\"tcp\" portid=\"{port}\"><state state=\"{state}\"/><service name=\"{service}\"/></port>"
            );
        }
        xml.push_str("</ports></host>\n");
    }
    xml.push_str("</nmaprun>\n");
    xml
}

/// A root directory with `config/` holding the inventory and, optionally,
/// the bad-ports file of [`UNIT`].
pub fn config_root(inventory: &str, ports: Option<&str>) -> TempDir {
    let dir = tempfile::tempdir().expect("tempdir");
    let config = dir.path().join("config");
    fs::create_dir(&config).expect("config dir");
    fs::write(config.join(format!("ports_baseline_{UNIT}.conf")), inventory).expect("inventory");
    if let Some(ports) = ports {
        fs::write(config.join(format!("ports_bad_{UNIT}")), ports).expect("ports");
    }
    dir
}
