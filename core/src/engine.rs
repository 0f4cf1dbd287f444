//! The seam between the pipeline and the external scan engine.

use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use tracing::debug;

use portwatch_common::error::EngineError;
use portwatch_common::models::unit::ScanUnit;

const POLL_INTERVAL: Duration = Duration::from_millis(200);

/// Something that can execute a [`ScanUnit`].
///
/// A successful run must leave a complete, closed artifact at
/// `unit.artifact`; the aggregator only ever looks at that file.
pub trait ScanEngine: Send + Sync {
    /// Human readable command line, recorded in the audit log.
    fn command_line(&self, unit: &ScanUnit) -> String;

    /// Runs the unit to completion, blocking the calling thread.
    fn run(&self, unit: &ScanUnit, timeout: Option<Duration>) -> Result<(), EngineError>;
}

/// Runs units through the `nmap` binary with XML output.
#[derive(Debug, Clone)]
pub struct NmapEngine {
    program: String,
}

impl NmapEngine {
    pub fn new<S: Into<String>>(program: S) -> Self {
        Self {
            program: program.into(),
        }
    }

    fn args(&self, unit: &ScanUnit) -> Vec<String> {
        let mut args: Vec<String> = unit.options.split_whitespace().map(str::to_string).collect();
        args.push("-oX".to_string());
        args.push(unit.artifact.display().to_string());
        args.push(unit.target.clone());
        args
    }
}

impl Default for NmapEngine {
    fn default() -> Self {
        Self::new("nmap")
    }
}

impl ScanEngine for NmapEngine {
    fn command_line(&self, unit: &ScanUnit) -> String {
        let mut parts = vec![self.program.clone()];
        parts.extend(self.args(unit));
        parts.join(" ")
    }

    fn run(&self, unit: &ScanUnit, timeout: Option<Duration>) -> Result<(), EngineError> {
        let mut child = Command::new(&self.program)
            .args(self.args(unit))
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|source| EngineError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        let status = wait(&mut child, timeout)?;
        debug!("Unit {unit} finished with {status}");

        if !status.success() {
            return Err(EngineError::ExitStatus {
                code: status.code(),
            });
        }
        if !unit.artifact.is_file() {
            return Err(EngineError::NoArtifact {
                path: unit.artifact.clone(),
            });
        }
        Ok(())
    }
}

/// Waits for `child`, killing it once `timeout` has passed.
fn wait(child: &mut Child, timeout: Option<Duration>) -> Result<ExitStatus, EngineError> {
    let Some(timeout) = timeout else {
        return child.wait().map_err(EngineError::Wait);
    };

    let deadline = Instant::now() + timeout;
    loop {
        if let Some(status) = child.try_wait().map_err(EngineError::Wait)? {
            return Ok(status);
        }
        if Instant::now() >= deadline {
            let _ = child.kill();
            let _ = child.wait();
            return Err(EngineError::Timeout { after: timeout });
        }
        thread::sleep(POLL_INTERVAL);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn unit() -> ScanUnit {
        ScanUnit {
            index: 0,
            target: "10.0.0.0/24".to_string(),
            exclude: Some("10.0.0.1".to_string()),
            ports: Some("22,80".to_string()),
            options: "-sT -p 22,80 --exclude 10.0.0.1".to_string(),
            expected_hosts: 256,
            artifact: PathBuf::from("/tmp/nmap-hr/unit-000-10.0.0.0_24.xml"),
        }
    }

    #[test]
    fn command_line_puts_output_before_target() {
        let engine = NmapEngine::default();
        assert_eq!(
            engine.command_line(&unit()),
            "nmap -sT -p 22,80 --exclude 10.0.0.1 -oX /tmp/nmap-hr/unit-000-10.0.0.0_24.xml 10.0.0.0/24"
        );
    }

    #[test]
    fn missing_program_is_a_spawn_error() {
        let engine = NmapEngine::new("/nonexistent/portwatch-engine");
        let err = engine.run(&unit(), None).unwrap_err();
        assert!(matches!(err, EngineError::Spawn { .. }));
    }

    #[cfg(unix)]
    #[test]
    fn non_zero_exit_is_reported() {
        let engine = NmapEngine::new("false");
        let err = engine.run(&unit(), None).unwrap_err();
        assert!(matches!(err, EngineError::ExitStatus { code: Some(1) }));
    }

    #[cfg(unix)]
    #[test]
    fn slow_engine_is_killed_after_timeout() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let script = dir.path().join("slow-engine");
        std::fs::write(&script, "#!/bin/sh\nsleep 5\n").unwrap();
        std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();
        let engine = NmapEngine::new(script.display().to_string());

        let started = Instant::now();
        let err = engine.run(&unit(), Some(Duration::from_millis(300))).unwrap_err();

        assert!(matches!(err, EngineError::Timeout { after } if after == Duration::from_millis(300)));
        assert!(err.to_string().contains("300ms"), "{err}");
        assert!(started.elapsed() < Duration::from_secs(4));
    }
}
