use std::collections::{HashMap, HashSet};
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

use tracing::{debug, info, warn};

/// Open ports seen by the previous run, per host.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BackupSnapshot {
    hosts: HashMap<String, HashSet<u16>>,
}

impl BackupSnapshot {
    /// Loads the previous report. Never fails: a missing or unreadable file
    /// yields an empty snapshot.
    pub fn load(path: &Path) -> Self {
        match File::open(path) {
            Ok(file) => Self::from_reader(file),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                info!("No backup at {}, every finding is new", path.display());
                Self::default()
            }
            Err(e) => {
                warn!("Unable to open backup {}: {e}", path.display());
                Self::default()
            }
        }
    }

    /// Reads `host,port,...` lines; anything else is ignored.
    pub fn from_reader<R: Read>(reader: R) -> Self {
        let mut snapshot = Self::default();
        let mut csv = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(reader);

        for (line, record) in csv.records().enumerate() {
            let record = match record {
                Ok(record) => record,
                Err(e) => {
                    warn!("Stopped reading backup at line {}: {e}", line + 1);
                    break;
                }
            };

            let (Some(host), Some(port)) = (record.get(0), record.get(1)) else {
                debug!("Ignoring short backup line {}", line + 1);
                continue;
            };
            let Ok(port) = port.trim().parse::<u16>() else {
                debug!("Ignoring backup line {} with port '{port}'", line + 1);
                continue;
            };

            snapshot.insert(host.trim(), port);
        }

        snapshot
    }

    pub fn insert(&mut self, host: &str, port: u16) {
        self.hosts.entry(host.to_string()).or_default().insert(port);
    }

    pub fn is_empty(&self) -> bool {
        self.hosts.is_empty()
    }

    pub fn contains(&self, host: &str, port: u16) -> bool {
        self.hosts.get(host).is_some_and(|ports| ports.contains(&port))
    }

    /// Whether `host:port` should carry the new marker.
    pub fn is_new(&self, host: &str, port: u16) -> bool {
        self.is_empty() || !self.contains(host, port)
    }
}
