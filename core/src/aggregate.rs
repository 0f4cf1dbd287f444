//! Reduces per-unit artifacts into report rows and state statistics.

use tracing::{debug, trace, warn};

use portwatch_common::audit;
use portwatch_common::error::AggregateError;
use portwatch_common::models::report::ReportEntry;
use portwatch_common::models::state::{ScanState, StateCounters};
use portwatch_common::models::unit::ScanUnit;

use crate::nmap_xml::{self, HostFacts};
use crate::report::{BackupSnapshot, Classification};

const TCP: &str = "tcp";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Aggregate {
    pub rows: Vec<ReportEntry>,
    pub stats: StateCounters,
    pub live_hosts: usize,
    /// Units whose artifact was missing or unreadable.
    pub skipped_units: usize,
}

/// Folds engine facts into an [`Aggregate`], one unit at a time.
pub struct Aggregator<'a> {
    snapshot: &'a BackupSnapshot,
    classification: Option<&'a Classification>,
    result: Aggregate,
}

impl<'a> Aggregator<'a> {
    pub fn new(snapshot: &'a BackupSnapshot, classification: Option<&'a Classification>) -> Self {
        Self {
            snapshot,
            classification,
            result: Aggregate::default(),
        }
    }

    /// Adds the hosts of one unit, in engine order.
    ///
    /// Only TCP ports are counted, so one `host,port` row never stands for two
    /// protocols. Fails on the first port whose state is outside the known set.
    pub fn absorb(&mut self, hosts: &[HostFacts]) -> Result<(), AggregateError> {
        for host in hosts {
            if host.up {
                self.result.live_hosts += 1;
            }

            for fact in &host.ports {
                if fact.protocol != TCP {
                    trace!("Ignoring {}/{} on {}", fact.port, fact.protocol, host.address);
                    continue;
                }

                let state: ScanState =
                    fact.state
                        .parse()
                        .map_err(|_| AggregateError::UnknownState {
                            host: host.address.clone(),
                            port: fact.port,
                            state: fact.state.clone(),
                        })?;

                self.result.stats.increment(state);
                if state != ScanState::Open {
                    continue;
                }

                self.result.rows.push(ReportEntry {
                    host: host.address.clone(),
                    port: fact.port,
                    state,
                    service: fact.service.clone(),
                    label: self
                        .classification
                        .map(|table| table.label(&host.address).to_string())
                        .unwrap_or_default(),
                    is_new: self.snapshot.is_new(&host.address, fact.port),
                });
            }
        }
        Ok(())
    }

    pub fn skip_unit(&mut self) {
        self.result.skipped_units += 1;
    }

    pub fn finish(self) -> Aggregate {
        self.result
    }
}

/// Reads every unit's artifact and aggregates them in unit order.
///
/// Units without a readable artifact are logged and skipped.
pub fn aggregate(
    units: &[ScanUnit],
    snapshot: &BackupSnapshot,
    classification: Option<&Classification>,
) -> Result<Aggregate, AggregateError> {
    let mut aggregator = Aggregator::new(snapshot, classification);

    for unit in units {
        match nmap_xml::parse_file(&unit.artifact) {
            Ok(hosts) => {
                aggregator.absorb(&hosts)?;
                debug!("Parsed {} for unit {unit}", unit.artifact.display());
                audit::record(format!("File {} parsed.", unit.artifact.display()));
            }
            Err(e) => {
                warn!("Skipping results of unit {unit}: {e}");
                aggregator.skip_unit();
            }
        }
    }

    Ok(aggregator.finish())
}
