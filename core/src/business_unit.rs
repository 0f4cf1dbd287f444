//! # Business Unit
//!
//! The aggregate root of a scan run. A unit is loaded from its config
//! directory, compiled into scan units, dispatched, and finally collected
//! into a report:
//!
//! ```text
//! load() -> build_units() -> scan() -> collect()
//! ```

use std::path::Path;
use std::sync::Arc;

use thiserror::Error;
use tracing::info;

use portwatch_common::audit;
use portwatch_common::config::Config;
use portwatch_common::error::{AggregateError, ConfigError};
use portwatch_common::models::contacts::Contacts;
use portwatch_common::models::ports::{ExclusionList, PortList};
use portwatch_common::models::state::StateCounters;
use portwatch_common::models::unit::{PortFilter, ScanUnit};

use crate::aggregate;
use crate::dispatch::{DispatchSummary, Dispatcher};
use crate::engine::ScanEngine;
use crate::ingest::{self, Inventory};
use crate::paths::Paths;
use crate::report::{self, BackupSnapshot, Classification, ReportError, ScanReport};
use crate::unit::ScanUnitBuilder;

#[derive(Debug, Error)]
pub enum CollectError {
    #[error(transparent)]
    Aggregate(#[from] AggregateError),

    #[error(transparent)]
    Report(#[from] ReportError),
}

#[derive(Debug, Clone)]
pub struct BusinessUnit {
    pub name: String,
    pub org: String,
    pub paths: Paths,
    pub ports: PortList,
    pub exclusions: ExclusionList,
    pub filter: PortFilter,
    pub entries: Vec<String>,
    pub contacts: Contacts,
    pub units: Vec<ScanUnit>,
    pub machine_count: u64,
    pub stats: StateCounters,
    pub live_hosts: usize,
}

impl BusinessUnit {
    /// Checks the config layout and reads the port list and inventory.
    pub fn load(name: &str, root: &Path, org: &str) -> Result<Self, ConfigError> {
        audit::record(format!("Scan started on {name}"));

        let (paths, filter) = Paths::resolve(root, name)?;

        let ports = match filter {
            PortFilter::Enabled => {
                let text = ingest::read_lines(&paths.ports_file)?;
                let ports = ingest::parse_ports(text.lines());
                audit::record("Finished reading ports");
                ports
            }
            PortFilter::Disabled => PortList::new(),
        };

        let text = ingest::read_lines(&paths.inventory_file)?;
        let Inventory {
            entries,
            exclusions,
            contacts,
            filter,
        } = ingest::parse_inventory(text.lines(), filter);
        audit::record("Finished reading inventory");

        info!(
            "Loaded {} targets, {} exclusions and {} ports for {name}",
            entries.len(),
            exclusions.exprs().len(),
            ports.tokens().len()
        );

        Ok(Self {
            name: name.to_string(),
            org: org.to_string(),
            paths,
            ports,
            exclusions,
            filter,
            entries,
            contacts,
            units: Vec::new(),
            machine_count: 0,
            stats: StateCounters::new(),
            live_hosts: 0,
        })
    }

    /// Compiles the inventory into scan units.
    pub fn build_units(&mut self, base_options: &str) -> &[ScanUnit] {
        if !self.filter.is_enabled() {
            info!("No port list for {}, scanning engine default ports", self.name);
        }

        let builder = ScanUnitBuilder {
            exclusions: &self.exclusions,
            ports: &self.ports,
            filter: self.filter,
            output_dir: &self.paths.output_dir,
            base_options,
        };

        self.units = builder.build_all(&self.entries);
        self.machine_count = self.units.iter().map(|unit| unit.expected_hosts).sum();
        &self.units
    }

    /// Runs every built unit through `engine`, blocking until all finished.
    pub fn scan(&self, engine: Arc<dyn ScanEngine>, cfg: &Config) -> DispatchSummary {
        self.scan_with(Dispatcher::new(engine, cfg.workers).with_timeout(cfg.timeout))
    }

    pub fn scan_with(&self, dispatcher: Dispatcher) -> DispatchSummary {
        info!(
            "Dispatching {} units covering {} machines",
            self.units.len(),
            self.machine_count
        );
        let summary = dispatcher.run(&self.units);
        audit::record(format!(
            "Scan of {} finished: {} units, {} failed",
            self.name, summary.completed, summary.failed
        ));
        summary
    }

    /// Aggregates the unit artifacts and writes the CSV report.
    ///
    /// The last report is rotated into the backup first and serves as the
    /// baseline for the new markers.
    pub fn collect(
        &mut self,
        classification: Option<&Classification>,
    ) -> Result<ScanReport, CollectError> {
        report::rotate_backup(&self.paths);
        let snapshot = BackupSnapshot::load(&self.paths.backup_file);
        let aggregate = aggregate::aggregate(&self.units, &snapshot, classification)?;

        self.stats = aggregate.stats;
        self.live_hosts = aggregate.live_hosts;

        report::write_report(&self.paths, &aggregate.rows)?;
        audit::record("Generated CSV report.");

        Ok(ScanReport {
            business_unit: self.name.clone(),
            org: self.org.clone(),
            rows: aggregate.rows,
            stats: self.stats,
            live_hosts: self.live_hosts,
            machine_count: self.machine_count,
            units: self.units.len(),
            skipped_units: aggregate.skipped_units,
            report_file: self.paths.report_file.clone(),
            contacts: self.contacts.clone(),
        })
    }
}
