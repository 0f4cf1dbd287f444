//! Report artifacts: the previous run's snapshot, the optional host
//! classification table, the CSV written for each run and the sinks that
//! receive the finished report.

mod classification;
mod snapshot;
mod writer;

pub use classification::Classification;
pub use snapshot::BackupSnapshot;
pub use writer::{ReportError, rotate_backup, write_report};

use std::path::PathBuf;

use tracing::warn;

use portwatch_common::models::contacts::Contacts;
use portwatch_common::models::report::ReportEntry;
use portwatch_common::models::state::StateCounters;

/// Everything a downstream consumer gets about a finished run.
#[derive(Debug, Clone)]
pub struct ScanReport {
    pub business_unit: String,
    pub org: String,
    pub rows: Vec<ReportEntry>,
    pub stats: StateCounters,
    pub live_hosts: usize,
    pub machine_count: u64,
    pub units: usize,
    pub skipped_units: usize,
    pub report_file: PathBuf,
    pub contacts: Contacts,
}

impl ScanReport {
    pub fn new_findings(&self) -> usize {
        self.rows.iter().filter(|row| row.is_new).count()
    }
}

/// A consumer of finished reports (renderer, uploader, notifier).
pub trait ReportSink {
    fn name(&self) -> &str;

    fn publish(&self, report: &ScanReport) -> anyhow::Result<()>;
}

/// Hands the report to every sink; failures are logged and skipped.
///
/// Returns how many sinks succeeded.
pub fn publish_all(sinks: &[Box<dyn ReportSink>], report: &ScanReport) -> usize {
    sinks
        .iter()
        .filter(|sink| match sink.publish(report) {
            Ok(()) => true,
            Err(e) => {
                warn!("Report sink '{}' failed: {e:#}", sink.name());
                false
            }
        })
        .count()
}
