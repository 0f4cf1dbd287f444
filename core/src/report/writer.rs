use std::fs;
use std::io;
use std::path::PathBuf;

use thiserror::Error;
use tracing::{info, warn};

use portwatch_common::models::report::ReportEntry;

use crate::paths::Paths;

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("unable to access {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("unable to process {}: {source}", path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
}

/// Writes `rows` as the new report. Returns only after the file is flushed.
pub fn write_report(paths: &Paths, rows: &[ReportEntry]) -> Result<(), ReportError> {
    let csv_err = |source| ReportError::Csv {
        path: paths.report_file.clone(),
        source,
    };

    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_path(&paths.report_file)
        .map_err(csv_err)?;

    for row in rows {
        writer.write_record(row.to_record()).map_err(csv_err)?;
    }

    writer.flush().map_err(|source| ReportError::Io {
        path: paths.report_file.clone(),
        source,
    })?;

    info!(
        "Wrote {} findings to {}",
        rows.len(),
        paths.report_file.display()
    );
    Ok(())
}

/// Copies the last report over the backup so it becomes this run's
/// baseline. Best effort; without a last report the backup is left alone.
pub fn rotate_backup(paths: &Paths) {
    if !paths.report_file.is_file() {
        return;
    }
    match fs::copy(&paths.report_file, &paths.backup_file) {
        Ok(_) => info!("Saved previous report as {}", paths.backup_file.display()),
        Err(e) => warn!("Unable to back up {}: {e}", paths.report_file.display()),
    }
}
