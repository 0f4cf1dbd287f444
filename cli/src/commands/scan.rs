use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use anyhow::Context;
use tracing::{info, warn};

use portwatch_common::config::Config;
use portwatch_core::business_unit::BusinessUnit;
use portwatch_core::dispatch::Dispatcher;
use portwatch_core::engine::{NmapEngine, ScanEngine};
use portwatch_core::report::{self, Classification, ReportSink};

use super::UnitArgs;
use crate::terminal::progress;
use crate::terminal::summary::TerminalSummary;

pub fn scan(args: &UnitArgs, classification: Option<&Path>, cfg: &Config) -> anyhow::Result<()> {
    let mut bu = BusinessUnit::load(&args.business_unit, &args.path, &cfg.org)
        .with_context(|| format!("cannot scan business unit '{}'", args.business_unit))?;

    let units = bu.build_units(&cfg.base_options).len();
    if units == 0 {
        warn!("No scan targets in {}", bu.paths.inventory_file.display());
    }

    let engine: Arc<dyn ScanEngine> = Arc::new(NmapEngine::new(cfg.engine_path.clone()));
    let span = progress::dispatch_span(units);
    let bar = span.clone();
    let dispatcher = Dispatcher::new(engine, cfg.workers)
        .with_timeout(cfg.timeout)
        .on_progress(move |unit, done| progress::report_unit_done(&bar, &unit.target, done));

    let start_time = Instant::now();
    let summary = {
        let _guard = span.enter();
        bu.scan_with(dispatcher)
    };
    drop(span);

    info!(
        "{} of {} units finished in {:.2}s",
        summary.succeeded(),
        summary.completed,
        start_time.elapsed().as_secs_f64()
    );
    if summary.failed > 0 {
        warn!("{} units failed, their hosts are missing from this report", summary.failed);
    }

    let table = classification.and_then(|path| match Classification::load(path) {
        Ok(table) => Some(table),
        Err(e) => {
            warn!("Continuing without classification: {e}");
            None
        }
    });

    let scan_report = bu
        .collect(table.as_ref())
        .with_context(|| format!("cannot build the report for '{}'", bu.name))?;

    let sinks: Vec<Box<dyn ReportSink>> = vec![Box::new(TerminalSummary)];
    report::publish_all(&sinks, &scan_report);

    Ok(())
}
