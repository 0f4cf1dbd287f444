//! The dispatcher's completion guarantee for various unit and pool sizes.

mod support;

use std::path::Path;
use std::sync::Arc;

use portwatch_common::models::ports::{ExclusionList, PortList};
use portwatch_common::models::unit::{PortFilter, ScanUnit};
use portwatch_core::dispatch::Dispatcher;
use portwatch_core::unit::ScanUnitBuilder;

use support::FakeEngine;

fn units(dir: &Path, n: usize) -> Vec<ScanUnit> {
    let exclusions = ExclusionList::new();
    let ports = PortList::new();
    let builder = ScanUnitBuilder {
        exclusions: &exclusions,
        ports: &ports,
        filter: PortFilter::Disabled,
        output_dir: dir,
        base_options: "",
    };
    let entries: Vec<String> = (0..n).map(|i| format!("10.{}.{}.1", i / 256, i % 256)).collect();
    builder.build_all(&entries)
}

fn assert_all_done(n: usize, workers: usize) {
    let dir = tempfile::tempdir().unwrap();
    let units = units(dir.path(), n);
    assert_eq!(units.len(), n);

    let engine = Arc::new(FakeEngine::new().with_delay(std::time::Duration::from_millis(2)));
    let summary = Dispatcher::new(engine.clone(), workers).run(&units);

    assert_eq!(summary.completed, n);
    assert_eq!(summary.failed, 0);
    assert_eq!(engine.runs(), n);
    assert!(units.iter().all(|unit| unit.artifact.is_file()));
}

#[test]
fn no_units_returns_immediately() {
    assert_all_done(0, 4);
}

#[test]
fn single_unit_with_idle_workers() {
    assert_all_done(1, 4);
}

#[test]
fn many_units_on_default_pool() {
    assert_all_done(100, 4);
}

#[test]
fn single_worker_runs_everything() {
    assert_all_done(10, 1);
}
