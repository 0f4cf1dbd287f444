//! End-to-end runs of a business unit against the fake engine.

mod support;

use std::fs;
use std::sync::Arc;

use portwatch_common::config::Config;
use portwatch_common::error::{AggregateError, ConfigError};
use portwatch_common::models::state::ScanState;
use portwatch_common::models::unit::PortFilter;
use portwatch_core::business_unit::{BusinessUnit, CollectError};
use portwatch_core::report::Classification;

use support::{FakeEngine, UNIT, config_root, up};

fn run(bu: &mut BusinessUnit, engine: FakeEngine) -> portwatch_core::report::ScanReport {
    bu.build_units("-sT");
    bu.scan(Arc::new(engine), &Config::default());
    bu.collect(None).expect("collect")
}

#[test]
fn single_host_without_ports_or_backup() {
    let root = config_root("10.0.0.5\n", None);
    let mut bu = BusinessUnit::load(UNIT, root.path(), "").unwrap();
    assert_eq!(bu.filter, PortFilter::Disabled);

    let units = bu.build_units("-sT");
    assert_eq!(units.len(), 1);
    assert_eq!(units[0].target, "10.0.0.5");
    assert_eq!(units[0].ports, None);
    assert_eq!(units[0].options, "-sT");

    let engine = FakeEngine::new().with_hosts("10.0.0.5", vec![up("10.0.0.5", &[(22, "open", "ssh")])]);
    let summary = bu.scan(Arc::new(engine), &Config::default());
    assert_eq!(summary.completed, 1);
    assert_eq!(summary.failed, 0);

    let report = bu.collect(None).unwrap();
    assert_eq!(
        fs::read_to_string(&report.report_file).unwrap(),
        "10.0.0.5,22,open,ssh,,*\n"
    );
    assert_eq!(report.stats.get(ScanState::Open), 1);
    assert_eq!(report.stats.total(), 1);
    assert_eq!(report.live_hosts, 1);
    assert_eq!(bu.live_hosts, 1);
}

#[test]
fn second_run_only_marks_ports_not_seen_before() {
    let root = config_root("10.0.0.0/30\n", Some("22,80,443\n"));

    let mut bu = BusinessUnit::load(UNIT, root.path(), "").unwrap();
    let first = FakeEngine::new().with_hosts(
        "10.0.0.0/30",
        vec![up("10.0.0.1", &[(22, "open", "ssh"), (80, "open", "http")])],
    );
    let report = run(&mut bu, first);
    assert!(report.rows.iter().all(|row| row.is_new));

    let mut bu = BusinessUnit::load(UNIT, root.path(), "").unwrap();
    let second = FakeEngine::new().with_hosts(
        "10.0.0.0/30",
        vec![
            up("10.0.0.1", &[(22, "open", "ssh"), (443, "open", "https"), (80, "closed", "http")]),
            up("10.0.0.2", &[(22, "open", "ssh")]),
        ],
    );
    let report = run(&mut bu, second);

    assert_eq!(
        fs::read_to_string(&bu.paths.backup_file).unwrap(),
        "10.0.0.1,22,open,ssh,,*\n10.0.0.1,80,open,http,,*\n"
    );
    assert_eq!(
        fs::read_to_string(&bu.paths.report_file).unwrap(),
        "10.0.0.1,22,open,ssh,,\n10.0.0.1,443,open,https,,*\n10.0.0.2,22,open,ssh,,*\n"
    );
    assert_eq!(report.new_findings(), 2);
    assert_eq!(report.stats.get(ScanState::Closed), 1);
    assert_eq!(report.live_hosts, 2);
}

#[test]
fn rows_follow_inventory_order() {
    let root = config_root("10.0.2.1\n10.0.1.1\n10.0.3.1\n", Some("1-1024"));
    let mut bu = BusinessUnit::load(UNIT, root.path(), "").unwrap();
    let engine = FakeEngine::new()
        .with_hosts("10.0.1.1", vec![up("10.0.1.1", &[(80, "open", "http"), (22, "open", "ssh")])])
        .with_hosts("10.0.2.1", vec![up("10.0.2.1", &[(443, "open", "https")])])
        .with_hosts("10.0.3.1", vec![up("10.0.3.1", &[(25, "open", "smtp")])])
        .with_delay(std::time::Duration::from_millis(10));

    let report = run(&mut bu, engine);
    let order: Vec<(String, u16)> = report.rows.iter().map(|r| (r.host.clone(), r.port)).collect();
    assert_eq!(
        order,
        vec![
            ("10.0.2.1".to_string(), 443),
            ("10.0.1.1".to_string(), 80),
            ("10.0.1.1".to_string(), 22),
            ("10.0.3.1".to_string(), 25),
        ]
    );
}

#[test]
fn failed_unit_is_left_out_of_the_report() {
    let root = config_root("10.0.0.5\n10.0.0.6\n", Some("22"));
    let mut bu = BusinessUnit::load(UNIT, root.path(), "").unwrap();
    bu.build_units("");

    let engine = FakeEngine::new()
        .with_hosts("10.0.0.5", vec![up("10.0.0.5", &[(22, "open", "ssh")])])
        .with_hosts("10.0.0.6", vec![up("10.0.0.6", &[(22, "open", "ssh")])])
        .failing("10.0.0.6");
    let summary = bu.scan(Arc::new(engine), &Config::default());
    assert_eq!(summary.completed, 2);
    assert_eq!(summary.failed, 1);
    assert!(!bu.units[1].artifact.exists());

    let report = bu.collect(None).unwrap();
    assert_eq!(report.skipped_units, 1);
    assert_eq!(report.rows.len(), 1);
    assert_eq!(report.rows[0].host, "10.0.0.5");
    assert_eq!(report.live_hosts, 1);
}

#[test]
fn unknown_state_aborts_before_writing() {
    let root = config_root("10.0.0.5\n", None);
    let mut bu = BusinessUnit::load(UNIT, root.path(), "").unwrap();
    bu.build_units("");
    let engine = FakeEngine::new().with_hosts("10.0.0.5", vec![up("10.0.0.5", &[(80, "unfiltered", "http")])]);
    bu.scan(Arc::new(engine), &Config::default());

    let err = bu.collect(None).unwrap_err();
    assert!(matches!(
        err,
        CollectError::Aggregate(AggregateError::UnknownState { port: 80, .. })
    ));
    assert!(!bu.paths.report_file.exists());
}

#[test]
fn classification_labels_rows() {
    let root = config_root("10.0.0.5\n", None);
    let table = Classification::from_reader("payroll,10.0.0.5\n".as_bytes()).unwrap();
    let mut bu = BusinessUnit::load(UNIT, root.path(), "").unwrap();
    bu.build_units("");
    let engine = FakeEngine::new().with_hosts("10.0.0.5", vec![up("10.0.0.5", &[(443, "open", "https")])]);
    bu.scan(Arc::new(engine), &Config::default());

    let report = bu.collect(Some(&table)).unwrap();
    assert_eq!(
        fs::read_to_string(&report.report_file).unwrap(),
        "10.0.0.5,443,open,https,payroll,*\n"
    );
}

#[test]
fn inventory_feeds_units_and_contacts() {
    let inventory = "\
# HR network
10.1.0.0/24
-10.1.0.1
-10.1.0.2
hr-lead@example.org
5550100@txt.example.net -m
10.1.1.10-20:8080  # app servers
";
    let root = config_root(inventory, Some("21,22,,\n3389\n"));
    let mut bu = BusinessUnit::load(UNIT, root.path(), "ACME").unwrap();

    assert_eq!(bu.exclusions.render(), "10.1.0.1,10.1.0.2,");
    assert_eq!(bu.ports.render(), "21,22,3389,");
    assert_eq!(bu.contacts.emails, vec!["hr-lead@example.org"]);
    assert_eq!(bu.contacts.mobile, vec!["5550100@txt.example.net"]);

    let units = bu.build_units("-sT").to_vec();
    assert_eq!(units.len(), 2);
    assert_eq!(units[0].options, "-sT -p 21,22,3389 --exclude 10.1.0.1,10.1.0.2");
    assert_eq!(units[1].target, "10.1.1.10-20");
    assert_eq!(units[1].ports.as_deref(), Some("8080"));
    assert_eq!(bu.machine_count, 256 + 11);
}

#[test]
fn missing_inventory_is_fatal() {
    let root = tempfile::tempdir().unwrap();
    fs::create_dir(root.path().join("config")).unwrap();

    let err = BusinessUnit::load(UNIT, root.path(), "").unwrap_err();
    assert!(matches!(err, ConfigError::Missing { what: "inventory file", .. }));
}
