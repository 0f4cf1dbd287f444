use anyhow::Context;
use colored::*;

use portwatch_common::config::Config;
use portwatch_core::business_unit::BusinessUnit;
use portwatch_core::engine::{NmapEngine, ScanEngine};

use super::UnitArgs;
use crate::terminal::print;

const NO_TARGETS: &str = "no scan targets in the inventory";

pub fn plan(args: &UnitArgs, cfg: &Config) -> anyhow::Result<()> {
    let mut bu = BusinessUnit::load(&args.business_unit, &args.path, &cfg.org)
        .with_context(|| format!("cannot plan business unit '{}'", args.business_unit))?;
    let engine = NmapEngine::new(cfg.engine_path.clone());

    let units = bu.build_units(&cfg.base_options);
    if units.is_empty() {
        print::centered(&NO_TARGETS.bright_black().to_string());
    }

    for unit in units {
        let details = [
            ("Hosts", unit.expected_hosts.to_string().normal()),
            ("Ports", unit.ports.as_deref().unwrap_or("engine default").normal()),
            ("Exclude", unit.exclude.as_deref().unwrap_or("-").normal()),
            ("Command", engine.command_line(unit).bright_black()),
        ];
        print::unit_tree(unit.index, &unit.target, &details);
    }

    print::rule();
    print::key_values(&[
        ("Targets", bu.units.len().to_string()),
        ("Machines", bu.machine_count.to_string()),
        (
            "Port filter",
            if bu.filter.is_enabled() { "enabled" } else { "disabled" }.to_string(),
        ),
        (
            "Contacts",
            format!(
                "{} email, {} mobile",
                bu.contacts.emails.len(),
                bu.contacts.mobile.len()
            ),
        ),
    ]);
    Ok(())
}
