//! Terminal rendering of a finished report.

use colored::*;

use portwatch_common::models::report::ReportEntry;
use portwatch_core::report::{ReportSink, ScanReport};

use crate::terminal::{colors, print};

/// Rows listed before the rest is summarised as a count.
const MAX_ROWS: usize = 40;

pub struct TerminalSummary;

impl ReportSink for TerminalSummary {
    fn name(&self) -> &str {
        "terminal"
    }

    fn publish(&self, report: &ScanReport) -> anyhow::Result<()> {
        print::header(&format!("{} report", report.business_unit));
        print_overview(report);

        print::header("port states");
        let states: Vec<(&str, String)> = report
            .stats
            .iter()
            .map(|(state, count)| (state.as_str(), count.to_string()))
            .collect();
        print::key_values(&states);

        print::header("open ports");
        print_rows(&report.rows);

        print::rule();
        let new = report.new_findings();
        let new_count = if new > 0 {
            new.to_string().color(colors::NEW_FINDING).bold()
        } else {
            new.to_string().green().bold()
        };
        print::centered(&format!(
            "{} open ports, {} new since the last run",
            report.rows.len().to_string().bold(),
            new_count
        ));
        Ok(())
    }
}

fn print_overview(report: &ScanReport) {
    let mut lines: Vec<(&str, String)> = Vec::new();
    if !report.org.is_empty() {
        lines.push(("Organisation", report.org.clone()));
    }
    lines.push(("Scan units", report.units.to_string()));
    if report.skipped_units > 0 {
        lines.push(("Units without results", report.skipped_units.to_string()));
    }
    lines.push(("Machines", report.machine_count.to_string()));
    lines.push(("Live hosts", report.live_hosts.to_string()));
    lines.push(("Report", report.report_file.display().to_string()));
    if !report.contacts.is_empty() {
        lines.push((
            "Contacts",
            format!(
                "{} email, {} mobile",
                report.contacts.emails.len(),
                report.contacts.mobile.len()
            ),
        ));
    }

    print::key_values(&lines);
}

fn print_rows(rows: &[ReportEntry]) {
    if rows.is_empty() {
        print::centered(&"no open ports found".bright_black().to_string());
        return;
    }

    for row in rows.iter().take(MAX_ROWS) {
        let marker: ColoredString = if row.is_new {
            "NEW".color(colors::NEW_FINDING).bold()
        } else {
            "   ".normal()
        };
        let label = if row.label.is_empty() {
            String::new()
        } else {
            format!(" ({})", row.label)
        };
        print::status(format!(
            "{} {:>15}:{:<5} {}{}",
            marker,
            row.host.color(colors::PRIMARY),
            row.port.to_string().color(colors::ACCENT),
            row.service,
            label.bright_black()
        ));
    }

    if rows.len() > MAX_ROWS {
        print::status(format!("... {} more in the report", rows.len() - MAX_ROWS));
    }
}
