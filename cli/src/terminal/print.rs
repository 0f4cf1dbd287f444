//! Terminal output routed through tracing so it shares the progress bar's
//! writer.

use colored::*;
use tracing::info;
use unicode_width::UnicodeWidthStr;

use crate::terminal::colors;

pub const TOTAL_WIDTH: usize = 64;

/// Events on this target are terminal output, printed without a level symbol.
pub const PRINT_TARGET: &str = "portwatch::print";

pub fn print(msg: &str) {
    info!(target: PRINT_TARGET, "{msg}");
}

pub fn header(title: &str) {
    let title = format!("⟦ {} ⟧", title.to_uppercase());
    let dashes = TOTAL_WIDTH.saturating_sub(UnicodeWidthStr::width(title.as_str()));
    let left = dashes / 2;

    print(&format!(
        "{}{}{}",
        "─".repeat(left).bright_black(),
        title.bright_green(),
        "─".repeat(dashes - left).bright_black()
    ));
}

pub fn rule() {
    print(&"═".repeat(TOTAL_WIDTH).color(colors::SEPARATOR).to_string());
}

/// A `> text` line.
pub fn status<T: AsRef<str>>(msg: T) {
    print(&format!(
        "{} {}",
        ">".color(colors::SEPARATOR),
        msg.as_ref().color(colors::TEXT_DEFAULT)
    ));
}

/// Prints `key.....: value` lines with the dots padding every key to the
/// longest one.
pub fn key_values<K: AsRef<str>>(lines: &[(K, String)]) {
    let width = lines.iter().map(|(key, _)| key.as_ref().len()).max().unwrap_or(0);
    for (key, value) in lines {
        let key = key.as_ref();
        status(format!(
            "{}{} {}",
            key.color(colors::PRIMARY),
            format!("{}:", ".".repeat(width + 1 - key.len())).color(colors::SEPARATOR),
            value.color(colors::TEXT_DEFAULT)
        ));
    }
}

/// Prints `[idx] name` followed by its details as a one level tree.
pub fn unit_tree(idx: usize, name: &str, details: &[(&str, ColoredString)]) {
    print(&format!(
        "{}{}{} {}",
        "[".color(colors::SEPARATOR),
        idx.to_string().color(colors::ACCENT),
        "]".color(colors::SEPARATOR),
        name.color(colors::PRIMARY)
    ));

    let width = details.iter().map(|(key, _)| key.len()).max().unwrap_or(0);
    for (i, (key, value)) in details.iter().enumerate() {
        let branch = if i + 1 == details.len() { "└─" } else { "├─" };
        print(&format!(
            " {} {}{} {}",
            branch.bright_black(),
            key.color(colors::TEXT_DEFAULT),
            format!("{}:", ".".repeat(width + 1 - key.len())).color(colors::SEPARATOR),
            value
        ));
    }
}

pub fn centered(msg: &str) {
    let pad = " ".repeat(TOTAL_WIDTH.saturating_sub(console::measure_text_width(msg)) / 2);
    print(&format!("{pad}{msg}"));
}
