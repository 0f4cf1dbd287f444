//! Parsing of a business unit's line-oriented config files.

use std::fs;
use std::path::Path;

use tracing::{debug, info};

use portwatch_common::error::ConfigError;
use portwatch_common::models::contacts::Contacts;
use portwatch_common::models::ports::{ExclusionList, PortList};
use portwatch_common::models::unit::PortFilter;

/// Everything read from the inventory file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Inventory {
    pub entries: Vec<String>,
    pub exclusions: ExclusionList,
    pub contacts: Contacts,
    /// The filter mode after reading, see [`parse_inventory`].
    pub filter: PortFilter,
}

/// Classifies inventory lines.
///
/// In order: comments are dropped (inline ones truncated), lines with `@` are
/// contacts (mobile when a `-m` token is present), lines starting with `-` are
/// exclusions and everything else is a scan target.
///
/// When `filter` is disabled, a target containing `:` turns it back on for
/// the whole unit.
pub fn parse_inventory<'a, I>(lines: I, mut filter: PortFilter) -> Inventory
where
    I: IntoIterator<Item = &'a str>,
{
    let mut entries = Vec::new();
    let mut exclusions = ExclusionList::new();
    let mut contacts = Contacts::default();

    for line in lines {
        let Some(line) = significant(line) else {
            continue;
        };

        if line.contains('@') {
            if line.split_whitespace().any(|t| t == "-m") {
                if let Some(number) = line.split_whitespace().next() {
                    contacts.mobile.push(number.to_string());
                }
            } else {
                contacts.emails.push(line.to_string());
            }
            continue;
        }

        if let Some(excluded) = line.strip_prefix('-') {
            exclusions.push(excluded);
            continue;
        }

        if !filter.is_enabled() && line.contains(':') {
            info!("Target '{line}' carries a port spec, re-enabling port filtering");
            filter = PortFilter::Enabled;
        }
        entries.push(line.to_string());
    }

    Inventory {
        entries,
        exclusions,
        contacts,
        filter,
    }
}

/// Collects the port list from the bad-ports file.
pub fn parse_ports<'a, I>(lines: I) -> PortList
where
    I: IntoIterator<Item = &'a str>,
{
    let mut ports = PortList::new();
    for line in lines {
        if let Some(line) = significant(line) {
            ports.append(line);
        }
    }
    ports
}

/// Strips comments and whitespace, `None` when nothing is left.
fn significant(line: &str) -> Option<&str> {
    let line = match line.split_once('#') {
        Some((before, _)) => before,
        None => line,
    };
    let line = line.trim();
    (!line.is_empty()).then_some(line)
}

pub(crate) fn read_lines(path: &Path) -> Result<String, ConfigError> {
    let bytes = fs::read(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    debug!("Read {} bytes from {}", bytes.len(), path.display());
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}
