//! Compiles inventory entries into engine jobs.

use std::path::Path;
use std::str::FromStr;

use rayon::prelude::*;
use tracing::warn;

use portwatch_common::error::ConfigError;
use portwatch_common::models::ports::{ExclusionList, PortList};
use portwatch_common::models::unit::{PortFilter, ScanUnit};
use portwatch_common::network::target::{self, Target};

/// Builds [`ScanUnit`]s from the frozen policy of a business unit.
///
/// Holds only shared references, so building is a pure function of the
/// entry and safe to run from several threads.
#[derive(Debug, Clone, Copy)]
pub struct ScanUnitBuilder<'a> {
    pub exclusions: &'a ExclusionList,
    pub ports: &'a PortList,
    pub filter: PortFilter,
    pub output_dir: &'a Path,
    pub base_options: &'a str,
}

impl ScanUnitBuilder<'_> {
    /// Compiles one inventory entry.
    ///
    /// Targets the host counter does not understand are still handed to the
    /// engine, counted as one machine. Only an entry without a target fails.
    pub fn build(&self, index: usize, entry: &str) -> Result<ScanUnit, ConfigError> {
        let (target_str, inline_ports) = target::split_port_spec(entry);
        if target_str.is_empty() {
            return Err(ConfigError::InvalidTarget {
                entry: entry.to_string(),
                reason: "no target before the port spec".to_string(),
            });
        }

        let expected_hosts = match Target::from_str(target_str) {
            Ok(target) => target.host_count(),
            Err(reason) => {
                warn!("Cannot count hosts of '{target_str}' ({reason}), passing it to the engine as is");
                1
            }
        };

        let ports = self.port_restriction(inline_ports);
        let exclude = (!self.exclusions.is_empty()).then(|| self.exclusions.to_arg());

        let mut options: Vec<String> = self
            .base_options
            .split_whitespace()
            .map(str::to_string)
            .collect();
        if let Some(ports) = &ports {
            options.extend(["-p".to_string(), ports.clone()]);
        }
        if let Some(exclude) = &exclude {
            options.extend(["--exclude".to_string(), exclude.clone()]);
        }

        let artifact = self
            .output_dir
            .join(format!("unit-{index:03}-{}.xml", file_safe(target_str)));

        Ok(ScanUnit {
            index,
            target: target_str.to_string(),
            exclude,
            ports,
            options: options.join(" "),
            expected_hosts,
            artifact,
        })
    }

    /// Builds every entry in parallel, keeping inventory order.
    ///
    /// Entries that fail to build are logged and left out.
    pub fn build_all(&self, entries: &[String]) -> Vec<ScanUnit> {
        let results: Vec<Result<ScanUnit, ConfigError>> = entries
            .par_iter()
            .enumerate()
            .map(|(index, entry)| self.build(index, entry))
            .collect();

        results
            .into_iter()
            .filter_map(|result| match result {
                Ok(unit) => Some(unit),
                Err(e) => {
                    warn!("Skipping inventory entry: {e}");
                    None
                }
            })
            .collect()
    }

    fn port_restriction(&self, inline: Option<&str>) -> Option<String> {
        if !self.filter.is_enabled() {
            return None;
        }

        let ports = match inline {
            Some(spec) => PortList::parse(spec),
            None => self.ports.clone(),
        };
        (!ports.is_empty()).then(|| ports.to_arg())
    }
}

fn file_safe(target: &str) -> String {
    target
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '.' { c } else { '_' })
        .collect()
}
