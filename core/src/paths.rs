//! Filesystem layout of a business unit.
//!
//! ```text
//! <root>/config/ports_baseline_<name>.conf   inventory (required)
//! <root>/config/ports_bad_<name>             port list (optional)
//! <root>/nmap-<name>/                        engine artifacts and reports
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use portwatch_common::error::ConfigError;
use portwatch_common::models::unit::PortFilter;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Paths {
    pub root: PathBuf,
    pub config_dir: PathBuf,
    pub ports_file: PathBuf,
    pub inventory_file: PathBuf,
    pub output_dir: PathBuf,
    pub report_file: PathBuf,
    pub backup_file: PathBuf,
}

impl Paths {
    pub fn new(root: &Path, name: &str) -> Self {
        let config_dir = root.join("config");
        let output_dir = root.join(format!("nmap-{name}"));

        Self {
            root: root.to_path_buf(),
            ports_file: config_dir.join(format!("ports_bad_{name}")),
            inventory_file: config_dir.join(format!("ports_baseline_{name}.conf")),
            report_file: output_dir.join(format!("output-{name}.csv")),
            backup_file: output_dir.join(format!("output-{name}.bak")),
            config_dir,
            output_dir,
        }
    }

    /// Resolves and checks the layout for `name` under `root`.
    ///
    /// Missing required artifacts are errors. A missing port list switches the
    /// unit to [`PortFilter::Disabled`]. The output directory is created when
    /// absent.
    pub fn resolve(root: &Path, name: &str) -> Result<(Self, PortFilter), ConfigError> {
        if root.as_os_str().is_empty() {
            return Err(ConfigError::RootUnset(name.to_string()));
        }

        let paths = Self::new(root, name);

        if !paths.config_dir.is_dir() {
            return Err(ConfigError::Missing {
                what: "config directory",
                path: paths.config_dir,
            });
        }

        let filter = if paths.ports_file.is_file() {
            PortFilter::Enabled
        } else {
            warn!(
                "No ports_bad_{name} specified at {}, continuing without",
                paths.ports_file.display()
            );
            PortFilter::Disabled
        };

        if !paths.inventory_file.is_file() {
            return Err(ConfigError::Missing {
                what: "inventory file",
                path: paths.inventory_file,
            });
        }

        if !paths.output_dir.is_dir() {
            info!("{} does not exist, creating now", paths.output_dir.display());
            fs::create_dir_all(&paths.output_dir).map_err(|source| {
                ConfigError::CreateOutputDir {
                    path: paths.output_dir.clone(),
                    source,
                }
            })?;
        }

        Ok((paths, filter))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_root(with_ports: bool) -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("config")).unwrap();
        fs::write(dir.path().join("config/ports_baseline_hr.conf"), "10.0.0.5\n").unwrap();
        if with_ports {
            fs::write(dir.path().join("config/ports_bad_hr"), "22\n").unwrap();
        }
        dir
    }

    #[test]
    fn derives_layout_from_root_and_name() {
        let paths = Paths::new(Path::new("/srv/scan"), "hr");
        assert_eq!(paths.inventory_file, Path::new("/srv/scan/config/ports_baseline_hr.conf"));
        assert_eq!(paths.ports_file, Path::new("/srv/scan/config/ports_bad_hr"));
        assert_eq!(paths.report_file, Path::new("/srv/scan/nmap-hr/output-hr.csv"));
        assert_eq!(paths.backup_file, Path::new("/srv/scan/nmap-hr/output-hr.bak"));
    }

    #[test]
    fn empty_root_is_fatal() {
        let err = Paths::resolve(Path::new(""), "hr").unwrap_err();
        assert!(matches!(err, ConfigError::RootUnset(name) if name == "hr"));
    }

    #[test]
    fn missing_inventory_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("config")).unwrap();

        let err = Paths::resolve(dir.path(), "hr").unwrap_err();
        assert!(matches!(err, ConfigError::Missing { what: "inventory file", .. }));
    }

    #[test]
    fn missing_port_list_degrades_and_output_dir_is_created() {
        let dir = config_root(false);

        let (paths, filter) = Paths::resolve(dir.path(), "hr").unwrap();
        assert_eq!(filter, PortFilter::Disabled);
        assert!(paths.output_dir.is_dir());

        let dir = config_root(true);
        let (_, filter) = Paths::resolve(dir.path(), "hr").unwrap();
        assert_eq!(filter, PortFilter::Enabled);
    }
}
