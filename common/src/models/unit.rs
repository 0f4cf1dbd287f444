use std::fmt;
use std::path::PathBuf;

/// Whether the business unit restricts scans to a port list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PortFilter {
    Enabled,
    /// No bad-ports file was found.
    Disabled,
}

impl PortFilter {
    pub fn is_enabled(&self) -> bool {
        matches!(self, PortFilter::Enabled)
    }
}

/// One compiled engine job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanUnit {
    /// Position in the inventory; report rows follow this order.
    pub index: usize,
    /// The target as written in the inventory, without any port spec.
    pub target: String,
    /// Rendered exclusion list, `None` when nothing is excluded.
    pub exclude: Option<String>,
    /// Rendered port restriction, `None` to scan the engine's defaults.
    pub ports: Option<String>,
    /// Full option string handed to the engine, output flags excluded.
    pub options: String,
    pub expected_hosts: u64,
    /// Where the engine writes this unit's result.
    pub artifact: PathBuf,
}

impl fmt::Display for ScanUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{} {}", self.index, self.target)
    }
}
