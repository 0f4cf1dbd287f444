use crate::models::state::ScanState;

pub const NEW_MARKER: &str = "*";

/// One open port in the final report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportEntry {
    pub host: String,
    pub port: u16,
    pub state: ScanState,
    pub service: String,
    /// Business classification of the host, empty when unknown.
    pub label: String,
    /// Not present in the previous run's report.
    pub is_new: bool,
}

impl ReportEntry {
    pub fn marker(&self) -> &'static str {
        if self.is_new { NEW_MARKER } else { "" }
    }

    /// Fields in report column order: host, port, state, service, label, marker.
    pub fn to_record(&self) -> [String; 6] {
        [
            self.host.clone(),
            self.port.to_string(),
            self.state.to_string(),
            self.service.clone(),
            self.label.clone(),
            self.marker().to_string(),
        ]
    }
}
