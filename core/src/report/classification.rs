use std::collections::HashMap;
use std::io::Read;
use std::path::Path;

use tracing::debug;

use super::ReportError;

/// Business classification labels per host, read from `label,host` lines.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Classification {
    labels: HashMap<String, String>,
}

impl Classification {
    pub fn load(path: &Path) -> Result<Self, ReportError> {
        let file = std::fs::File::open(path).map_err(|source| ReportError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_reader(file).map_err(|source| ReportError::Csv {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, csv::Error> {
        let mut labels = HashMap::new();
        let mut csv = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(reader);

        for record in csv.records() {
            let record = record?;
            match (record.get(0), record.get(1)) {
                (Some(label), Some(host)) => {
                    labels.insert(host.trim().to_string(), label.trim().to_string());
                }
                _ => debug!("Ignoring classification line {:?}", record.position()),
            }
        }

        Ok(Self { labels })
    }

    /// The host's label, empty when it has none.
    pub fn label(&self, host: &str) -> &str {
        self.labels.get(host).map(String::as_str).unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}
