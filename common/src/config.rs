use std::time::Duration;

pub const DEFAULT_WORKERS: usize = 4;
pub const DEFAULT_ENGINE: &str = "nmap";
pub const DEFAULT_OPTIONS: &str = "-sT -sV";

/// Runtime settings for a single scan run.
#[derive(Debug, Clone)]
pub struct Config {
    /// Number of engine invocations allowed to run at once.
    pub workers: usize,
    /// Kill an engine invocation after this long.
    ///
    /// `None` waits for the engine forever.
    pub timeout: Option<Duration>,
    /// Program used to run a scan unit.
    pub engine_path: String,
    /// Options placed in front of every unit's own options.
    pub base_options: String,
    /// Organisation the business unit belongs to, shown in summaries.
    pub org: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            workers: DEFAULT_WORKERS,
            timeout: None,
            engine_path: DEFAULT_ENGINE.to_string(),
            base_options: DEFAULT_OPTIONS.to_string(),
            org: String::new(),
        }
    }
}
