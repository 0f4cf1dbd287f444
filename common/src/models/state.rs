//! Port states the engine may report, and the counters kept for them.

use std::fmt;
use std::ops::Index;
use std::str::FromStr;

/// The closed set of port states a scan can report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScanState {
    Open,
    OpenFiltered,
    Filtered,
    ClosedFiltered,
    Closed,
}

impl ScanState {
    pub const ALL: [ScanState; 5] = [
        ScanState::Open,
        ScanState::OpenFiltered,
        ScanState::Filtered,
        ScanState::ClosedFiltered,
        ScanState::Closed,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ScanState::Open => "open",
            ScanState::OpenFiltered => "open|filtered",
            ScanState::Filtered => "filtered",
            ScanState::ClosedFiltered => "closed|filtered",
            ScanState::Closed => "closed",
        }
    }

    fn slot(&self) -> usize {
        *self as usize
    }
}

impl fmt::Display for ScanState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a state string is outside the closed set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownState(pub String);

impl FromStr for ScanState {
    type Err = UnknownState;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ScanState::ALL
            .into_iter()
            .find(|state| state.as_str() == s)
            .ok_or_else(|| UnknownState(s.to_string()))
    }
}

/// One counter per [`ScanState`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StateCounters([usize; ScanState::ALL.len()]);

impl StateCounters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn increment(&mut self, state: ScanState) {
        self.0[state.slot()] += 1;
    }

    pub fn get(&self, state: ScanState) -> usize {
        self.0[state.slot()]
    }

    pub fn total(&self) -> usize {
        self.0.iter().sum()
    }

    /// Every state with its count, in the fixed order of [`ScanState::ALL`].
    pub fn iter(&self) -> impl Iterator<Item = (ScanState, usize)> + '_ {
        ScanState::ALL.into_iter().map(|state| (state, self.get(state)))
    }
}

impl Index<ScanState> for StateCounters {
    type Output = usize;

    fn index(&self, state: ScanState) -> &usize {
        &self.0[state.slot()]
    }
}
