use std::{fmt, io, path::PathBuf};
use thiserror::Error;

/// Which of the two peak-search windows of a cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowSide {
    First,
    Second,
}

impl fmt::Display for WindowSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WindowSide::First => write!(f, "first"),
            WindowSide::Second => write!(f, "second"),
        }
    }
}

/// Errors returned by [`SignalReducer::reduce`](crate::reducer::SignalReducer::reduce).
///
/// Every variant aborts the current call; no partial table is returned.
#[derive(Error, Debug)]
pub enum ReduceError {
    /// An input file is missing, unreadable or malformed.
    #[error("failed to load {path:?}: {reason}")]
    DataLoad { path: PathBuf, reason: String },

    /// No series were requested.
    #[error("set count must be at least 1")]
    NoSeries,

    /// Cycle window bounds are malformed.
    #[error("invalid cycle window: {0}")]
    InvalidWindow(String),

    /// A peak-search window holds no samples.
    #[error("no samples fall in the {0} peak window")]
    EmptyWindow(WindowSide),

    /// The plotting backend failed.
    #[error("failed to render plot: {0}")]
    Plot(String),

    /// Writing the period and gravity report failed.
    #[error("failed to write report")]
    Report(#[from] io::Error),
}

impl ReduceError {
    pub(crate) fn data_load(path: impl Into<PathBuf>, reason: impl fmt::Display) -> Self {
        Self::DataLoad {
            path: path.into(),
            reason: reason.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ReduceError>;
