use std::path::PathBuf;
use thiserror::Error;

/// Errors produced while parsing trajectories or configuring the analyses.
///
/// Parsing and configuration errors are unrecoverable for the run: the caller
/// gets enough context (line number, frame index, offending value) to locate
/// the defect, and no partial output is produced.
#[derive(Debug, Error)]
pub enum AnalysisError {
    /// An ATOM record whose coordinate fields could not be extracted.
    #[error("malformed coordinate record at line {line}: {content:?}")]
    MalformedRecord { line: usize, content: String },

    /// Frames in a trajectory must all have the same atom count.
    #[error("frame {frame} has {found} atoms, expected {expected}")]
    FrameLengthMismatch {
        frame: usize,
        expected: usize,
        found: usize,
    },

    /// Invalid analysis parameters, rejected before any frame is processed.
    #[error("invalid configuration: {0}")]
    Configuration(String),

    /// Zero frames parsed from the input.
    #[error("trajectory contains no frames")]
    EmptyTrajectory,

    #[error("failed to open {path}: {source}")]
    OpenFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

pub type Result<T> = std::result::Result<T, AnalysisError>;
