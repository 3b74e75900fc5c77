//! Error types for the coverage gate.

use std::path::PathBuf;

use crate::exit_codes::codes;

/// Errors produced while routing arguments, running the checker, or reading
/// its structured report.
#[derive(Debug, thiserror::Error)]
pub enum CovError {
    #[error(transparent)]
    Args(#[from] clap::Error),

    #[error("failed to launch checker `{program}`: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed while waiting for checker `{program}`: {source}")]
    Wait {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to create temporary report file: {0}")]
    TempFile(#[source] std::io::Error),

    #[error("checker produced no structured report: {0}")]
    MissingReport(String),

    #[error("could not read structured report {}: {source}", path.display())]
    ReadReport {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("structured report is not valid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("failed to relay checker output: {0}")]
    Relay(#[source] std::io::Error),

    #[error(
        "structured report matches no known coverage schema \
         (expected `typeCompleteness.completenessScore` or `summary.filesAnalyzed`)"
    )]
    UnrecognizedSchema,
}

impl CovError {
    /// Whether the run can continue by skipping coverage evaluation.
    ///
    /// Report problems are soft: the user sees a diagnostic and the checker's
    /// own exit code decides the run. Everything else aborts the run.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            CovError::MissingReport(_)
                | CovError::ReadReport { .. }
                | CovError::InvalidJson(_)
                | CovError::UnrecognizedSchema
        )
    }

    /// Exit code used when this error aborts the run.
    pub fn exit_code(&self) -> i32 {
        match self {
            CovError::Args(_) => codes::CLI_ARGS,
            CovError::Spawn { source, .. } if source.kind() == std::io::ErrorKind::NotFound => {
                codes::CHECKER_NOT_FOUND
            }
            CovError::Spawn { .. } => codes::CHECKER_NOT_EXECUTABLE,
            _ => codes::FAILURE,
        }
    }
}

/// Result type for coverage gate operations.
pub type CovResult<T> = std::result::Result<T, CovError>;
