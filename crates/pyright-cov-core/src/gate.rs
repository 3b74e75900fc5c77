//! Coverage gate: threshold comparison and exit-code synthesis.

use serde::{Deserialize, Serialize};

use crate::args::ThresholdConfig;
use crate::coverage::CoverageReport;
use crate::error::CovError;
use crate::exit_codes::codes;
use crate::report::ReportPayload;

/// Result of turning a collected report into a coverage figure.
#[derive(Debug)]
pub enum Evaluation {
    /// Coverage was measured.
    Measured(CoverageReport),

    /// Coverage could not be measured; the run falls back to the checker.
    Skipped(CovError),

    /// The caller handles structured output; nothing was evaluated.
    CallerManaged,
}

impl Evaluation {
    /// Parse a strategy's payload.
    pub fn from_payload(payload: ReportPayload) -> Self {
        match payload {
            ReportPayload::Captured(text) => match CoverageReport::from_json(&text) {
                Ok(report) => Evaluation::Measured(report),
                Err(err) => Evaluation::Skipped(err),
            },
            ReportPayload::Unavailable(err) => Evaluation::Skipped(err),
            ReportPayload::CallerManaged => Evaluation::CallerManaged,
        }
    }

    pub fn coverage_percent(&self) -> Option<f64> {
        match self {
            Evaluation::Measured(report) => Some(report.coverage_percent),
            _ => None,
        }
    }
}

/// What the gate decided.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    /// Coverage met the threshold; the checker's code stands.
    Passed,

    /// Coverage fell short of the threshold.
    BelowThreshold,

    /// Coverage could not be measured; the checker's code stands.
    Skipped,

    /// Caller-managed structured output; the checker's code stands.
    CallerManaged,
}

/// Gate evaluation verdict.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GateVerdict {
    pub outcome: Outcome,

    /// Measured coverage, if any.
    pub coverage_percent: Option<f64>,

    /// Threshold the coverage was compared against.
    pub threshold_percent: f64,

    /// Exit code for the whole run.
    pub exit_code: i32,

    /// User-facing message (below-threshold notice or skip diagnostic).
    pub message: Option<String>,
}

impl GateVerdict {
    /// Whether the run as a whole succeeded.
    pub fn passed(&self) -> bool {
        self.exit_code == codes::SUCCESS
    }
}

/// Coverage gate rules.
pub struct CoverageGate;

impl CoverageGate {
    /// Decide the run's exit code.
    ///
    /// Gate rule:
    /// - Measured coverage strictly below the threshold exits `1`
    /// - Anything else exits with the checker's own code
    /// - An unmeasurable report is surfaced as a message, never treated as
    ///   100% or as an automatic failure
    pub fn evaluate(
        evaluation: &Evaluation,
        threshold: &ThresholdConfig,
        checker_exit_code: i32,
    ) -> GateVerdict {
        let (outcome, exit_code, message) = match evaluation {
            Evaluation::Measured(report) if threshold.is_breached_by(report.coverage_percent) => (
                Outcome::BelowThreshold,
                codes::COVERAGE_BELOW_THRESHOLD,
                Some(below_threshold_message(
                    report.coverage_percent,
                    threshold.percent,
                )),
            ),
            Evaluation::Measured(_) => (Outcome::Passed, checker_exit_code, None),
            Evaluation::Skipped(err) => (
                Outcome::Skipped,
                checker_exit_code,
                Some(format!("pyright-cov: could not evaluate coverage: {err}")),
            ),
            Evaluation::CallerManaged => (Outcome::CallerManaged, checker_exit_code, None),
        };

        GateVerdict {
            outcome,
            coverage_percent: evaluation.coverage_percent(),
            threshold_percent: threshold.percent,
            exit_code,
            message,
        }
    }
}

/// `Coverage 85.0% is below minimum required 90.0%`
pub fn below_threshold_message(coverage_percent: f64, threshold_percent: f64) -> String {
    format!(
        "Coverage {:.1}% is below minimum required {:.1}%",
        coverage_percent, threshold_percent
    )
}
