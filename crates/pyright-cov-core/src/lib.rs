//! pyright-cov - type coverage gate for a static type checker
//!
//! Runs the checker once and fails the run when the coverage figure in its
//! JSON report is below a threshold:
//! - Routes `--cov-fail-under` away from the checker's own arguments
//! - Collects the JSON report from stdout or a scoped temporary file
//! - Extracts coverage from either known report layout
//! - Combines the coverage verdict with the checker's exit code

pub mod args;
pub mod checker;
pub mod coverage;
pub mod error;
pub mod exit_codes;
pub mod gate;
pub mod obs;
pub mod pipeline;
pub mod report;
pub mod telemetry;

// Re-export key types
pub use args::{route, InvocationRequest, RoutedArgs, ThresholdConfig, DEFAULT_THRESHOLD};
pub use checker::{CheckerCommand, ChildResult};
pub use coverage::{CoverageReport, CoverageSchema};
pub use error::{CovError, CovResult};
pub use gate::{CoverageGate, Evaluation, GateVerdict, Outcome};
pub use pipeline::{CoveragePipeline, PipelineResult};
pub use report::{
    select_strategy, CallerManaged, DirectCapture, ProducedReport, ReportPayload, ReportStrategy,
    TempFileCapture,
};
pub use telemetry::init_tracing;
