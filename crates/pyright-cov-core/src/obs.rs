//! Structured log events for a pyright-cov run.
//!
//! Events are emitted through `tracing` with an `event` field naming them.
//! Nothing here prints to the user; the default filter level (`warn`) keeps
//! the wrapper quiet unless `RUST_LOG` asks for more.

use tracing::{debug, info, warn};

use crate::gate::GateVerdict;

/// Span covering one checker run, tagged with the report strategy in use.
/// Attach with `tracing::Instrument`.
pub fn run_span(strategy: &str) -> tracing::Span {
    tracing::info_span!("pyright_cov.run", strategy = %strategy)
}

/// Emit event: checker launched.
pub fn emit_checker_started(program: &str, arg_count: usize) {
    debug!(event = "checker.started", program = %program, arg_count = arg_count);
}

/// Emit event: checker exited.
pub fn emit_checker_finished(program: &str, exit_code: i32, duration_ms: u64) {
    info!(
        event = "checker.finished",
        program = %program,
        exit_code = exit_code,
        duration_ms = duration_ms,
    );
}

/// Emit event: gate decided with a measured coverage figure.
pub fn emit_coverage_evaluated(schema: &str, verdict: &GateVerdict) {
    info!(
        event = "coverage.evaluated",
        schema = %schema,
        coverage_percent = verdict.coverage_percent,
        threshold_percent = verdict.threshold_percent,
        exit_code = verdict.exit_code,
    );
}

/// Emit event: coverage evaluation skipped (warning level).
pub fn emit_coverage_skipped(reason: &dyn std::fmt::Display) {
    warn!(event = "coverage.skipped", reason = %reason);
}

/// Emit event: caller supplied their own structured-output flag.
pub fn emit_caller_managed() {
    info!(event = "coverage.caller_managed");
}

/// Emit event: temporary report could not be removed (warning level).
pub fn emit_report_cleanup_failed(path: &str, error: &dyn std::fmt::Display) {
    warn!(event = "report.cleanup_failed", path = %path, error = %error);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gate::Outcome;

    #[test]
    fn test_emit_functions_do_not_panic() {
        let verdict = GateVerdict {
            outcome: Outcome::Passed,
            coverage_percent: Some(95.0),
            threshold_percent: 90.0,
            exit_code: 0,
            message: None,
        };
        emit_checker_started("pyright", 2);
        emit_checker_finished("pyright", 0, 120);
        emit_coverage_evaluated("type_completeness", &verdict);
        emit_coverage_skipped(&"no report");
        emit_caller_managed();
        emit_report_cleanup_failed("/tmp/pyright-cov-x.json", &"busy");
    }

    #[test]
    fn test_run_span_create() {
        let _span = run_span("direct_capture");
    }
}
