//! Run orchestration: route arguments, run the checker once, relay its
//! output, evaluate coverage and decide the exit code.

use std::io::Write;

use tracing::Instrument;

use crate::args::{self, InvocationRequest, ThresholdConfig};
use crate::checker::{CheckerCommand, ChildResult};
use crate::error::{CovError, CovResult};
use crate::gate::{CoverageGate, Evaluation, GateVerdict, Outcome};
use crate::obs;
use crate::report::select_strategy;

/// Result of a complete run.
#[derive(Debug, Clone)]
pub struct PipelineResult {
    /// Tokens forwarded to the checker.
    pub request: InvocationRequest,

    /// Threshold in effect.
    pub threshold: ThresholdConfig,

    /// Name of the report strategy used.
    pub strategy: &'static str,

    /// Checker output and exit code.
    pub child: ChildResult,

    /// Final decision.
    pub verdict: GateVerdict,
}

impl PipelineResult {
    /// Exit code for the whole run.
    pub fn exit_code(&self) -> i32 {
        self.verdict.exit_code
    }
}

/// Coverage gate pipeline around one checker.
#[derive(Debug, Clone, Default)]
pub struct CoveragePipeline {
    checker: CheckerCommand,
}

impl CoveragePipeline {
    pub fn new(checker: CheckerCommand) -> Self {
        Self { checker }
    }

    pub fn checker(&self) -> &CheckerCommand {
        &self.checker
    }

    /// Execute one run over `tokens` (program name excluded).
    ///
    /// The checker's stderr is always copied to `stderr`; its stdout is copied
    /// to `stdout` unless a JSON report was read from it. The below-threshold
    /// message goes to `stdout`, evaluation diagnostics to `stderr`.
    ///
    /// Errors are fatal: bad wrapper arguments (before anything is spawned),
    /// a checker that cannot be launched, or output that cannot be relayed.
    pub async fn run<I, O, E>(
        &self,
        tokens: I,
        stdout: &mut O,
        stderr: &mut E,
    ) -> CovResult<PipelineResult>
    where
        I: IntoIterator<Item = String>,
        O: Write + ?Sized,
        E: Write + ?Sized,
    {
        let routed = args::route(tokens, &self.checker.json_flag)?;
        let strategy = select_strategy(&self.checker, &routed.request);

        let produced = strategy
            .produce(&self.checker, &routed.request)
            .instrument(obs::run_span(strategy.name()))
            .await?;
        let child = produced.child;
        let evaluation = Evaluation::from_payload(produced.payload);

        // Stdout that did not yield a report is the checker's own text.
        if strategy.relays_stdout() || matches!(evaluation, Evaluation::Skipped(_)) {
            stdout
                .write_all(child.stdout.as_bytes())
                .map_err(CovError::Relay)?;
        }
        stderr
            .write_all(child.stderr.as_bytes())
            .map_err(CovError::Relay)?;

        let verdict = CoverageGate::evaluate(&evaluation, &routed.threshold, child.exit_code);

        match &evaluation {
            Evaluation::Measured(report) => {
                obs::emit_coverage_evaluated(report.schema.name(), &verdict)
            }
            Evaluation::Skipped(err) => obs::emit_coverage_skipped(err),
            Evaluation::CallerManaged => obs::emit_caller_managed(),
        }

        if let Some(message) = &verdict.message {
            let written = match verdict.outcome {
                Outcome::BelowThreshold => writeln!(stdout, "{message}"),
                _ => writeln!(stderr, "{message}"),
            };
            written.map_err(CovError::Relay)?;
        }
        stdout.flush().map_err(CovError::Relay)?;
        stderr.flush().map_err(CovError::Relay)?;

        Ok(PipelineResult {
            request: routed.request,
            threshold: routed.threshold,
            strategy: strategy.name(),
            child,
            verdict,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn test_argument_error_spawns_nothing() {
        // Would fail with a spawn error if it got that far.
        let pipeline = CoveragePipeline::new(CheckerCommand::custom(
            "pyright-cov-definitely-not-installed",
            Vec::new(),
        ));
        let mut out = Vec::new();
        let mut err = Vec::new();
        let result = pipeline
            .run(tokens(&["--cov-fail-under", "abc"]), &mut out, &mut err)
            .await;
        assert!(matches!(result, Err(CovError::Args(_))));
        assert!(out.is_empty());
        assert!(err.is_empty());
    }

    #[tokio::test]
    async fn test_missing_checker_is_fatal() {
        let pipeline = CoveragePipeline::new(CheckerCommand::custom(
            "pyright-cov-definitely-not-installed",
            Vec::new(),
        ));
        let mut out = Vec::new();
        let mut err = Vec::new();
        let result = pipeline.run(tokens(&["src/"]), &mut out, &mut err).await;
        let error = result.unwrap_err();
        assert!(matches!(error, CovError::Spawn { .. }));
        assert_eq!(error.exit_code(), 127);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_direct_capture_suppresses_json_stdout() {
        let script = r#"echo 'warning: slow' >&2
printf '{"typeCompleteness":{"completenessScore":0.85}}'"#;
        let pipeline = CoveragePipeline::new(CheckerCommand::custom(
            "sh",
            tokens(&["-c", script, "sh"]),
        ));
        let mut out = Vec::new();
        let mut err = Vec::new();
        let result = pipeline
            .run(tokens(&["--cov-fail-under", "90"]), &mut out, &mut err)
            .await
            .expect("pipeline failed");

        assert_eq!(result.strategy, "direct_capture");
        assert_eq!(result.exit_code(), 1);
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "Coverage 85.0% is below minimum required 90.0%\n"
        );
        assert_eq!(String::from_utf8(err).unwrap(), "warning: slow\n");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_direct_capture_relays_stdout_without_report() {
        let script = "echo 'Error: pyrightconfig.json is invalid'; exit 2";
        let pipeline = CoveragePipeline::new(CheckerCommand::custom(
            "sh",
            tokens(&["-c", script, "sh"]),
        ));
        let mut out = Vec::new();
        let mut err = Vec::new();
        let result = pipeline
            .run(Vec::new(), &mut out, &mut err)
            .await
            .expect("pipeline failed");

        assert_eq!(result.strategy, "direct_capture");
        assert_eq!(result.exit_code(), 2);
        assert_eq!(result.verdict.outcome, Outcome::Skipped);
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "Error: pyrightconfig.json is invalid\n"
        );
        assert!(String::from_utf8(err)
            .unwrap()
            .starts_with("pyright-cov: could not evaluate coverage:"));
    }
}
