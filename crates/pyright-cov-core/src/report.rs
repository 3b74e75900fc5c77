//! Strategies for getting a structured report out of the checker.
//!
//! Each strategy runs the checker exactly once and hands back the child's
//! output together with whatever report it collected:
//!
//! - [`DirectCapture`] appends the JSON-to-stdout flag and reads stdout.
//! - [`TempFileCapture`] points the checker at a fresh temporary file and
//!   reads it back. The file is removed before `produce` returns, on every
//!   path.
//! - [`CallerManaged`] injects nothing. The caller asked for structured output
//!   themselves, so there is nothing for the wrapper to read.

use async_trait::async_trait;
use tempfile::TempPath;

use crate::args::InvocationRequest;
use crate::checker::{CheckerCommand, ChildResult};
use crate::error::{CovError, CovResult};
use crate::obs;

/// Report collected by a strategy.
#[derive(Debug)]
pub enum ReportPayload {
    /// Raw report text.
    Captured(String),

    /// A report was requested but could not be collected.
    Unavailable(CovError),

    /// The caller manages structured output; coverage is not evaluated.
    CallerManaged,
}

/// Checker output plus the collected report.
#[derive(Debug)]
pub struct ProducedReport {
    pub child: ChildResult,
    pub payload: ReportPayload,
}

/// Produces a structured report from one checker invocation.
#[async_trait]
pub trait ReportStrategy: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Whether the checker's stdout should be shown to the user.
    fn relays_stdout(&self) -> bool;

    /// Run the checker for `request` and collect its report.
    ///
    /// Errors are reserved for failures to run the checker at all; report
    /// problems come back as [`ReportPayload::Unavailable`].
    async fn produce(
        &self,
        checker: &CheckerCommand,
        request: &InvocationRequest,
    ) -> CovResult<ProducedReport>;
}

/// Pick the strategy for this run.
///
/// The caller's own structured-output flag takes precedence. Otherwise a
/// checker that can write JSON to a file gets the temp-file strategy and any
/// other checker is read from stdout.
pub fn select_strategy(
    checker: &CheckerCommand,
    request: &InvocationRequest,
) -> Box<dyn ReportStrategy> {
    if request.requests_structured_output {
        return Box::new(CallerManaged);
    }
    match &checker.json_file_flag {
        Some(flag) => Box::new(TempFileCapture::new(flag.clone())),
        None => Box::new(DirectCapture),
    }
}

/// Reads the JSON report from the checker's stdout.
///
/// Stdout carries the JSON, so it is only relayed when no report came out of it.
#[derive(Debug, Clone, Copy, Default)]
pub struct DirectCapture;

#[async_trait]
impl ReportStrategy for DirectCapture {
    fn name(&self) -> &'static str {
        "direct_capture"
    }

    fn relays_stdout(&self) -> bool {
        false
    }

    async fn produce(
        &self,
        checker: &CheckerCommand,
        request: &InvocationRequest,
    ) -> CovResult<ProducedReport> {
        let mut args = request.args.clone();
        args.push(checker.json_flag.clone());

        let child = checker.run(&args).await?;
        tracing::debug!(stdout = %child.stdout, "Checker structured output");

        let payload = if child.stdout.trim().is_empty() {
            ReportPayload::Unavailable(CovError::MissingReport(
                "nothing was written to stdout".to_string(),
            ))
        } else {
            ReportPayload::Captured(child.stdout.clone())
        };

        Ok(ProducedReport { child, payload })
    }
}

/// Has the checker write its JSON report to a scoped temporary file.
#[derive(Debug, Clone)]
pub struct TempFileCapture {
    flag: String,
}

impl TempFileCapture {
    /// `flag` is followed by the report path on the checker's command line.
    pub fn new(flag: impl Into<String>) -> Self {
        Self { flag: flag.into() }
    }
}

#[async_trait]
impl ReportStrategy for TempFileCapture {
    fn name(&self) -> &'static str {
        "temp_file"
    }

    fn relays_stdout(&self) -> bool {
        true
    }

    async fn produce(
        &self,
        checker: &CheckerCommand,
        request: &InvocationRequest,
    ) -> CovResult<ProducedReport> {
        // Unique name comes from tempfile; the guard deletes it on drop if we
        // bail out early.
        let report_path = tempfile::Builder::new()
            .prefix("pyright-cov-")
            .suffix(".json")
            .tempfile()
            .map_err(CovError::TempFile)?
            .into_temp_path();

        let mut args = request.args.clone();
        args.push(self.flag.clone());
        args.push(report_path.to_string_lossy().into_owned());

        let child = checker.run(&args).await?;

        let payload = match read_report(&report_path).await {
            Ok(text) => ReportPayload::Captured(text),
            Err(err) => ReportPayload::Unavailable(err),
        };
        release(report_path);

        Ok(ProducedReport { child, payload })
    }
}

async fn read_report(path: &std::path::Path) -> CovResult<String> {
    let text = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| match source.kind() {
            std::io::ErrorKind::NotFound => {
                CovError::MissingReport(format!("{} was removed", path.display()))
            }
            _ => CovError::ReadReport {
                path: path.to_path_buf(),
                source,
            },
        })?;

    if text.trim().is_empty() {
        return Err(CovError::MissingReport(format!(
            "{} was left empty",
            path.display()
        )));
    }
    Ok(text)
}

/// Delete the report file. Failures are logged and otherwise ignored.
fn release(report_path: TempPath) {
    let display = report_path.display().to_string();
    if let Err(err) = report_path.close() {
        if err.kind() != std::io::ErrorKind::NotFound {
            obs::emit_report_cleanup_failed(&display, &err);
        }
    }
}

/// Runs the checker untouched; the caller handles structured output.
#[derive(Debug, Clone, Copy, Default)]
pub struct CallerManaged;

#[async_trait]
impl ReportStrategy for CallerManaged {
    fn name(&self) -> &'static str {
        "caller_managed"
    }

    fn relays_stdout(&self) -> bool {
        true
    }

    async fn produce(
        &self,
        checker: &CheckerCommand,
        request: &InvocationRequest,
    ) -> CovResult<ProducedReport> {
        let child = checker.run(&request.args).await?;
        Ok(ProducedReport {
            child,
            payload: ReportPayload::CallerManaged,
        })
    }
}
