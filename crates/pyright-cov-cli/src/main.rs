//! pyright-cov - fail the build when pyright's type coverage drops
//!
//! ```text
//! pyright-cov [--cov-fail-under PERCENT] [PYRIGHT ARGS...]
//! ```
//!
//! Every argument except `--cov-fail-under` (default `100.0`) is handed to
//! `pyright` unchanged. The exit code is `1` when coverage is measurable and
//! below the threshold, otherwise pyright's own exit code.
//!
//! Logging goes to stderr and is off below `warn` unless `RUST_LOG` says
//! otherwise; `PYRIGHT_COV_LOG_FORMAT=json` switches to JSON lines.

use anyhow::{anyhow, Context, Result};
use pyright_cov_core::exit_codes::codes;
use pyright_cov_core::{init_tracing, telemetry, CheckerCommand, CovError, CoveragePipeline};
use tracing::{debug, Level};

#[tokio::main(flavor = "current_thread")]
async fn main() {
    init_tracing(telemetry::json_requested(), Level::WARN);

    let code = match run().await {
        Ok(code) => code,
        Err(err) => report_fatal(&err),
    };
    std::process::exit(code);
}

async fn run() -> Result<i32> {
    let tokens = collect_args().context("Failed to read command line")?;
    debug!(?tokens, "Starting pyright-cov");

    let pipeline = CoveragePipeline::new(CheckerCommand::pyright());
    let mut stdout = std::io::stdout();
    let mut stderr = std::io::stderr();
    let result = pipeline.run(tokens, &mut stdout, &mut stderr).await?;

    Ok(result.exit_code())
}

/// Command-line arguments without the program name.
fn collect_args() -> Result<Vec<String>> {
    std::env::args_os()
        .skip(1)
        .map(|arg| {
            arg.into_string()
                .map_err(|raw| anyhow!("argument {:?} is not valid UTF-8", raw))
        })
        .collect()
}

/// Print a fatal error and pick the exit code for it.
fn report_fatal(err: &anyhow::Error) -> i32 {
    match err.downcast_ref::<CovError>() {
        Some(CovError::Args(usage)) => {
            eprint!("{usage}");
            codes::CLI_ARGS
        }
        Some(cov_err) => {
            eprintln!("pyright-cov: {err:#}");
            cov_err.exit_code()
        }
        None => {
            eprintln!("pyright-cov: {err:#}");
            codes::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fatal_spawn_error_code() {
        let err = anyhow::Error::new(CovError::Spawn {
            program: "pyright".to_string(),
            source: std::io::Error::from(std::io::ErrorKind::NotFound),
        });
        assert_eq!(report_fatal(&err), codes::CHECKER_NOT_FOUND);
    }

    #[test]
    fn test_fatal_argument_error_code() {
        let err = pyright_cov_core::route(
            vec!["--cov-fail-under".to_string(), "abc".to_string()],
            "--outputjson",
        )
        .unwrap_err();
        assert_eq!(report_fatal(&anyhow::Error::new(err)), codes::CLI_ARGS);
    }

    #[test]
    fn test_fatal_error_with_context_keeps_code() {
        let err = anyhow::Error::new(CovError::TempFile(std::io::Error::from(
            std::io::ErrorKind::PermissionDenied,
        )))
        .context("Failed to run pipeline");
        assert_eq!(report_fatal(&err), codes::FAILURE);
    }

    #[test]
    fn test_fatal_other_error_code() {
        assert_eq!(report_fatal(&anyhow!("boom")), codes::FAILURE);
    }
}
