//! Checker process execution.

use std::process::Stdio;
use std::time::Instant;

use serde::{Deserialize, Serialize};
use tokio::process::Command;

use crate::error::{CovError, CovResult};
use crate::exit_codes;
use crate::obs;

/// How to launch the type checker and ask it for structured output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckerCommand {
    /// Executable to run.
    pub program: String,

    /// Arguments placed before the forwarded tokens.
    pub leading_args: Vec<String>,

    /// Flag that makes the checker print its JSON report on stdout.
    pub json_flag: String,

    /// Flag that makes the checker write its JSON report to a path given as
    /// the next argument, if the checker has one.
    pub json_file_flag: Option<String>,
}

impl CheckerCommand {
    /// The `pyright` executable on `PATH`.
    pub fn pyright() -> Self {
        Self {
            program: "pyright".to_string(),
            leading_args: Vec::new(),
            json_flag: "--outputjson".to_string(),
            json_file_flag: None,
        }
    }

    /// A custom checker. JSON flags default to pyright's.
    pub fn custom(program: impl Into<String>, leading_args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            leading_args,
            ..Self::pyright()
        }
    }

    /// Set the flag used to request a JSON report written to a file.
    pub fn with_json_file_flag(mut self, flag: impl Into<String>) -> Self {
        self.json_file_flag = Some(flag.into());
        self
    }

    /// Run the checker to completion with `args` appended after the leading
    /// arguments, capturing stdout and stderr in full.
    ///
    /// A non-zero exit from the checker is an ordinary result, not an error.
    /// Waits as long as the checker runs.
    pub async fn run(&self, args: &[String]) -> CovResult<ChildResult> {
        let start = Instant::now();
        obs::emit_checker_started(&self.program, args.len());

        let child = Command::new(&self.program)
            .args(&self.leading_args)
            .args(args)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| CovError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        let output = child
            .wait_with_output()
            .await
            .map_err(|source| CovError::Wait {
                program: self.program.clone(),
                source,
            })?;

        let duration_ms = start.elapsed().as_millis() as u64;
        let exit_code = exit_codes::from_status(&output.status);
        let stdout = String::from_utf8_lossy(&output.stdout).to_string();
        let stderr = String::from_utf8_lossy(&output.stderr).to_string();

        obs::emit_checker_finished(&self.program, exit_code, duration_ms);

        Ok(ChildResult {
            exit_code,
            stdout,
            stderr,
            duration_ms,
        })
    }
}

impl Default for CheckerCommand {
    fn default() -> Self {
        Self::pyright()
    }
}

/// Result of one checker invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChildResult {
    /// Exit code (0 = success).
    pub exit_code: i32,

    /// Captured stdout.
    pub stdout: String,

    /// Captured stderr.
    pub stderr: String,

    /// Duration in milliseconds.
    pub duration_ms: u64,
}

impl ChildResult {
    /// Whether the checker itself passed.
    pub fn passed(&self) -> bool {
        self.exit_code == 0
    }
}
