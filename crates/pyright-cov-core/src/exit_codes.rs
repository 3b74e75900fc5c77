//! Exit code constants for pyright-cov.
//!
//! The checker's own exit code is propagated unchanged whenever the wrapper
//! has nothing to add; the constants below cover the cases where the wrapper
//! itself decides the outcome.

/// Exit code constants.
pub mod codes {
    /// Checker succeeded and coverage (when measurable) met the threshold.
    pub const SUCCESS: i32 = 0;

    /// Coverage was measured and is below the configured threshold.
    pub const COVERAGE_BELOW_THRESHOLD: i32 = 1;

    /// Generic wrapper failure (waiting on the checker, temp file creation).
    pub const FAILURE: i32 = 1;

    /// Invalid wrapper arguments (e.g. non-numeric `--cov-fail-under`).
    pub const CLI_ARGS: i32 = 2;

    /// Checker executable exists but could not be launched.
    pub const CHECKER_NOT_EXECUTABLE: i32 = 126;

    /// Checker executable was not found.
    pub const CHECKER_NOT_FOUND: i32 = 127;

    /// Base added to a signal number when the checker was killed by a signal.
    pub const SIGNAL_BASE: i32 = 128;
}

/// Derive an exit code from a finished child process.
///
/// Uses the real code when there is one. On Unix a signal-terminated child
/// maps to `128 + signal`, as shells report it.
pub fn from_status(status: &std::process::ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }

    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return codes::SIGNAL_BASE + signal;
        }
    }

    codes::FAILURE
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::os::unix::process::ExitStatusExt;
    use std::process::ExitStatus;

    #[test]
    fn test_exit_code_passthrough() {
        assert_eq!(from_status(&ExitStatus::from_raw(0)), codes::SUCCESS);
        assert_eq!(from_status(&ExitStatus::from_raw(3 << 8)), 3);
    }

    #[test]
    fn test_signal_maps_to_shell_convention() {
        // SIGKILL
        assert_eq!(from_status(&ExitStatus::from_raw(9)), 137);
    }
}
