//! Argument routing between the wrapper and the checker.
//!
//! The wrapper owns exactly one option, `--cov-fail-under`. Every other token
//! belongs to the checker and is forwarded untouched, in order, even when the
//! wrapper has never heard of it.

use clap::Parser;
use serde::{Deserialize, Serialize};

use crate::error::CovResult;

/// The wrapper's own option.
pub const COV_FAIL_UNDER: &str = "--cov-fail-under";

/// Threshold used when `--cov-fail-under` is not given.
pub const DEFAULT_THRESHOLD: f64 = 100.0;

/// Ends option recognition; it and everything after it are forwarded.
const END_OF_OPTIONS: &str = "--";

#[derive(Debug, Parser)]
#[command(
    name = "pyright-cov",
    disable_help_flag = true,
    disable_version_flag = true,
    args_override_self = true
)]
struct WrapperArgs {
    /// Fail if coverage is below this percentage
    #[arg(long = "cov-fail-under", value_name = "PERCENT", default_value_t = DEFAULT_THRESHOLD)]
    cov_fail_under: f64,
}

/// Minimum acceptable coverage, as a percentage.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ThresholdConfig {
    pub percent: f64,
}

impl ThresholdConfig {
    pub fn new(percent: f64) -> Self {
        Self { percent }
    }

    /// Whether `coverage` falls short of this threshold.
    ///
    /// Compared at full precision; rounding only happens when printing.
    pub fn is_breached_by(&self, coverage: f64) -> bool {
        coverage < self.percent
    }
}

impl Default for ThresholdConfig {
    fn default() -> Self {
        Self::new(DEFAULT_THRESHOLD)
    }
}

/// Tokens to forward to the checker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvocationRequest {
    /// Pass-through tokens in their original order.
    pub args: Vec<String>,

    /// Whether the caller already asked the checker for structured output.
    pub requests_structured_output: bool,
}

impl InvocationRequest {
    /// Build a request, detecting any token that starts with `json_flag`.
    pub fn new(args: Vec<String>, json_flag: &str) -> Self {
        let requests_structured_output = args.iter().any(|arg| arg.starts_with(json_flag));
        Self {
            args,
            requests_structured_output,
        }
    }
}

/// Outcome of routing the command line.
#[derive(Debug, Clone, PartialEq)]
pub struct RoutedArgs {
    pub request: InvocationRequest,
    pub threshold: ThresholdConfig,
}

/// Split command-line tokens (program name excluded) into the wrapper's
/// threshold and the checker's pass-through request.
///
/// Fails with [`CovError::Args`](crate::CovError::Args) when the threshold is
/// missing or not a number. Nothing has been spawned at that point.
pub fn route<I>(tokens: I, json_flag: &str) -> CovResult<RoutedArgs>
where
    I: IntoIterator<Item = String>,
{
    let mut forwarded = Vec::new();
    let mut own = Vec::new();

    let mut tokens = tokens.into_iter();
    while let Some(token) = tokens.next() {
        if token == END_OF_OPTIONS {
            forwarded.push(token);
            forwarded.extend(tokens.by_ref());
            break;
        }

        if token == COV_FAIL_UNDER {
            // Normalised to `--flag=value` so clap never mistakes a negative
            // number for another flag.
            match tokens.next() {
                Some(value) => own.push(format!("{COV_FAIL_UNDER}={value}")),
                None => own.push(token),
            }
        } else if token
            .strip_prefix(COV_FAIL_UNDER)
            .is_some_and(|rest| rest.starts_with('='))
        {
            own.push(token);
        } else {
            forwarded.push(token);
        }
    }

    let parsed =
        WrapperArgs::try_parse_from(std::iter::once("pyright-cov".to_string()).chain(own))?;

    Ok(RoutedArgs {
        request: InvocationRequest::new(forwarded, json_flag),
        threshold: ThresholdConfig::new(parsed.cov_fail_under),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::CovError;

    fn tokens(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_default_threshold() {
        let routed = route(tokens(&["src/"]), "--outputjson").expect("route failed");
        assert_eq!(routed.threshold.percent, 100.0);
        assert_eq!(routed.request.args, tokens(&["src/"]));
        assert!(!routed.request.requests_structured_output);
    }

    #[test]
    fn test_threshold_separate_value() {
        let routed = route(
            tokens(&["--level", "error", "--cov-fail-under", "87.5", "pkg"]),
            "--outputjson",
        )
        .expect("route failed");
        assert_eq!(routed.threshold.percent, 87.5);
        assert_eq!(routed.request.args, tokens(&["--level", "error", "pkg"]));
    }

    #[test]
    fn test_threshold_equals_form() {
        let routed = route(tokens(&["--cov-fail-under=42", "-p", "."]), "--outputjson")
            .expect("route failed");
        assert_eq!(routed.threshold.percent, 42.0);
        assert_eq!(routed.request.args, tokens(&["-p", "."]));
    }

    #[test]
    fn test_negative_threshold_accepted() {
        let routed =
            route(tokens(&["--cov-fail-under", "-5"]), "--outputjson").expect("route failed");
        assert_eq!(routed.threshold.percent, -5.0);
        assert!(routed.request.args.is_empty());
    }

    #[test]
    fn test_last_threshold_wins() {
        let routed = route(
            tokens(&["--cov-fail-under", "10", "--cov-fail-under=20"]),
            "--outputjson",
        )
        .expect("route failed");
        assert_eq!(routed.threshold.percent, 20.0);
    }

    #[test]
    fn test_non_numeric_threshold_rejected() {
        let err = route(tokens(&["--cov-fail-under", "lots"]), "--outputjson").unwrap_err();
        assert!(matches!(err, CovError::Args(_)));
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn test_missing_threshold_value_rejected() {
        let err = route(tokens(&["src/", "--cov-fail-under"]), "--outputjson").unwrap_err();
        assert!(matches!(err, CovError::Args(_)));
    }

    #[test]
    fn test_unknown_tokens_forwarded_in_order() {
        let raw = tokens(&["--verbose", "-p", "pyrightconfig.json", "--unknown=x", "b.py", "a.py"]);
        let routed = route(raw.clone(), "--outputjson").expect("route failed");
        assert_eq!(routed.request.args, raw);
    }

    #[test]
    fn test_prefix_is_not_an_abbreviation() {
        let routed = route(tokens(&["--cov-fail", "--cov-fail-underx=1"]), "--outputjson")
            .expect("route failed");
        assert_eq!(routed.request.args, tokens(&["--cov-fail", "--cov-fail-underx=1"]));
        assert_eq!(routed.threshold, ThresholdConfig::default());
    }

    #[test]
    fn test_end_of_options_forwards_rest() {
        let routed = route(
            tokens(&["--cov-fail-under", "50", "--", "--cov-fail-under", "60"]),
            "--outputjson",
        )
        .expect("route failed");
        assert_eq!(routed.threshold.percent, 50.0);
        assert_eq!(routed.request.args, tokens(&["--", "--cov-fail-under", "60"]));
    }

    #[test]
    fn test_detects_structured_output_request() {
        let routed =
            route(tokens(&["--outputjson", "src/"]), "--outputjson").expect("route failed");
        assert!(routed.request.requests_structured_output);

        let routed = route(tokens(&["--outputjson=report.json"]), "--outputjson")
            .expect("route failed");
        assert!(routed.request.requests_structured_output);
    }

    #[test]
    fn test_threshold_comparison_is_strict() {
        let threshold = ThresholdConfig::new(90.0);
        assert!(threshold.is_breached_by(89.99));
        assert!(!threshold.is_breached_by(90.0));
        assert!(!threshold.is_breached_by(95.0));
        // 89.96 would print as 90.0 but still fails
        assert!(threshold.is_breached_by(89.96));
    }
}
