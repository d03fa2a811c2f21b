//! Preflight checks.
//!
//! Verified before the pipeline enters any state: a failed check aborts the
//! run before anything on disk can change.

use crate::services::probe;
use colored::Colorize;

/// Result of a preflight check.
#[derive(Debug)]
pub struct CheckResult {
    pub name: String,
    pub success: bool,
    pub message: String,
    pub hint: Option<String>,
}

impl CheckResult {
    pub fn ok(name: &str, message: &str) -> Self {
        Self {
            name: name.to_string(),
            success: true,
            message: message.to_string(),
            hint: None,
        }
    }

    pub fn fail(name: &str, message: &str, hint: &str) -> Self {
        Self {
            name: name.to_string(),
            success: false,
            message: message.to_string(),
            hint: Some(hint.to_string()),
        }
    }
}

/// Run all preflight checks.
pub fn run_preflight_checks() -> Vec<CheckResult> {
    vec![check_tmdb_key(), check_ffprobe()]
}

fn check_tmdb_key() -> CheckResult {
    match std::env::var("TMDB_API_KEY") {
        Ok(key) if !key.trim().is_empty() => CheckResult::ok("TMDB", "API key configured"),
        _ => CheckResult::fail(
            "TMDB",
            "API key not configured",
            "Set TMDB_API_KEY in the environment or a .env file",
        ),
    }
}

fn check_ffprobe() -> CheckResult {
    if probe::is_installed() {
        CheckResult::ok("ffprobe", "found on PATH")
    } else {
        CheckResult::fail(
            "ffprobe",
            "not found",
            "Install FFmpeg: sudo apt install ffmpeg",
        )
    }
}

/// Print preflight check results.
pub fn print_results(results: &[CheckResult]) {
    for result in results {
        if result.success {
            println!(
                "{} {}: {}",
                "[OK]".green(),
                result.name.bold(),
                result.message
            );
        } else {
            println!(
                "{} {}: {}",
                "[FAIL]".red(),
                result.name.bold(),
                result.message
            );
            if let Some(hint) = &result.hint {
                println!("       {hint}");
            }
        }
    }
}

/// Check if all preflight checks passed.
pub fn all_passed(results: &[CheckResult]) -> bool {
    results.iter().all(|r| r.success)
}
