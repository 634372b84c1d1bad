//! Failure classification for analyzer invocations

use super::invoker::ExitError;
use regex::Regex;
use std::sync::OnceLock;

static MISSING_PATTERN: OnceLock<Regex> = OnceLock::new();

fn missing_pattern() -> &'static Regex {
    MISSING_PATTERN
        .get_or_init(|| Regex::new(r"(?i)no such file or directory|not found").expect("valid regex"))
}

/// Why an invocation failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    Unknown,
    BinaryNotFound,
}

/// Classify a failed invocation.
///
/// A failure only counts as a missing binary when the diagnostic both
/// reads like a missing file AND names the analyzer binary. A target file
/// that does not exist produces the same "no such file or directory" text
/// without the binary name, and must stay `Unknown`.
pub fn classify_failure(exit_error: Option<&ExitError>, binary_name: &str) -> FailureKind {
    let Some(err) = exit_error else {
        return FailureKind::Unknown;
    };

    let message = err.message.to_lowercase();
    let names_binary = !binary_name.is_empty() && message.contains(&binary_name.to_lowercase());

    if missing_pattern().is_match(&message) && names_binary {
        FailureKind::BinaryNotFound
    } else {
        FailureKind::Unknown
    }
}
