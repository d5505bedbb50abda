//! Report text normalisation.

/// Flatten a multi-line report into one line.
///
/// Blank lines are dropped, the rest are trimmed and joined with single
/// spaces.
pub fn normalize(report: &str) -> String {
    report
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}
