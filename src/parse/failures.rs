// src/parse/failures.rs

/// Upper bound on diagnostic lines kept per outcome.
pub const MAX_ERROR_LINES: usize = 5;

/// Case-insensitive substrings marking a diagnostic line.
const FAILURE_MARKERS: &[&str] = &[
    "error", "fail", "exception", "assert", "✗", "✘", "❌", "失败", "错误",
];

const SCREENSHOT_MARKERS: &[&str] = &["screenshot", "截图", "截屏"];

/// Up to [`MAX_ERROR_LINES`] trimmed lines carrying a failure marker, in
/// original order.
pub fn extract_error_lines(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .filter(|line| {
            let lower = line.to_lowercase();
            FAILURE_MARKERS.iter().any(|m| lower.contains(m))
        })
        .take(MAX_ERROR_LINES)
        .map(str::to_string)
        .collect()
}

/// Whether the output mentions that the program produced screenshots.
///
/// A hint only; nothing checks that the files exist.
pub fn mentions_screenshots(text: &str) -> bool {
    let lower = text.to_lowercase();
    SCREENSHOT_MARKERS.iter().any(|m| lower.contains(m))
}
