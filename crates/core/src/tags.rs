// SPDX-License-Identifier: MIT

//! Tag parsing: comma-separated, trimmed, de-duplicated, order preserved.

/// Parse a comma-separated tag string into an ordered, de-duplicated list.
///
/// Empty entries (from leading/trailing/doubled commas) are dropped.
pub fn parse_tags(raw: &str) -> Vec<String> {
    let mut seen = Vec::new();
    for part in raw.split(',') {
        let trimmed = part.trim();
        if trimmed.is_empty() {
            continue;
        }
        if !seen.iter().any(|t: &String| t == trimmed) {
            seen.push(trimmed.to_string());
        }
    }
    seen
}
