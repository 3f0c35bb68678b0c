// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

use std::sync::OnceLock;

use regex::Regex;

/// Line range from a `#L<n>` or `#L<n>-L<m>` fragment
///
/// A single line yields `(n, n)`. Anything else, including an empty or
/// malformed fragment, yields `None`.
pub fn parse_line_fragment(fragment: &str) -> Option<(u32, u32)> {
    static LINE_FRAGMENT: OnceLock<Regex> = OnceLock::new();
    let regex = LINE_FRAGMENT.get_or_init(|| Regex::new(r"^#L(\d+)(?:-L(\d+))?").unwrap());

    let captures = regex.captures(fragment)?;
    let start: u32 = captures.get(1)?.as_str().parse().ok()?;
    let end = match captures.get(2) {
        Some(end) => end.as_str().parse().ok()?,
        None => start,
    };
    Some((start, end))
}

/// Fragment for a line range; the end marker is omitted for a single line
pub(crate) fn build_line_fragment(start_line: Option<u32>, end_line: Option<u32>) -> String {
    match (start_line, end_line) {
        (Some(start), Some(end)) if end != start => format!("#L{}-L{}", start, end),
        (Some(start), _) => format!("#L{}", start),
        (None, _) => String::new(),
    }
}
