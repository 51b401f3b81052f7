//! Heuristic major extraction from PDF front-matter text.
//!
//! Dissertation front matter repeats the program name near the advisor and
//! committee blocks under varying labels. Anchored markers favor precision
//! over recall: unconventional phrasing yields an empty result rather than
//! a false positive.

use std::sync::LazyLock;

use regex::Regex;

/// Case-sensitive line markers; the text after the first marker on a line is
/// the candidate major.
static MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:Major:|majors:|Co-Majors:)(.*)$").expect("marker regex"));

/// Greedy parenthesized span, e.g. the "(PhD)" suffix in
/// "Computer Science (PhD)".
static PARENTHETICAL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\(.*\)").expect("parenthetical regex"));

/// Scan text lines for major declarations and join the results with `"; "`.
///
/// Per line: first marker match wins, unmatched lines contribute nothing.
/// The captured text is trimmed, any parenthesized span removed, and
/// trimmed again.
pub fn find_major<'a, I>(lines: I) -> String
where
    I: IntoIterator<Item = &'a str>,
{
    let mut majors = Vec::new();
    for line in lines {
        if let Some(captures) = MARKER.captures(line) {
            let candidate = captures.get(1).map_or("", |m| m.as_str()).trim();
            let stripped = PARENTHETICAL.replace_all(candidate, "");
            majors.push(stripped.trim().to_string());
        }
    }
    majors.join("; ")
}
