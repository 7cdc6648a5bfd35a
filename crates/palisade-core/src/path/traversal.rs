//! Traversal detection on the raw, un-decoded input.
//!
//! Runs before any filesystem-aware check so encoding tricks cannot bypass
//! the later stages. The engine never percent-decodes; it hunts for the
//! encodings themselves.

/// Percent-encoded traversal sequences, matched case-insensitively
///
/// Covers fully and partially encoded `..` (single and double encoding) and
/// `..` combined with an encoded separator.
const ENCODED_TRAVERSAL_MARKERS: &[&str] = &[
    // ".." with both dots encoded, single and double
    "%2e%2e",
    "%252e%252e",
    // mixed literal/encoded dots
    ".%2e",
    "%2e.",
    ".%252e",
    "%252e.",
    // ".." adjacent to an encoded separator
    "..%2f",
    "%2f..",
    "..%5c",
    "%5c..",
    "..%252f",
    "%252f..",
    "..%255c",
    "%255c..",
];

/// Report traversal intent in `raw`, if any
///
/// Checks literal `..` segments (either separator style) and the encoded
/// marker list. Returns the reason for the first hit.
pub(crate) fn detect_traversal(raw: &str) -> Option<String> {
    if raw
        .split(['/', '\\'])
        .any(|segment| segment == "..")
    {
        return Some("path contains a '..' traversal segment".to_string());
    }

    let lower = raw.to_ascii_lowercase();
    for marker in ENCODED_TRAVERSAL_MARKERS {
        if lower.contains(marker) {
            return Some(format!(
                "path contains encoded traversal sequence '{marker}'"
            ));
        }
    }

    None
}
