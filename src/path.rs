//! Path algebra for delimited configuration keys.
//!
//! Keys address nodes in the configuration tree as segments joined by
//! [`KEY_DELIMITER`] (`a:b:c`). Segments may be empty: `a::b` names a child
//! of the empty-named section under `a`.

use std::cmp::Ordering;

/// The delimiter separating individual segments in a configuration path.
pub const KEY_DELIMITER: char = ':';

/// Combines path segments into one path.
///
/// Empty segments are preserved verbatim; an empty input yields `""`.
pub fn combine<I, S>(segments: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut out = String::new();
    for (i, segment) in segments.into_iter().enumerate() {
        if i > 0 {
            out.push(KEY_DELIMITER);
        }
        out.push_str(segment.as_ref());
    }
    out
}

/// Extracts the last path segment from the path.
pub fn section_key(path: &str) -> &str {
    match path.rfind(KEY_DELIMITER) {
        Some(idx) => &path[idx + 1..],
        None => path,
    }
}

/// Extracts the path of the parent node for a given path.
///
/// Returns `None` for a top-level node, including the empty path (an empty
/// path contains no delimiter and therefore has no parent).
pub fn parent_path(path: &str) -> Option<&str> {
    path.rfind(KEY_DELIMITER).map(|idx| &path[..idx])
}

/// Orders two configuration paths.
///
/// `None` compares equal to the empty path. Leading delimiters before each
/// segment are skipped, so `":a"` and `"a"` compare equal. Remaining
/// segments compare pairwise: integer-like segments (`^-?\d+$`) by value,
/// others case-insensitively, and an integer segment always sorts before a
/// non-integer one. A path whose segments are a prefix of the other's sorts
/// first.
pub fn compare(x: Option<&str>, y: Option<&str>) -> Ordering {
    let mut x_rest = skip_delimiters(x.unwrap_or(""));
    let mut y_rest = skip_delimiters(y.unwrap_or(""));

    while !x_rest.is_empty() && !y_rest.is_empty() {
        let (x_part, x_next) = split_segment(x_rest);
        let (y_part, y_next) = split_segment(y_rest);

        let ordering = compare_parts(x_part, y_part);
        if ordering != Ordering::Equal {
            return ordering;
        }

        x_rest = x_next;
        y_rest = y_next;
    }

    match (x_rest.is_empty(), y_rest.is_empty()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Less,
        (false, true) => Ordering::Greater,
        (false, false) => unreachable!(),
    }
}

fn skip_delimiters(path: &str) -> &str {
    path.trim_start_matches(KEY_DELIMITER)
}

/// Splits off the next segment and the remainder with leading delimiters
/// already consumed.
fn split_segment(path: &str) -> (&str, &str) {
    match path.find(KEY_DELIMITER) {
        Some(idx) => (&path[..idx], skip_delimiters(&path[idx + 1..])),
        None => (path, ""),
    }
}

fn compare_parts(a: &str, b: &str) -> Ordering {
    match (parse_integer(a), parse_integer(b)) {
        (Some(a_int), Some(b_int)) => a_int.cmp(&b_int),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => a
            .chars()
            .flat_map(char::to_lowercase)
            .cmp(b.chars().flat_map(char::to_lowercase)),
    }
}

fn parse_integer(part: &str) -> Option<i128> {
    let digits = part.strip_prefix('-').unwrap_or(part);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    part.parse().ok()
}
