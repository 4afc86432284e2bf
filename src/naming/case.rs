//! Segment casing rules

use std::collections::BTreeMap;

/// Render one `_`-separated segment of a raw identifier
///
/// Table hits win; an all-uppercase segment is capitalized then lowercased
/// (`FORMAT` → `Format`); anything else goes through [`pascal_segment`].
pub fn case_segment(segment: &str, acronyms: &BTreeMap<String, String>) -> String {
    if let Some(fixed) = acronyms.get(segment) {
        return fixed.clone();
    }
    if segment.is_empty() {
        return String::new();
    }
    if segment.chars().all(char::is_uppercase) {
        let mut chars = segment.chars();
        let first = chars.next().map(String::from).unwrap_or_default();
        return first + &chars.as_str().to_lowercase();
    }
    pascal_segment(segment)
}

/// Digit-aware PascalCase for a mixed segment
///
/// The first character and every character after a digit are uppercased; a
/// `d` directly after a digit also uppercases its successor, so `2d` reads
/// as a dimension tag. Characters following a lowercase letter keep their
/// case, which preserves existing camelCase humps (`sType` → `SType`).
pub fn pascal_segment(segment: &str) -> String {
    let mut out = String::with_capacity(segment.len());
    let mut up_next = true;
    let mut was_lower = false;
    let mut was_digit = false;

    for ch in segment.chars() {
        if up_next {
            out.extend(ch.to_uppercase());
        } else if was_lower {
            out.push(ch);
        } else {
            out.extend(ch.to_lowercase());
        }

        up_next = ch.is_ascii_digit();
        was_lower = ch.is_lowercase();
        if was_digit && ch.to_ascii_lowercase() == 'd' {
            up_next = true;
        }
        was_digit = ch.is_ascii_digit();
    }

    out
}

/// Strip `prefix` from the start of `name`, ignoring ASCII case
pub fn strip_prefix_ignore_case<'a>(name: &'a str, prefix: &str) -> Option<&'a str> {
    let head = name.get(..prefix.len())?;
    if head.eq_ignore_ascii_case(prefix) {
        name.get(prefix.len()..)
    } else {
        None
    }
}
