//! Fragment extraction: candidate JSON objects buried in (or cut out of) model text.

use serde_json::Value;

use crate::repair::repair;

/// Upper bound on balanced fragments tried per response.
pub const MAX_FRAGMENTS: usize = 64;

/// A fragment that decoded (possibly after repair).
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    /// Byte length of the fragment text that produced `value`.
    pub len: usize,
    pub value: Value,
}

/// Every balanced `{...}` substring, longest first.
///
/// Single pass of brace-depth matching that skips braces inside
/// double-quoted strings. Brackets are not tracked.
pub fn balanced_objects(text: &str) -> Vec<&str> {
    let mut opens = Vec::new();
    let mut found = Vec::new();
    let mut in_string = false;
    let mut escaped = false;

    for (i, c) in text.char_indices() {
        if in_string {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
            continue;
        }

        match c {
            '"' => in_string = true,
            '{' => opens.push(i),
            '}' => {
                if let Some(start) = opens.pop() {
                    found.push(&text[start..=i]);
                }
            }
            _ => {}
        }
    }

    found.sort_by_key(|s| std::cmp::Reverse(s.len()));
    found.truncate(MAX_FRAGMENTS);
    found
}

/// Close an object cut off mid-generation.
///
/// Starting at the first `{`, appends whatever quote and brackets are still
/// open. A dangling `,` is dropped, and a dangling `:` or object key gets a
/// `null` value. Returns `None` when there is no `{`, when the first object is
/// already balanced, or when brackets are mismatched.
pub fn close_truncated(text: &str) -> Option<String> {
    let start = text.find('{')?;
    let body = &text[start..];

    let mut closers: Vec<char> = Vec::new();
    let mut in_string = false;
    let mut escaped = false;
    // Last significant character outside strings, and the one before the latest string.
    let mut last_code: Option<char> = None;
    let mut before_string: Option<char> = None;
    let mut ends_with_string = false;

    for c in body.chars() {
        if in_string {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
            continue;
        }

        if c.is_whitespace() {
            continue;
        }

        ends_with_string = false;
        match c {
            '"' => {
                in_string = true;
                ends_with_string = true;
                before_string = last_code;
            }
            '{' => closers.push('}'),
            '[' => closers.push(']'),
            '}' | ']' => {
                if closers.pop() != Some(c) {
                    return None;
                }
                if closers.is_empty() {
                    return None;
                }
            }
            _ => {}
        }
        last_code = Some(c);
    }

    if closers.is_empty() {
        return None;
    }

    let mut closed = body.trim_end().to_string();
    if in_string {
        if escaped {
            closed.pop();
        }
        closed.push('"');
    }

    let in_object = closers.last() == Some(&'}');
    if ends_with_string {
        if in_object && matches!(before_string, Some('{' | ',')) {
            closed.push_str(": null");
        }
    } else if closed.ends_with(',') {
        closed.pop();
    } else if closed.ends_with(':') {
        closed.push_str(" null");
    }

    closed.extend(closers.iter().rev());
    Some(closed)
}

/// Decode every candidate object in `text`.
///
/// The repaired, re-closed tail comes first (it is the whole response when the
/// model was cut off), followed by each balanced fragment, tried as-is and
/// then repaired.
pub fn candidates(text: &str) -> Vec<Candidate> {
    let mut out = Vec::new();

    if let Some(closed) = close_truncated(&repair(text)) {
        if let Ok(value) = serde_json::from_str::<Value>(&closed) {
            out.push(Candidate {
                len: closed.len(),
                value,
            });
        }
    }

    for fragment in balanced_objects(text) {
        let value = serde_json::from_str::<Value>(fragment)
            .ok()
            .or_else(|| serde_json::from_str::<Value>(&repair(fragment)).ok());
        if let Some(value) = value {
            out.push(Candidate {
                len: fragment.len(),
                value,
            });
        }
    }

    out
}
