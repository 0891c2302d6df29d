//! Envelope stripping: remove everything around the JSON object a model returns.

use std::sync::LazyLock;

use regex::Regex;

/// Markdown fence delimiters. A language tag goes with the fence only when it
/// is `json` or ends the line, so words after an inline fence survive.
static CODE_FENCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"```(?:json\b|[A-Za-z]*[ \t]*\r?(?:\n|$))?").expect("code fence pattern is valid")
});

/// Byte-order marks and zero-width characters.
pub(crate) fn is_invisible(c: char) -> bool {
    matches!(
        c,
        '\u{200B}' | '\u{200C}' | '\u{200D}' | '\u{2060}' | '\u{FEFF}' | '\u{FFFE}'
    )
}

/// Strip BOMs, zero-width characters, code fences (anywhere) and any text
/// before the first `{` or after the last `}`.
///
/// Text without a `{` is returned trimmed. When the object opened by the
/// first `{` is never closed (a truncated generation) everything from that
/// `{` to the end is kept.
pub fn strip_envelope(raw: &str) -> String {
    let visible: String = raw.chars().filter(|c| !is_invisible(*c)).collect();
    let unfenced = CODE_FENCE.replace_all(&visible, "");
    let trimmed = unfenced.trim();

    let Some(start) = trimmed.find('{') else {
        return trimmed.to_string();
    };
    let body = &trimmed[start..];
    if left_open(body) {
        return body.to_string();
    }

    match body.rfind('}') {
        Some(end) => body[..=end].to_string(),
        None => body.to_string(),
    }
}

/// True when the object starting at the first byte never closes.
fn left_open(body: &str) -> bool {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

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
        match c {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return false;
                }
            }
            _ => {}
        }
    }
    depth > 0
}
