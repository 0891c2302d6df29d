//! Ordered, independent text repairs for almost-JSON model output.
//!
//! Each rule is a pure `&str -> String` transform with its own fixture. Rules
//! are heuristics: they make common corruption parseable and may mis-repair
//! adversarial content (a script that itself uses curly quotes as punctuation).

use std::borrow::Cow;
use std::sync::LazyLock;

use regex::Regex;
use tracing::trace;

/// One named repair step.
#[derive(Debug, Clone, Copy)]
pub struct RepairRule {
    pub name: &'static str,
    pub apply: fn(&str) -> String,
}

/// Repairs in application order.
pub const RULES: [RepairRule; 7] = [
    RepairRule {
        name: "normalize_typography",
        apply: normalize_typography,
    },
    RepairRule {
        name: "collapse_double_escapes",
        apply: collapse_double_escapes,
    },
    RepairRule {
        name: "escape_inner_quotes",
        apply: escape_inner_quotes,
    },
    RepairRule {
        name: "escape_control_characters",
        apply: escape_control_characters,
    },
    RepairRule {
        name: "quote_unquoted_keys",
        apply: quote_unquoted_keys,
    },
    RepairRule {
        name: "single_quotes_to_double",
        apply: single_quotes_to_double,
    },
    RepairRule {
        name: "strip_trailing_commas",
        apply: strip_trailing_commas,
    },
];

static DOUBLED_ESCAPE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"\\\\([nrt"/])"#).expect("doubled escape pattern is valid"));

static UNQUOTED_KEY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"([{,]\s*)([A-Za-z_$][A-Za-z0-9_$\-]*)(\s*):").expect("unquoted key pattern is valid")
});

static TRAILING_COMMA: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r",(\s*[\]}])").expect("trailing comma pattern is valid"));

/// Apply every rule in order.
pub fn repair(text: &str) -> String {
    let mut current = text.to_string();
    for rule in &RULES {
        let next = (rule.apply)(&current);
        if next != current {
            trace!(rule = rule.name, "repair rule changed text");
        }
        current = next;
    }
    current
}

/// Smart quotes, dashes, ellipsis and non-breaking spaces to ASCII.
pub fn normalize_typography(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\u{201C}' | '\u{201D}' | '\u{201E}' | '\u{201F}' | '\u{2033}' => out.push('"'),
            '\u{2018}' | '\u{2019}' | '\u{201A}' | '\u{201B}' | '\u{2032}' => out.push('\''),
            '\u{2013}' | '\u{2014}' | '\u{2212}' => out.push('-'),
            '\u{2026}' => out.push_str("..."),
            '\u{00A0}' => out.push(' '),
            _ => out.push(c),
        }
    }
    out
}

/// `\\n` to `\n` (and `\\"`, `\\t`, ...). A document whose every quote is
/// escaped was stringified twice and loses one escape level first.
pub fn collapse_double_escapes(text: &str) -> String {
    let text = if is_stringified_twice(text) {
        unescape_one_level(text)
    } else {
        text.to_string()
    };
    DOUBLED_ESCAPE.replace_all(&text, r"\${1}").into_owned()
}

/// Escape `"` characters inside string values that do not end the string.
///
/// A quote ends a string only when the next non-whitespace character is
/// `,` `}` `]` `:` or the end of input.
pub fn escape_inner_quotes(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut out = String::with_capacity(text.len() + 16);
    let mut in_string = false;
    let mut escaped = false;

    for (i, &c) in chars.iter().enumerate() {
        if !in_string {
            if c == '"' {
                in_string = true;
            }
            out.push(c);
            continue;
        }

        if escaped {
            escaped = false;
            out.push(c);
            continue;
        }

        match c {
            '\\' => {
                escaped = true;
                out.push(c);
            }
            '"' if ends_string(&chars[i + 1..]) => {
                in_string = false;
                out.push(c);
            }
            '"' => out.push_str("\\\""),
            _ => out.push(c),
        }
    }

    out
}

/// Literal newlines, tabs and other control characters inside strings to escapes.
pub fn escape_control_characters(text: &str) -> String {
    map_segments(text, |code| Cow::Borrowed(code), |string| {
        if !string.chars().any(char::is_control) {
            return Cow::Borrowed(string);
        }
        let mut out = String::with_capacity(string.len() + 8);
        for c in string.chars() {
            match c {
                '\n' => out.push_str("\\n"),
                '\r' => out.push_str("\\r"),
                '\t' => out.push_str("\\t"),
                c if (c as u32) < 0x20 => out.push_str(&format!("\\u{:04x}", c as u32)),
                c => out.push(c),
            }
        }
        Cow::Owned(out)
    })
}

/// `{score: 8}` to `{"score": 8}`, outside string values only.
pub fn quote_unquoted_keys(text: &str) -> String {
    map_segments(
        text,
        |code| UNQUOTED_KEY.replace_all(code, "${1}\"${2}\"${3}:"),
        Cow::Borrowed,
    )
}

/// `{'a': 'it's'}` to `{"a": "it's"}`.
///
/// A `'` opens a string only where a value or key may start (after `{` `[`
/// `,` `:`), and closes it only where a double-quoted string could end, so
/// apostrophes survive.
pub fn single_quotes_to_double(text: &str) -> String {
    #[derive(PartialEq)]
    enum State {
        Code,
        Double,
        Single,
    }

    let chars: Vec<char> = text.chars().collect();
    let mut out = String::with_capacity(text.len());
    let mut state = State::Code;
    let mut last_code: Option<char> = None;
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        match state {
            State::Code => match c {
                '"' => {
                    state = State::Double;
                    out.push(c);
                }
                '\'' if matches!(last_code, None | Some('{' | '[' | ',' | ':')) => {
                    state = State::Single;
                    out.push('"');
                }
                _ => {
                    out.push(c);
                    if !c.is_whitespace() {
                        last_code = Some(c);
                    }
                }
            },
            State::Double => {
                out.push(c);
                if c == '\\' {
                    if let Some(&next) = chars.get(i + 1) {
                        out.push(next);
                        i += 1;
                    }
                } else if c == '"' {
                    state = State::Code;
                    last_code = Some('"');
                }
            }
            State::Single => match c {
                '\\' => {
                    match chars.get(i + 1) {
                        Some('\'') => out.push('\''),
                        Some(&next) => {
                            out.push('\\');
                            out.push(next);
                        }
                        None => out.push_str("\\\\"),
                    }
                    i += 1;
                }
                '"' => out.push_str("\\\""),
                '\'' if ends_string(&chars[i + 1..]) => {
                    out.push('"');
                    state = State::Code;
                    last_code = Some('"');
                }
                _ => out.push(c),
            },
        }
        i += 1;
    }

    out
}

/// `[1, 2,]` to `[1, 2]`, outside string values only.
pub fn strip_trailing_commas(text: &str) -> String {
    map_segments(
        text,
        |code| TRAILING_COMMA.replace_all(code, "${1}"),
        Cow::Borrowed,
    )
}

fn ends_string(rest: &[char]) -> bool {
    match rest.iter().find(|c| !c.is_whitespace()) {
        None => true,
        Some(c) => matches!(c, ',' | '}' | ']' | ':'),
    }
}

fn is_stringified_twice(text: &str) -> bool {
    let mut saw_escaped_quote = false;
    let mut prev = None;
    for c in text.chars() {
        if c == '"' {
            if prev != Some('\\') {
                return false;
            }
            saw_escaped_quote = true;
        }
        prev = Some(c);
    }
    saw_escaped_quote
}

fn unescape_one_level(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '\\' {
            if let Some(&next) = chars.peek() {
                if next == '"' || next == '\\' {
                    out.push(next);
                    chars.next();
                    continue;
                }
            }
        }
        out.push(c);
    }
    out
}

/// Rebuild `text`, passing runs outside double-quoted strings to `code` and
/// strings (delimiters included) to `string`.
fn map_segments<'a, C, S>(text: &'a str, mut code: C, mut string: S) -> String
where
    C: FnMut(&'a str) -> Cow<'a, str>,
    S: FnMut(&'a str) -> Cow<'a, str>,
{
    let mut out = String::with_capacity(text.len());
    let mut start = 0;
    let mut in_string = false;
    let mut escaped = false;

    for (i, c) in text.char_indices() {
        if in_string {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                out.push_str(&string(&text[start..=i]));
                start = i + 1;
                in_string = false;
            }
        } else if c == '"' {
            out.push_str(&code(&text[start..i]));
            start = i;
            in_string = true;
        }
    }

    if start < text.len() {
        let rest = &text[start..];
        if in_string {
            out.push_str(&string(rest));
        } else {
            out.push_str(&code(rest));
        }
    }

    out
}
