//! Inline markers the analysis prompt asks the model to emit.

/// Appended to suggestions/improvements the rewrite already applies.
pub const IMPLEMENTED_MARKER: &str = "[IMPLEMENTED]";

/// Prefix of the bracketed visual cue annotations in rewritten text.
pub const VISUAL_CUE_MARKER: &str = "[VISUAL CUE";

/// Split a suggestion into its display text and whether it is implemented.
pub fn split_implemented(text: &str) -> (String, bool) {
    if !text.contains(IMPLEMENTED_MARKER) {
        return (text.trim().to_string(), false);
    }
    let cleaned = text.replace(IMPLEMENTED_MARKER, "");
    (cleaned.split_whitespace().collect::<Vec<_>>().join(" "), true)
}

/// Visual cue annotations (`[VISUAL CUE]`, `[VISUAL CUE: chart]`) in order of appearance.
pub fn visual_cues(text: &str) -> Vec<&str> {
    let mut cues = Vec::new();
    let mut rest = text;
    let mut offset = 0;

    while let Some(start) = rest.find(VISUAL_CUE_MARKER) {
        let abs_start = offset + start;
        let Some(len) = text[abs_start..].find(']') else {
            break;
        };
        let abs_end = abs_start + len + 1;
        cues.push(&text[abs_start..abs_end]);
        offset = abs_end;
        rest = &text[abs_end..];
    }

    cues
}
