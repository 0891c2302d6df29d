//! Deterministic result synthesis: placeholder filling for partial results and
//! the total fallback when nothing could be recovered.

use std::collections::BTreeMap;

use scriptaudit_core::{
    Analysis, AnalysisResult, ReadabilityMetrics, RewrittenScript, Section, SectionKind,
};

use crate::schema::PartialAnalysis;

/// Score used for every numeric field of the fallback result.
pub const DEFAULT_SCORE: f64 = 7.0;

/// Characters of the submitted script echoed as the fallback introduction.
pub const FALLBACK_EXCERPT_CHARS: usize = 200;

pub const PLACEHOLDER_INTRODUCTION: &str = "[Introduction needs to be added]";
pub const PLACEHOLDER_MAIN_CONTENT: &str = "[Main content needs to be added]";
pub const PLACEHOLDER_CONCLUSION: &str = "[Conclusion needs to be added]";
pub const PLACEHOLDER_CALL_TO_ACTION: &str = "[Call to action needs to be added]";

pub const FALLBACK_EMPTY_SCRIPT: &str = "No script text was provided for analysis.";
pub const FALLBACK_MAIN_CONTENT: &str =
    "The rewritten script could not be generated for this submission.";
pub const FALLBACK_CONCLUSION: &str =
    "Review the suggestions above and revise the script accordingly.";
pub const FALLBACK_CALL_TO_ACTION: &str = "Submit the script again for a complete analysis.";
pub const FALLBACK_SUGGESTION: &str = "Review the script for clarity and logical structure.";
pub const FALLBACK_IMPROVEMENT: &str = "Add concrete examples to support the key points.";
pub const FALLBACK_OBJECTIVE: &str = "Understand the key points of the script.";

const FALLBACK_WORDS_PER_SENTENCE: f64 = 15.0;

/// The result returned when no parse strategy recovered anything.
///
/// The introduction echoes the first [`FALLBACK_EXCERPT_CHARS`] characters of
/// `original_script` so the user still sees their own text.
pub fn fallback_analysis(original_script: &str) -> AnalysisResult {
    let introduction = if original_script.trim().is_empty() {
        FALLBACK_EMPTY_SCRIPT.to_string()
    } else {
        excerpt(original_script, FALLBACK_EXCERPT_CHARS).to_string()
    };

    let mut sections = BTreeMap::new();
    sections.insert(
        SectionKind::Introduction.key().to_string(),
        Section {
            score: DEFAULT_SCORE,
            suggestions: vec![FALLBACK_SUGGESTION.to_string()],
            readability_metrics: ReadabilityMetrics {
                flesch_kincaid: DEFAULT_SCORE,
                words_per_sentence: FALLBACK_WORDS_PER_SENTENCE,
                technical_terms: Vec::new(),
            },
            ai_enhancements: None,
        },
    );

    AnalysisResult {
        analysis: Analysis {
            technical_terms: Vec::new(),
            readability_score: DEFAULT_SCORE,
            suggestions: vec![FALLBACK_SUGGESTION.to_string()],
            overall_score: DEFAULT_SCORE,
            prioritized_improvements: vec![FALLBACK_IMPROVEMENT.to_string()],
            sections,
        },
        rewritten_script: RewrittenScript {
            title: None,
            learning_objectives: vec![FALLBACK_OBJECTIVE.to_string()],
            introduction,
            main_content: FALLBACK_MAIN_CONTENT.to_string(),
            conclusion: FALLBACK_CONCLUSION.to_string(),
            call_to_action: FALLBACK_CALL_TO_ACTION.to_string(),
        },
    }
}

/// Complete a partial result: missing lists become empty, missing script
/// texts become labeled placeholders. Present fields are kept as they are;
/// absent analysis sections are not invented.
pub fn fill_partial(partial: PartialAnalysis) -> AnalysisResult {
    let script = partial.script;

    AnalysisResult {
        analysis: Analysis {
            technical_terms: partial.technical_terms.unwrap_or_default(),
            readability_score: partial.readability_score,
            suggestions: partial.suggestions.unwrap_or_default(),
            overall_score: partial.overall_score,
            prioritized_improvements: partial.prioritized_improvements.unwrap_or_default(),
            sections: partial.sections,
        },
        rewritten_script: RewrittenScript {
            title: script.title,
            learning_objectives: script.learning_objectives.unwrap_or_default(),
            introduction: script
                .introduction
                .unwrap_or_else(|| PLACEHOLDER_INTRODUCTION.to_string()),
            main_content: script
                .main_content
                .unwrap_or_else(|| PLACEHOLDER_MAIN_CONTENT.to_string()),
            conclusion: script
                .conclusion
                .unwrap_or_else(|| PLACEHOLDER_CONCLUSION.to_string()),
            call_to_action: script
                .call_to_action
                .unwrap_or_else(|| PLACEHOLDER_CALL_TO_ACTION.to_string()),
        },
    }
}

/// The first `max_chars` characters of `text` (never splits a character).
pub fn excerpt(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((end, _)) => &text[..end],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{self, tests::complete_value};

    #[test]
    fn fallback_echoes_a_prefix_of_the_script() {
        let script = "x".repeat(500);
        let result = fallback_analysis(&script);

        assert_eq!(result.rewritten_script.introduction.len(), FALLBACK_EXCERPT_CHARS);
        assert!(script.starts_with(&result.rewritten_script.introduction));
        assert_eq!(result.analysis.overall_score, DEFAULT_SCORE);
        assert_eq!(result.analysis.readability_score, DEFAULT_SCORE);
        assert_eq!(result.analysis.suggestions.len(), 1);
        assert_eq!(result.analysis.prioritized_improvements.len(), 1);
    }

    #[test]
    fn fallback_for_blank_script_uses_placeholder() {
        let result = fallback_analysis("   ");
        assert_eq!(result.rewritten_script.introduction, FALLBACK_EMPTY_SCRIPT);
    }

    #[test]
    fn fallback_is_deterministic_and_schema_complete() {
        let a = fallback_analysis("Short script.");
        let b = fallback_analysis("Short script.");
        assert_eq!(a, b);
        assert_eq!(a.rewritten_script.introduction, "Short script.");

        let value = serde_json::to_value(&a).unwrap();
        assert!(schema::validate_complete(&value));
    }

    #[test]
    fn excerpt_respects_char_boundaries() {
        assert_eq!(excerpt("héllo wörld", 4), "héll");
        assert_eq!(excerpt("abc", 10), "abc");
        assert_eq!(excerpt("", 3), "");
    }

    #[test]
    fn fill_partial_only_touches_missing_fields() {
        let mut value = complete_value();
        value["rewrittenScript"]
            .as_object_mut()
            .unwrap()
            .remove("callToAction");
        value["analysis"].as_object_mut().unwrap().remove("technicalTerms");

        let partial = schema::validate_partial(&value).unwrap();
        let filled = fill_partial(partial);

        assert_eq!(filled.rewritten_script.call_to_action, PLACEHOLDER_CALL_TO_ACTION);
        assert!(filled.analysis.technical_terms.is_empty());
        assert_eq!(filled.rewritten_script.introduction, "Hi [VISUAL CUE]");
        assert_eq!(filled.analysis.suggestions, vec!["clarify X".to_string()]);
        assert_eq!(filled.analysis.sections.len(), 3);

        let value = serde_json::to_value(&filled).unwrap();
        assert!(schema::validate_complete(&value));
    }
}
