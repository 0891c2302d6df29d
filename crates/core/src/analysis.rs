//! Script analysis data model.
//!
//! These types are the contract handed to renderers: every field present,
//! every type correct. JSON field names are camelCase.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Top-level result of one script analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub analysis: Analysis,
    pub rewritten_script: RewrittenScript,
}

impl AnalysisResult {
    /// Look up one of the canonical sections.
    pub fn section(&self, kind: SectionKind) -> Option<&Section> {
        self.analysis.sections.get(kind.key())
    }
}

/// Quality analysis of the submitted script.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Analysis {
    /// Terms flagged as jargon.
    pub technical_terms: Vec<String>,
    /// Intended range 1-10 (not enforced).
    pub readability_score: f64,
    /// May carry the `[IMPLEMENTED]` marker.
    pub suggestions: Vec<String>,
    /// Intended range 1-10 (not enforced).
    pub overall_score: f64,
    /// May carry the `[IMPLEMENTED]` marker.
    pub prioritized_improvements: Vec<String>,
    pub sections: BTreeMap<String, Section>,
}

/// Per-section analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Section {
    pub score: f64,
    pub suggestions: Vec<String>,
    pub readability_metrics: ReadabilityMetrics,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ai_enhancements: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadabilityMetrics {
    pub flesch_kincaid: f64,
    pub words_per_sentence: f64,
    pub technical_terms: Vec<String>,
}

/// The model's rewrite of the script.
///
/// Text fields may embed `[VISUAL CUE]` annotations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RewrittenScript {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub learning_objectives: Vec<String>,
    pub introduction: String,
    pub main_content: String,
    pub conclusion: String,
    pub call_to_action: String,
}

/// The section names the analysis prompt asks for.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SectionKind {
    Introduction,
    MainContent,
    Conclusion,
}

impl SectionKind {
    pub const ALL: [SectionKind; 3] = [
        SectionKind::Introduction,
        SectionKind::MainContent,
        SectionKind::Conclusion,
    ];

    /// Key of this section in `analysis.sections`.
    pub fn key(&self) -> &'static str {
        match self {
            SectionKind::Introduction => "introduction",
            SectionKind::MainContent => "mainContent",
            SectionKind::Conclusion => "conclusion",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.key() == key)
    }
}

impl core::fmt::Display for SectionKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.key())
    }
}
