//! Two-tier schema validation of decoded LLM output.
//!
//! - **Complete**: every field of [`AnalysisResult`] present with the right type.
//! - **Partial**: `analysis`, `rewrittenScript`, both scores and the
//!   `introduction` section are present; lists and script texts may be missing
//!   (typical of a generation truncated mid-way).
//! - **Invalid**: anything else.
//!
//! "Not quite valid" is the common path here, so validation returns values,
//! not errors.

use std::collections::{BTreeMap, BTreeSet};

use serde_json::{Map, Value};
use thiserror::Error;

use scriptaudit_core::{
    Analysis, AnalysisResult, ReadabilityMetrics, RewrittenScript, Section, SectionKind,
};

/// First schema rule a value breaks, with the JSON path of the offending field.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaViolation {
    #[error("response must be a JSON object")]
    NotAnObject,

    #[error("missing required field `{0}`")]
    Missing(String),

    #[error("field `{path}` must be {expected}")]
    WrongType {
        path: String,
        expected: &'static str,
    },
}

impl SchemaViolation {
    fn missing(path: &str) -> Self {
        Self::Missing(path.to_string())
    }

    fn wrong_type(path: &str, expected: &'static str) -> Self {
        Self::WrongType {
            path: path.to_string(),
            expected,
        }
    }
}

/// Outcome of checking one decoded value against both tiers.
#[derive(Debug, Clone, PartialEq)]
pub enum Validation {
    Complete(AnalysisResult),
    Partial(PartialAnalysis, MissingFieldSet),
    Invalid(SchemaViolation),
}

/// A value that satisfies the relaxed schema.
///
/// `sections` always contains a valid `introduction`.
#[derive(Debug, Clone, PartialEq)]
pub struct PartialAnalysis {
    pub technical_terms: Option<Vec<String>>,
    pub readability_score: f64,
    pub suggestions: Option<Vec<String>>,
    pub overall_score: f64,
    pub prioritized_improvements: Option<Vec<String>>,
    pub sections: BTreeMap<String, Section>,
    pub script: PartialScript,
}

/// `rewrittenScript` under the relaxed schema.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PartialScript {
    pub title: Option<String>,
    pub learning_objectives: Option<Vec<String>>,
    pub introduction: Option<String>,
    pub main_content: Option<String>,
    pub conclusion: Option<String>,
    pub call_to_action: Option<String>,
}

/// An optional field absent from a partial value.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum MissingField {
    TechnicalTerms,
    Suggestions,
    PrioritizedImprovements,
    Section(SectionKind),
    LearningObjectives,
    ScriptIntroduction,
    ScriptMainContent,
    ScriptConclusion,
    CallToAction,
}

impl MissingField {
    /// JSON path of the field.
    pub fn path(&self) -> &'static str {
        match self {
            MissingField::TechnicalTerms => "analysis.technicalTerms",
            MissingField::Suggestions => "analysis.suggestions",
            MissingField::PrioritizedImprovements => "analysis.prioritizedImprovements",
            MissingField::Section(SectionKind::Introduction) => "analysis.sections.introduction",
            MissingField::Section(SectionKind::MainContent) => "analysis.sections.mainContent",
            MissingField::Section(SectionKind::Conclusion) => "analysis.sections.conclusion",
            MissingField::LearningObjectives => "rewrittenScript.learningObjectives",
            MissingField::ScriptIntroduction => "rewrittenScript.introduction",
            MissingField::ScriptMainContent => "rewrittenScript.mainContent",
            MissingField::ScriptConclusion => "rewrittenScript.conclusion",
            MissingField::CallToAction => "rewrittenScript.callToAction",
        }
    }
}

impl core::fmt::Display for MissingField {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.path())
    }
}

/// Ordered set of missing optional fields.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MissingFieldSet(BTreeSet<MissingField>);

impl MissingFieldSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, field: MissingField) {
        self.0.insert(field);
    }

    pub fn contains(&self, field: MissingField) -> bool {
        self.0.contains(&field)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = MissingField> + '_ {
        self.0.iter().copied()
    }

    /// JSON paths, in a stable order.
    pub fn paths(&self) -> Vec<&'static str> {
        self.iter().map(|f| f.path()).collect()
    }
}

impl FromIterator<MissingField> for MissingFieldSet {
    fn from_iter<I: IntoIterator<Item = MissingField>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
enum Tier {
    Complete,
    Partial,
}

/// True only if `value` satisfies the complete schema.
pub fn validate_complete(value: &Value) -> bool {
    parse_complete(value).is_ok()
}

/// The relaxed view of `value`, or `None` if even the relaxed schema fails.
pub fn validate_partial(value: &Value) -> Option<PartialAnalysis> {
    parse_partial(value).ok()
}

/// Classify `value` against both tiers.
pub fn classify(value: &Value) -> Validation {
    match parse_complete(value) {
        Ok(result) => Validation::Complete(result),
        Err(_) => match parse_partial(value) {
            Ok(partial) => {
                let missing = find_missing_fields(&partial);
                Validation::Partial(partial, missing)
            }
            Err(violation) => Validation::Invalid(violation),
        },
    }
}

/// Optional fields absent from a partial value.
pub fn find_missing_fields(partial: &PartialAnalysis) -> MissingFieldSet {
    let mut missing = MissingFieldSet::new();

    if partial.technical_terms.is_none() {
        missing.insert(MissingField::TechnicalTerms);
    }
    if partial.suggestions.is_none() {
        missing.insert(MissingField::Suggestions);
    }
    if partial.prioritized_improvements.is_none() {
        missing.insert(MissingField::PrioritizedImprovements);
    }
    for kind in SectionKind::ALL {
        if !partial.sections.contains_key(kind.key()) {
            missing.insert(MissingField::Section(kind));
        }
    }

    let script = &partial.script;
    if script.learning_objectives.is_none() {
        missing.insert(MissingField::LearningObjectives);
    }
    if script.introduction.is_none() {
        missing.insert(MissingField::ScriptIntroduction);
    }
    if script.main_content.is_none() {
        missing.insert(MissingField::ScriptMainContent);
    }
    if script.conclusion.is_none() {
        missing.insert(MissingField::ScriptConclusion);
    }
    if script.call_to_action.is_none() {
        missing.insert(MissingField::CallToAction);
    }

    missing
}

/// Typed form of [`validate_complete`].
pub fn parse_complete(value: &Value) -> Result<AnalysisResult, SchemaViolation> {
    let tier = Tier::Complete;
    let root = value.as_object().ok_or(SchemaViolation::NotAnObject)?;

    let analysis = object(required(root, "analysis", "analysis")?, "analysis")?;
    let script = object(
        required(root, "rewrittenScript", "rewrittenScript")?,
        "rewrittenScript",
    )?;

    let technical_terms = string_list(
        required(analysis, "technicalTerms", "analysis.technicalTerms")?,
        "analysis.technicalTerms",
    )?;
    let readability_score = number(
        required(analysis, "readabilityScore", "analysis.readabilityScore")?,
        "analysis.readabilityScore",
        tier,
    )?;
    let suggestions = string_list(
        required(analysis, "suggestions", "analysis.suggestions")?,
        "analysis.suggestions",
    )?;
    let overall_score = number(
        required(analysis, "overallScore", "analysis.overallScore")?,
        "analysis.overallScore",
        tier,
    )?;
    let prioritized_improvements = string_list(
        required(
            analysis,
            "prioritizedImprovements",
            "analysis.prioritizedImprovements",
        )?,
        "analysis.prioritizedImprovements",
    )?;
    let sections = sections(
        required(analysis, "sections", "analysis.sections")?,
        tier,
    )?;

    let rewritten_script = RewrittenScript {
        title: nullable_string(script, "title", "rewrittenScript.title")?,
        learning_objectives: string_list(
            required(
                script,
                "learningObjectives",
                "rewrittenScript.learningObjectives",
            )?,
            "rewrittenScript.learningObjectives",
        )?,
        introduction: string(
            required(script, "introduction", "rewrittenScript.introduction")?,
            "rewrittenScript.introduction",
        )?,
        main_content: string(
            required(script, "mainContent", "rewrittenScript.mainContent")?,
            "rewrittenScript.mainContent",
        )?,
        conclusion: string(
            required(script, "conclusion", "rewrittenScript.conclusion")?,
            "rewrittenScript.conclusion",
        )?,
        call_to_action: string(
            required(script, "callToAction", "rewrittenScript.callToAction")?,
            "rewrittenScript.callToAction",
        )?,
    };

    Ok(AnalysisResult {
        analysis: Analysis {
            technical_terms,
            readability_score,
            suggestions,
            overall_score,
            prioritized_improvements,
            sections,
        },
        rewritten_script,
    })
}

/// Typed form of [`validate_partial`].
pub fn parse_partial(value: &Value) -> Result<PartialAnalysis, SchemaViolation> {
    let tier = Tier::Partial;
    let root = value.as_object().ok_or(SchemaViolation::NotAnObject)?;

    let analysis = object(required(root, "analysis", "analysis")?, "analysis")?;
    let script = object(
        required(root, "rewrittenScript", "rewrittenScript")?,
        "rewrittenScript",
    )?;

    let technical_terms =
        optional_string_list(analysis, "technicalTerms", "analysis.technicalTerms", tier)?;
    let readability_score = number(
        required(analysis, "readabilityScore", "analysis.readabilityScore")?,
        "analysis.readabilityScore",
        tier,
    )?;
    let suggestions =
        optional_string_list(analysis, "suggestions", "analysis.suggestions", tier)?;
    let overall_score = number(
        required(analysis, "overallScore", "analysis.overallScore")?,
        "analysis.overallScore",
        tier,
    )?;
    let prioritized_improvements = optional_string_list(
        analysis,
        "prioritizedImprovements",
        "analysis.prioritizedImprovements",
        tier,
    )?;
    let sections = sections(
        required(analysis, "sections", "analysis.sections")?,
        tier,
    )?;

    let script = PartialScript {
        title: nullable_string(script, "title", "rewrittenScript.title")?,
        learning_objectives: optional_string_list(
            script,
            "learningObjectives",
            "rewrittenScript.learningObjectives",
            tier,
        )?,
        introduction: optional_string(
            script,
            "introduction",
            "rewrittenScript.introduction",
            tier,
        )?,
        main_content: optional_string(script, "mainContent", "rewrittenScript.mainContent", tier)?,
        conclusion: optional_string(script, "conclusion", "rewrittenScript.conclusion", tier)?,
        call_to_action: optional_string(
            script,
            "callToAction",
            "rewrittenScript.callToAction",
            tier,
        )?,
    };

    Ok(PartialAnalysis {
        technical_terms,
        readability_score,
        suggestions,
        overall_score,
        prioritized_improvements,
        sections,
        script,
    })
}

fn sections(value: &Value, tier: Tier) -> Result<BTreeMap<String, Section>, SchemaViolation> {
    let map = object(value, "analysis.sections")?;
    if !map.contains_key(SectionKind::Introduction.key()) {
        return Err(SchemaViolation::missing("analysis.sections.introduction"));
    }

    let mut sections = BTreeMap::new();
    for (name, raw) in map {
        let path = format!("analysis.sections.{name}");
        let canonical = SectionKind::from_key(name).is_some();

        if tier == Tier::Partial && raw.is_null() {
            if name == SectionKind::Introduction.key() {
                return Err(SchemaViolation::missing(&path));
            }
            continue;
        }

        match section(raw, &path, tier) {
            Ok(s) => {
                sections.insert(name.clone(), s);
            }
            // Stray sections the prompt never asked for are dropped under the relaxed tier.
            Err(_) if tier == Tier::Partial && !canonical => {}
            Err(e) => return Err(e),
        }
    }

    Ok(sections)
}

fn section(value: &Value, path: &str, tier: Tier) -> Result<Section, SchemaViolation> {
    let obj = object(value, path)?;

    let score_path = format!("{path}.score");
    let suggestions_path = format!("{path}.suggestions");
    let metrics_path = format!("{path}.readabilityMetrics");

    let metrics = object(
        required(obj, "readabilityMetrics", &metrics_path)?,
        &metrics_path,
    )?;
    let fk_path = format!("{metrics_path}.fleschKincaid");
    let wps_path = format!("{metrics_path}.wordsPerSentence");
    let terms_path = format!("{metrics_path}.technicalTerms");

    Ok(Section {
        score: number(required(obj, "score", &score_path)?, &score_path, tier)?,
        suggestions: string_list(
            required(obj, "suggestions", &suggestions_path)?,
            &suggestions_path,
        )?,
        readability_metrics: ReadabilityMetrics {
            flesch_kincaid: number(required(metrics, "fleschKincaid", &fk_path)?, &fk_path, tier)?,
            words_per_sentence: number(
                required(metrics, "wordsPerSentence", &wps_path)?,
                &wps_path,
                tier,
            )?,
            technical_terms: string_list(
                required(metrics, "technicalTerms", &terms_path)?,
                &terms_path,
            )?,
        },
        ai_enhancements: nullable_string(obj, "aiEnhancements", &format!("{path}.aiEnhancements"))?,
    })
}

fn required<'a>(
    obj: &'a Map<String, Value>,
    key: &str,
    path: &str,
) -> Result<&'a Value, SchemaViolation> {
    obj.get(key).ok_or_else(|| SchemaViolation::missing(path))
}

/// `None` when absent; under the relaxed tier `null` also counts as absent.
fn optional<'a>(obj: &'a Map<String, Value>, key: &str, tier: Tier) -> Option<&'a Value> {
    match obj.get(key) {
        Some(Value::Null) if tier == Tier::Partial => None,
        other => other,
    }
}

fn object<'a>(value: &'a Value, path: &str) -> Result<&'a Map<String, Value>, SchemaViolation> {
    value
        .as_object()
        .ok_or_else(|| SchemaViolation::wrong_type(path, "an object"))
}

/// Finite number. The relaxed tier also coerces numeric strings such as `"8.5"`.
fn number(value: &Value, path: &str, tier: Tier) -> Result<f64, SchemaViolation> {
    let n = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) if tier == Tier::Partial => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    n.filter(|n| n.is_finite())
        .ok_or_else(|| SchemaViolation::wrong_type(path, "a finite number"))
}

fn string(value: &Value, path: &str) -> Result<String, SchemaViolation> {
    value
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| SchemaViolation::wrong_type(path, "a string"))
}

fn string_list(value: &Value, path: &str) -> Result<Vec<String>, SchemaViolation> {
    let items = value
        .as_array()
        .ok_or_else(|| SchemaViolation::wrong_type(path, "an array of strings"))?;
    items
        .iter()
        .map(|item| {
            item.as_str()
                .map(str::to_string)
                .ok_or_else(|| SchemaViolation::wrong_type(path, "an array of strings"))
        })
        .collect()
}

fn optional_string(
    obj: &Map<String, Value>,
    key: &str,
    path: &str,
    tier: Tier,
) -> Result<Option<String>, SchemaViolation> {
    optional(obj, key, tier).map(|v| string(v, path)).transpose()
}

/// For fields the result model keeps optional: `null` is absent in both tiers.
fn nullable_string(
    obj: &Map<String, Value>,
    key: &str,
    path: &str,
) -> Result<Option<String>, SchemaViolation> {
    optional(obj, key, Tier::Partial)
        .map(|v| string(v, path))
        .transpose()
}

fn optional_string_list(
    obj: &Map<String, Value>,
    key: &str,
    path: &str,
    tier: Tier,
) -> Result<Option<Vec<String>>, SchemaViolation> {
    optional(obj, key, tier)
        .map(|v| string_list(v, path))
        .transpose()
}
