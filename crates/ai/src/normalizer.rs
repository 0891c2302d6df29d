//! Response normalizer: raw provider text in, schema-conformant result out.
//!
//! Stages, each a fallback for the previous:
//! 1. strip the envelope (fences, prose, invisible characters)
//! 2. direct parse
//! 3. repair + parse
//! 4. fragment extraction, longest complete candidate wins
//! 5. longest partial candidate, placeholder-filled
//! 6. deterministic default built from the submitted script
//!
//! [`normalize`] never fails and never panics on any input.

use serde_json::Value;
use tracing::{debug, warn};

use scriptaudit_core::AnalysisResult;

use crate::defaults::{fallback_analysis, fill_partial};
use crate::envelope::strip_envelope;
use crate::fragments;
use crate::repair::repair;
use crate::schema::{self, MissingFieldSet, Validation};

/// Whole-text parse strategy that produced a complete result.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ParseStrategy {
    /// The stripped text decoded as-is.
    Direct,
    /// The stripped text decoded after the repair rules.
    Repaired,
    /// A fragment of the text decoded.
    Fragment,
}

impl ParseStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            ParseStrategy::Direct => "direct",
            ParseStrategy::Repaired => "repaired",
            ParseStrategy::Fragment => "fragment",
        }
    }
}

/// How a result was obtained.
#[derive(Debug, Clone, PartialEq)]
pub enum NormalizeOutcome {
    Complete(ParseStrategy),
    /// Partial result; the listed fields were absent (lists and script texts filled).
    PartialFilled(MissingFieldSet),
    /// Nothing recoverable; deterministic default.
    Fallback,
}

impl NormalizeOutcome {
    /// Short label for logs and response headers.
    pub fn label(&self) -> &'static str {
        match self {
            NormalizeOutcome::Complete(_) => "complete",
            NormalizeOutcome::PartialFilled(_) => "partial",
            NormalizeOutcome::Fallback => "fallback",
        }
    }
}

/// A normalized result plus the path that produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct Normalized {
    pub result: AnalysisResult,
    pub outcome: NormalizeOutcome,
}

type ParseAttempt = fn(&str) -> Option<Value>;

/// Whole-text strategies, tried in order; the first complete result wins.
const WHOLE_TEXT_CHAIN: [(ParseStrategy, ParseAttempt); 2] = [
    (ParseStrategy::Direct, parse_direct),
    (ParseStrategy::Repaired, parse_repaired),
];

fn parse_direct(text: &str) -> Option<Value> {
    serde_json::from_str(text).ok()
}

fn parse_repaired(text: &str) -> Option<Value> {
    serde_json::from_str(&repair(text)).ok()
}

/// Normalize raw provider output into an [`AnalysisResult`].
///
/// `original_script` is only used by the total fallback.
pub fn normalize(raw: &str, original_script: &str) -> AnalysisResult {
    normalize_detailed(raw, original_script).result
}

/// Like [`normalize`], also reporting which stage produced the result.
pub fn normalize_detailed(raw: &str, original_script: &str) -> Normalized {
    let stripped = strip_envelope(raw);
    debug!(
        raw_len = raw.len(),
        stripped_len = stripped.len(),
        "normalizing provider response"
    );

    for (strategy, attempt) in WHOLE_TEXT_CHAIN {
        let Some(value) = attempt(&stripped) else {
            debug!(strategy = strategy.as_str(), "response did not decode");
            continue;
        };
        match schema::parse_complete(&value) {
            Ok(result) => {
                debug!(strategy = strategy.as_str(), "response is complete");
                return Normalized {
                    result,
                    outcome: NormalizeOutcome::Complete(strategy),
                };
            }
            Err(violation) => {
                debug!(strategy = strategy.as_str(), %violation, "decoded response is not complete");
            }
        }
    }

    if let Some(normalized) = from_fragments(&stripped) {
        return normalized;
    }

    warn!(
        raw_len = raw.len(),
        "no recoverable analysis in provider response; using default result"
    );
    Normalized {
        result: fallback_analysis(original_script),
        outcome: NormalizeOutcome::Fallback,
    }
}

fn from_fragments(text: &str) -> Option<Normalized> {
    let mut candidates = fragments::candidates(text);
    candidates.sort_by_key(|c| std::cmp::Reverse(c.len));
    debug!(count = candidates.len(), "decoded fragment candidates");

    let mut best_partial = None;
    for candidate in &candidates {
        match schema::classify(&candidate.value) {
            Validation::Complete(result) => {
                debug!(len = candidate.len, "fragment is complete");
                return Some(Normalized {
                    result,
                    outcome: NormalizeOutcome::Complete(ParseStrategy::Fragment),
                });
            }
            Validation::Partial(partial, missing) if best_partial.is_none() => {
                best_partial = Some((partial, missing));
            }
            Validation::Partial(..) | Validation::Invalid(_) => {}
        }
    }

    let (partial, missing) = best_partial?;
    warn!(
        missing = ?missing.paths(),
        "provider response is partial; filling missing fields with placeholders"
    );
    Some(Normalized {
        result: fill_partial(partial),
        outcome: NormalizeOutcome::PartialFilled(missing),
    })
}
