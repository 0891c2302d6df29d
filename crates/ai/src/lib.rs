//! `scriptaudit-ai`
//!
//! **Responsibility:** the LLM boundary of the script auditor.
//!
//! - Builds the outbound analysis prompt.
//! - Turns whatever text the provider returns into a schema-conformant
//!   [`AnalysisResult`](scriptaudit_core::AnalysisResult), never failing on
//!   malformed-but-present input.
//! - Defines the provider trait; concrete HTTP clients live in infra.

pub mod defaults;
pub mod envelope;
pub mod fragments;
pub mod job;
pub mod normalizer;
pub mod prompt;
pub mod provider;
pub mod repair;
pub mod result;
pub mod schema;

pub use job::{AnalysisRequest, ScriptAnalysisJob};
pub use normalizer::{NormalizeOutcome, Normalized, ParseStrategy, normalize, normalize_detailed};
pub use prompt::{build_analysis_prompt, enhance_prompt_for_structured_output};
pub use provider::{CompletionProvider, CompletionRequest, ProviderError};
pub use result::AiError;
pub use schema::{
    MissingField, MissingFieldSet, PartialAnalysis, SchemaViolation, Validation, classify,
    find_missing_fields, validate_complete, validate_partial,
};
