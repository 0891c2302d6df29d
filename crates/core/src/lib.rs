//! `scriptaudit-core`: domain foundation building blocks.
//!
//! This crate contains the **pure domain** model of a script analysis (no LLM,
//! HTTP or parsing concerns).

pub mod analysis;
pub mod error;
pub mod id;
pub mod markers;

pub use analysis::{
    Analysis, AnalysisResult, ReadabilityMetrics, RewrittenScript, Section, SectionKind,
};
pub use error::{DomainError, DomainResult};
pub use id::AnalysisId;
pub use markers::{IMPLEMENTED_MARKER, VISUAL_CUE_MARKER, split_implemented, visual_cues};
