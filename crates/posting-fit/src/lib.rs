//! Fit scoring, company classification and filtering for job postings.
//!
//! The engine turns a normalized posting and a candidate profile into a score breakdown,
//! a letter grade and a keep/veto decision that can be audited after the fact.

pub mod classification;
pub mod config;
pub mod engine;
pub mod error;
pub mod filters;
pub mod matching;
pub mod postings;
pub mod profile;
pub mod scoring;
pub mod telemetry;

pub use classification::{
    ClassificationSource, ClassificationStore, CompanyClassification, CompanyClassifier, CompanyType,
};
pub use engine::{JobEvaluation, JobPosting, PipelineState, ScoreResult, ScoringOrchestrator};
pub use filters::{FilterDecision, FilterPipeline, FilterReason};
pub use profile::{CandidateProfile, ProfileError};
pub use scoring::{FitScorer, Grade, ScoreBreakdown, SeniorityHierarchy};
