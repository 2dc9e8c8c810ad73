//! Orchestration of filters, sub-scores and company classification for one posting.

mod orchestrator;
pub mod router;


use serde::{Deserialize, Serialize};

use crate::classification::CompanyClassification;
use crate::filters::FilterDecision;
use crate::scoring::{Grade, ScoreBreakdown};

pub use orchestrator::ScoringOrchestrator;
pub use router::scoring_router;

/// Normalized posting handed over by the ingestion side.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobPosting {
    pub title: String,
    pub company: String,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl JobPosting {
    pub fn new(title: impl Into<String>, company: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            company: company.into(),
            ..Self::default()
        }
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreResult {
    pub total_score: i32,
    pub grade: Grade,
    pub breakdown: ScoreBreakdown,
    pub classification_metadata: CompanyClassification,
}

/// Where a posting sits in the filter/score pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineState {
    Pending,
    HardFiltered,
    PassedHard,
    Scored,
    ContextFiltered,
    Kept,
}

impl PipelineState {
    pub const fn is_terminal(self) -> bool {
        matches!(
            self,
            PipelineState::HardFiltered | PipelineState::ContextFiltered | PipelineState::Kept
        )
    }

    pub const fn label(self) -> &'static str {
        match self {
            PipelineState::Pending => "pending",
            PipelineState::HardFiltered => "hard_filtered",
            PipelineState::PassedHard => "passed_hard",
            PipelineState::Scored => "scored",
            PipelineState::ContextFiltered => "context_filtered",
            PipelineState::Kept => "kept",
        }
    }
}

/// Full pipeline run for one posting, kept for audit and digest building.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobEvaluation {
    pub posting: JobPosting,
    pub state: PipelineState,
    pub hard_filter: FilterDecision,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context_filter: Option<FilterDecision>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<ScoreResult>,
}

impl JobEvaluation {
    pub fn summary(&self) -> String {
        let subject = format!("{} @ {}", self.posting.title, self.posting.company);
        let veto = |decision: &FilterDecision| {
            decision
                .reason
                .map(|reason| reason.summary())
                .unwrap_or_else(|| "vetoed".to_string())
        };

        match (self.state, &self.score) {
            (PipelineState::HardFiltered, _) => format!("{subject}: {}", veto(&self.hard_filter)),
            (PipelineState::ContextFiltered, Some(score)) => format!(
                "{subject}: {} (score {}, grade {})",
                self.context_filter
                    .as_ref()
                    .map(veto)
                    .unwrap_or_else(|| "vetoed".to_string()),
                score.total_score,
                score.grade
            ),
            (PipelineState::Kept, Some(score)) => format!(
                "{subject}: kept with grade {} (score {})",
                score.grade, score.total_score
            ),
            (state, _) => format!("{subject}: {}", state.label()),
        }
    }

    /// Kept postings graded at least `minimum` go into digests.
    pub fn should_surface(&self, minimum: Grade) -> bool {
        self.state == PipelineState::Kept
            && self
                .score
                .as_ref()
                .is_some_and(|score| score.grade.meets(minimum))
    }
}
