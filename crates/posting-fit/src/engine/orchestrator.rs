use std::sync::Arc;

use tracing::{debug, info_span};

use crate::classification::{
    ClassificationInput, ClassificationStore, CompanyClassification, CompanyClassifier,
    CompanyType, StoreError,
};
use crate::filters::FilterPipeline;
use crate::profile::{CandidateProfile, ProfileError};
use crate::scoring::{calculate_grade, FitScorer, ScoreBreakdown, SeniorityHierarchy, SubScoreBounds};

use super::{JobEvaluation, JobPosting, PipelineState, ScoreResult};

/// Ties the profile-driven scorer, the filter pipeline and the shared company classifier
/// together. Cheap to share behind an `Arc`; scoring itself holds no locks.
pub struct ScoringOrchestrator<S: ?Sized> {
    profile: Arc<CandidateProfile>,
    scorer: FitScorer,
    filters: FilterPipeline,
    classifier: Arc<CompanyClassifier<S>>,
}

impl<S> ScoringOrchestrator<S>
where
    S: ClassificationStore + ?Sized,
{
    pub fn new(
        profile: Arc<CandidateProfile>,
        hierarchy: Arc<SeniorityHierarchy>,
        classifier: Arc<CompanyClassifier<S>>,
    ) -> Result<Self, ProfileError> {
        profile.validate()?;
        let scorer = FitScorer::new(&profile, hierarchy)?;
        let filters = FilterPipeline::new(&profile)?;

        Ok(Self {
            profile,
            scorer,
            filters,
            classifier,
        })
    }

    /// Replaces the scorer, e.g. to plug in a different role-type archetype.
    pub fn with_scorer(mut self, scorer: FitScorer) -> Self {
        self.scorer = scorer;
        self
    }

    pub fn profile(&self) -> &CandidateProfile {
        &self.profile
    }

    pub fn scorer(&self) -> &FitScorer {
        &self.scorer
    }

    pub fn filters(&self) -> &FilterPipeline {
        &self.filters
    }

    pub fn classifier(&self) -> &CompanyClassifier<S> {
        &self.classifier
    }

    /// Scores a posting. Only the classification store can fail; missing posting fields
    /// simply score zero in the affected category.
    pub fn score_job(&self, job: &JobPosting) -> Result<ScoreResult, StoreError> {
        let _span = info_span!("score_job", title = %job.title, company = %job.company).entered();
        let title = job.title.as_str();
        let company = job.company.as_str();

        // Role type is evaluated first so its trace event precedes seniority.
        let role_type = self.scorer.score_role_type(title);
        debug!(role_type, "role type scored");
        let seniority = self.scorer.score_seniority(title);
        debug!(seniority, "seniority scored");
        let domain = self.scorer.score_domain(title, company);
        let location = self.scorer.score_location(job.location.as_deref());
        let technical = self.scorer.score_technical(title, company);

        let classification = self.classifier.classify(&ClassificationInput {
            company: job.company.clone(),
            domain_keywords: self.scorer.matched_domain_keywords(title, company),
            job_title: Some(job.title.clone()),
            job_description: job.description.clone(),
        })?;

        let breakdown = ScoreBreakdown {
            seniority,
            domain,
            role_type,
            location,
            technical,
            company_classification: self.company_adjustment(&classification),
        };
        let total_score = breakdown.total();
        let grade = calculate_grade(total_score, &self.profile.grading);

        debug!(
            total_score,
            grade = %grade,
            company_type = %classification.company_type,
            "posting scored"
        );

        Ok(ScoreResult {
            total_score,
            grade,
            breakdown,
            classification_metadata: classification,
        })
    }

    /// Runs the full pipeline: hard filters, scoring, then context filters.
    pub fn evaluate(&self, job: &JobPosting) -> Result<JobEvaluation, StoreError> {
        let mut evaluation = JobEvaluation {
            posting: job.clone(),
            state: PipelineState::Pending,
            hard_filter: self.filters.apply_hard_filters(&job.title),
            context_filter: None,
            score: None,
        };

        if !evaluation.hard_filter.passed {
            evaluation.state = PipelineState::HardFiltered;
            return Ok(evaluation);
        }
        evaluation.state = PipelineState::PassedHard;

        let score = self.score_job(job)?;
        evaluation.state = PipelineState::Scored;

        let context = self.filters.apply_context_filters(&job.title, &score.breakdown);
        evaluation.state = if context.passed {
            PipelineState::Kept
        } else {
            PipelineState::ContextFiltered
        };
        evaluation.context_filter = Some(context);
        evaluation.score = Some(score);

        debug!(title = %job.title, state = evaluation.state.label(), "posting evaluated");
        Ok(evaluation)
    }

    /// Signed points for the company type under the profile's filtering settings.
    pub fn company_adjustment(&self, classification: &CompanyClassification) -> i32 {
        let filtering = &self.profile.filtering;
        let points = match classification.company_type {
            CompanyType::Hardware => filtering.hardware_company_boost,
            CompanyType::Both => filtering.hardware_company_boost / 2,
            CompanyType::Software
                if classification.confidence()
                    >= filtering.aggression.software_penalty_min_confidence() =>
            {
                filtering.software_company_penalty
            }
            CompanyType::Software | CompanyType::Unknown => 0,
        };
        SubScoreBounds::COMPANY_CLASSIFICATION.clamp(points)
    }
}
