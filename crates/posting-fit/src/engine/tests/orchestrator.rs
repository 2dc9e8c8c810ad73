use std::collections::BTreeMap;
use std::sync::Arc;

use serde_json::json;

use super::common::*;
use crate::classification::{
    ClassificationSource, ClassificationStore, CompanyClassification, CompanyType,
    InMemoryClassificationStore, StoreError,
};
use crate::engine::{JobPosting, PipelineState};
use crate::filters::FilterReason;
use crate::scoring::{FitScorer, Grade, RoleTypeScorer, ScoreBreakdown, SeniorityHierarchy};

fn auto(company_type: CompanyType, confidence: f64) -> CompanyClassification {
    CompanyClassification::new(
        company_type,
        confidence,
        BTreeMap::new(),
        ClassificationSource::Auto,
    )
    .expect("valid confidence")
}

#[test]
fn vp_at_hardware_company_scores_an_a() {
    let (orchestrator, store) = build_orchestrator();

    let result = orchestrator
        .score_job(&vp_at_hardware_company())
        .expect("scores");

    assert_eq!(
        result.breakdown,
        ScoreBreakdown {
            seniority: 30,
            domain: 20,
            role_type: 20,
            location: 15,
            technical: 4,
            company_classification: 10,
        }
    );
    assert_eq!(result.total_score, 99);
    assert_eq!(result.grade, Grade::A);
    assert_eq!(result.classification_metadata.company_type, CompanyType::Hardware);
    assert!(store
        .fetch("Hardware Automation Co")
        .expect("fetch")
        .is_some());
}

#[test]
fn total_is_breakdown_sum_and_sub_scores_stay_in_bounds() {
    let (orchestrator, _) = build_orchestrator();
    let postings = [
        JobPosting::new("", ""),
        JobPosting::new("Mischief Maker", "Acme").with_location("Austin, TX"),
        JobPosting::new("Supervisor of Engineering", "Acme Software"),
        JobPosting::new("Director of Software Engineering", "Robotics Cloud Inc")
            .with_location("Hybrid - Boston"),
        JobPosting::new("Chief Robotics Officer", "Boston Dynamics")
            .with_location("Cambridge, Massachusetts")
            .with_description("Embedded firmware, FPGA and robotics automation hardware"),
    ];

    for posting in &postings {
        let result = orchestrator.score_job(posting).expect("scores");
        assert!(
            result.breakdown.out_of_bounds().is_empty(),
            "{}: {:?}",
            posting.title,
            result.breakdown
        );
        assert_eq!(result.total_score, result.breakdown.total());
    }
}

#[test]
fn missing_fields_score_zero_without_failing() {
    let (orchestrator, _) = build_orchestrator();
    let result = orchestrator
        .score_job(&JobPosting::new("", ""))
        .expect("structurally valid posting scores");

    assert_eq!(result.breakdown.seniority, 0);
    assert_eq!(result.breakdown.location, 0);
    assert_eq!(result.breakdown.role_type, 0);
    assert_eq!(result.breakdown.domain, 5);
    assert_eq!(result.classification_metadata, CompanyClassification::unknown());
}

#[test]
fn company_adjustment_follows_type_and_aggression() {
    let (moderate, _) = build_orchestrator();
    assert_eq!(moderate.company_adjustment(&auto(CompanyType::Hardware, 0.5)), 10);
    assert_eq!(moderate.company_adjustment(&auto(CompanyType::Both, 0.4)), 5);
    assert_eq!(moderate.company_adjustment(&auto(CompanyType::Unknown, 0.2)), 0);
    assert_eq!(moderate.company_adjustment(&auto(CompanyType::Software, 0.6)), -20);
    assert_eq!(moderate.company_adjustment(&auto(CompanyType::Software, 0.4)), 0);

    let conservative = orchestrator_with(
        profile_with(json!({ "filtering": { "aggression": "conservative" } })),
        Arc::new(InMemoryClassificationStore::new()),
    );
    assert_eq!(conservative.company_adjustment(&auto(CompanyType::Software, 0.6)), 0);
    assert_eq!(
        conservative.company_adjustment(&CompanyClassification::manual(CompanyType::Software)),
        -20
    );

    let aggressive = orchestrator_with(
        profile_with(json!({
            "filtering": {
                "aggression": "aggressive",
                "hardware_company_boost": 15,
                "software_company_penalty": -30
            }
        })),
        Arc::new(InMemoryClassificationStore::new()),
    );
    assert_eq!(aggressive.company_adjustment(&auto(CompanyType::Software, 0.3)), -30);
    assert_eq!(aggressive.company_adjustment(&auto(CompanyType::Both, 0.5)), 7);
}

#[test]
fn manual_override_changes_the_company_adjustment() {
    let (orchestrator, _) = build_orchestrator();
    orchestrator
        .classifier()
        .record_manual("Hardware Automation Co", CompanyType::Software)
        .expect("manual write");

    let result = orchestrator
        .score_job(&vp_at_hardware_company())
        .expect("scores");
    assert!(result.classification_metadata.is_manual());
    assert_eq!(result.breakdown.company_classification, -20);
    assert_eq!(result.total_score, 69);
    assert_eq!(result.grade, Grade::C);
}

#[test]
fn hard_filtered_postings_are_never_scored() {
    let (orchestrator, store) = build_orchestrator();
    let evaluation = orchestrator
        .evaluate(&JobPosting::new("Junior Hardware Engineer", "Skydio"))
        .expect("evaluates");

    assert_eq!(evaluation.state, PipelineState::HardFiltered);
    assert!(evaluation.state.is_terminal());
    assert_eq!(evaluation.hard_filter.reason, Some(FilterReason::Junior));
    assert!(evaluation.score.is_none());
    assert!(evaluation.context_filter.is_none());
    assert!(store.is_empty());
    assert!(evaluation.summary().contains("junior"));
    assert!(!evaluation.should_surface(Grade::F));
}

#[test]
fn software_engineering_leadership_is_context_filtered() {
    let (orchestrator, _) = build_orchestrator();
    let evaluation = orchestrator
        .evaluate(&JobPosting::new(
            "Director of Software Engineering",
            "Hardware Automation Co",
        ))
        .expect("evaluates");

    assert_eq!(evaluation.state, PipelineState::ContextFiltered);
    assert!(evaluation.hard_filter.passed);
    assert_eq!(
        evaluation.context_filter.and_then(|decision| decision.reason),
        Some(FilterReason::SoftwareEngineering)
    );
    let score = evaluation.score.as_ref().expect("scored before the veto");
    assert_eq!(score.breakdown.seniority, 30);
    assert!(evaluation.summary().contains("software engineering"));
}

#[test]
fn kept_postings_surface_by_grade() {
    let (orchestrator, _) = build_orchestrator();
    let evaluation = orchestrator
        .evaluate(&vp_at_hardware_company())
        .expect("evaluates");

    assert_eq!(evaluation.state, PipelineState::Kept);
    assert!(evaluation.should_surface(Grade::A));
    assert_eq!(
        evaluation.summary(),
        "VP of Engineering @ Hardware Automation Co: kept with grade A (score 99)"
    );

    let serialized = serde_json::to_value(&evaluation).expect("serializes");
    assert_eq!(serialized["state"], "kept");
    assert_eq!(serialized["score"]["grade"], "A");
}

#[test]
fn busy_store_failure_is_surfaced_to_the_caller() {
    let orchestrator = orchestrator_with(profile_with(json!({})), Arc::new(BusyStore));
    let err = orchestrator
        .score_job(&vp_at_hardware_company())
        .expect_err("store stays busy");
    assert!(matches!(err, StoreError::Busy));
}

#[test]
fn profile_grade_thresholds_are_honoured() {
    let orchestrator = orchestrator_with(
        profile_with(json!({ "grading": { "a": 100, "b": 90, "c": 70, "d": 50 } })),
        Arc::new(InMemoryClassificationStore::new()),
    );
    let result = orchestrator
        .score_job(&vp_at_hardware_company())
        .expect("scores");
    assert_eq!(result.total_score, 99);
    assert_eq!(result.grade, Grade::B);
}

#[test]
fn role_type_archetype_can_be_swapped() {
    struct NoRoleShape;
    impl RoleTypeScorer for NoRoleShape {
        fn score(&self, _title: &str) -> i32 {
            0
        }
    }

    let (orchestrator, _) = build_orchestrator();
    let hierarchy = Arc::new(SeniorityHierarchy::standard().expect("hierarchy compiles"));
    let scorer = FitScorer::new(orchestrator.profile(), hierarchy)
        .expect("scorer builds")
        .with_role_type_scorer(Box::new(NoRoleShape));
    let orchestrator = orchestrator.with_scorer(scorer);

    let result = orchestrator
        .score_job(&vp_at_hardware_company())
        .expect("scores");
    assert_eq!(result.breakdown.role_type, 0);
    assert_eq!(result.total_score, 79);
}
