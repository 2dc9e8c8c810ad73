use std::sync::Arc;
use std::time::Duration;

use axum::body::to_bytes;
use axum::response::Response;
use serde_json::{json, Value};

use crate::classification::{
    ClassificationRecord, ClassificationStore, ClassifierTables, CompanyClassification,
    CompanyClassifier, CompanyType, InMemoryClassificationStore, RetryPolicy, StoreError,
    UpsertOutcome,
};
use crate::engine::{JobPosting, ScoringOrchestrator};
use crate::profile::CandidateProfile;
use crate::scoring::SeniorityHierarchy;

pub(super) fn profile_json() -> Value {
    json!({
        "target_seniority": ["director", "vp", "cto"],
        "domain_keywords": ["hardware", "robotics", "automation", "embedded"],
        "technical_keywords": ["firmware", "fpga"],
        "role_types": {
            "engineering_leadership": { "keywords": ["engineering", "hardware"], "points": 20 },
            "product_leadership": { "keywords": ["product"], "points": 15 },
            "software_leadership": { "keywords": ["software engineering"], "points": -10 }
        },
        "location_preferences": {
            "remote_keywords": ["remote"],
            "hybrid_keywords": ["hybrid"],
            "preferred_cities": ["Boston", "Cambridge"],
            "preferred_regions": ["Massachusetts"]
        }
    })
}

pub(super) fn profile_with(overrides: Value) -> CandidateProfile {
    let mut raw = profile_json();
    if let (Some(base), Some(extra)) = (raw.as_object_mut(), overrides.as_object()) {
        for (key, value) in extra {
            base.insert(key.clone(), value.clone());
        }
    }
    CandidateProfile::from_json_str(&raw.to_string()).expect("fixture profile is valid")
}

pub(super) fn orchestrator_with<S>(
    profile: CandidateProfile,
    store: Arc<S>,
) -> ScoringOrchestrator<S>
where
    S: ClassificationStore,
{
    orchestrator_with_retry(profile, store, RetryPolicy::new(2, Duration::from_millis(1)))
}

pub(super) fn orchestrator_with_retry<S>(
    profile: CandidateProfile,
    store: Arc<S>,
    retry: RetryPolicy,
) -> ScoringOrchestrator<S>
where
    S: ClassificationStore,
{
    let tables = Arc::new(ClassifierTables::standard().expect("tables compile"));
    let classifier = Arc::new(CompanyClassifier::new(tables, store).with_retry_policy(retry));
    let hierarchy = Arc::new(SeniorityHierarchy::standard().expect("hierarchy compiles"));
    ScoringOrchestrator::new(Arc::new(profile), hierarchy, classifier)
        .expect("orchestrator builds")
}

pub(super) fn build_orchestrator() -> (
    ScoringOrchestrator<InMemoryClassificationStore>,
    Arc<InMemoryClassificationStore>,
) {
    let store = Arc::new(InMemoryClassificationStore::new());
    let orchestrator = orchestrator_with(profile_with(json!({})), Arc::clone(&store));
    (orchestrator, store)
}

pub(super) fn vp_at_hardware_company() -> JobPosting {
    JobPosting::new("VP of Engineering", "Hardware Automation Co").with_location("Remote")
}

/// Store that is permanently busy.
pub(super) struct BusyStore;

impl ClassificationStore for BusyStore {
    fn fetch(&self, _company: &str) -> Result<Option<ClassificationRecord>, StoreError> {
        Err(StoreError::Busy)
    }

    fn upsert_auto(
        &self,
        _company: &str,
        _classification: &CompanyClassification,
    ) -> Result<UpsertOutcome, StoreError> {
        Err(StoreError::Busy)
    }

    fn put_manual(
        &self,
        _company: &str,
        _company_type: CompanyType,
    ) -> Result<ClassificationRecord, StoreError> {
        Err(StoreError::Busy)
    }
}

pub(super) async fn json_body(response: Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body collects");
    serde_json::from_slice(&bytes).expect("json body")
}
