use metrics_exporter_prometheus::PrometheusHandle;
use posting_fit::classification::{
    ClassificationStore, ClassifierTables, CompanyClassifier, CompanyType,
    InMemoryClassificationStore, JsonFileClassificationStore, RetryPolicy,
};
use posting_fit::config::EngineConfig;
use posting_fit::error::AppError;
use posting_fit::profile::ProfileError;
use posting_fit::{CandidateProfile, Grade, ScoringOrchestrator, SeniorityHierarchy};
use std::path::Path;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tracing::info;

const DEFAULT_PROFILE: &str = include_str!("../profiles/default.json");

/// Orchestrator with the store chosen at runtime.
pub(crate) type Orchestrator = ScoringOrchestrator<dyn ClassificationStore>;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Loads the profile from `profile_override`, then the configured path, then the bundled default.
pub(crate) fn load_profile(
    config: &EngineConfig,
    profile_override: Option<&Path>,
) -> Result<CandidateProfile, ProfileError> {
    match profile_override.or(config.profile_path.as_deref()) {
        Some(path) => {
            info!(path = %path.display(), "loading candidate profile");
            CandidateProfile::from_path(path)
        }
        None => CandidateProfile::from_json_str(DEFAULT_PROFILE),
    }
}

pub(crate) fn open_store(config: &EngineConfig) -> Result<Arc<dyn ClassificationStore>, AppError> {
    let store: Arc<dyn ClassificationStore> = match &config.classification_store {
        Some(path) => {
            info!(path = %path.display(), "using file-backed classification store");
            Arc::new(JsonFileClassificationStore::open(path.clone())?)
        }
        None => Arc::new(InMemoryClassificationStore::new()),
    };
    Ok(store)
}

pub(crate) fn build_orchestrator(
    config: &EngineConfig,
    profile_override: Option<&Path>,
) -> Result<Arc<Orchestrator>, AppError> {
    let profile = Arc::new(load_profile(config, profile_override)?);
    let hierarchy =
        Arc::new(SeniorityHierarchy::standard().map_err(|err| AppError::Profile(err.into()))?);
    let tables = Arc::new(ClassifierTables::standard().map_err(|err| AppError::Profile(err.into()))?);

    let classifier = CompanyClassifier::new(tables, open_store(config)?)
        .with_retry_policy(RetryPolicy::new(config.retry_attempts, config.retry_backoff));

    let orchestrator = ScoringOrchestrator::new(profile, hierarchy, Arc::new(classifier))?;
    Ok(Arc::new(orchestrator))
}

pub(crate) fn parse_grade(raw: &str) -> Result<Grade, String> {
    match raw.trim().to_ascii_uppercase().as_str() {
        "A" => Ok(Grade::A),
        "B" => Ok(Grade::B),
        "C" => Ok(Grade::C),
        "D" => Ok(Grade::D),
        "F" => Ok(Grade::F),
        other => Err(format!("'{other}' is not a grade (expected A, B, C, D or F)")),
    }
}

pub(crate) fn parse_company_type(raw: &str) -> Result<CompanyType, String> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "hardware" => Ok(CompanyType::Hardware),
        "software" => Ok(CompanyType::Software),
        "both" => Ok(CompanyType::Both),
        "unknown" => Ok(CompanyType::Unknown),
        other => Err(format!(
            "'{other}' is not a company type (expected hardware, software, both or unknown)"
        )),
    }
}

#[cfg(test)]
pub(crate) fn test_engine_config() -> EngineConfig {
    EngineConfig {
        profile_path: None,
        classification_store: None,
        retry_attempts: 2,
        retry_backoff: std::time::Duration::from_millis(1),
    }
}
