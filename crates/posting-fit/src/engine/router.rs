use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;

use crate::classification::{ClassificationStore, CompanyType, StoreError};
use crate::error::AppError;

use super::{JobPosting, ScoringOrchestrator};

/// Body of a manual classification override.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct ManualClassificationRequest {
    #[serde(rename = "type")]
    pub company_type: CompanyType,
}

/// Scoring and classification endpoints backed by one orchestrator.
pub fn scoring_router<S>(orchestrator: Arc<ScoringOrchestrator<S>>) -> Router
where
    S: ClassificationStore + ?Sized + 'static,
{
    Router::new()
        .route("/api/v1/postings/score", post(score_handler::<S>))
        .route("/api/v1/postings/evaluate", post(evaluate_handler::<S>))
        .route(
            "/api/v1/companies/:company/classification",
            get(classification_handler::<S>).put(override_handler::<S>),
        )
        .with_state(orchestrator)
}

pub(crate) async fn score_handler<S>(
    State(orchestrator): State<Arc<ScoringOrchestrator<S>>>,
    Json(posting): Json<JobPosting>,
) -> Result<Response, AppError>
where
    S: ClassificationStore + ?Sized + 'static,
{
    let result = run_blocking(orchestrator, move |engine| engine.score_job(&posting)).await?;
    Ok((StatusCode::OK, Json(result)).into_response())
}

pub(crate) async fn evaluate_handler<S>(
    State(orchestrator): State<Arc<ScoringOrchestrator<S>>>,
    Json(posting): Json<JobPosting>,
) -> Result<Response, AppError>
where
    S: ClassificationStore + ?Sized + 'static,
{
    let evaluation = run_blocking(orchestrator, move |engine| engine.evaluate(&posting)).await?;
    Ok((StatusCode::OK, Json(evaluation)).into_response())
}

pub(crate) async fn classification_handler<S>(
    State(orchestrator): State<Arc<ScoringOrchestrator<S>>>,
    Path(company): Path<String>,
) -> Result<Response, AppError>
where
    S: ClassificationStore + ?Sized + 'static,
{
    let lookup = company.clone();
    let stored =
        run_blocking(orchestrator, move |engine| engine.classifier().stored(&lookup)).await?;
    match stored {
        Some(record) => Ok((StatusCode::OK, Json(record)).into_response()),
        None => Err(AppError::NotFound(format!("classification for '{company}'"))),
    }
}

pub(crate) async fn override_handler<S>(
    State(orchestrator): State<Arc<ScoringOrchestrator<S>>>,
    Path(company): Path<String>,
    Json(request): Json<ManualClassificationRequest>,
) -> Result<Response, AppError>
where
    S: ClassificationStore + ?Sized + 'static,
{
    if company.trim().is_empty() {
        return Err(AppError::InvalidInput("company name is empty".to_string()));
    }
    let record = run_blocking(orchestrator, move |engine| {
        engine
            .classifier()
            .record_manual(&company, request.company_type)
    })
    .await?;
    Ok((StatusCode::OK, Json(record)).into_response())
}

/// Runs engine work on the blocking pool; store retries sleep and the file store does
/// synchronous I/O.
async fn run_blocking<S, T, F>(
    orchestrator: Arc<ScoringOrchestrator<S>>,
    work: F,
) -> Result<T, AppError>
where
    S: ClassificationStore + ?Sized + 'static,
    T: Send + 'static,
    F: FnOnce(&ScoringOrchestrator<S>) -> Result<T, StoreError> + Send + 'static,
{
    let outcome = tokio::task::spawn_blocking(move || work(&orchestrator))
        .await
        .map_err(|err| AppError::Server(axum::Error::new(err)))?;
    Ok(outcome?)
}
