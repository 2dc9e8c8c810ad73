use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::body::Body;
use axum::extract::State;
use axum::http::{header, Request, StatusCode};
use axum::Json;
use serde_json::json;
use tower::ServiceExt;

use super::common::*;
use crate::classification::RetryPolicy;
use crate::engine::router::{score_handler, scoring_router};

fn post_json(uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::post(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .expect("request builds")
}

fn get(uri: &str) -> Request<Body> {
    Request::get(uri).body(Body::empty()).expect("request builds")
}

#[tokio::test]
async fn score_route_returns_breakdown_and_grade() {
    let (orchestrator, _) = build_orchestrator();
    let router = scoring_router(Arc::new(orchestrator));

    let response = router
        .oneshot(post_json(
            "/api/v1/postings/score",
            json!({
                "title": "VP of Engineering",
                "company": "Hardware Automation Co",
                "location": "Remote"
            }),
        ))
        .await
        .expect("router responds");

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["total_score"], 99);
    assert_eq!(body["grade"], "A");
    assert_eq!(body["breakdown"]["seniority"], 30);
    assert_eq!(body["classification_metadata"]["type"], "hardware");
    assert_eq!(body["classification_metadata"]["source"], "auto");
}

#[tokio::test]
async fn evaluate_route_reports_hard_filter_tag() {
    let (orchestrator, _) = build_orchestrator();
    let router = scoring_router(Arc::new(orchestrator));

    let response = router
        .oneshot(post_json(
            "/api/v1/postings/evaluate",
            json!({ "title": "Associate Product Manager", "company": "Skydio", "location": null }),
        ))
        .await
        .expect("router responds");

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["state"], "hard_filtered");
    assert_eq!(body["hard_filter"]["passed"], false);
    assert_eq!(
        body["hard_filter"]["reason"],
        "hard_filter_associate_low_seniority"
    );
    assert!(body.get("score").is_none());
}

#[tokio::test]
async fn classification_routes_read_and_override() {
    let (orchestrator, _) = build_orchestrator();
    let router = scoring_router(Arc::new(orchestrator));
    let uri = "/api/v1/companies/Skydio/classification";

    let missing = router.clone().oneshot(get(uri)).await.expect("responds");
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);

    let put = Request::put(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(json!({ "type": "software" }).to_string()))
        .expect("request builds");
    let updated = router.clone().oneshot(put).await.expect("responds");
    assert_eq!(updated.status(), StatusCode::OK);
    let body = json_body(updated).await;
    assert_eq!(body["company"], "skydio");
    assert_eq!(body["classification"]["source"], "manual");

    let fetched = router.oneshot(get(uri)).await.expect("responds");
    assert_eq!(fetched.status(), StatusCode::OK);
    let body = json_body(fetched).await;
    assert_eq!(body["classification"]["type"], "software");
    assert_eq!(body["classification"]["confidence"], 1.0);
}

#[tokio::test]
async fn override_rejects_unknown_company_type() {
    let (orchestrator, _) = build_orchestrator();
    let router = scoring_router(Arc::new(orchestrator));

    let put = Request::put("/api/v1/companies/Skydio/classification")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(json!({ "type": "biotech" }).to_string()))
        .expect("request builds");
    let response = router.oneshot(put).await.expect("responds");
    assert!(response.status().is_client_error());
}

#[tokio::test]
async fn busy_store_maps_to_service_unavailable() {
    let orchestrator = Arc::new(orchestrator_with(
        profile_with(json!({})),
        Arc::new(BusyStore),
    ));

    let Err(error) =
        score_handler::<BusyStore>(State(orchestrator), Json(vp_at_hardware_company())).await
    else {
        panic!("store stays busy");
    };
    let response = axum::response::IntoResponse::into_response(error);

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    let body = json_body(response).await;
    assert!(body["error"]
        .as_str()
        .expect("error message")
        .contains("busy"));
}

#[tokio::test]
async fn retrying_store_does_not_stall_the_runtime() {
    let orchestrator = Arc::new(orchestrator_with_retry(
        profile_with(json!({})),
        Arc::new(BusyStore),
        RetryPolicy::new(3, Duration::from_millis(100)),
    ));
    let router = scoring_router(orchestrator);

    let started = Instant::now();
    let request = tokio::spawn(router.oneshot(post_json(
        "/api/v1/postings/score",
        serde_json::to_value(vp_at_hardware_company()).expect("posting serializes"),
    )));
    let other_work = tokio::spawn(async move { started.elapsed() });

    let waited = other_work.await.expect("task completes");
    let response = request
        .await
        .expect("task completes")
        .expect("router responds");

    assert!(waited < Duration::from_millis(100), "other task waited {waited:?}");
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    assert!(started.elapsed() >= Duration::from_millis(300));
}
