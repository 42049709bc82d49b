use std::time::Duration;

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Method, Request, StatusCode};
use cds_api::api::{INVALID_QUERY_MESSAGE, MALFORMED_REQUEST_MESSAGE, NO_MATCHES_MESSAGE, router};
use cds_api::db;
use cds_api::db::repository::insert_course;
use cds_api::models::NewCourse;
use cds_api::state::AppState;
use chrono::{TimeZone, Utc};
use serde_json::{Value, json};
use sqlx::SqlitePool;
use tokio_util::sync::CancellationToken;
use tower::ServiceExt;

async fn setup_test_db() -> SqlitePool {
    db::connect("sqlite::memory:", 1)
        .await
        .expect("Failed to create test db")
}

async fn insert(pool: &SqlitePool, name: &str, code: &str) {
    insert_course(
        pool,
        NewCourse {
            name: name.to_string(),
            code: code.to_string(),
            effective_date: Utc.with_ymd_and_hms(2025, 9, 1, 0, 0, 0).unwrap(),
            expiry_date: Utc.with_ymd_and_hms(2026, 6, 30, 0, 0, 0).unwrap(),
            is_active: true,
            description: None,
        },
    )
    .await
    .expect("Failed to insert course");
}

fn app(pool: SqlitePool) -> Router {
    router(AppState::sqlite(pool, CancellationToken::new()))
}

async fn get(app: Router, uri: &str) -> (StatusCode, Value) {
    send(app, Request::get(uri).body(Body::empty()).unwrap()).await
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("response body is not JSON")
    };
    (status, body)
}

#[tokio::test]
async fn test_returns_matching_courses() {
    let pool = setup_test_db().await;
    insert(&pool, "Intro to CS", "CS101").await;

    let (status, body) = get(app(pool), "/courses?courseCode=CS1").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!([{
            "courseTitle": "Intro to CS",
            "courseCode": "CS101",
            "effectiveDate": "2025-09-01T00:00:00Z",
            "expiryDate": "2026-06-30T00:00:00Z",
        }])
    );
}

#[tokio::test]
async fn test_combined_filters_are_a_conjunction() {
    let pool = setup_test_db().await;
    insert(&pool, "Intro to CS", "CS101").await;
    insert(&pool, "Intro to Philosophy", "PHIL100").await;
    insert(&pool, "Operating Systems", "CS340").await;

    let (status, body) = get(app(pool.clone()), "/courses?courseTitle=intro").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 2);

    let (status, body) = get(app(pool), "/courses?courseTitle=intro&courseCode=cs").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body[0]["courseCode"], "CS101");
    assert_eq!(body.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_non_ascii_title_matches_any_case() {
    let pool = setup_test_db().await;
    insert(&pool, "Éthique Appliquée", "ÉTH101").await;

    let (status, body) = get(app(pool), "/courses?courseTitle=%C3%A9thique").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);
    assert_eq!(body[0]["courseCode"], "ÉTH101");
}

#[tokio::test]
async fn test_no_matches_is_not_found() {
    let pool = setup_test_db().await;

    let (status, body) = get(app(pool), "/courses?courseTitle=Anything").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], NO_MATCHES_MESSAGE);
}

#[tokio::test]
async fn test_missing_filters_is_bad_request() {
    let pool = setup_test_db().await;
    insert(&pool, "Intro to CS", "CS101").await;

    for uri in ["/courses", "/courses?courseTitle=&courseCode=", "/courses?courseCode=%20%20"] {
        let (status, body) = get(app(pool.clone()), uri).await;

        assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
        let violations = body.as_array().expect("violations array");
        assert_eq!(violations.len(), 1);
        assert!(
            violations[0]["message"]
                .as_str()
                .unwrap()
                .contains("must provide at least 1")
        );
    }
}

#[tokio::test]
async fn test_unparsable_query_is_bad_request() {
    let pool = setup_test_db().await;
    insert(&pool, "Intro to CS", "CS101").await;

    let (status, body) = get(app(pool), "/courses?courseCode=CS&courseCode=MATH").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], INVALID_QUERY_MESSAGE);
}

#[tokio::test]
async fn test_repeated_request_is_idempotent() {
    let pool = setup_test_db().await;
    insert(&pool, "Intro to CS", "CS101").await;
    insert(&pool, "Data Structures", "CS201").await;

    let first = get(app(pool.clone()), "/courses?courseCode=cs").await;
    let second = get(app(pool), "/courses?courseCode=cs").await;

    assert_eq!(first.0, StatusCode::OK);
    assert_eq!(first, second);
}

#[tokio::test]
async fn test_search_with_body() {
    let pool = setup_test_db().await;
    insert(&pool, "Intro to CS", "CS101").await;

    let request = Request::builder()
        .method(Method::POST)
        .uri("/courses/search")
        .header("content-type", "application/json")
        .body(Body::from(r#"{"courseTitle":"intro"}"#))
        .unwrap();
    let (status, body) = send(app(pool), request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body[0]["courseTitle"], "Intro to CS");
}

#[tokio::test]
async fn test_search_without_body_is_bad_request() {
    let pool = setup_test_db().await;

    let missing = Request::builder()
        .method(Method::POST)
        .uri("/courses/search")
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(app(pool.clone()), missing).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], MALFORMED_REQUEST_MESSAGE);

    let garbled = Request::builder()
        .method(Method::POST)
        .uri("/courses/search")
        .header("content-type", "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let (status, body) = send(app(pool.clone()), garbled).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], MALFORMED_REQUEST_MESSAGE);

    let empty_object = Request::builder()
        .method(Method::POST)
        .uri("/courses/search")
        .header("content-type", "application/json")
        .body(Body::from("{}"))
        .unwrap();
    let (status, body) = send(app(pool), empty_object).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.is_array());
}

#[tokio::test]
async fn test_cancelled_lookup_has_no_body() {
    let pool = setup_test_db().await;
    insert(&pool, "Intro to CS", "CS101").await;

    let shutdown = CancellationToken::new();
    let app = router(AppState::sqlite(pool.clone(), shutdown.clone()));

    // Hold the only connection so the lookup stays in flight.
    let held = pool.acquire().await.unwrap();

    let request = tokio::spawn(async move {
        app.oneshot(Request::get("/courses?courseCode=CS").body(Body::empty()).unwrap())
            .await
            .unwrap()
    });

    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(!request.is_finished());
    shutdown.cancel();

    let response = request.await.unwrap();
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert!(bytes.is_empty());

    drop(held);
}

#[tokio::test]
async fn test_lookup_storage_failure_is_internal_error() {
    let pool = setup_test_db().await;
    insert(&pool, "Intro to CS", "CS101").await;

    pool.close().await;
    let (status, body) = get(app(pool), "/courses?courseCode=CS").await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "500 Internal Server Error");
    assert_eq!(body["message"], "Database error occurred");
}

#[tokio::test]
async fn test_health_and_alive() {
    let pool = setup_test_db().await;

    let (status, _) = get(app(pool.clone()), "/health").await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = get(app(pool.clone()), "/alive").await;
    assert_eq!(status, StatusCode::OK);

    pool.close().await;
    let (status, body) = get(app(pool), "/health").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["message"], "Database error occurred");
}
