use std::time::Duration;

use axum::Json;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::Query;
use axum::response::Response;
use axum::routing::post;
use axum::{Router, extract::State, http::StatusCode, routing::get};
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;
use tracing::{Span, debug, info};

use crate::error::AppError;
use crate::models::{CourseFilterRequest, CourseSummary};
use crate::state::AppState;

pub const MALFORMED_REQUEST_MESSAGE: &str = "Request body cannot be null";
pub const INVALID_QUERY_MESSAGE: &str = "Query string could not be parsed";
pub const NO_MATCHES_MESSAGE: &str = "No courses found matching the criteria.";

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/alive", get(alive))
        .route("/courses", get(list_courses))
        .route("/courses/search", post(search_courses))
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http().on_response(
            |res: &Response, latency: Duration, _span: &Span| {
                info!("returned {} in {}ms", res.status(), latency.as_millis());
            },
        )))
        .with_state(state)
}

async fn health(State(state): State<AppState>) -> Result<StatusCode, AppError> {
    sqlx::query("select 1").execute(&state.db).await?;
    Ok(StatusCode::OK)
}

async fn alive() -> StatusCode {
    StatusCode::OK
}

async fn list_courses(
    State(state): State<AppState>,
    query: Result<Query<CourseFilterRequest>, QueryRejection>,
) -> Result<Json<Vec<CourseSummary>>, AppError> {
    let Query(request) = query.map_err(|e| {
        debug!("rejected query string: {}", e);
        AppError::MalformedRequest(INVALID_QUERY_MESSAGE.to_string())
    })?;

    lookup(&state, request).await
}

async fn search_courses(
    State(state): State<AppState>,
    body: Result<Json<CourseFilterRequest>, JsonRejection>,
) -> Result<Json<Vec<CourseSummary>>, AppError> {
    let Json(request) = body.map_err(|e| {
        debug!("rejected request body: {}", e);
        AppError::MalformedRequest(MALFORMED_REQUEST_MESSAGE.to_string())
    })?;

    lookup(&state, request).await
}

async fn lookup(state: &AppState, request: CourseFilterRequest) -> Result<Json<Vec<CourseSummary>>, AppError> {
    state.filter_validator.validate(&request).map_err(|violations| {
        debug!(?violations, "course filter rejected");
        AppError::Validation(violations)
    })?;

    let cancel = state.shutdown.child_token();
    let courses = state.courses.get_courses(&request, &cancel).await?;

    if courses.is_empty() {
        return Err(AppError::NotFound(NO_MATCHES_MESSAGE.to_string()));
    }

    Ok(Json(courses))
}
