use axum::{
    extract::{
        rejection::{PathRejection, QueryRejection},
        DefaultBodyLimit, FromRequest, FromRequestParts, State,
    },
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post, put},
    Json, Router,
};
use serde_json::json;
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use uuid::Uuid;

use crate::{
    auth::{AuthUser, RequireTeacher},
    courses,
    error::{AppError, AppResult},
    models::*,
    state::AppState,
};

/// JSON body whose rejection is a 400 validation error.
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct AppJson<T>(pub T);

/// Path parameters whose rejection is a 400 validation error.
#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(AppError))]
pub struct AppPath<T>(pub T);

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        AppError::Validation(rejection.body_text())
    }
}

/// Query string whose rejection is a 400 validation error.
#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(AppError))]
pub struct AppQuery<T>(pub T);

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::Validation(rejection.body_text())
    }
}

/// The full service: API routes plus health, body limit, tracing and CORS.
pub fn app(state: AppState, body_limit: usize) -> Router {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        .merge(router(state))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any))
                .layer(DefaultBodyLimit::max(body_limit)),
        )
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/courses", get(list_courses).post(create_course))
        .route("/api/courses/:id", put(update_course))
        .route("/api/courses/enroll/:course_id", post(enroll_course))
        .with_state(state)
}

async fn list_courses(
    State(state): State<AppState>,
    AppQuery(query): AppQuery<ListCoursesQuery>,
) -> AppResult<impl IntoResponse> {
    let page = courses::list(state.store.as_ref(), &query).await?;
    Ok(Json(json!({ "success": true, "data": page })))
}

async fn create_course(
    State(state): State<AppState>,
    RequireTeacher(principal): RequireTeacher,
    AppJson(req): AppJson<CreateCourseReq>,
) -> AppResult<impl IntoResponse> {
    let course = courses::create(state.store.as_ref(), &principal, req).await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "message": "Course created successfully",
            "course": course,
        })),
    ))
}

async fn update_course(
    State(state): State<AppState>,
    RequireTeacher(principal): RequireTeacher,
    AppPath(id): AppPath<Uuid>,
    AppJson(req): AppJson<UpdateCourseReq>,
) -> AppResult<Json<Course>> {
    let course = courses::update(state.store.as_ref(), &principal, id, req).await?;
    Ok(Json(course))
}

async fn enroll_course(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
    AppPath(course_id): AppPath<Uuid>,
) -> AppResult<impl IntoResponse> {
    courses::enroll(state.store.as_ref(), &principal, course_id).await?;
    Ok(Json(json!({ "message": "Enrolled successfully" })))
}
