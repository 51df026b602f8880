pub mod auth;

use axum::Json;
use axum::extract::{Path, Query};
use axum::routing::{delete, post};
use axum::{Router, extract::State, http::StatusCode, routing::get};
use serde::Deserialize;

use crate::error::AppError;
use crate::models::*;
use crate::services::{CrawlService, CrawlStats, LectureService, TimetableService, parse_semester_param};
use crate::state::AppState;

pub use auth::CurrentUser;

#[derive(Deserialize)]
struct FetchParams {
    semester: String,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/v1/lectures", get(search_lectures))
        .route("/api/v1/lectures/fetch", post(fetch_lectures))
        .route("/api/v1/timetables", get(list_timetables).post(create_timetable))
        .route(
            "/api/v1/timetables/{id}",
            get(get_timetable).patch(rename_timetable).delete(delete_timetable),
        )
        .route("/api/v1/timetables/{id}/lectures", post(add_lecture))
        .route("/api/v1/timetables/{id}/lectures/{lecture_id}", delete(remove_lecture))
        .with_state(state)
}

fn timetables(state: &AppState) -> TimetableService {
    TimetableService::new(state.db.clone(), state.locks.clone())
}

async fn health(State(state): State<AppState>) -> Result<StatusCode, AppError> {
    sqlx::query("select 1").execute(&state.db).await?;
    Ok(StatusCode::OK)
}

async fn search_lectures(
    State(state): State<AppState>,
    Query(query): Query<LectureSearchQuery>,
) -> Result<Json<LectureSearchResponse>, AppError> {
    let service = LectureService::new(state.db.clone());
    Ok(Json(service.search(&query).await?))
}

async fn fetch_lectures(
    State(state): State<AppState>,
    Query(params): Query<FetchParams>,
) -> Result<Json<CrawlStats>, AppError> {
    let (year, semester) = parse_semester_param(&params.semester)?;
    let service = CrawlService::new(state.db.clone(), state.source.clone());
    let stats = service.crawl(year, &semester).await?;
    Ok(Json(stats))
}

async fn list_timetables(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
) -> Result<Json<Vec<Timetable>>, AppError> {
    Ok(Json(timetables(&state).list(&user_id).await?))
}

async fn create_timetable(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Json(req): Json<NewTimetableRequest>,
) -> Result<(StatusCode, Json<Timetable>), AppError> {
    let timetable = timetables(&state).create(&user_id, req).await?;
    Ok((StatusCode::CREATED, Json(timetable)))
}

async fn get_timetable(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Path(id): Path<String>,
) -> Result<Json<TimetableDetail>, AppError> {
    Ok(Json(timetables(&state).detail(&user_id, &id).await?))
}

async fn rename_timetable(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Path(id): Path<String>,
    Json(req): Json<RenameTimetableRequest>,
) -> Result<Json<Timetable>, AppError> {
    Ok(Json(timetables(&state).rename(&user_id, &id, &req.name).await?))
}

async fn delete_timetable(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    timetables(&state).delete(&user_id, &id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn add_lecture(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Path(id): Path<String>,
    Json(req): Json<AddLectureRequest>,
) -> Result<Json<TimetableDetail>, AppError> {
    let detail = timetables(&state).add_lecture(&user_id, &id, &req.lecture_id).await?;
    Ok(Json(detail))
}

async fn remove_lecture(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Path((id, lecture_id)): Path<(String, String)>,
) -> Result<Json<TimetableDetail>, AppError> {
    let detail = timetables(&state).remove_lecture(&user_id, &id, &lecture_id).await?;
    Ok(Json(detail))
}
