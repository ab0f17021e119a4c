//! HTTP handlers for the record store.

use std::sync::Arc;

use axum::{
    extract::{
        rejection::{FormRejection, JsonRejection, PathRejection, QueryRejection},
        Form, Path, Query, State,
    },
    response::Html,
    Json,
};
use chrono::{Datelike, Local};
use serde::{Deserialize, Serialize};

use crate::aggregation::{StatsFilter, StatsSummary};
use crate::models::{MonthKey, MonthlyCounts, MonthlyRecord};
use crate::storage::{PomoStore, StoreError};

use super::problem::{ApiProblem, ApiResult};
use super::AppState;


#[derive(Debug, Serialize)]
pub struct HealthResponse {
    status: &'static str,
}


/// Body of `PUT /pomo/{year}/{month}`.
#[derive(Debug, Deserialize)]
pub struct CountsPayload {
    pomodoros_completed: i64,
    short_breaks: i64,
    long_breaks: i64,
}


/// Form body of `POST /api/save-pomodoros`.
#[derive(Debug, Deserialize)]
pub struct SavePomodorosForm {
    pomodoros: i64,
    year: i64,
    month: i64,
}


#[derive(Debug, Serialize)]
pub struct SavePomodorosResponse {
    success: bool,
    message: String,
    record: MonthlyRecord,
}


#[derive(Debug, Deserialize)]
pub struct StatsQuery {
    year: Option<i64>,
    month: Option<i64>,
}


#[derive(Debug, Serialize)]
pub struct YearsResponse {
    years: Vec<i32>,
}


pub async fn home() -> Html<&'static str> {
    Html(include_str!("../../static/index.html"))
}


pub async fn healthcheck() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}


pub async fn get_month(
    State(state): State<AppState>,
    path: Result<Path<(i64, i64)>, PathRejection>,
) -> ApiResult<Json<MonthlyRecord>> {
    let (year, month) = month_path(path)?;
    let record = with_store(&state, move |store| store.get(year, month)).await?;
    Ok(Json(record))
}


pub async fn put_month(
    State(state): State<AppState>,
    path: Result<Path<(i64, i64)>, PathRejection>,
    payload: Result<Json<CountsPayload>, JsonRejection>,
) -> ApiResult<Json<MonthlyRecord>> {
    let (year, month) = month_path(path)?;
    let Json(payload) = payload.map_err(ApiProblem::from_json_rejection)?;

    let counts = MonthlyCounts::try_new(
        payload.pomodoros_completed,
        payload.short_breaks,
        payload.long_breaks,
    )
    .map_err(|e| ApiProblem::validation(e.message()))?;

    let record = with_store(&state, move |store| store.put(year, month, counts)).await?;
    Ok(Json(record))
}


pub async fn increment_month(
    State(state): State<AppState>,
    path: Result<Path<(i64, i64)>, PathRejection>,
) -> ApiResult<Json<MonthlyRecord>> {
    let (year, month) = month_path(path)?;
    let record = with_store(&state, move |store| store.increment(year, month)).await?;
    Ok(Json(record))
}


/// Add a finished session's pomodoros to its month.
pub async fn save_pomodoros(
    State(state): State<AppState>,
    form: Result<Form<SavePomodorosForm>, FormRejection>,
) -> ApiResult<Json<SavePomodorosResponse>> {
    let Form(form) = form.map_err(ApiProblem::from_form_rejection)?;
    let SavePomodorosForm { pomodoros, year, month } = form;

    let record =
        with_store(&state, move |store| store.add_pomodoros(year, month, pomodoros)).await?;
    Ok(Json(SavePomodorosResponse {
        success: true,
        message: format!("Saved {pomodoros} pomodoros for {month}/{year}"),
        record,
    }))
}


pub async fn list_months(State(state): State<AppState>) -> ApiResult<Json<Vec<MonthlyRecord>>> {
    let records = with_store(&state, |store| store.list()).await?;
    Ok(Json(records))
}


pub async fn stats(
    State(state): State<AppState>,
    query: Result<Query<StatsQuery>, QueryRejection>,
) -> ApiResult<Json<StatsSummary>> {
    let Query(query) = query.map_err(ApiProblem::from_query_rejection)?;
    let filter = StatsFilter::new(query.year, query.month)
        .map_err(|e| ApiProblem::validation(e.message()))?;
    let current_year = Local::now().year();

    let summary = with_store(&state, move |store| store.stats(filter, current_year)).await?;
    Ok(Json(summary))
}


pub async fn years(State(state): State<AppState>) -> ApiResult<Json<YearsResponse>> {
    let years = with_store(&state, |store| store.years()).await?;
    Ok(Json(YearsResponse { years }))
}


/// Extract and range-check `{year}/{month}` before touching storage.
fn month_path(path: Result<Path<(i64, i64)>, PathRejection>) -> ApiResult<(i64, i64)> {
    let Path((year, month)) = path.map_err(ApiProblem::from_path_rejection)?;
    MonthKey::new(year, month).map_err(|e| ApiProblem::validation(e.message()))?;
    Ok((year, month))
}


/// Run a store operation on the blocking pool.
async fn with_store<T, F>(state: &AppState, op: F) -> ApiResult<T>
where
    F: FnOnce(&PomoStore) -> Result<T, StoreError> + Send + 'static,
    T: Send + 'static,
{
    let store = Arc::clone(&state.store);
    tokio::task::spawn_blocking(move || op(&*store))
        .await
        .map_err(|e| ApiProblem::internal(format!("store task failed: {e}")))?
        .map_err(ApiProblem::from_store)
}
