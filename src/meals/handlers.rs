use axum::{
    extract::{Query, State},
    http::StatusCode,
    routing::{delete, get, post},
    Json, Router,
};
use time::OffsetDateTime;
use tracing::{info, instrument};
use uuid::Uuid;

use super::{
    dto::{LogMealRequest, LogsQuery, MealLogsResponse},
    repo,
    repo_types::MealLog,
    services,
};
use crate::{
    auth::AuthUser,
    error::{AppError, AppPath, ValidJson},
    state::AppState,
};

pub fn write_routes() -> Router<AppState> {
    Router::new()
        .route("/meals/log", post(log_meal))
        .route("/meals/logs/:id", delete(delete_log))
}

pub fn read_routes() -> Router<AppState> {
    Router::new().route("/meals/logs", get(list_logs))
}

/// POST /meals/log
#[instrument(skip(state, req))]
pub async fn log_meal(
    State(state): State<AppState>,
    AuthUser { user_id, .. }: AuthUser,
    ValidJson(req): ValidJson<LogMealRequest>,
) -> Result<(StatusCode, Json<MealLog>), AppError> {
    let log = repo::insert(&state.db, user_id, &req).await?;
    info!(%user_id, log_id = %log.id, meal_type = ?log.meal_type, "meal logged");
    Ok((StatusCode::CREATED, Json(log)))
}

/// GET /meals/logs?date= for daily totals, or ?startDate=&endDate= for logs.
#[instrument(skip(state))]
pub async fn list_logs(
    State(state): State<AppState>,
    AuthUser { user_id, .. }: AuthUser,
    Query(q): Query<LogsQuery>,
) -> Result<Json<MealLogsResponse>, AppError> {
    if let Some(raw) = services::present(q.date.as_deref()) {
        let (_, (from, until)) = services::required_day(raw)?;
        let totals = repo::totals_between(&state.db, user_id, from, until).await?;
        return Ok(Json(MealLogsResponse::Totals(totals)));
    }

    let (from, to) = services::log_range(
        q.start_date.as_deref(),
        q.end_date.as_deref(),
        OffsetDateTime::now_utc(),
    );
    let logs = repo::list_between(&state.db, user_id, from, to).await?;
    Ok(Json(MealLogsResponse::Logs(logs)))
}

#[instrument(skip(state))]
pub async fn delete_log(
    State(state): State<AppState>,
    AuthUser { user_id, .. }: AuthUser,
    AppPath(id): AppPath<Uuid>,
) -> Result<StatusCode, AppError> {
    if !repo::delete(&state.db, user_id, id).await? {
        return Err(AppError::NotFound("Meal log not found".into()));
    }
    info!(%user_id, log_id = %id, "meal log deleted");
    Ok(StatusCode::NO_CONTENT)
}
