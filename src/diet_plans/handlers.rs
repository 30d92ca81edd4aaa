use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tracing::instrument;

use super::{dto::DietPlan, repo, services};
use crate::{
    auth::AuthUser,
    error::AppError,
    nutrition::calc::{self, EnergyTargets},
    state::AppState,
};

pub fn plan_routes() -> Router<AppState> {
    Router::new()
        .route("/diet-plan", get(get_active_plan))
        .route("/diet-plan/generate", post(generate_plan))
}

pub fn target_routes() -> Router<AppState> {
    Router::new().route("/targets", get(get_targets))
}

/// POST /diet-plan/generate
#[instrument(skip(state))]
pub async fn generate_plan(
    State(state): State<AppState>,
    AuthUser { user_id, .. }: AuthUser,
) -> Result<(StatusCode, Json<DietPlan>), AppError> {
    let plan = services::generate(&state, user_id).await?;
    Ok((StatusCode::CREATED, Json(plan)))
}

#[instrument(skip(state))]
pub async fn get_active_plan(
    State(state): State<AppState>,
    AuthUser { user_id, .. }: AuthUser,
) -> Result<Json<DietPlan>, AppError> {
    repo::find_active(&state.db, user_id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound("No active diet plan".into()))
}

/// Targets computed from the current profile, independent of any plan.
#[instrument(skip(state))]
pub async fn get_targets(
    State(state): State<AppState>,
    AuthUser { user_id, .. }: AuthUser,
) -> Result<Json<EnergyTargets>, AppError> {
    let profile = services::load_profile(&state, user_id).await?;
    Ok(Json(calc::compute(&(&profile).into())))
}
