use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post, put},
    Json, Router,
};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use super::{
    dto::{OnboardingDraft, OnboardingForm, Profile},
    repo,
    steps::{self, OnboardingStep},
};
use crate::{
    auth::AuthUser,
    error::{AppError, AppJson, AppPath, ValidJson},
    state::AppState,
};

pub fn onboarding_routes() -> Router<AppState> {
    Router::new()
        .route("/onboarding/complete", post(complete))
        .route("/onboarding/draft", get(get_draft).delete(discard_draft))
        .route("/onboarding/draft/complete", post(complete_from_draft))
        .route("/onboarding/draft/:step", put(save_step))
}

pub fn profile_routes() -> Router<AppState> {
    Router::new().route("/profile", get(get_profile).put(replace_profile))
}

async fn create_profile(
    state: &AppState,
    user_id: Uuid,
    form: &OnboardingForm,
) -> Result<Profile, AppError> {
    let Some(profile) = repo::insert_profile(&state.db, user_id, form).await? else {
        warn!(%user_id, "onboarding already completed");
        return Err(AppError::Conflict("Onboarding already completed".into()));
    };
    repo::delete_draft(&state.db, user_id).await?;
    info!(%user_id, "onboarding completed");
    Ok(profile)
}

/// POST /onboarding/complete with the whole questionnaire.
#[instrument(skip(state, form))]
pub async fn complete(
    State(state): State<AppState>,
    AuthUser { user_id, .. }: AuthUser,
    ValidJson(form): ValidJson<OnboardingForm>,
) -> Result<(StatusCode, Json<Profile>), AppError> {
    let profile = create_profile(&state, user_id, &form).await?;
    Ok((StatusCode::CREATED, Json(profile)))
}

/// POST /onboarding/draft/complete: finish from the fields saved step by step.
#[instrument(skip(state))]
pub async fn complete_from_draft(
    State(state): State<AppState>,
    AuthUser { user_id, .. }: AuthUser,
) -> Result<(StatusCode, Json<Profile>), AppError> {
    let (draft, _) = repo::find_draft(&state.db, user_id)
        .await?
        .ok_or_else(|| AppError::BadRequest("Onboarding is incomplete: no saved steps".into()))?;
    let form = steps::finish(draft)?;
    let profile = create_profile(&state, user_id, &form).await?;
    Ok((StatusCode::CREATED, Json(profile)))
}

#[instrument(skip(state))]
pub async fn get_draft(
    State(state): State<AppState>,
    AuthUser { user_id, .. }: AuthUser,
) -> Result<Json<OnboardingDraft>, AppError> {
    let draft = match repo::find_draft(&state.db, user_id).await? {
        Some((data, updated_at)) => OnboardingDraft {
            data,
            updated_at: Some(updated_at),
        },
        None => OnboardingDraft {
            data: serde_json::json!({}),
            updated_at: None,
        },
    };
    Ok(Json(draft))
}

/// PUT /onboarding/draft/:step
#[instrument(skip(state, body))]
pub async fn save_step(
    State(state): State<AppState>,
    AuthUser { user_id, .. }: AuthUser,
    AppPath(step): AppPath<String>,
    AppJson(body): AppJson<serde_json::Value>,
) -> Result<Json<OnboardingDraft>, AppError> {
    let step: OnboardingStep = step.parse()?;
    let fields = step.fields(body)?;
    let (data, updated_at) = repo::merge_draft(&state.db, user_id, &fields).await?;

    info!(%user_id, ?step, "onboarding step saved");
    Ok(Json(OnboardingDraft {
        data,
        updated_at: Some(updated_at),
    }))
}

#[instrument(skip(state))]
pub async fn discard_draft(
    State(state): State<AppState>,
    AuthUser { user_id, .. }: AuthUser,
) -> Result<StatusCode, AppError> {
    repo::delete_draft(&state.db, user_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[instrument(skip(state))]
pub async fn get_profile(
    State(state): State<AppState>,
    AuthUser { user_id, .. }: AuthUser,
) -> Result<Json<Profile>, AppError> {
    repo::find_profile(&state.db, user_id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound("Profile not found; complete onboarding first".into()))
}

#[instrument(skip(state, form))]
pub async fn replace_profile(
    State(state): State<AppState>,
    AuthUser { user_id, .. }: AuthUser,
    ValidJson(form): ValidJson<OnboardingForm>,
) -> Result<Json<Profile>, AppError> {
    let profile = repo::update_profile(&state.db, user_id, &form)
        .await?
        .ok_or_else(|| AppError::NotFound("Profile not found; complete onboarding first".into()))?;
    info!(%user_id, "profile updated");
    Ok(Json(profile))
}
