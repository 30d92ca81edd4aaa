use axum::{
    extract::{FromRef, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tracing::{error, info, instrument, warn};

use crate::{
    auth::{
        dto::{AccountSummary, LoginRequest, MeResponse, RefreshRequest, RegisterRequest, TokenPair},
        repo::{self as accounts, Account},
        services::{ensure_session_active, hash_password, verify_password, AuthUser, JwtKeys},
    },
    error::{AppError, ValidJson},
    onboarding::repo as profiles,
    state::AppState,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/refresh", post(refresh))
        .route("/auth/logout", post(logout))
}

pub fn me_routes() -> Router<AppState> {
    Router::new().route("/me", get(get_me))
}

/// Opens a session and signs the access/refresh pair bound to it.
async fn issue_tokens(state: &AppState, account: Account) -> Result<TokenPair, AppError> {
    let session_id = state.sessions.create(account.id).await?;
    let keys = JwtKeys::from_ref(state);
    let access_token = keys.sign_access(account.id, session_id).map_err(|e| {
        error!(error = %e, "jwt sign access failed");
        AppError::Internal(e)
    })?;
    let refresh_token = keys.sign_refresh(account.id, session_id).map_err(|e| {
        error!(error = %e, "jwt sign refresh failed");
        AppError::Internal(e)
    })?;
    info!(user_id = %account.id, %session_id, "session opened");
    Ok(TokenPair {
        access_token,
        refresh_token,
        user: AccountSummary {
            id: account.id,
            email: account.email,
        },
    })
}

/// POST /auth/register
#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    ValidJson(payload): ValidJson<RegisterRequest>,
) -> Result<(StatusCode, Json<TokenPair>), AppError> {
    let email = payload.email.trim().to_lowercase();
    let hash = hash_password(&payload.password)?;

    let Some(account) = accounts::create(&state.db, &email, &hash).await? else {
        warn!(%email, "email already registered");
        return Err(AppError::Conflict("Email already registered".into()));
    };

    info!(user_id = %account.id, %email, "account registered");
    Ok((StatusCode::CREATED, Json(issue_tokens(&state, account).await?)))
}

/// POST /auth/login
#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    ValidJson(payload): ValidJson<LoginRequest>,
) -> Result<Json<TokenPair>, AppError> {
    let email = payload.email.trim().to_lowercase();

    let Some(account) = accounts::find_by_email(&state.db, &email).await? else {
        warn!(%email, "login for unknown email");
        return Err(AppError::Unauthorized("Invalid credentials".into()));
    };

    if !verify_password(&payload.password, &account.password_hash)? {
        warn!(user_id = %account.id, "login with wrong password");
        return Err(AppError::Unauthorized("Invalid credentials".into()));
    }

    Ok(Json(issue_tokens(&state, account).await?))
}

#[instrument(skip(state, payload))]
pub async fn refresh(
    State(state): State<AppState>,
    ValidJson(payload): ValidJson<RefreshRequest>,
) -> Result<Json<TokenPair>, AppError> {
    let keys = JwtKeys::from_ref(&state);
    let claims = keys
        .verify_refresh(&payload.refresh_token)
        .map_err(|e| AppError::Unauthorized(e.to_string()))?;

    ensure_session_active(&state, claims.sub, claims.sid).await?;

    let account = accounts::find_by_id(&state.db, claims.sub)
        .await?
        .ok_or_else(|| AppError::Unauthorized("User not found".into()))?;

    // Same session, fresh pair.
    let access_token = keys.sign_access(claims.sub, claims.sid)?;
    let refresh_token = keys.sign_refresh(claims.sub, claims.sid)?;
    Ok(Json(TokenPair {
        access_token,
        refresh_token,
        user: AccountSummary {
            id: account.id,
            email: account.email,
        },
    }))
}

#[instrument(skip(state))]
pub async fn logout(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<StatusCode, AppError> {
    state.sessions.revoke(auth.session_id).await?;
    info!(user_id = %auth.user_id, session_id = %auth.session_id, "user signed out");
    Ok(StatusCode::NO_CONTENT)
}

#[instrument(skip(state))]
pub async fn get_me(
    State(state): State<AppState>,
    AuthUser { user_id, .. }: AuthUser,
) -> Result<Json<MeResponse>, AppError> {
    let account = accounts::find_by_id(&state.db, user_id).await?.ok_or_else(|| {
        error!(%user_id, "account behind a live session is gone");
        AppError::Unauthorized("User not found".into())
    })?;
    let onboarded = profiles::profile_exists(&state.db, user_id).await?;

    Ok(Json(MeResponse {
        id: account.id,
        email: account.email,
        onboarded,
    }))
}
