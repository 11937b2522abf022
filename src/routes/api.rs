// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! API routes for authenticated users.

use crate::error::Result;
use crate::middleware::auth::AuthUser;
use crate::models::{ChatScreen, Profile, ProfilePatch};
use crate::AppState;
use axum::{
    extract::State,
    routing::{get, post},
    Extension, Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;
use validator::Validate;

/// API routes (require authentication via JWT).
/// The auth middleware is applied in routes/mod.rs for these routes.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/profile", get(get_profile).patch(update_profile))
        .route("/api/credits/use", post(use_credits))
        .route("/api/credits/add", post(add_credits))
        .route("/api/screens/chat", get(get_chat_screen))
}

// ─── Profile ─────────────────────────────────────────────────

/// Get (and create on first call) the current user's profile.
async fn get_profile(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<Profile>> {
    let profile = state
        .profiles
        .fetch(&user.auth_state())
        .await?
        .ok_or(crate::error::AppError::Unauthorized)?;

    Ok(Json(profile))
}

/// Apply a partial profile update.
async fn update_profile(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(patch): Json<ProfilePatch>,
) -> Result<Json<Profile>> {
    patch.validate()?;
    if patch.is_empty() {
        return Err(crate::error::AppError::BadRequest(
            "No profile fields to update".to_string(),
        ));
    }

    let profile = state
        .profiles
        .update(&user.auth_state(), &patch)
        .await?
        .ok_or(crate::error::AppError::Unauthorized)?;

    Ok(Json(profile))
}

// ─── Credits ─────────────────────────────────────────────────

#[derive(Debug, Deserialize, Validate)]
pub struct CreditRequest {
    #[validate(range(min = 1, max = 1_000_000))]
    pub amount: i64,
}

/// Response for spending credits.
#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct UseCreditsResponse {
    pub success: bool,
    /// Balance as last confirmed by the store (absent if never loaded)
    #[cfg_attr(feature = "binding-generation", ts(type = "number | null"))]
    pub credits: Option<i64>,
}

/// Response for adding credits.
#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct AddCreditsResponse {
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub credits: i64,
}

/// Spend credits. `success: false` means the balance was too low.
async fn use_credits(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(request): Json<CreditRequest>,
) -> Result<Json<UseCreditsResponse>> {
    request.validate()?;

    let success = state
        .profiles
        .debit(&user.auth_state(), request.amount)
        .await?;

    Ok(Json(UseCreditsResponse {
        success,
        credits: state.profiles.cached(&user.uid).map(|p| p.credits),
    }))
}

/// Add credits to the user's balance.
async fn add_credits(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(request): Json<CreditRequest>,
) -> Result<Json<AddCreditsResponse>> {
    request.validate()?;

    let credits = state
        .profiles
        .credit(&user.auth_state(), request.amount)
        .await?
        .ok_or(crate::error::AppError::Unauthorized)?;

    Ok(Json(AddCreditsResponse { credits }))
}

// ─── Screens ─────────────────────────────────────────────────

/// Chat screen layout (chat list, then chat detail).
async fn get_chat_screen(Extension(_user): Extension<AuthUser>) -> Json<ChatScreen> {
    Json(ChatScreen::default())
}
