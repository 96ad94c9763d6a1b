//! Job-seeker pages: dashboard, job swiper, matches, profile, and chat.
//!
//! All state lives in the caller's workspace; handlers only translate
//! between HTTP and the service state machines.

use axum::Router;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::Json;
use axum::routing::{delete, get, post};
use serde::{Deserialize, Serialize};

use super::auth::AuthUser;
use super::{ApiError, api_error};
use crate::provider::Identity;
use crate::services::catalog::{self, ChatMessage, DashboardCard, Match};
use crate::services::chat::{self, ChatError, ChatThread};
use crate::services::jobs::{JobBrowserView, SwipeError, SwipeOutcome};
use crate::services::profile::{ProfileError, SeekerProfile, SeekerProfileUpdate};
use crate::state::AppState;

pub(super) fn routes() -> Router<AppState> {
    Router::new()
        .route("/dashboard", get(dashboard))
        .route("/jobs", get(jobs))
        .route("/jobs/swipe", post(swipe))
        .route("/jobs/reset", post(reset))
        .route("/matches", get(matches))
        .route("/profile", get(profile).put(update_profile))
        .route("/profile/skills", post(add_skill))
        .route("/profile/skills/{skill}", delete(remove_skill))
        .route("/chat/{id}", get(chat_thread).post(send_message))
}

pub(crate) fn swipe_error_to_status(err: &SwipeError) -> StatusCode {
    match err {
        SwipeError::Exhausted => StatusCode::CONFLICT,
    }
}

pub(crate) fn profile_error_to_status(err: &ProfileError) -> StatusCode {
    match err {
        ProfileError::EmptySkill | ProfileError::Blank(_) => StatusCode::BAD_REQUEST,
        ProfileError::DuplicateSkill(_) => StatusCode::CONFLICT,
    }
}

fn profile_error(err: &ProfileError) -> ApiError {
    api_error(profile_error_to_status(err), &err.to_string())
}

// =============================================================================
// DASHBOARD
// =============================================================================

#[derive(Debug, Serialize)]
pub struct Dashboard {
    pub user: Identity,
    pub cards: Vec<DashboardCard>,
}

/// `GET /dashboard`
pub async fn dashboard(auth: AuthUser) -> Json<Dashboard> {
    Json(Dashboard { user: auth.user, cards: catalog::seeker_dashboard_cards() })
}

// =============================================================================
// JOBS
// =============================================================================

/// `GET /jobs`
pub async fn jobs(State(state): State<AppState>, auth: AuthUser) -> Json<JobBrowserView> {
    Json(state.with_workspace(&auth.user, |ws| ws.browser.view()).await)
}

#[derive(Debug, Deserialize)]
pub struct SwipeBody {
    pub liked: bool,
}

#[derive(Debug, Serialize)]
pub struct SwipeResponse {
    #[serde(flatten)]
    pub outcome: SwipeOutcome,
    pub view: JobBrowserView,
}

/// `POST /jobs/swipe`: right (`liked: true`) or left on the current job.
pub async fn swipe(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(body): Json<SwipeBody>,
) -> Result<Json<SwipeResponse>, ApiError> {
    let result = state
        .with_workspace(&auth.user, |ws| {
            let outcome = ws.browser.swipe(body.liked)?;
            Ok::<_, SwipeError>(SwipeResponse { outcome, view: ws.browser.view() })
        })
        .await;
    result
        .map(Json)
        .map_err(|e| api_error(swipe_error_to_status(&e), &e.to_string()))
}

/// `POST /jobs/reset`: start over from the first job.
pub async fn reset(State(state): State<AppState>, auth: AuthUser) -> Json<JobBrowserView> {
    Json(
        state
            .with_workspace(&auth.user, |ws| {
                ws.browser.start_over();
                ws.browser.view()
            })
            .await,
    )
}

/// `GET /matches`
pub async fn matches(State(state): State<AppState>, auth: AuthUser) -> Json<Vec<Match>> {
    Json(state.with_workspace(&auth.user, |ws| ws.matches.clone()).await)
}

// =============================================================================
// PROFILE
// =============================================================================

/// `GET /profile`
pub async fn profile(State(state): State<AppState>, auth: AuthUser) -> Json<SeekerProfile> {
    Json(state.with_workspace(&auth.user, |ws| ws.profile.clone()).await)
}

/// `PUT /profile`
pub async fn update_profile(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(update): Json<SeekerProfileUpdate>,
) -> Result<Json<SeekerProfile>, ApiError> {
    state
        .with_workspace(&auth.user, |ws| {
            ws.profile.apply(update)?;
            Ok::<_, ProfileError>(ws.profile.clone())
        })
        .await
        .map(Json)
        .map_err(|e| profile_error(&e))
}

#[derive(Debug, Deserialize)]
pub struct SkillBody {
    #[serde(default)]
    pub skill: String,
}

/// `POST /profile/skills`
pub async fn add_skill(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(body): Json<SkillBody>,
) -> Result<(StatusCode, Json<Vec<String>>), ApiError> {
    state
        .with_workspace(&auth.user, |ws| {
            ws.profile.add_skill(&body.skill)?;
            Ok::<_, ProfileError>(ws.profile.skills.clone())
        })
        .await
        .map(|skills| (StatusCode::CREATED, Json(skills)))
        .map_err(|e| profile_error(&e))
}

/// `DELETE /profile/skills/{skill}`
pub async fn remove_skill(State(state): State<AppState>, auth: AuthUser, Path(skill): Path<String>) -> StatusCode {
    let removed = state.with_workspace(&auth.user, |ws| ws.profile.remove_skill(&skill)).await;
    if removed { StatusCode::NO_CONTENT } else { StatusCode::NOT_FOUND }
}

// =============================================================================
// CHAT
// =============================================================================

/// `GET /chat/{id}`
pub async fn chat_thread(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(company_id): Path<u32>,
) -> Result<Json<ChatThread>, StatusCode> {
    state
        .with_workspace(&auth.user, |ws| ws.chat(company_id).cloned())
        .await
        .map(Json)
        .ok_or(StatusCode::NOT_FOUND)
}

#[derive(Debug, Deserialize)]
pub struct MessageBody {
    #[serde(default)]
    pub text: String,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub appended: Vec<ChatMessage>,
}

/// `POST /chat/{id}`: send a message to a matched company.
pub async fn send_message(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(company_id): Path<u32>,
    Json(body): Json<MessageBody>,
) -> Result<(StatusCode, Json<MessageResponse>), ApiError> {
    let timestamp = chat::now_rfc3339();
    let result = state
        .with_workspace(&auth.user, |ws| ws.chat(company_id).map(|thread| thread.send(&body.text, &timestamp)))
        .await;
    match result {
        None => Err(api_error(StatusCode::NOT_FOUND, "company not found")),
        Some(Err(e @ ChatError::EmptyMessage)) => Err(api_error(StatusCode::BAD_REQUEST, &e.to_string())),
        Some(Ok(appended)) => Ok((StatusCode::CREATED, Json(MessageResponse { appended }))),
    }
}

#[cfg(test)]
#[path = "seeker_test.rs"]
mod tests;
