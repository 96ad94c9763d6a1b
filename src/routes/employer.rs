//! Employer pages: dashboard, company profile, job posting, candidate queue,
//! and job analytics.

use axum::Router;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::Json;
use axum::routing::{get, post};
use serde::{Deserialize, Serialize};

use super::auth::AuthUser;
use super::{ApiError, api_error};
use crate::provider::{Identity, Role};
use crate::services::catalog::{self, Candidate, DashboardCard};
use crate::services::employer::{self, AnalyticsReport, CandidateDecision, EmployerError, JobPostingForm, PostedJob};
use crate::services::profile::{CompanyProfile, CompanyProfileUpdate, ProfileError};
use crate::state::AppState;

pub(super) fn routes() -> Router<AppState> {
    Router::new()
        .route("/employer/dashboard", get(dashboard))
        .route("/employer/profile", get(profile).put(update_profile))
        .route("/employer/post-job", get(posted_jobs).post(post_job))
        .route("/employer/candidates", get(candidates))
        .route("/employer/candidates/{id}", post(decide_candidate))
        .route("/employer/analytics", get(analytics))
}

pub(crate) fn employer_error_to_status(err: &EmployerError) -> StatusCode {
    match err {
        EmployerError::MissingFields => StatusCode::BAD_REQUEST,
        EmployerError::CandidateNotFound(_) => StatusCode::NOT_FOUND,
    }
}

fn employer_error(err: &EmployerError) -> ApiError {
    api_error(employer_error_to_status(err), &err.to_string())
}

#[derive(Debug, Serialize)]
pub struct Dashboard {
    pub user: Identity,
    pub company_name: String,
    pub cards: Vec<DashboardCard>,
}

/// `GET /employer/dashboard`
pub async fn dashboard(State(state): State<AppState>, auth: AuthUser) -> Json<Dashboard> {
    let company_name = state.with_workspace(&auth.user, |ws| ws.company.company_name.clone()).await;
    Json(Dashboard { user: auth.user, company_name, cards: catalog::employer_dashboard_cards() })
}

// =============================================================================
// COMPANY PROFILE
// =============================================================================

/// `GET /employer/profile`
pub async fn profile(State(state): State<AppState>, auth: AuthUser) -> Json<CompanyProfile> {
    Json(state.with_workspace(&auth.user, |ws| ws.company.clone()).await)
}

/// `PUT /employer/profile`
pub async fn update_profile(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(update): Json<CompanyProfileUpdate>,
) -> Result<Json<CompanyProfile>, ApiError> {
    state
        .with_workspace(&auth.user, |ws| {
            ws.company.apply(update)?;
            Ok::<_, ProfileError>(ws.company.clone())
        })
        .await
        .map(Json)
        .map_err(|e| api_error(StatusCode::BAD_REQUEST, &e.to_string()))
}

// =============================================================================
// JOB POSTING
// =============================================================================

/// `GET /employer/post-job`: jobs this employer has posted so far.
pub async fn posted_jobs(State(state): State<AppState>, auth: AuthUser) -> Json<Vec<PostedJob>> {
    Json(state.with_workspace(&auth.user, |ws| ws.posted_jobs.clone()).await)
}

#[derive(Debug, Serialize)]
pub struct PostJobResponse {
    pub job: PostedJob,
    pub redirect: &'static str,
}

/// `POST /employer/post-job`
pub async fn post_job(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(form): Json<JobPostingForm>,
) -> Result<(StatusCode, Json<PostJobResponse>), ApiError> {
    let job = state
        .with_workspace(&auth.user, |ws| {
            let job = employer::build_posting(form, &ws.posted_jobs)?;
            ws.posted_jobs.push(job.clone());
            Ok::<_, EmployerError>(job)
        })
        .await
        .map_err(|e| employer_error(&e))?;

    tracing::info!(user_id = %auth.user.id, job_id = job.job.id, title = %job.job.title, "job posted");
    Ok((StatusCode::CREATED, Json(PostJobResponse { job, redirect: Role::Employer.dashboard_path() })))
}

// =============================================================================
// CANDIDATES
// =============================================================================

/// `GET /employer/candidates`
pub async fn candidates(State(state): State<AppState>, auth: AuthUser) -> Json<Vec<Candidate>> {
    Json(state.with_workspace(&auth.user, |ws| ws.candidates.pending().to_vec()).await)
}

#[derive(Debug, Deserialize)]
pub struct DecisionBody {
    pub approved: bool,
}

#[derive(Debug, Serialize)]
pub struct DecisionResponse {
    pub candidate: Candidate,
    pub decision: CandidateDecision,
    pub remaining: usize,
}

/// `POST /employer/candidates/{id}`: approve or decline.
pub async fn decide_candidate(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<u32>,
    Json(body): Json<DecisionBody>,
) -> Result<Json<DecisionResponse>, ApiError> {
    state
        .with_workspace(&auth.user, |ws| {
            let (candidate, decision) = ws.candidates.decide(id, body.approved)?;
            Ok::<_, EmployerError>(DecisionResponse { candidate, decision, remaining: ws.candidates.pending().len() })
        })
        .await
        .map(Json)
        .map_err(|e| employer_error(&e))
}

/// `GET /employer/analytics`
pub async fn analytics(_auth: AuthUser) -> Json<AnalyticsReport> {
    Json(employer::analytics(&catalog::sample_job_stats()))
}

#[cfg(test)]
#[path = "employer_test.rs"]
mod tests;
