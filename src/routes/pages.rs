//! Public pages: the landing page and the login/signup entry pages.

use axum::Router;
use axum::extract::Query;
use axum::response::Json;
use axum::routing::get;
use serde::{Deserialize, Serialize};

use crate::provider::Role;
use crate::state::AppState;

pub(super) fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(landing))
        .route("/login", get(login_page))
        .route("/signup", get(signup_page))
        .route("/employer/login", get(employer_login_page))
        .route("/employer/signup", get(employer_signup_page))
}

#[derive(Debug, Serialize)]
pub struct Link {
    pub label: &'static str,
    pub href: &'static str,
}

#[derive(Debug, Serialize)]
pub struct Landing {
    pub title: &'static str,
    pub tagline: &'static str,
    pub links: Vec<Link>,
}

/// `GET /`
pub async fn landing() -> Json<Landing> {
    Json(Landing {
        title: "JobSwipe",
        tagline: "Swipe right on your next job.",
        links: vec![
            Link { label: "Log in", href: "/login" },
            Link { label: "Sign up", href: "/signup" },
            Link { label: "Employer login", href: "/employer/login" },
        ],
    })
}

#[derive(Debug, Deserialize)]
pub struct EntryQuery {
    error: Option<String>,
}

/// What an entry page form posts to, and for whom.
#[derive(Debug, Serialize)]
pub struct EntryPage {
    pub page: &'static str,
    pub role: Role,
    pub action: &'static str,
    /// Set when a failed email callback bounced the user back here.
    pub error: Option<String>,
}

fn entry(page: &'static str, role: Role, action: &'static str, query: EntryQuery) -> Json<EntryPage> {
    Json(EntryPage { page, role, action, error: query.error })
}

pub async fn login_page(Query(query): Query<EntryQuery>) -> Json<EntryPage> {
    entry("login", Role::JobSeeker, "/api/auth/login", query)
}

pub async fn signup_page(Query(query): Query<EntryQuery>) -> Json<EntryPage> {
    entry("signup", Role::JobSeeker, "/api/auth/signup", query)
}

pub async fn employer_login_page(Query(query): Query<EntryQuery>) -> Json<EntryPage> {
    entry("employer_login", Role::Employer, "/api/auth/employer/login", query)
}

pub async fn employer_signup_page(Query(query): Query<EntryQuery>) -> Json<EntryPage> {
    entry("employer_signup", Role::Employer, "/api/auth/signup", query)
}
