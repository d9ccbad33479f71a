//! HTTP route handlers for the portal.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                       - Landing page
//! GET  /health                 - Health check
//!
//! # Auth
//! GET  /login                  - Login page
//! POST /login                  - Login action
//! POST /logout                 - Logout action
//!
//! # Auctions (requires auth)
//! GET  /auctions               - Listing: table or calendar view, filters,
//!                                pagination, month navigation
//! GET  /auctions/day           - Auctions on one calendar day (?date=MM/DD/YYYY)
//! GET  /auctions/download      - CSV export with the current filters
//!
//! # Admin dashboard (requires admin)
//! GET  /dashboard              - Overview tiles
//! GET  /dashboard/users        - User table
//! GET  /dashboard/users/{id}/edit   - Edit form
//! POST /dashboard/users/{id}/edit   - Edit action
//! POST /dashboard/users/{id}/delete - Delete action
//! GET  /dashboard/register     - Create-user form
//! POST /dashboard/register     - Create-user action
//! GET  /dashboard/scraper      - Scraper control panel
//! POST /dashboard/scraper/start
//! POST /dashboard/scraper/schedule
//! POST /dashboard/scraper/next-run-range
//! POST /dashboard/scraper/daily-run-range
//! ```

pub mod auctions;
pub mod auth;
pub mod dashboard;
pub mod home;
pub mod scraper;
pub mod users;

use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/login", get(auth::login_page).post(auth::login))
        .route("/logout", post(auth::logout))
}

/// Create the auction routes router.
pub fn auction_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(auctions::index))
        .route("/day", get(auctions::day))
        .route("/download", get(auctions::download))
}

/// Create the admin dashboard router.
pub fn dashboard_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(dashboard::overview))
        .route("/users", get(users::index))
        .route("/users/{id}/edit", get(users::edit_page).post(users::edit))
        .route("/users/{id}/delete", post(users::delete))
        .route("/register", get(users::register_page).post(users::register))
        .route("/scraper", get(scraper::panel))
        .route("/scraper/start", post(scraper::start))
        .route("/scraper/schedule", post(scraper::schedule))
        .route("/scraper/next-run-range", post(scraper::next_run_range))
        .route("/scraper/daily-run-range", post(scraper::daily_run_range))
}

/// Create all routes for the portal.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(home::home))
        .nest("/auctions", auction_routes())
        .nest("/dashboard", dashboard_routes())
        .merge(auth_routes())
}

/// Query parameters for transient success/error notices.
///
/// The server-rendered stand-in for toast notifications: actions redirect
/// back with a message in the query string.
#[derive(Debug, Default, serde::Deserialize)]
pub struct MessageQuery {
    pub error: Option<String>,
    pub success: Option<String>,
}
