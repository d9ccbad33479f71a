//! Scraper control panel route handlers (admin dashboard).
//!
//! The scraper itself is backend-owned; this panel only displays its
//! last-run log and posts schedule changes. Every action redirects back to
//! the panel, which refetches the details.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Query, State},
    response::Redirect,
};
use serde::Deserialize;

use crate::backend::BackendError;
use crate::backend::types::{DailyRunRange, NextRunRange, ScraperDetails, ScraperSchedule};
use crate::error::Result;
use crate::filters;
use crate::middleware::RequireAdmin;
use crate::models::UserProfile;
use crate::routes::MessageQuery;
use crate::state::AppState;

// =============================================================================
// Form Types
// =============================================================================

/// Schedule form data (`datetime-local` and `time` inputs).
#[derive(Debug, Deserialize)]
pub struct ScheduleForm {
    #[serde(default)]
    pub next_run_time: String,
    #[serde(default)]
    pub daily_run_time: String,
}

/// Next-run range form data (`date` inputs).
#[derive(Debug, Deserialize)]
pub struct NextRunRangeForm {
    #[serde(default)]
    pub next_run_from: String,
    #[serde(default)]
    pub next_run_to: String,
}

/// Daily-run range form data (`date` inputs).
#[derive(Debug, Deserialize)]
pub struct DailyRunRangeForm {
    #[serde(default)]
    pub daily_run_from: String,
    #[serde(default)]
    pub daily_run_to: String,
}

// =============================================================================
// Template
// =============================================================================

/// Scraper panel template.
#[derive(Template, WebTemplate)]
#[template(path = "dashboard/scraper.html")]
pub struct ScraperTemplate {
    pub user: Option<UserProfile>,
    pub admin_name: String,
    pub details: ScraperDetails,
    pub error: Option<String>,
    pub success: Option<String>,
}

// =============================================================================
// Handlers
// =============================================================================

/// Display the scraper control panel.
pub async fn panel(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Query(query): Query<MessageQuery>,
) -> Result<ScraperTemplate> {
    let (details, error) = match state.backend().scraper_details().await {
        Ok(details) => (details, query.error),
        Err(e) if e.is_unauthorized() => return Err(e.into()),
        Err(e) => {
            tracing::warn!(error = %e, "failed to fetch scraper details");
            (
                ScraperDetails::default(),
                Some("Error fetching scraper details".to_string()),
            )
        }
    };

    Ok(ScraperTemplate {
        admin_name: admin.name.clone(),
        user: Some(admin),
        details,
        error,
        success: query.success,
    })
}

/// Run the scraper now.
pub async fn start(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
) -> Result<Redirect> {
    match state.backend().scraper_start().await {
        Ok(()) => Ok(Redirect::to(
            "/dashboard/scraper?success=Scraper+started+successfully!",
        )),
        Err(e) if e.is_unauthorized() => Err(e.into()),
        Err(BackendError::Validation { message } | BackendError::Rejected { message }) => {
            Ok(redirect_with_error(&message))
        }
        Err(e) => {
            tracing::warn!(error = %e, "failed to start scraper");
            Ok(redirect_with_error("Error starting scraper"))
        }
    }
}

/// Save the one-shot and/or daily run time.
pub async fn schedule(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Form(form): Form<ScheduleForm>,
) -> Result<Redirect> {
    let schedule = ScraperSchedule {
        next_run_time: non_empty(&form.next_run_time),
        daily_run_time: non_empty(&form.daily_run_time),
    };
    if schedule.next_run_time.is_none() && schedule.daily_run_time.is_none() {
        return Ok(redirect_with_error(
            "Please select a daily run time or next run time",
        ));
    }

    match state.backend().scraper_schedule(&schedule).await {
        Ok(()) => Ok(Redirect::to(
            "/dashboard/scraper?success=Schedule+updated+successfully!",
        )),
        Err(e) if e.is_unauthorized() => Err(e.into()),
        Err(BackendError::Validation { message } | BackendError::Rejected { message }) => {
            Ok(redirect_with_error(&message))
        }
        Err(e) => {
            tracing::warn!(error = %e, "failed to update scraper schedule");
            Ok(redirect_with_error("Failed to update schedule"))
        }
    }
}

/// Save the one-shot run's scrape window.
pub async fn next_run_range(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Form(form): Form<NextRunRangeForm>,
) -> Result<Redirect> {
    let range = NextRunRange {
        next_run_from: non_empty(&form.next_run_from),
        next_run_to: non_empty(&form.next_run_to),
    };
    if range.next_run_from.is_none() && range.next_run_to.is_none() {
        return Ok(redirect_with_error(
            "Please select at least one date for next run range",
        ));
    }

    match state.backend().scraper_next_run_range(&range).await {
        Ok(()) => Ok(Redirect::to(
            "/dashboard/scraper?success=Next+run+range+updated+successfully!",
        )),
        Err(e) if e.is_unauthorized() => Err(e.into()),
        Err(e) => {
            tracing::warn!(error = %e, "failed to update next run range");
            Ok(redirect_with_error("Error updating next run range"))
        }
    }
}

/// Save the daily run's scrape window.
pub async fn daily_run_range(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Form(form): Form<DailyRunRangeForm>,
) -> Result<Redirect> {
    let range = DailyRunRange {
        daily_run_from: non_empty(&form.daily_run_from),
        daily_run_to: non_empty(&form.daily_run_to),
    };
    if range.daily_run_from.is_none() && range.daily_run_to.is_none() {
        return Ok(redirect_with_error(
            "Please select at least one date for daily run range",
        ));
    }

    match state.backend().scraper_daily_run_range(&range).await {
        Ok(()) => Ok(Redirect::to(
            "/dashboard/scraper?success=Daily+run+range+updated+successfully!",
        )),
        Err(e) if e.is_unauthorized() => Err(e.into()),
        Err(e) => {
            tracing::warn!(error = %e, "failed to update daily run range");
            Ok(redirect_with_error("Error updating daily run range"))
        }
    }
}

// =============================================================================
// Helpers
// =============================================================================

fn non_empty(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

fn redirect_with_error(message: &str) -> Redirect {
    let query = url::form_urlencoded::Serializer::new(String::new())
        .append_pair("error", message)
        .finish();
    Redirect::to(&format!("/dashboard/scraper?{query}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_non_empty_trims_and_drops_blank() {
        assert_eq!(non_empty("  07:30 "), Some("07:30".to_string()));
        assert_eq!(non_empty("   "), None);
        assert_eq!(non_empty(""), None);
    }
}
