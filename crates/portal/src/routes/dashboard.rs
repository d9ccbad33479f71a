//! Dashboard overview route handler.

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::State;

use crate::error::Result;
use crate::filters;
use crate::middleware::RequireAdmin;
use crate::models::UserProfile;
use crate::state::AppState;

/// Overview tile numbers.
#[derive(Debug, Clone, Copy, Default)]
pub struct OverviewMetrics {
    pub total_users: u64,
    pub total_auctions: u64,
}

/// Overview page template.
#[derive(Template, WebTemplate)]
#[template(path = "dashboard/overview.html")]
pub struct OverviewTemplate {
    pub user: Option<UserProfile>,
    pub admin_name: String,
    pub metrics: OverviewMetrics,
    pub error: Option<String>,
}

/// Display the dashboard overview.
pub async fn overview(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
) -> Result<OverviewTemplate> {
    let (metrics, error) = match state.backend().analysis().await {
        Ok(analysis) => (
            OverviewMetrics {
                total_users: analysis.total_users,
                total_auctions: analysis.total_auctions,
            },
            None,
        ),
        Err(e) if e.is_unauthorized() => return Err(e.into()),
        Err(e) => {
            tracing::warn!(error = %e, "failed to fetch analysis");
            (
                OverviewMetrics::default(),
                Some("Failed to fetch data".to_string()),
            )
        }
    };

    Ok(OverviewTemplate {
        admin_name: admin.name.clone(),
        user: Some(admin),
        metrics,
        error,
    })
}
