//! Landing page route handler.

use askama::Template;
use askama_web::WebTemplate;

use crate::filters;
use crate::middleware::OptionalAuth;
use crate::models::UserProfile;

/// Landing page template.
#[derive(Template, WebTemplate)]
#[template(path = "home.html")]
pub struct HomeTemplate {
    pub user: Option<UserProfile>,
}

/// Display the landing page.
pub async fn home(OptionalAuth(user): OptionalAuth) -> HomeTemplate {
    HomeTemplate { user }
}
