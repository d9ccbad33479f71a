//! Auction backend API client implementation.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use reqwest::StatusCode;
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use tracing::instrument;

use gavelpoint_core::{DateKey, Email, UserId};

use crate::backend::BackendError;
use crate::backend::types::{
    Analysis, ApiMessage, Auction, AuctionCounts, AuctionFilters, AuctionsByDate, AuctionsPage,
    CsvExport, DailyRunRange, LoginResponse, NewUser, NextRunRange, ScraperDetails,
    ScraperSchedule, StatusList, UserDetail, UserList, UserRecord, UserUpdate,
};
use crate::models::UserProfile;
use crate::session::SessionManager;

/// TTL of the cached status vocabulary.
const STATUS_CACHE_TTL: Duration = Duration::from_secs(300);

/// Cache key for the status vocabulary (the cache holds one entry).
const STATUS_CACHE_KEY: &str = "auction-status";

/// Client for the auction backend REST API.
///
/// Cheaply cloneable. Holds the cookie jar carrying the backend's
/// `access_token` credential cookie, and the process session manager so a
/// 401 from any endpoint clears the session on the spot.
#[derive(Clone)]
pub struct BackendClient {
    inner: Arc<BackendClientInner>,
}

struct BackendClientInner {
    http: reqwest::Client,
    /// Base URL without trailing slash, e.g. `http://localhost:5000/api`.
    base: String,
    session: SessionManager,
    status_cache: Cache<&'static str, Vec<String>>,
}

impl BackendClient {
    /// Create a new backend client.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client fails to build.
    pub fn new(api_base_url: &url::Url, session: SessionManager) -> Result<Self, BackendError> {
        let http = reqwest::Client::builder().cookie_store(true).build()?;

        let status_cache = Cache::builder()
            .max_capacity(1)
            .time_to_live(STATUS_CACHE_TTL)
            .build();

        Ok(Self {
            inner: Arc::new(BackendClientInner {
                http,
                base: api_base_url.as_str().trim_end_matches('/').to_string(),
                session,
                status_cache,
            }),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{path}", self.inner.base)
    }

    // =========================================================================
    // Auth
    // =========================================================================

    /// Authenticate against `POST /login` and return the operator profile.
    ///
    /// The backend sets its credential cookie on this client's jar as a side
    /// effect; the caller is expected to hand the profile to the session
    /// manager.
    ///
    /// # Errors
    ///
    /// `Unauthorized` for bad credentials, `Validation` for missing fields,
    /// `Http` when the backend is unreachable.
    #[instrument(skip(self, password), fields(email = %email))]
    pub async fn login(
        &self,
        email: &Email,
        password: &SecretString,
    ) -> Result<UserProfile, BackendError> {
        let response = self
            .inner
            .http
            .post(self.url("login"))
            .json(&serde_json::json!({
                "email": email.as_str(),
                "password": password.expose_secret(),
            }))
            .send()
            .await?;
        let response = self.check(response).await?;

        let body: LoginResponse = parse_json(response).await?;
        let profile_email = match Email::parse(&body.email) {
            Ok(parsed) => parsed,
            // The backend echoes what it has on file; fall back to the
            // address the operator just authenticated with.
            Err(_) => email.clone(),
        };

        Ok(UserProfile {
            name: body.name,
            email: profile_email,
            role: body.role,
        })
    }

    /// `POST /logout`: ask the backend to expire its credential cookie.
    ///
    /// # Errors
    ///
    /// Returns an error if the call fails; callers treat that as advisory.
    pub async fn logout(&self) -> Result<(), BackendError> {
        let response = self.inner.http.post(self.url("logout")).send().await?;
        self.check(response).await?;
        Ok(())
    }

    /// `POST /register`: create a user (admin-gated by the backend).
    ///
    /// # Errors
    ///
    /// `Validation` carries the backend's inline message (duplicate email,
    /// empty fields); `Unauthorized` when the caller is not allowed.
    #[instrument(skip(self, user), fields(username = %user.username))]
    pub async fn register(&self, user: &NewUser) -> Result<(), BackendError> {
        let response = self
            .inner
            .http
            .post(self.url("register"))
            .json(user)
            .send()
            .await?;
        self.check(response).await?;
        Ok(())
    }

    // =========================================================================
    // Auctions
    // =========================================================================

    /// `GET /auctions`: one page of the filtered listing.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure or a non-success status.
    #[instrument(skip(self, filters))]
    pub async fn auctions(
        &self,
        filters: &AuctionFilters,
        page: u32,
    ) -> Result<AuctionsPage, BackendError> {
        let response = self
            .inner
            .http
            .get(self.url("auctions"))
            .query(filters)
            .query(&[("page", page)])
            .send()
            .await?;
        let response = self.check(response).await?;
        parse_json(response).await
    }

    /// `GET /auctions-status`: the status filter vocabulary.
    ///
    /// Cached for five minutes; empty-string entries are dropped at the
    /// boundary so the filter dropdown never offers a blank choice.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure or a non-success status.
    pub async fn auction_statuses(&self) -> Result<Vec<String>, BackendError> {
        if let Some(statuses) = self.inner.status_cache.get(STATUS_CACHE_KEY).await {
            return Ok(statuses);
        }

        let response = self
            .inner
            .http
            .get(self.url("auctions-status"))
            .send()
            .await?;
        let response = self.check(response).await?;
        let list: StatusList = parse_json(response).await?;

        let statuses: Vec<String> = list
            .auction_status
            .into_iter()
            .filter(|s| !s.is_empty())
            .collect();
        self.inner
            .status_cache
            .insert(STATUS_CACHE_KEY, statuses.clone())
            .await;
        Ok(statuses)
    }

    /// `GET /auction_counts`: sparse per-day counts under the same filters
    /// as the listing.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure or a non-success status.
    #[instrument(skip(self, filters))]
    pub async fn auction_counts(
        &self,
        filters: &AuctionFilters,
    ) -> Result<AuctionCounts, BackendError> {
        let response = self
            .inner
            .http
            .get(self.url("auction_counts"))
            .query(filters)
            .send()
            .await?;
        let response = self.check(response).await?;
        parse_json(response).await
    }

    /// `GET /auctions-by-date`: every auction on one calendar day.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure or a non-success status.
    #[instrument(skip(self))]
    pub async fn auctions_by_date(&self, date: DateKey) -> Result<Vec<Auction>, BackendError> {
        let response = self
            .inner
            .http
            .get(self.url("auctions-by-date"))
            .query(&[("date", date.to_string())])
            .send()
            .await?;
        let response = self.check(response).await?;
        let body: AuctionsByDate = parse_json(response).await?;
        Ok(body.auctions)
    }

    /// `GET /auctions/download`: CSV export of the filtered listing,
    /// unpaginated, with the exact same filter parameters as
    /// [`auctions`](Self::auctions).
    ///
    /// # Errors
    ///
    /// `NotFound` when no rows match; otherwise transport or status errors.
    #[instrument(skip(self, filters))]
    pub async fn download_csv(&self, filters: &AuctionFilters) -> Result<CsvExport, BackendError> {
        let response = self
            .inner
            .http
            .get(self.url("auctions/download"))
            .query(filters)
            .send()
            .await?;
        let response = self.check(response).await?;

        let filename = attachment_filename(&response).unwrap_or_else(|| {
            format!(
                "auctions_{}.csv",
                chrono::Local::now().format("%Y%m%d_%H%M%S")
            )
        });
        let content = response.bytes().await?.to_vec();
        Ok(CsvExport { filename, content })
    }

    // =========================================================================
    // Dashboard
    // =========================================================================

    /// `GET /analysis`: the overview tile numbers.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure or a non-success status.
    pub async fn analysis(&self) -> Result<Analysis, BackendError> {
        let response = self.inner.http.get(self.url("analysis")).send().await?;
        let response = self.check(response).await?;
        parse_json(response).await
    }

    /// `GET /users`: all portal users.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure or a non-success status.
    pub async fn users(&self) -> Result<Vec<UserRecord>, BackendError> {
        let response = self.inner.http.get(self.url("users")).send().await?;
        let response = self.check(response).await?;
        let body: UserList = parse_json(response).await?;
        Ok(body.users)
    }

    /// `GET /users/{id}`: one user.
    ///
    /// # Errors
    ///
    /// `NotFound` when the id does not exist.
    pub async fn user(&self, id: UserId) -> Result<UserRecord, BackendError> {
        let response = self
            .inner
            .http
            .get(self.url(&format!("users/{id}")))
            .send()
            .await?;
        let response = self.check(response).await?;
        let body: UserDetail = parse_json(response).await?;
        Ok(body.user)
    }

    /// `PUT /users/{id}`: update a user.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure or a non-success status.
    #[instrument(skip(self, update))]
    pub async fn update_user(&self, id: UserId, update: &UserUpdate) -> Result<(), BackendError> {
        let response = self
            .inner
            .http
            .put(self.url(&format!("users/{id}")))
            .json(update)
            .send()
            .await?;
        self.check(response).await?;
        Ok(())
    }

    /// `DELETE /users/{id}`: remove a user.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure or a non-success status.
    #[instrument(skip(self))]
    pub async fn delete_user(&self, id: UserId) -> Result<(), BackendError> {
        let response = self
            .inner
            .http
            .delete(self.url(&format!("users/{id}")))
            .send()
            .await?;
        self.check(response).await?;
        Ok(())
    }

    // =========================================================================
    // Scraper
    // =========================================================================

    /// `GET /scraper/details`: last-run log and schedule state.
    ///
    /// # Errors
    ///
    /// `Rejected` when the backend answers `success: false`.
    pub async fn scraper_details(&self) -> Result<ScraperDetails, BackendError> {
        let response = self
            .inner
            .http
            .get(self.url("scraper/details"))
            .send()
            .await?;
        let response = self.check(response).await?;
        let details: ScraperDetails = parse_json(response).await?;
        if !details.success {
            return Err(BackendError::Rejected {
                message: "Failed to fetch scraper details".to_string(),
            });
        }
        Ok(details)
    }

    /// `POST /scraper/start`: run the scraper now.
    ///
    /// # Errors
    ///
    /// `Rejected` when the backend answers `success: false`.
    #[instrument(skip(self))]
    pub async fn scraper_start(&self) -> Result<(), BackendError> {
        let response = self
            .inner
            .http
            .post(self.url("scraper/start"))
            .json(&serde_json::json!({}))
            .send()
            .await?;
        self.check_envelope(response).await
    }

    /// `POST /scraper/schedule`: set the one-shot and/or daily run time.
    ///
    /// # Errors
    ///
    /// `Validation` when the backend rejects the formats or the two times
    /// are within ten minutes of each other.
    #[instrument(skip(self, schedule))]
    pub async fn scraper_schedule(&self, schedule: &ScraperSchedule) -> Result<(), BackendError> {
        let response = self
            .inner
            .http
            .post(self.url("scraper/schedule"))
            .json(schedule)
            .send()
            .await?;
        self.check_envelope(response).await
    }

    /// `POST /scraper/next_run_range`: set the scrape window for the
    /// one-shot run.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure or a non-success status.
    #[instrument(skip(self, range))]
    pub async fn scraper_next_run_range(&self, range: &NextRunRange) -> Result<(), BackendError> {
        let response = self
            .inner
            .http
            .post(self.url("scraper/next_run_range"))
            .json(range)
            .send()
            .await?;
        self.check_envelope(response).await
    }

    /// `POST /scraper/daily_run_range`: set the scrape window for the daily
    /// run.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure or a non-success status.
    #[instrument(skip(self, range))]
    pub async fn scraper_daily_run_range(&self, range: &DailyRunRange) -> Result<(), BackendError> {
        let response = self
            .inner
            .http
            .post(self.url("scraper/daily_run_range"))
            .json(range)
            .send()
            .await?;
        self.check_envelope(response).await
    }

    // =========================================================================
    // Response handling
    // =========================================================================

    /// Map status codes to the error taxonomy.
    ///
    /// This is the portal's cross-cutting interceptor: every response from
    /// every endpoint passes through here, and a 401 force-clears the
    /// session before the error propagates.
    async fn check(&self, response: reqwest::Response) -> Result<reqwest::Response, BackendError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let message = error_message(response).await;

        if status == StatusCode::UNAUTHORIZED {
            tracing::warn!(message = %message, "backend rejected credentials; clearing session");
            self.inner.session.logout();
            return Err(BackendError::Unauthorized { message });
        }

        Err(match status {
            StatusCode::BAD_REQUEST => BackendError::Validation { message },
            StatusCode::NOT_FOUND => BackendError::NotFound { message },
            _ => BackendError::Api {
                status: status.as_u16(),
                message,
            },
        })
    }

    /// [`check`](Self::check), then require a `success: true` envelope.
    async fn check_envelope(&self, response: reqwest::Response) -> Result<(), BackendError> {
        let response = self.check(response).await?;
        let envelope: ApiMessage = parse_json(response).await?;
        if envelope.success {
            Ok(())
        } else {
            Err(BackendError::Rejected {
                message: envelope
                    .message
                    .unwrap_or_else(|| "Backend reported failure".to_string()),
            })
        }
    }
}

/// Parse a JSON body, keeping the raw text around for diagnostics.
async fn parse_json<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, BackendError> {
    let text = response.text().await?;
    serde_json::from_str(&text).map_err(|e| {
        tracing::error!(
            error = %e,
            body = %text.chars().take(500).collect::<String>(),
            "failed to parse backend response"
        );
        BackendError::Parse(e)
    })
}

/// Best-effort human message from an error response body.
async fn error_message(response: reqwest::Response) -> String {
    let text = response.text().await.unwrap_or_default();
    if let Ok(envelope) = serde_json::from_str::<ApiMessage>(&text)
        && let Some(message) = envelope.message
    {
        return message;
    }
    text.chars().take(200).collect()
}

/// Filename from a `Content-Disposition: attachment; filename=...` header.
fn attachment_filename(response: &reqwest::Response) -> Option<String> {
    let disposition = response
        .headers()
        .get(reqwest::header::CONTENT_DISPOSITION)?
        .to_str()
        .ok()?;
    let raw = disposition.split("filename=").nth(1)?;
    let name = raw.trim_matches(|c| c == '"' || c == ' ' || c == ';');
    if name.is_empty() {
        None
    } else {
        Some(name.to_string())
    }
}
