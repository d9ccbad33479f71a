//! Auction backend API client.
//!
//! The portal owns no data: listings, users, analysis numbers, and the
//! scraper schedule all live behind the backend's REST API. This module is
//! the only place that talks to it.
//!
//! # Architecture
//!
//! - `reqwest` with a cookie store; the backend authenticates with an
//!   `HttpOnly` `access_token` cookie set by `POST /login`, and the jar
//!   carries it on every subsequent call.
//! - One typed record per endpoint response (see [`types`]); loose fields
//!   are default-filled at this boundary.
//! - The status vocabulary is cached in-process via `moka` (5-minute TTL) -
//!   it only changes when the scraper runs.
//! - Any 401 from any endpoint force-clears the portal session before the
//!   error surfaces; the error layer then redirects to the login page.
//!
//! # Example
//!
//! ```rust,ignore
//! use gavelpoint_portal::backend::{BackendClient, types::AuctionFilters};
//!
//! let client = BackendClient::new(&config, session.clone())?;
//!
//! let filters = AuctionFilters {
//!     auction_status: Some("Scheduled".into()),
//!     ..AuctionFilters::default()
//! };
//! let page = client.auctions(&filters, 1).await?;
//! let counts = client.auction_counts(&filters).await?;
//! ```

mod client;
pub mod types;

pub use client::BackendClient;

use thiserror::Error;

/// Errors that can occur when calling the auction backend.
#[derive(Debug, Error)]
pub enum BackendError {
    /// Transport-level failure: the backend never answered.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// 401: the backend rejected our credentials. The session has already
    /// been cleared by the time this surfaces.
    #[error("Not authorized: {message}")]
    Unauthorized {
        /// Backend-supplied message, if any.
        message: String,
    },

    /// 400: the backend rejected the request contents.
    #[error("Validation failed: {message}")]
    Validation {
        /// Backend-supplied message for inline display.
        message: String,
    },

    /// 404: nothing there (e.g. a CSV export with no matching rows).
    #[error("Not found: {message}")]
    NotFound {
        /// Backend-supplied message.
        message: String,
    },

    /// A 200 envelope with `success: false`.
    #[error("Backend reported failure: {message}")]
    Rejected {
        /// Backend-supplied message.
        message: String,
    },

    /// Any other unexpected status.
    #[error("Backend error (HTTP {status}): {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Backend-supplied or raw body message.
        message: String,
    },

    /// Response body did not match the endpoint's schema.
    #[error("Response parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Response body was syntactically fine but semantically unusable.
    #[error("Unexpected response payload: {0}")]
    Payload(String),
}

impl BackendError {
    /// Whether this error means the session was rejected (and cleared).
    #[must_use]
    pub const fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized { .. })
    }

    /// Whether this error is a transport failure with no response at all.
    #[must_use]
    pub const fn is_connectivity(&self) -> bool {
        matches!(self, Self::Http(_))
    }
}
