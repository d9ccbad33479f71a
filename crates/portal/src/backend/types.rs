//! Typed records for the auction backend's JSON API.
//!
//! The backend grew out of a scraper and answers with loosely-shaped JSON:
//! auction columns are PascalCase strings, most fields can be absent, and
//! envelope objects carry a `success`/`message` pair. Every endpoint gets an
//! explicit schema here, with `#[serde(default)]` filling anything missing at
//! the boundary so call sites never have to re-check shape.

use std::collections::HashMap;

use serde::{Deserialize, Deserializer, Serialize};

use gavelpoint_core::{DateKey, UserId, UserRole};

// =============================================================================
// Envelope
// =============================================================================

/// Generic `{"success": ..., "message": ...}` envelope used by most
/// mutation-style endpoints.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApiMessage {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
}

// =============================================================================
// Auth
// =============================================================================

/// Body of `POST /login` on success.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub role: UserRole,
}

/// Body of `POST /register`.
#[derive(Debug, Clone, Serialize)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub dob: String,
    pub password: String,
}

// =============================================================================
// Auctions
// =============================================================================

/// Filter parameters shared by the listing, the per-day counts, and the CSV
/// export. Serialized straight into the query string; empty filters are
/// omitted so the backend sees the same absence a cleared form would send.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuctionFilters {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auction_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auction_status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_from: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_to: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
}

impl AuctionFilters {
    /// Whether any filter is set.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.auction_type.is_none()
            && self.auction_status.is_none()
            && self.date_from.is_none()
            && self.date_to.is_none()
            && self.search.is_none()
    }
}

/// One auction row, with the scraper's full column set.
///
/// Everything except the id is a display string; judgement and bid amounts
/// arrive pre-formatted from the county sites and are not parsed further.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Auction {
    #[serde(default)]
    pub id: i64,
    #[serde(default, rename = "PropertyAddress")]
    pub property_address: String,
    #[serde(default, rename = "AuctionType")]
    pub auction_type: String,
    #[serde(default, rename = "CaseNo")]
    pub case_no: String,
    #[serde(default, rename = "FinalJudgementAmount")]
    pub final_judgement_amount: String,
    #[serde(default, rename = "ParcelID")]
    pub parcel_id: String,
    /// Date-and-time string, e.g. `07/15/2025 11:00 AM`.
    #[serde(default, rename = "AuctionDate")]
    pub auction_date: String,
    #[serde(default, rename = "AuctionSoldAmount")]
    pub auction_sold_amount: String,
    #[serde(default, rename = "SoldTo")]
    pub sold_to: String,
    #[serde(default, rename = "PlaintiffMaxBid")]
    pub plaintiff_max_bid: String,
    #[serde(default, rename = "AuctionStatus")]
    pub auction_status: String,
    #[serde(default, rename = "Link")]
    pub link: String,
}

impl Auction {
    /// Whether the status badge should render in the cancelled style.
    #[must_use]
    pub fn is_canceled(&self) -> bool {
        self.auction_status.contains("Canceled")
    }
}

/// Body of `GET /auctions`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AuctionsPage {
    #[serde(default)]
    pub auctions: Vec<Auction>,
    #[serde(default = "one")]
    pub total_pages: u32,
}

const fn one() -> u32 {
    1
}

/// Body of `GET /auctions-status`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StatusList {
    #[serde(default)]
    pub auction_status: Vec<String>,
}

/// Body of `GET /auctions-by-date`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AuctionsByDate {
    #[serde(default)]
    pub auctions: Vec<Auction>,
}

/// Sparse per-day auction counts, keyed by [`DateKey`].
///
/// The wire form is a flat object of `MM/DD/YYYY` keys; only days with at
/// least one auction appear, and a missing day means zero. Keys the backend
/// sends in any other shape are dropped rather than failing the whole map.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuctionCounts(HashMap<DateKey, u64>);

impl AuctionCounts {
    /// Count for a day; absent days are zero.
    #[must_use]
    pub fn get(&self, key: DateKey) -> u64 {
        self.0.get(&key).copied().unwrap_or(0)
    }

    /// Number of days with at least one auction.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether no day has any auctions.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(DateKey, u64)> for AuctionCounts {
    fn from_iter<I: IntoIterator<Item = (DateKey, u64)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<'de> Deserialize<'de> for AuctionCounts {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw: HashMap<String, u64> = HashMap::deserialize(deserializer)?;
        Ok(Self(
            raw.into_iter()
                .filter_map(|(k, v)| k.parse::<DateKey>().ok().map(|key| (key, v)))
                .collect(),
        ))
    }
}

// =============================================================================
// Dashboard
// =============================================================================

/// Body of `GET /analysis`.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct Analysis {
    #[serde(default)]
    pub total_users: u64,
    #[serde(default)]
    pub total_auctions: u64,
}

/// One row of `GET /users`, and the `user` object of `GET /users/{id}`.
#[derive(Debug, Clone, Deserialize)]
pub struct UserRecord {
    pub id: UserId,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub email: String,
    /// Date-of-birth string as the backend serializes it; format varies, so
    /// it is normalized at the view layer.
    #[serde(default)]
    pub dob: Option<String>,
    #[serde(default)]
    pub role: UserRole,
}

/// Body of `GET /users`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserList {
    #[serde(default)]
    pub users: Vec<UserRecord>,
}

/// Body of `GET /users/{id}`.
#[derive(Debug, Clone, Deserialize)]
pub struct UserDetail {
    pub user: UserRecord,
}

/// Body of `PUT /users/{id}`.
#[derive(Debug, Clone, Default, Serialize)]
pub struct UserUpdate {
    pub name: String,
    pub email: String,
    pub dob: String,
    pub password: String,
}

// =============================================================================
// Scraper
// =============================================================================

/// Body of `GET /scraper/details`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ScraperDetails {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub last_run_time: Option<String>,
    #[serde(default)]
    pub last_auctions_inserted: u64,
    #[serde(default)]
    pub last_run_status: Option<String>,
    #[serde(default)]
    pub last_error_message: Option<String>,
    #[serde(default)]
    pub next_run_time: Option<String>,
    #[serde(default)]
    pub daily_run_time: Option<String>,
    #[serde(default)]
    pub next_run_from: Option<String>,
    #[serde(default)]
    pub next_run_to: Option<String>,
    #[serde(default)]
    pub daily_run_from: Option<String>,
    #[serde(default)]
    pub daily_run_to: Option<String>,
}

impl ScraperDetails {
    /// Whether the last run completed successfully.
    #[must_use]
    pub fn last_run_succeeded(&self) -> bool {
        self.last_run_status.as_deref() == Some("Success")
    }
}

/// Body of `POST /scraper/schedule`.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ScraperSchedule {
    /// One-shot run instant, `YYYY-MM-DDTHH:MM` from a datetime-local input.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_run_time: Option<String>,
    /// Recurring run time-of-day, `HH:MM`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub daily_run_time: Option<String>,
}

/// Body of `POST /scraper/next_run_range`.
#[derive(Debug, Clone, Default, Serialize)]
pub struct NextRunRange {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_run_from: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_run_to: Option<String>,
}

/// Body of `POST /scraper/daily_run_range`.
#[derive(Debug, Clone, Default, Serialize)]
pub struct DailyRunRange {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub daily_run_from: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub daily_run_to: Option<String>,
}

/// Export produced by `GET /auctions/download`.
#[derive(Debug, Clone)]
pub struct CsvExport {
    /// Attachment filename, from Content-Disposition when the backend sends
    /// one, otherwise generated.
    pub filename: String,
    /// Raw CSV bytes.
    pub content: Vec<u8>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_auction_deserializes_pascal_case_columns() {
        let auction: Auction = serde_json::from_str(
            r#"{
                "id": 7,
                "PropertyAddress": "123 Main St",
                "AuctionType": "FORECLOSURE",
                "CaseNo": "2025-CA-001",
                "FinalJudgementAmount": "250,000.00",
                "ParcelID": "40-12-34",
                "AuctionDate": "07/15/2025 11:00 AM",
                "AuctionStatus": "Auction Canceled 06/30/2025",
                "Link": "https://example.com/7"
            }"#,
        )
        .unwrap();

        assert_eq!(auction.property_address, "123 Main St");
        assert_eq!(auction.case_no, "2025-CA-001");
        assert!(auction.is_canceled());
        // Columns absent from the payload default to empty.
        assert_eq!(auction.sold_to, "");
    }

    #[test]
    fn test_auctions_page_defaults() {
        let page: AuctionsPage = serde_json::from_str(r#"{"success": true}"#).unwrap();
        assert!(page.auctions.is_empty());
        assert_eq!(page.total_pages, 1);
    }

    #[test]
    fn test_counts_absent_date_is_zero() {
        let counts: AuctionCounts =
            serde_json::from_str(r#"{"07/15/2025": 3, "07/16/2025": 1}"#).unwrap();

        assert_eq!(counts.get("07/15/2025".parse().unwrap()), 3);
        assert_eq!(counts.get("07/17/2025".parse().unwrap()), 0);
        assert_eq!(counts.len(), 2);
    }

    #[test]
    fn test_counts_drop_malformed_keys() {
        let counts: AuctionCounts =
            serde_json::from_str(r#"{"07/15/2025": 3, "success": 1}"#).unwrap();
        assert_eq!(counts.len(), 1);
    }

    #[test]
    fn test_filters_serialize_omits_empty() {
        let filters = AuctionFilters {
            auction_status: Some("Canceled".to_string()),
            ..AuctionFilters::default()
        };
        let query = serde_json::to_value(&filters).unwrap();
        assert_eq!(query.as_object().unwrap().len(), 1);
    }

    #[test]
    fn test_unknown_role_in_user_record_defaults() {
        let user: UserRecord =
            serde_json::from_str(r#"{"id": 3, "username": "pat", "role": "owner"}"#).unwrap();
        assert_eq!(user.role, UserRole::User);
    }
}
