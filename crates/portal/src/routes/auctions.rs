//! Auction listing route handlers: filtered table, calendar view, day
//! detail, and the CSV export proxy.
//!
//! One page render issues the three dependent fetches (listing page, status
//! vocabulary, per-day counts) concurrently and tolerates each failing on
//! its own: a broken piece becomes an inline notice while the rest of the
//! page still renders. Only a 401 aborts the render, because by then the
//! session is gone.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Query, State},
    http::header,
    response::IntoResponse,
};
use chrono::NaiveDate;
use serde::Deserialize;
use url::form_urlencoded;

use gavelpoint_core::DateKey;

use crate::backend::BackendError;
use crate::backend::types::{Auction, AuctionCounts, AuctionFilters};
use crate::calendar::{self, Activation, CalendarCell, MonthRef};
use crate::error::{AppError, Result};
use crate::filters;
use crate::middleware::RequireAuth;
use crate::models::UserProfile;
use crate::state::AppState;

// =============================================================================
// Query Types
// =============================================================================

/// Query parameters of the listing page.
#[derive(Debug, Default, Deserialize)]
pub struct AuctionsQuery {
    pub view: Option<String>,
    pub page: Option<u32>,
    pub auction_type: Option<String>,
    pub auction_status: Option<String>,
    pub date_from: Option<String>,
    pub date_to: Option<String>,
    pub search: Option<String>,
    pub cal_year: Option<i32>,
    pub cal_month: Option<u32>,
    pub error: Option<String>,
}

impl AuctionsQuery {
    /// Project the filter fields, treating empty form inputs as unset.
    fn filters(&self) -> AuctionFilters {
        AuctionFilters {
            auction_type: non_empty(self.auction_type.as_deref()),
            auction_status: non_empty(self.auction_status.as_deref()),
            date_from: non_empty(self.date_from.as_deref()),
            date_to: non_empty(self.date_to.as_deref()),
            search: non_empty(self.search.as_deref()),
        }
    }

    fn wants_calendar(&self) -> bool {
        self.view.as_deref() == Some("calendar")
    }
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToOwned::to_owned)
}

/// Query parameters of the day-detail page.
#[derive(Debug, Deserialize)]
pub struct DayQuery {
    pub date: String,
}

// =============================================================================
// View Types
// =============================================================================

/// One pagination link.
pub struct PageLink {
    pub number: u32,
    pub href: String,
    pub current: bool,
}

/// One option of the status dropdown, with its selected state resolved.
pub struct StatusOption {
    pub value: String,
    pub selected: bool,
}

/// One rendered calendar cell.
pub struct CellView {
    pub day: u32,
    pub count: u64,
    pub is_today: bool,
    pub is_pad: bool,
    /// Where clicking the cell goes: the day detail for days with auctions,
    /// a reload carrying the empty-day notice otherwise, nothing for pads.
    pub href: Option<String>,
    pub count_label: &'static str,
}

/// The calendar pane.
pub struct CalendarView {
    pub title: String,
    pub prev_href: String,
    pub next_href: String,
    pub cells: Vec<CellView>,
}

/// Listing page template.
#[derive(Template, WebTemplate)]
#[template(path = "auctions/index.html")]
pub struct AuctionsIndexTemplate {
    pub user: Option<UserProfile>,
    pub error: Option<String>,
    pub view_calendar: bool,
    pub filters: AuctionFilters,
    pub foreclosure_selected: bool,
    pub statuses: Vec<StatusOption>,
    pub auctions: Vec<Auction>,
    pub current_page: u32,
    pub total_pages: u32,
    pub pages: Vec<PageLink>,
    pub table_href: String,
    pub calendar_href: String,
    pub clear_href: String,
    pub download_href: String,
    pub calendar: CalendarView,
}

/// Day detail page template.
#[derive(Template, WebTemplate)]
#[template(path = "auctions/day.html")]
pub struct AuctionDayTemplate {
    pub user: Option<UserProfile>,
    pub date: String,
    pub auctions: Vec<Auction>,
    pub error: Option<String>,
    pub back_href: String,
}

// =============================================================================
// Handlers
// =============================================================================

/// Display the auction listing in table or calendar view.
pub async fn index(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Query(query): Query<AuctionsQuery>,
) -> Result<AuctionsIndexTemplate> {
    let filters = query.filters();
    let page = query.page.unwrap_or(1).max(1);

    let backend = state.backend();
    let (list, statuses, counts) = tokio::join!(
        backend.auctions(&filters, page),
        backend.auction_statuses(),
        backend.auction_counts(&filters),
    );
    let list = pass_unauthorized(list)?;
    let statuses = pass_unauthorized(statuses)?;
    let counts = pass_unauthorized(counts)?;

    let mut error = query.error.clone();
    let (auctions, total_pages) = match list {
        Ok(page_data) => (page_data.auctions, page_data.total_pages.max(1)),
        Err(e) => {
            tracing::warn!(error = %e, "failed to fetch auctions");
            error.get_or_insert_with(|| listing_error_message(&e));
            (Vec::new(), 1)
        }
    };
    let statuses = statuses.unwrap_or_else(|e| {
        tracing::warn!(error = %e, "failed to fetch auction statuses");
        Vec::new()
    });
    let counts = match counts {
        Ok(counts) => counts,
        Err(e) => {
            tracing::warn!(error = %e, "failed to fetch auction counts");
            error.get_or_insert_with(|| listing_error_message(&e));
            AuctionCounts::default()
        }
    };

    let today = chrono::Local::now().date_naive();
    let month = displayed_month(&query, today);
    let current_page = page.min(total_pages);

    let statuses = statuses
        .into_iter()
        .map(|value| StatusOption {
            selected: filters.auction_status.as_deref() == Some(value.as_str()),
            value,
        })
        .collect();

    Ok(AuctionsIndexTemplate {
        user: Some(user),
        error,
        view_calendar: query.wants_calendar(),
        foreclosure_selected: filters.auction_type.as_deref() == Some("FORECLOSURE"),
        statuses,
        auctions,
        current_page,
        total_pages,
        pages: page_links(&filters, current_page, total_pages),
        table_href: listing_href(&filters, &[("view", "table".to_string())]),
        calendar_href: listing_href(&filters, &[("view", "calendar".to_string())]),
        clear_href: "/auctions".to_string(),
        download_href: format!("/auctions/download{}", query_suffix(&filter_pairs(&filters))),
        calendar: calendar_view(&filters, month, &counts, today),
        filters,
    })
}

/// Display every auction on one calendar day.
pub async fn day(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Query(query): Query<DayQuery>,
) -> Result<AuctionDayTemplate> {
    let date: DateKey = query
        .date
        .parse()
        .map_err(|_| AppError::BadRequest(format!("invalid date {:?}", query.date)))?;

    let (auctions, error) = match state.backend().auctions_by_date(date).await {
        Ok(auctions) => {
            let error = auctions
                .is_empty()
                .then(|| "No auctions available for this day.".to_string());
            (auctions, error)
        }
        Err(e) if e.is_unauthorized() => return Err(e.into()),
        Err(e) => {
            tracing::warn!(error = %e, "failed to fetch auctions for day");
            (Vec::new(), Some(listing_error_message(&e)))
        }
    };

    Ok(AuctionDayTemplate {
        user: Some(user),
        date: date.to_string(),
        auctions,
        error,
        back_href: format!(
            "/auctions?view=calendar&cal_year={}&cal_month={}",
            date.year(),
            date.month()
        ),
    })
}

/// Proxy the CSV export with the same filter parameters as the listing.
pub async fn download(
    State(state): State<AppState>,
    RequireAuth(_user): RequireAuth,
    Query(query): Query<AuctionsQuery>,
) -> Result<impl IntoResponse> {
    let filters = query.filters();
    let export = state.backend().download_csv(&filters).await?;

    Ok((
        [
            (
                header::CONTENT_TYPE,
                "text/csv; charset=utf-8".to_string(),
            ),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", export.filename),
            ),
        ],
        export.content,
    ))
}

// =============================================================================
// Helpers
// =============================================================================

/// Re-raise a 401 (the session is already cleared; the error layer turns it
/// into a login redirect) and hand everything else back for inline handling.
fn pass_unauthorized<T>(
    result: std::result::Result<T, BackendError>,
) -> Result<std::result::Result<T, BackendError>> {
    match result {
        Err(e) if e.is_unauthorized() => Err(AppError::Backend(e)),
        other => Ok(other),
    }
}

/// Inline message for a failed listing fetch.
fn listing_error_message(error: &BackendError) -> String {
    if error.is_connectivity() {
        "Network error. Please check your connection.".to_string()
    } else {
        "Something went wrong while fetching auctions".to_string()
    }
}

/// The month the calendar pane shows: explicit query state, else the month
/// containing today.
fn displayed_month(query: &AuctionsQuery, today: NaiveDate) -> MonthRef {
    query
        .cal_year
        .zip(query.cal_month)
        .and_then(|(year, month)| MonthRef::new(year, month))
        .unwrap_or_else(|| MonthRef::containing(today))
}

fn filter_pairs(filters: &AuctionFilters) -> Vec<(&'static str, String)> {
    let mut pairs = Vec::new();
    if let Some(v) = &filters.auction_type {
        pairs.push(("auction_type", v.clone()));
    }
    if let Some(v) = &filters.auction_status {
        pairs.push(("auction_status", v.clone()));
    }
    if let Some(v) = &filters.date_from {
        pairs.push(("date_from", v.clone()));
    }
    if let Some(v) = &filters.date_to {
        pairs.push(("date_to", v.clone()));
    }
    if let Some(v) = &filters.search {
        pairs.push(("search", v.clone()));
    }
    pairs
}

/// Encode pairs as `?a=b&c=d`, or nothing when there are no pairs.
fn query_suffix(pairs: &[(&'static str, String)]) -> String {
    if pairs.is_empty() {
        return String::new();
    }
    let encoded = form_urlencoded::Serializer::new(String::new())
        .extend_pairs(pairs.iter().map(|(k, v)| (*k, v.as_str())))
        .finish();
    format!("?{encoded}")
}

/// A listing link carrying the current filters plus `extra` parameters.
fn listing_href(filters: &AuctionFilters, extra: &[(&'static str, String)]) -> String {
    let mut pairs = filter_pairs(filters);
    pairs.extend(extra.iter().cloned());
    format!("/auctions{}", query_suffix(&pairs))
}

/// Numbered page links, windowed around the current page.
fn page_links(filters: &AuctionFilters, current: u32, total: u32) -> Vec<PageLink> {
    const WINDOW: u32 = 3;

    let first = current.saturating_sub(WINDOW).max(1);
    let last = current.saturating_add(WINDOW).min(total);

    (first..=last)
        .map(|number| PageLink {
            number,
            href: listing_href(
                filters,
                &[
                    ("view", "table".to_string()),
                    ("page", number.to_string()),
                ],
            ),
            current: number == current,
        })
        .collect()
}

/// Render the month grid, resolving each cell's click intent.
fn calendar_view(
    filters: &AuctionFilters,
    month: MonthRef,
    counts: &AuctionCounts,
    today: NaiveDate,
) -> CalendarView {
    let cells = calendar::build_month_grid(month, counts, today)
        .iter()
        .map(|cell| cell_view(filters, month, cell))
        .collect();

    CalendarView {
        title: month.title(),
        prev_href: month_href(filters, month.advance(-1)),
        next_href: month_href(filters, month.advance(1)),
        cells,
    }
}

fn cell_view(filters: &AuctionFilters, month: MonthRef, cell: &CalendarCell) -> CellView {
    let href = match calendar::activate(cell) {
        Activation::Navigate(date) => Some(format!(
            "/auctions/day{}",
            query_suffix(&[("date", date.to_string())])
        )),
        // The empty-day notice reloads the calendar with the message shown.
        Activation::Notice(message) => {
            let mut pairs = filter_pairs(filters);
            pairs.extend([
                ("view", "calendar".to_string()),
                ("cal_year", month.year.to_string()),
                ("cal_month", month.month.to_string()),
                ("error", message.to_string()),
            ]);
            Some(format!("/auctions{}", query_suffix(&pairs)))
        }
        Activation::Ignore => None,
    };

    CellView {
        day: cell.day,
        count: cell.count,
        is_today: cell.is_today,
        is_pad: cell.is_pad,
        href,
        count_label: if cell.count == 1 { "Auction" } else { "Auctions" },
    }
}

fn month_href(filters: &AuctionFilters, month: MonthRef) -> String {
    listing_href(
        filters,
        &[
            ("view", "calendar".to_string()),
            ("cal_year", month.year.to_string()),
            ("cal_month", month.month.to_string()),
        ],
    )
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn filters_with_status(status: &str) -> AuctionFilters {
        AuctionFilters {
            auction_status: Some(status.to_string()),
            ..AuctionFilters::default()
        }
    }

    #[test]
    fn test_query_filters_drop_empty_strings() {
        let query = AuctionsQuery {
            auction_type: Some(String::new()),
            auction_status: Some("Scheduled".to_string()),
            search: Some("  ".to_string()),
            ..AuctionsQuery::default()
        };
        let filters = query.filters();
        assert_eq!(filters.auction_type, None);
        assert_eq!(filters.search, None);
        assert_eq!(filters.auction_status.as_deref(), Some("Scheduled"));
    }

    #[test]
    fn test_listing_href_encodes_filters() {
        let href = listing_href(
            &filters_with_status("Auction Canceled"),
            &[("view", "table".to_string())],
        );
        assert_eq!(href, "/auctions?auction_status=Auction+Canceled&view=table");
    }

    #[test]
    fn test_download_href_matches_listing_filters() {
        let filters = filters_with_status("Canceled");
        let listing = listing_href(&filters, &[]);
        let download = format!("/auctions/download{}", query_suffix(&filter_pairs(&filters)));
        // Same query string on both: the export sees exactly the filters the
        // listing shows.
        assert_eq!(
            listing.trim_start_matches("/auctions"),
            download.trim_start_matches("/auctions/download"),
        );
    }

    #[test]
    fn test_page_links_windowed_and_marked() {
        let links = page_links(&AuctionFilters::default(), 5, 20);
        let numbers: Vec<u32> = links.iter().map(|l| l.number).collect();
        assert_eq!(numbers, vec![2, 3, 4, 5, 6, 7, 8]);
        assert!(links.iter().find(|l| l.number == 5).unwrap().current);
    }

    #[test]
    fn test_page_links_clamped_at_edges() {
        let links = page_links(&AuctionFilters::default(), 1, 2);
        let numbers: Vec<u32> = links.iter().map(|l| l.number).collect();
        assert_eq!(numbers, vec![1, 2]);
    }

    #[test]
    fn test_empty_day_cell_links_carry_notice() {
        let today = NaiveDate::from_ymd_opt(2025, 7, 1).unwrap();
        let month = MonthRef::new(2025, 7).unwrap();
        let view = calendar_view(&AuctionFilters::default(), month, &AuctionCounts::default(), today);

        let day_cell = view.cells.iter().find(|c| c.day == 10).unwrap();
        let href = day_cell.href.as_deref().unwrap();
        assert!(href.contains("error=No+auctions+available"));
        assert!(!href.contains("/auctions/day"));
    }

    #[test]
    fn test_busy_day_cell_links_to_day_detail() {
        let today = NaiveDate::from_ymd_opt(2025, 7, 1).unwrap();
        let month = MonthRef::new(2025, 7).unwrap();
        let counts: AuctionCounts = [("07/10/2025".parse().unwrap(), 4)].into_iter().collect();
        let view = calendar_view(&AuctionFilters::default(), month, &counts, today);

        let day_cell = view.cells.iter().find(|c| c.day == 10).unwrap();
        assert_eq!(
            day_cell.href.as_deref().unwrap(),
            "/auctions/day?date=07%2F10%2F2025"
        );
        assert_eq!(day_cell.count_label, "Auctions");
    }

    #[test]
    fn test_pad_cells_have_no_href() {
        let today = NaiveDate::from_ymd_opt(2025, 7, 1).unwrap();
        let month = MonthRef::new(2025, 7).unwrap();
        let view = calendar_view(&AuctionFilters::default(), month, &AuctionCounts::default(), today);

        assert!(view.cells.iter().filter(|c| c.is_pad).all(|c| c.href.is_none()));
    }
}
