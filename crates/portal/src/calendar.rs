//! Calendar aggregation view-model.
//!
//! Turns a displayed month plus the backend's sparse per-day count mapping
//! into the fixed grid the calendar view renders: leading pad cells so day 1
//! lands under its weekday column, then one cell per day annotated with its
//! auction count and a today marker.
//!
//! The grid is rebuilt from scratch on every month change or data refresh.
//! At 42 cells worst case there is nothing to win by patching it
//! incrementally, and derived state can never go stale.

use chrono::{Datelike, Days, Months, NaiveDate};

use gavelpoint_core::DateKey;

use crate::backend::types::AuctionCounts;

/// A displayed month: year plus 1-based month number.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonthRef {
    pub year: i32,
    /// 1 = January ... 12 = December.
    pub month: u32,
}

impl MonthRef {
    /// Construct a month reference.
    ///
    /// Returns `None` if `month` is outside 1-12.
    #[must_use]
    pub const fn new(year: i32, month: u32) -> Option<Self> {
        if matches!(month, 1..=12) {
            Some(Self { year, month })
        } else {
            None
        }
    }

    /// The month containing `date`.
    #[must_use]
    pub fn containing(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    /// First day of this month.
    #[must_use]
    pub fn first_day(self) -> NaiveDate {
        // Month is range-checked at construction; a year outside chrono's
        // representable range is not reachable from the UI.
        NaiveDate::from_ymd_opt(self.year, self.month, 1).unwrap_or(NaiveDate::MIN)
    }

    /// Shift by `delta` whole months, rolling over year boundaries in either
    /// direction (January - 1 = December of the previous year, December + 1
    /// = January of the next).
    #[must_use]
    pub fn advance(self, delta: i32) -> Self {
        let first = self.first_day();
        let shifted = if delta >= 0 {
            first
                .checked_add_months(Months::new(delta.unsigned_abs()))
                .unwrap_or(first)
        } else {
            first
                .checked_sub_months(Months::new(delta.unsigned_abs()))
                .unwrap_or(first)
        };
        Self::containing(shifted)
    }

    /// Header title, e.g. `February 2024`.
    #[must_use]
    pub fn title(self) -> String {
        self.first_day().format("%B %Y").to_string()
    }
}

/// Number of days in the month: one past the end (day 1 of the next month)
/// minus one day.
#[must_use]
pub fn days_in_month(month: MonthRef) -> u32 {
    let first = month.first_day();
    let last = first
        .checked_add_months(Months::new(1))
        .and_then(|next_first| next_first.checked_sub_days(Days::new(1)))
        .unwrap_or(first);
    last.day()
}

/// Weekday column of day 1, Sunday-first: 0 = Sunday ... 6 = Saturday.
///
/// The grid is left-padded with this many empty cells.
#[must_use]
pub fn first_weekday_offset(month: MonthRef) -> u32 {
    month.first_day().weekday().num_days_from_sunday()
}

/// One cell of the month grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalendarCell {
    /// Day of month, 1-based; 0 for pad cells.
    pub day: u32,
    /// The cell's calendar date; the month's first day for pad cells.
    pub date: NaiveDate,
    /// Auctions on this day under the current filters.
    pub count: u64,
    /// Whether this cell is the render-time current date.
    pub is_today: bool,
    /// Leading blank cell before day 1.
    pub is_pad: bool,
}

impl CalendarCell {
    /// The backend key for this cell's date.
    #[must_use]
    pub fn date_key(&self) -> DateKey {
        DateKey::new(self.date)
    }
}

/// What activating (clicking) a cell should do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Activation {
    /// Open the day detail for this date.
    Navigate(DateKey),
    /// Tell the operator there is nothing on this day.
    Notice(&'static str),
    /// Pad cells never react.
    Ignore,
}

/// Resolve a cell's click intent: days with auctions navigate, empty days
/// notify, pads do nothing.
#[must_use]
pub fn activate(cell: &CalendarCell) -> Activation {
    if cell.is_pad {
        Activation::Ignore
    } else if cell.count > 0 {
        Activation::Navigate(cell.date_key())
    } else {
        Activation::Notice("No auctions available for this day!")
    }
}

/// Build the ordered grid for `month`: `first_weekday_offset` pad cells, then
/// one cell per day 1..=`days_in_month`, each carrying its count from the
/// sparse mapping (absent date = 0) and a today marker computed against the
/// passed render-time date.
#[must_use]
pub fn build_month_grid(
    month: MonthRef,
    counts: &AuctionCounts,
    today: NaiveDate,
) -> Vec<CalendarCell> {
    let offset = first_weekday_offset(month);
    let days = days_in_month(month);
    let first = month.first_day();

    let mut cells = Vec::with_capacity((offset + days) as usize);

    for _ in 0..offset {
        cells.push(CalendarCell {
            day: 0,
            date: first,
            count: 0,
            is_today: false,
            is_pad: true,
        });
    }

    for day in 1..=days {
        let date = first
            .checked_add_days(Days::new(u64::from(day - 1)))
            .unwrap_or(first);
        cells.push(CalendarCell {
            day,
            date,
            count: counts.get(DateKey::new(date)),
            is_today: date == today,
            is_pad: false,
        });
    }

    cells
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn month(year: i32, month_no: u32) -> MonthRef {
        MonthRef::new(year, month_no).unwrap()
    }

    fn key(s: &str) -> DateKey {
        s.parse().unwrap()
    }

    #[test]
    fn test_days_in_month_handles_leap_years() {
        assert_eq!(days_in_month(month(2024, 2)), 29);
        assert_eq!(days_in_month(month(2023, 2)), 28);
        assert_eq!(days_in_month(month(2025, 4)), 30);
        assert_eq!(days_in_month(month(2025, 12)), 31);
    }

    #[test]
    fn test_advance_rolls_over_year_boundaries() {
        assert_eq!(month(2024, 1).advance(-1), month(2023, 12));
        assert_eq!(month(2023, 12).advance(1), month(2024, 1));
        assert_eq!(month(2024, 6).advance(-18), month(2022, 12));
        assert_eq!(month(2024, 6).advance(0), month(2024, 6));
    }

    #[test]
    fn test_first_weekday_offset() {
        // 2025-07-01 was a Tuesday.
        assert_eq!(first_weekday_offset(month(2025, 7)), 2);
        // 2023-01-01 was a Sunday.
        assert_eq!(first_weekday_offset(month(2023, 1)), 0);
    }

    #[test]
    fn test_grid_shape_for_all_months_of_several_years() {
        let counts = AuctionCounts::default();
        let today = NaiveDate::from_ymd_opt(2024, 6, 15).unwrap();
        for year in [2023, 2024, 2025] {
            for m in 1..=12 {
                let mref = month(year, m);
                let grid = build_month_grid(mref, &counts, today);
                let offset = first_weekday_offset(mref) as usize;
                let days = days_in_month(mref) as usize;

                assert_eq!(grid.len(), offset + days, "{year}-{m}");
                assert!(grid.iter().take(offset).all(|c| c.is_pad), "{year}-{m}");
                assert_eq!(
                    grid.iter().filter(|c| !c.is_pad).count(),
                    days,
                    "{year}-{m}"
                );
            }
        }
    }

    #[test]
    fn test_grid_days_are_sequential_and_dated() {
        let counts = AuctionCounts::default();
        let today = NaiveDate::from_ymd_opt(2025, 7, 1).unwrap();
        let grid = build_month_grid(month(2025, 7), &counts, today);

        let days: Vec<u32> = grid.iter().filter(|c| !c.is_pad).map(|c| c.day).collect();
        assert_eq!(days, (1..=31).collect::<Vec<_>>());
        let fourth = grid.iter().find(|c| c.day == 4).unwrap();
        assert_eq!(fourth.date, NaiveDate::from_ymd_opt(2025, 7, 4).unwrap());
    }

    #[test]
    fn test_grid_counts_come_from_sparse_mapping() {
        let counts: AuctionCounts =
            [(key("07/15/2025"), 3), (key("07/20/2025"), 1)].into_iter().collect();
        let today = NaiveDate::from_ymd_opt(2025, 7, 15).unwrap();
        let grid = build_month_grid(month(2025, 7), &counts, today);

        let cell = |day: u32| grid.iter().find(|c| c.day == day).unwrap().clone();
        assert_eq!(cell(15).count, 3);
        assert_eq!(cell(20).count, 1);
        assert_eq!(cell(16).count, 0);
    }

    #[test]
    fn test_is_today_requires_exact_date_match() {
        let counts = AuctionCounts::default();
        let today = NaiveDate::from_ymd_opt(2025, 7, 15).unwrap();

        let this_month = build_month_grid(month(2025, 7), &counts, today);
        assert!(this_month.iter().find(|c| c.day == 15).unwrap().is_today);
        assert!(!this_month.iter().find(|c| c.day == 14).unwrap().is_today);

        // Same day number in a different month is not today.
        let other_month = build_month_grid(month(2025, 8), &counts, today);
        assert!(other_month.iter().all(|c| !c.is_today));
    }

    #[test]
    fn test_activate_navigates_only_with_auctions() {
        let counts: AuctionCounts = [(key("07/15/2025"), 2)].into_iter().collect();
        let today = NaiveDate::from_ymd_opt(2025, 7, 1).unwrap();
        let grid = build_month_grid(month(2025, 7), &counts, today);

        let busy = grid.iter().find(|c| c.day == 15).unwrap();
        assert_eq!(activate(busy), Activation::Navigate(key("07/15/2025")));

        for cell in grid.iter().filter(|c| !c.is_pad && c.day != 15) {
            assert!(
                matches!(activate(cell), Activation::Notice(_)),
                "day {} must not navigate",
                cell.day
            );
        }
    }

    #[test]
    fn test_activate_ignores_pad_cells() {
        let counts = AuctionCounts::default();
        let today = NaiveDate::from_ymd_opt(2025, 7, 1).unwrap();
        let grid = build_month_grid(month(2025, 7), &counts, today);

        for pad in grid.iter().filter(|c| c.is_pad) {
            assert_eq!(activate(pad), Activation::Ignore);
        }
    }
}
