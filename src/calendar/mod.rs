//! Date-grid generation for the month, week and day views.
//!
//! All functions are pure: they take a reference date and return the dates
//! the view displays. No timezone conversion happens here; every date is a
//! local calendar date.

pub mod nav;

use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::model::ParseError;

// ─── View mode ────────────────────────────────────────────────────────────────

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    #[default]
    Month,
    Week,
    Day,
}

impl ViewMode {
    pub fn as_str(self) -> &'static str {
        match self {
            ViewMode::Month => "month",
            ViewMode::Week  => "week",
            ViewMode::Day   => "day",
        }
    }
}

impl FromStr for ViewMode {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "month" => Ok(ViewMode::Month),
            "week"  => Ok(ViewMode::Week),
            "day"   => Ok(ViewMode::Day),
            _       => Err(ParseError::View(s.to_owned())),
        }
    }
}

impl fmt::Display for ViewMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ─── Month arithmetic ─────────────────────────────────────────────────────────

/// Number of days in `month` of `year`, read back from the day before the
/// first of the following month. Returns 0 for a month outside 1..=12.
pub fn days_in_month(year: i32, month: u32) -> u32 {
    if !(1..=12).contains(&month) { return 0; }
    let (next_y, next_m) = if month == 12 { (year + 1, 1) } else { (year, month + 1) };
    NaiveDate::from_ymd_opt(next_y, next_m, 1)
        .and_then(|next| next.pred_opt())
        .map(|last| last.day())
        .unwrap_or(0)
}

pub fn first_of_month(date: NaiveDate) -> NaiveDate {
    date - Duration::days(date.day0() as i64)
}

pub fn last_of_month(date: NaiveDate) -> NaiveDate {
    let len = days_in_month(date.year(), date.month());
    first_of_month(date) + Duration::days(len as i64 - 1)
}

// ─── Grids ────────────────────────────────────────────────────────────────────

/// Month view slots: one `None` per weekday before the 1st (Sunday = 0),
/// then one `Some(date)` for every day of the month. The tail is left
/// unpadded; see [`pad_to_weeks`].
pub fn month_slots(reference: NaiveDate) -> Vec<Option<NaiveDate>> {
    let first   = first_of_month(reference);
    let leading = first.weekday().num_days_from_sunday() as usize;
    let len     = days_in_month(first.year(), first.month()) as usize;

    let mut slots = Vec::with_capacity(leading + len);
    slots.extend(std::iter::repeat(None).take(leading));
    slots.extend(first.iter_days().take(len).map(Some));
    slots
}

/// Splits slots into rows of 7, padding the last row with `None`.
pub fn pad_to_weeks(slots: &[Option<NaiveDate>]) -> Vec<Vec<Option<NaiveDate>>> {
    slots.chunks(7).map(|chunk| {
        let mut week = chunk.to_vec();
        week.resize(7, None);
        week
    }).collect()
}

/// Monday of the week containing `reference`. Weeks run Monday → Sunday,
/// so a Sunday belongs to the week that started six days earlier.
pub fn week_start(reference: NaiveDate) -> NaiveDate {
    reference - Duration::days(reference.weekday().num_days_from_monday() as i64)
}

pub fn week_dates(reference: NaiveDate) -> [NaiveDate; 7] {
    let start = week_start(reference);
    std::array::from_fn(|i| start + Duration::days(i as i64))
}

/// Ordered slots displayed for `view` around `reference`.
pub fn grid(reference: NaiveDate, view: ViewMode) -> Vec<Option<NaiveDate>> {
    match view {
        ViewMode::Month => month_slots(reference),
        ViewMode::Week  => week_dates(reference).into_iter().map(Some).collect(),
        ViewMode::Day   => vec![Some(reference)],
    }
}

/// First and last concrete date shown by `view` (both inclusive).
pub fn visible_range(reference: NaiveDate, view: ViewMode) -> (NaiveDate, NaiveDate) {
    match view {
        ViewMode::Month => (first_of_month(reference), last_of_month(reference)),
        ViewMode::Week  => {
            let start = week_start(reference);
            (start, start + Duration::days(6))
        }
        ViewMode::Day   => (reference, reference),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Weekday;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn days_in_month_follows_gregorian_rules() {
        assert_eq!(days_in_month(2024, 2), 29);
        assert_eq!(days_in_month(2023, 2), 28);
        assert_eq!(days_in_month(1900, 2), 28);
        assert_eq!(days_in_month(2000, 2), 29);
        assert_eq!(days_in_month(2024, 4), 30);
        assert_eq!(days_in_month(2024, 12), 31);
        assert_eq!(days_in_month(2024, 13), 0);
    }

    #[test]
    fn month_slots_pad_to_first_weekday() {
        for m in 1..=12 {
            let reference = date(2025, m, 10);
            let slots     = month_slots(reference);
            let first     = date(2025, m, 1);
            let leading   = slots.iter().take_while(|s| s.is_none()).count();

            assert_eq!(leading, first.weekday().num_days_from_sunday() as usize);
            assert_eq!(slots.len() - leading, days_in_month(2025, m) as usize);
            assert!(slots[leading..].iter().all(Option::is_some));
        }
    }

    #[test]
    fn december_2024_grid() {
        // 2024-12-01 is a Sunday: no padding.
        let slots = grid(date(2024, 12, 19), ViewMode::Month);
        assert_eq!(slots.len(), 31);
        assert_eq!(slots[0], Some(date(2024, 12, 1)));
        assert_eq!(slots[18], Some(date(2024, 12, 19)));
    }

    #[test]
    fn february_2025_has_six_padding_slots() {
        let slots = month_slots(date(2025, 2, 14));
        assert_eq!(slots.len(), 6 + 28);
        assert_eq!(slots[6], Some(date(2025, 2, 1)));
        assert_eq!(slots.last().copied().flatten(), Some(date(2025, 2, 28)));
    }

    #[test]
    fn pad_to_weeks_completes_last_row() {
        let weeks = pad_to_weeks(&month_slots(date(2025, 2, 1)));
        assert_eq!(weeks.len(), 5);
        assert!(weeks.iter().all(|w| w.len() == 7));
        assert_eq!(weeks[4][6], None);
    }

    #[test]
    fn week_starts_on_monday() {
        assert_eq!(week_start(date(2024, 12, 19)), date(2024, 12, 16));
        assert_eq!(week_start(date(2024, 12, 16)), date(2024, 12, 16));
        assert_eq!(week_start(date(2024, 12, 22)), date(2024, 12, 16));
    }

    #[test]
    fn week_grid_is_seven_consecutive_days() {
        let mut d = date(2024, 12, 28);
        for _ in 0..14 {
            let days = grid(d, ViewMode::Week);
            assert_eq!(days.len(), 7);
            assert_eq!(days[0].map(|x| x.weekday()), Some(Weekday::Mon));
            for pair in days.windows(2) {
                assert_eq!(pair[0].unwrap().succ_opt(), pair[1]);
            }
            assert!(days.contains(&Some(d)));
            d = d.succ_opt().unwrap();
        }
    }

    #[test]
    fn day_grid_is_the_reference() {
        assert_eq!(grid(date(2024, 2, 29), ViewMode::Day), vec![Some(date(2024, 2, 29))]);
    }

    #[test]
    fn visible_range_per_view() {
        let r = date(2024, 12, 19);
        assert_eq!(visible_range(r, ViewMode::Month), (date(2024, 12, 1), date(2024, 12, 31)));
        assert_eq!(visible_range(r, ViewMode::Week),  (date(2024, 12, 16), date(2024, 12, 22)));
        assert_eq!(visible_range(r, ViewMode::Day),   (r, r));
    }

    #[test]
    fn view_mode_parses() {
        assert_eq!("Week".parse::<ViewMode>(), Ok(ViewMode::Week));
        assert_eq!("year".parse::<ViewMode>(), Err(ParseError::View("year".into())));
    }
}
