use chrono::{Duration, Local, Months, NaiveDate};

use super::{week_dates, ViewMode};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction { Prev, Next }

/// Moves `date` one view-sized step. Month steps are calendar-aware: the
/// day is clamped to the target month's length (Jan 31 → Feb 28/29).
pub fn step(date: NaiveDate, view: ViewMode, dir: Direction) -> NaiveDate {
    let moved = match (view, dir) {
        (ViewMode::Month, Direction::Next) => date.checked_add_months(Months::new(1)),
        (ViewMode::Month, Direction::Prev) => date.checked_sub_months(Months::new(1)),
        (ViewMode::Week,  Direction::Next) => date.checked_add_signed(Duration::days(7)),
        (ViewMode::Week,  Direction::Prev) => date.checked_sub_signed(Duration::days(7)),
        (ViewMode::Day,   Direction::Next) => date.succ_opt(),
        (ViewMode::Day,   Direction::Prev) => date.pred_opt(),
    };
    moved.unwrap_or_else(|| {
        tracing::warn!("navigation from {date} left the supported date range");
        date
    })
}

/// Reference date plus view mode: everything needed to rebuild the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NavState {
    pub reference: NaiveDate,
    pub view:      ViewMode,
}

impl NavState {
    pub fn new(reference: NaiveDate, view: ViewMode) -> Self {
        Self { reference, view }
    }

    pub fn next(&mut self) { self.reference = step(self.reference, self.view, Direction::Next); }
    pub fn prev(&mut self) { self.reference = step(self.reference, self.view, Direction::Prev); }

    /// Resets the reference to the local current date; the view is kept.
    pub fn today(&mut self) { self.reference = Local::now().date_naive(); }

    pub fn jump_to(&mut self, date: NaiveDate) { self.reference = date; }

    /// Switching views never moves the reference date.
    pub fn set_view(&mut self, view: ViewMode) { self.view = view; }

    pub fn title(&self) -> String {
        match self.view {
            ViewMode::Month => self.reference.format("%B %Y").to_string(),
            ViewMode::Week  => {
                let days = week_dates(self.reference);
                format!("{} – {}", days[0].format("%b %-d"), days[6].format("%b %-d, %Y"))
            }
            ViewMode::Day   => self.reference.format("%A, %B %-d, %Y").to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn week_next_from_sample_date() {
        let mut nav = NavState::new(date(2024, 12, 19), ViewMode::Week);
        nav.next();
        assert_eq!(nav.reference, date(2024, 12, 26));
    }

    #[test]
    fn day_step_crosses_year() {
        assert_eq!(step(date(2024, 12, 31), ViewMode::Day, Direction::Next), date(2025, 1, 1));
        assert_eq!(step(date(2025, 1, 1), ViewMode::Day, Direction::Prev), date(2024, 12, 31));
    }

    #[test]
    fn month_step_clamps_day() {
        assert_eq!(step(date(2024, 1, 31), ViewMode::Month, Direction::Next), date(2024, 2, 29));
        assert_eq!(step(date(2025, 1, 31), ViewMode::Month, Direction::Next), date(2025, 2, 28));
        assert_eq!(step(date(2024, 3, 31), ViewMode::Month, Direction::Prev), date(2024, 2, 29));
        assert_eq!(step(date(2024, 12, 15), ViewMode::Month, Direction::Next), date(2025, 1, 15));
    }

    #[test]
    fn next_then_prev_round_trips() {
        let starts = [date(2024, 12, 19), date(2024, 12, 31), date(2025, 1, 1), date(2024, 2, 28)];
        for view in [ViewMode::Month, ViewMode::Week, ViewMode::Day] {
            for start in starts {
                let mut nav = NavState::new(start, view);
                nav.next();
                nav.prev();
                assert_eq!(nav.reference, start, "{view} from {start}");
            }
        }
    }

    #[test]
    fn set_view_keeps_reference() {
        let mut nav = NavState::new(date(2024, 12, 19), ViewMode::Month);
        nav.set_view(ViewMode::Day);
        assert_eq!(nav.reference, date(2024, 12, 19));
        assert_eq!(nav.view, ViewMode::Day);
    }

    #[test]
    fn today_ignores_view() {
        let mut nav = NavState::new(date(1999, 1, 1), ViewMode::Week);
        nav.today();
        assert_eq!(nav.reference, Local::now().date_naive());
        assert_eq!(nav.view, ViewMode::Week);
    }

    #[test]
    fn titles() {
        let mut nav = NavState::new(date(2024, 12, 19), ViewMode::Month);
        assert_eq!(nav.title(), "December 2024");
        nav.set_view(ViewMode::Week);
        assert_eq!(nav.title(), "Dec 16 – Dec 22, 2024");
        nav.set_view(ViewMode::Day);
        assert_eq!(nav.title(), "Thursday, December 19, 2024");
    }
}
