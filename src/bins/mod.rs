//! Binning of the flat event list onto calendar cells.
//!
//! Date binning is exact calendar-date equality. Hour binning uses the
//! leading integer of the event's display time and ignores AM/PM, so
//! "2:30 PM" lands in bucket 2 (outside the displayed range), not 14.

use chrono::NaiveDate;
use std::collections::HashMap;
use std::ops::RangeInclusive;

use crate::model::CalendarEvent;

/// Rows of the week/day hour grid.
pub const DISPLAY_HOURS: RangeInclusive<u32> = 8..=19;

/// Events rendered inside a single month-view cell before "+N more".
pub const MONTH_CELL_LIMIT: usize = 4;

/// Leading hour number of a display time: "10:00 AM" → 10, "9" → 9.
/// `None` when there is no leading digit or the number is not a valid hour.
pub fn parse_hour(time: &str) -> Option<u32> {
    let t      = time.trim_start();
    let digits = t.find(|c: char| !c.is_ascii_digit()).unwrap_or(t.len());
    t[..digits].parse::<u32>().ok().filter(|h| *h <= 23)
}

/// True when `ev` lands in one of the [`DISPLAY_HOURS`] rows.
pub fn has_display_hour(ev: &CalendarEvent) -> bool {
    ev.hour().is_some_and(|h| DISPLAY_HOURS.contains(&h))
}

/// Events dated `date`, in input order.
pub fn events_on(events: &[CalendarEvent], date: NaiveDate) -> Vec<&CalendarEvent> {
    events.iter().filter(|e| e.date == date).collect()
}

// ─── Cells ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct CalendarCell<'a> {
    /// `None` for a padding slot.
    pub date:   Option<NaiveDate>,
    pub events: Vec<&'a CalendarEvent>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CellPreview<'c, 'a> {
    pub shown:    &'c [&'a CalendarEvent],
    pub overflow: Option<usize>,
}

impl<'a> CalendarCell<'a> {
    #[cfg(test)]
    pub fn is_padding(&self) -> bool { self.date.is_none() }

    /// First `limit` events plus the count of the ones left out.
    pub fn preview(&self, limit: usize) -> CellPreview<'_, 'a> {
        let n = self.events.len();
        CellPreview {
            shown:    &self.events[..n.min(limit)],
            overflow: (n > limit).then(|| n - limit),
        }
    }
}

/// One cell per slot, each holding the events of its date.
pub fn cells<'a>(slots: &[Option<NaiveDate>], events: &'a [CalendarEvent]) -> Vec<CalendarCell<'a>> {
    slots.iter().map(|slot| CalendarCell {
        date:   *slot,
        events: slot.map(|d| events_on(events, d)).unwrap_or_default(),
    }).collect()
}

// ─── Hour bins ────────────────────────────────────────────────────────────────

/// `(date, hour)` → events, for the week and day grids.
#[derive(Debug, Default)]
pub struct HourBins<'a> {
    bins: HashMap<(NaiveDate, u32), Vec<&'a CalendarEvent>>,
}

impl<'a> HourBins<'a> {
    /// Bins `events` for every date in `dates` over [`DISPLAY_HOURS`].
    /// Events without a parseable hour, or with an hour outside the range,
    /// end up in no bucket.
    pub fn build(dates: &[NaiveDate], events: &'a [CalendarEvent]) -> Self {
        let mut bins: HashMap<(NaiveDate, u32), Vec<&'a CalendarEvent>> = HashMap::new();
        for &date in dates {
            for hour in DISPLAY_HOURS {
                bins.insert((date, hour), Vec::new());
            }
        }

        for ev in events {
            let Some(hour) = ev.hour() else { continue };
            if let Some(bucket) = bins.get_mut(&(ev.date, hour)) {
                bucket.push(ev);
            }
        }

        Self { bins }
    }

    pub fn get(&self, date: NaiveDate, hour: u32) -> &[&'a CalendarEvent] {
        self.bins.get(&(date, hour)).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Total number of events placed in any bucket.
    #[cfg(test)]
    pub fn bound(&self) -> usize {
        self.bins.values().map(Vec::len).sum()
    }
}
