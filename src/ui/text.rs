//! Plain-text rendering used by `pawcal print` and `pawcal list`.

use chrono::{Datelike, NaiveDate};
use std::fmt::Write;

use crate::bins::{cells, events_on, HourBins, DISPLAY_HOURS, MONTH_CELL_LIMIT};
use crate::calendar::{grid, nav::NavState, pad_to_weeks, week_dates, ViewMode};
use crate::model::CalendarEvent;

pub fn render(nav: &NavState, events: &[CalendarEvent]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", nav.title());
    match nav.view {
        ViewMode::Month => month(&mut out, nav.reference, events),
        ViewMode::Week  => hours(&mut out, &week_dates(nav.reference), events),
        ViewMode::Day   => hours(&mut out, &[nav.reference], events),
    }
    out
}

/// Every event grouped under a date heading, in the order given.
pub fn agenda(events: &[CalendarEvent]) -> String {
    let mut out  = String::new();
    let mut last = None;
    for ev in events {
        if last != Some(ev.date) {
            let _ = writeln!(out, "{}", ev.date.format("%a %b %-d, %Y"));
            last = Some(ev.date);
        }
        let _ = writeln!(out, "  {}", line(ev));
    }
    if events.is_empty() {
        out.push_str("No appointments.\n");
    }
    out
}

fn line(ev: &CalendarEvent) -> String {
    format!(
        "{:>8}  {} [{}] {} ({}) · {}",
        ev.time, ev.title, ev.category.label(), ev.subject_name, ev.owner_name, ev.status,
    )
}

fn month(out: &mut String, reference: NaiveDate, events: &[CalendarEvent]) {
    let slots = grid(reference, ViewMode::Month);

    let _ = writeln!(out, " Su  Mo  Tu  We  Th  Fr  Sa");
    for week in pad_to_weeks(&slots) {
        for slot in week {
            match slot {
                Some(d) if !events_on(events, d).is_empty() => { let _ = write!(out, "{:>3}*", d.day()); }
                Some(d) => { let _ = write!(out, "{:>3} ", d.day()); }
                None    => out.push_str("    "),
            }
        }
        out.push('\n');
    }

    for cell in cells(&slots, events) {
        let Some(date) = cell.date else { continue };
        if cell.events.is_empty() { continue; }
        let _ = writeln!(out, "\n{}", date.format("%a %b %-d"));
        let preview = cell.preview(MONTH_CELL_LIMIT);
        for ev in preview.shown {
            let _ = writeln!(out, "  {}", line(ev));
        }
        if let Some(more) = preview.overflow {
            let _ = writeln!(out, "  +{more} more");
        }
    }
}

fn hours(out: &mut String, dates: &[NaiveDate], events: &[CalendarEvent]) {
    let bins = HourBins::build(dates, events);
    for &date in dates {
        let _ = writeln!(out, "\n{}", date.format("%a %b %-d"));
        for hour in DISPLAY_HOURS {
            let bound = bins.get(date, hour);
            if bound.is_empty() { continue; }
            for ev in bound {
                let _ = writeln!(out, "  {hour:02}:00 {}", line(ev));
            }
        }
        let unplaced: Vec<_> = events_on(events, date).into_iter()
            .filter(|ev| !bound_somewhere(&bins, date, ev))
            .collect();
        for ev in unplaced {
            let _ = writeln!(out, "     --  {}", line(ev));
        }
    }
}

fn bound_somewhere(bins: &HourBins<'_>, date: NaiveDate, ev: &CalendarEvent) -> bool {
    DISPLAY_HOURS.any(|h| bins.get(date, h).iter().any(|b| b.id == ev.id))
}
