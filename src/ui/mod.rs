pub mod text;

use chrono::{Datelike, Local, NaiveDate};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{block::Title, Block, Borders, Cell, Clear, List, ListItem, ListState, Paragraph, Row, Table, Wrap},
    Frame,
};

use crate::app::{App, Panel};
use crate::bins::{self, HourBins, DISPLAY_HOURS, MONTH_CELL_LIMIT};
use crate::calendar::{grid, pad_to_weeks, week_dates, ViewMode};
use crate::model::CalendarEvent;
use crate::theme::{hex_to_color, ThemeConfig};

const WEEKDAYS_SUN_FIRST: [&str; 7] = ["Su", "Mo", "Tu", "We", "Th", "Fr", "Sa"];

// ─── Root draw ────────────────────────────────────────────────────────────────

pub fn draw(f: &mut Frame, app: &App) {
    let area = f.area();

    f.render_widget(
        Block::default().style(Style::default().bg(app.theme.bg()).fg(app.theme.fg())),
        area,
    );

    // Layout: [ header(1) | content | status_bar(1) ]
    let root = Layout::default().direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Min(0), Constraint::Length(1)])
        .split(area);

    draw_header(f, app, root[0]);
    match app.nav.view {
        ViewMode::Month => draw_month(f, app, root[1]),
        ViewMode::Week  => draw_week(f, app, root[1]),
        ViewMode::Day   => draw_day(f, app, root[1]),
    }
    draw_statusbar(f, app, root[2]);

    match app.active_panel {
        Panel::EventDetail => {
            if let Some(ev) = &app.selected { draw_detail(f, area, app, ev); }
        }
        Panel::Help     => draw_help(f, area, app),
        Panel::Calendar => {}
    }
}

// ─── Header ───────────────────────────────────────────────────────────────────

fn draw_header(f: &mut Frame, app: &App, area: Rect) {
    let t = &app.theme;
    let mut spans = vec![Span::styled(
        format!(" {} ", app.nav.title()),
        Style::default().fg(t.accent()).add_modifier(Modifier::BOLD),
    )];
    for view in [ViewMode::Month, ViewMode::Week, ViewMode::Day] {
        let style = if view == app.nav.view {
            let (bg, fg) = t.selected_highlight();
            Style::default().bg(bg).fg(fg).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(t.fg_dim())
        };
        spans.push(Span::raw(" "));
        spans.push(Span::styled(format!(" {} ", view.as_str()), style));
    }
    f.render_widget(Paragraph::new(Line::from(spans)).style(Style::default().bg(t.bg2())), area);
}

// ─── Month ────────────────────────────────────────────────────────────────────

fn draw_month(f: &mut Frame, app: &App, area: Rect) {
    let t     = &app.theme;
    let weeks = pad_to_weeks(&grid(app.nav.reference, ViewMode::Month));
    let today = Local::now().date_naive();

    let mut row_constraints = vec![Constraint::Length(1)];
    row_constraints.extend(std::iter::repeat(Constraint::Ratio(1, weeks.len() as u32)).take(weeks.len()));
    let rows = Layout::default().direction(Direction::Vertical)
        .constraints(row_constraints).split(area);

    let header_cols = seven_columns(rows[0]);
    for (i, name) in WEEKDAYS_SUN_FIRST.iter().enumerate() {
        let style = if i == 0 || i == 6 { t.weekend_color() } else { t.fg_dim() };
        f.render_widget(
            Paragraph::new(Span::styled(format!(" {name}"), Style::default().fg(style).add_modifier(Modifier::BOLD))),
            header_cols[i],
        );
    }

    for (w, week) in weeks.iter().enumerate() {
        let cols  = seven_columns(rows[w + 1]);
        let cells = bins::cells(week, &app.events);
        for (c, cell) in cells.iter().enumerate() {
            let Some(date) = cell.date else {
                f.render_widget(Block::default().borders(Borders::ALL)
                    .border_type(t.border_type())
                    .border_style(Style::default().fg(t.bg2())), cols[c]);
                continue;
            };

            let title_style = day_style(t, date, app.nav.reference, today, c == 0 || c == 6);
            let block = Block::default()
                .title(Title::from(Span::styled(format!("{:>2}", date.day()), title_style)))
                .borders(Borders::ALL)
                .border_type(t.border_type())
                .border_style(Style::default().fg(
                    if date == app.nav.reference { t.border_active() } else { t.border() }
                ));

            // Cursor index into this cell's events; only the reference date has one.
            let cursor  = (date == app.nav.reference).then_some(app.event_cursor);
            let preview = cell.preview(MONTH_CELL_LIMIT);
            let mut lines: Vec<Line> = preview.shown.iter().enumerate().map(|(i, ev)| {
                let chip = event_chip(ev);
                if cursor == Some(i) { highlighted(t, chip) } else { chip }
            }).collect();
            if let Some(more) = preview.overflow {
                let mut line = Line::from(Span::styled(
                    format!("+{more} more"),
                    Style::default().fg(t.overflow()).add_modifier(Modifier::ITALIC),
                ));
                // Cursor past the cap: light the overflow line and name the event.
                let hidden = cursor.filter(|&i| i >= preview.shown.len()).and_then(|i| cell.events.get(i));
                if let Some(ev) = hidden {
                    line.spans.push(Span::raw(format!(" {}", ev.title)));
                    line = highlighted(t, line);
                }
                lines.push(line);
            }
            f.render_widget(Paragraph::new(lines).block(block), cols[c]);
        }
    }
}

fn seven_columns(area: Rect) -> std::rc::Rc<[Rect]> {
    Layout::default().direction(Direction::Horizontal)
        .constraints([Constraint::Ratio(1, 7); 7]).split(area)
}

fn day_style(t: &ThemeConfig, date: NaiveDate, reference: NaiveDate, today: NaiveDate, weekend: bool) -> Style {
    if date == reference {
        let (bg, fg) = t.selected_highlight();
        Style::default().bg(bg).fg(fg).add_modifier(Modifier::BOLD)
    } else if date == today {
        let (bg, fg) = t.today_highlight();
        Style::default().bg(bg).fg(fg).add_modifier(Modifier::BOLD)
    } else if weekend {
        Style::default().fg(t.weekend_color())
    } else {
        Style::default().fg(t.fg())
    }
}

fn event_chip(ev: &CalendarEvent) -> Line<'static> {
    let mut style = Style::default().fg(hex_to_color(ev.category.color()));
    if ev.status == crate::model::Status::Cancelled {
        style = style.add_modifier(Modifier::CROSSED_OUT);
    }
    Line::from(vec![
        Span::styled("● ", Style::default().fg(hex_to_color(ev.status.color()))),
        Span::styled(ev.title.clone(), style),
    ])
}

/// `line` restyled with the selection colors.
fn highlighted(t: &ThemeConfig, mut line: Line<'static>) -> Line<'static> {
    let (bg, fg) = t.selected_highlight();
    let sel = Style::default().bg(bg).fg(fg).add_modifier(Modifier::BOLD);
    for span in &mut line.spans {
        span.style = span.style.patch(sel);
    }
    line
}

// ─── Week / day hour grids ────────────────────────────────────────────────────

fn hour_table(app: &App, dates: &[NaiveDate], bins: &HourBins<'_>, title: String) -> Table<'static> {
    let t      = &app.theme;
    let today  = Local::now().date_naive();
    let cursor = app.cursor_event().map(|e| e.id.as_str());

    let mut header = vec![Cell::from("")];
    header.extend(dates.iter().map(|d| {
        let weekend = d.weekday().number_from_monday() >= 6;
        Cell::from(Span::styled(
            d.format("%a %-d").to_string(),
            day_style(t, *d, app.nav.reference, today, weekend),
        ))
    }));

    let rows: Vec<Row> = DISPLAY_HOURS.map(|hour| {
        let mut cells = vec![Cell::from(Span::styled(
            format!("{hour:02}:00"),
            Style::default().fg(t.fg_dim()),
        ))];
        cells.extend(dates.iter().map(|d| {
            let evs = bins.get(*d, hour);
            // The cursor event wins the slot when it shares an hour with others.
            let under_cursor = evs.iter()
                .find(|e| *d == app.nav.reference && Some(e.id.as_str()) == cursor);
            let Some(first) = under_cursor.or(evs.first()) else { return Cell::from("") };
            let mut line = event_chip(first);
            if under_cursor.is_some() {
                line = highlighted(t, line);
            }
            if evs.len() > 1 {
                line.spans.push(Span::styled(
                    format!(" +{}", evs.len() - 1),
                    Style::default().fg(t.overflow()),
                ));
            }
            Cell::from(line)
        }));
        Row::new(cells)
    }).collect();

    let mut widths = vec![Constraint::Length(6)];
    widths.extend(std::iter::repeat(Constraint::Ratio(1, dates.len() as u32)).take(dates.len()));

    Table::new(rows, widths)
        .header(Row::new(header).style(Style::default().add_modifier(Modifier::BOLD)))
        .block(Block::default()
            .title(Title::from(Span::styled(title, Style::default().fg(t.accent()))))
            .borders(Borders::ALL)
            .border_type(t.border_type())
            .border_style(Style::default().fg(t.border())))
}

fn draw_week(f: &mut Frame, app: &App, area: Rect) {
    let dates = week_dates(app.nav.reference);
    let bins  = HourBins::build(&dates, &app.events);
    f.render_widget(hour_table(app, &dates, &bins, " Week ".into()), area);
}

fn draw_day(f: &mut Frame, app: &App, area: Rect) {
    let t     = &app.theme;
    let cols  = Layout::default().direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)]).split(area);

    let dates = [app.nav.reference];
    let bins  = HourBins::build(&dates, &app.events);
    f.render_widget(hour_table(app, &dates, &bins, " Schedule ".into()), cols[0]);

    // Every event of the day, including those the hour grid cannot place.
    let block = Block::default()
        .title(Title::from(Span::styled(" ● Appointments ", Style::default().fg(t.accent()))))
        .borders(Borders::ALL)
        .border_type(t.border_type())
        .border_style(Style::default().fg(t.border_active()));

    let day = app.day_events();
    if day.is_empty() {
        f.render_widget(
            Paragraph::new("  No appointments").block(block).style(Style::default().fg(t.fg_dim())),
            cols[1],
        );
        return;
    }

    let items: Vec<ListItem> = day.iter().map(|ev| {
        let mut line = event_chip(ev);
        line.spans.insert(0, Span::styled(format!("{:>8} ", ev.time), Style::default().fg(t.fg_dim())));
        ListItem::new(line)
    }).collect();

    let (bg, fg) = t.selected_highlight();
    let mut state = ListState::default();
    state.select(Some(app.event_cursor));
    f.render_stateful_widget(
        List::new(items).block(block)
            .highlight_style(Style::default().bg(bg).fg(fg))
            .highlight_symbol("▶ "),
        cols[1],
        &mut state,
    );
}

// ─── Status bar ───────────────────────────────────────────────────────────────

fn draw_statusbar(f: &mut Frame, app: &App, area: Rect) {
    let t = &app.theme;
    let bar = Paragraph::new(Line::from(vec![
        Span::styled(
            format!(" {} ", app.nav.view.as_str().to_uppercase()),
            Style::default().bg(t.accent()).fg(t.bg()).add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            "  [/]:prev/next  h/l:day  m/w/d:view  t:today  j/k:event  Enter:open  ?:help  q:quit",
            Style::default().fg(t.fg_dim()),
        ),
        Span::styled(
            format!("  {}", app.status),
            Style::default().fg(t.fg_dim()).add_modifier(Modifier::ITALIC),
        ),
    ])).style(Style::default().bg(t.bg2()));
    f.render_widget(bar, area);
}

// ─── Event detail popup ───────────────────────────────────────────────────────

fn draw_detail(f: &mut Frame, area: Rect, app: &App, ev: &CalendarEvent) {
    let t    = &app.theme;
    let rect = centered(50, 50, area);
    f.render_widget(Clear, rect);

    let block = Block::default()
        .title(Title::from(Line::from(Span::styled(
            format!(" {} ", ev.title),
            Style::default().fg(t.accent()).add_modifier(Modifier::BOLD),
        ))))
        .borders(Borders::ALL)
        .border_type(t.border_type())
        .border_style(Style::default().fg(t.border_active()))
        .style(Style::default().bg(t.popup_bg()));

    let dim = Style::default().fg(t.fg_dim());
    let fg  = Style::default().fg(t.fg());
    let row = |label: &'static str, value: Span<'static>| {
        Line::from(vec![Span::styled(format!("  {label:<9}"), dim), value])
    };

    let mut lines = vec![
        Line::from(""),
        row("When", Span::styled(format!("{} · {}", ev.date.format("%a %b %-d, %Y"), ev.time), fg)),
        row("Service", Span::styled(
            ev.category.label(),
            Style::default().fg(hex_to_color(ev.category.color())).add_modifier(Modifier::BOLD),
        )),
        row("Patient", Span::styled(format!("{} {}", ev.subject_kind.icon(), ev.subject_name), fg)),
        row("Owner", Span::styled(ev.owner_name.clone(), fg)),
        row("Status", Span::styled(ev.status.label(), Style::default().fg(hex_to_color(ev.status.color())))),
    ];
    if let Some(notes) = &ev.notes {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(format!("  {notes}"), fg)));
    }
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled("  Esc: close", dim)));

    f.render_widget(
        Paragraph::new(lines).block(block).wrap(Wrap { trim: false }),
        rect,
    );
}

// ─── Help overlay ────────────────────────────────────────────────────────────

fn draw_help(f: &mut Frame, area: Rect, app: &App) {
    let t    = &app.theme;
    let rect = centered(60, 70, area);
    f.render_widget(Clear, rect);

    let block = Block::default()
        .title(Title::from(Line::from(Span::styled(
            " Keyboard Shortcuts ",
            Style::default().fg(t.accent()).add_modifier(Modifier::BOLD),
        ))))
        .borders(Borders::ALL)
        .border_type(t.border_type())
        .border_style(Style::default().fg(t.border_active()))
        .style(Style::default().bg(t.popup_bg()));

    let accent = Style::default().fg(t.accent()).add_modifier(Modifier::BOLD);
    let dim    = Style::default().fg(t.fg_dim());
    let lines  = vec![
        Line::from(""),
        Line::from(Span::styled("  Navigation", accent)),
        Line::from(Span::styled("  [ / ]  ← / →       Previous / next month, week or day", dim)),
        Line::from(Span::styled("  h / l              Move one day", dim)),
        Line::from(Span::styled("  t                  Jump to today", dim)),
        Line::from(Span::styled("  m / w / d          Month, week or day view", dim)),
        Line::from(""),
        Line::from(Span::styled("  Appointments", accent)),
        Line::from(Span::styled("  j / k              Move through the day's appointments", dim)),
        Line::from(Span::styled("  Enter              Show details", dim)),
        Line::from(""),
        Line::from(Span::styled("  General", accent)),
        Line::from(Span::styled("  T                  Cycle theme", dim)),
        Line::from(Span::styled("  ?                  Toggle help", dim)),
        Line::from(Span::styled("  Esc                Close / back", dim)),
        Line::from(Span::styled("  q                  Quit", dim)),
    ];

    f.render_widget(
        Paragraph::new(lines).block(block).style(Style::default().fg(t.fg()))
            .wrap(Wrap { trim: false }),
        rect,
    );
}

// ─── Utilities ────────────────────────────────────────────────────────────────

fn centered(pct_x: u16, pct_y: u16, r: Rect) -> Rect {
    let vert = Layout::default().direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - pct_y) / 2),
            Constraint::Percentage(pct_y),
            Constraint::Percentage((100 - pct_y) / 2),
        ]).split(r);
    Layout::default().direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - pct_x) / 2),
            Constraint::Percentage(pct_x),
            Constraint::Percentage((100 - pct_x) / 2),
        ]).split(vert[1])[1]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::nav::NavState;
    use crate::db::Database;
    use ratatui::{backend::TestBackend, buffer::Buffer, style::Color, Terminal};

    async fn app(view: ViewMode) -> App {
        let db = Database::in_memory().await.unwrap();
        db.migrate().await.unwrap();
        db.seed_samples().await.unwrap();
        let reference = NaiveDate::from_ymd_opt(2024, 12, 19).unwrap();
        let mut app = App::new(db, ThemeConfig::default(), NavState::new(reference, view));
        app.refresh().await;
        app
    }

    fn buffer(app: &App) -> Buffer {
        let mut term = Terminal::new(TestBackend::new(160, 48)).unwrap();
        term.draw(|f| draw(f, app)).unwrap();
        term.backend().buffer().clone()
    }

    async fn render(view: ViewMode) -> String {
        let buf = buffer(&app(view).await);
        buf.content().iter().map(|c| c.symbol()).collect()
    }

    /// Background of the first cell of `text` on screen.
    fn bg_of(buf: &Buffer, text: &str) -> Color {
        let want: Vec<String> = text.chars().map(String::from).collect();
        let syms: Vec<&str>   = buf.content().iter().map(|c| c.symbol()).collect();
        let at = syms.windows(want.len())
            .position(|w| w.iter().zip(&want).all(|(a, b)| a == b))
            .unwrap_or_else(|| panic!("{text} not on screen"));
        buf.content()[at].bg
    }

    #[tokio::test]
    async fn month_view_shows_sample_day() {
        let screen = render(ViewMode::Month).await;
        assert!(screen.contains("December 2024"));
        assert!(screen.contains("Check-up Luna"));
    }

    #[tokio::test]
    async fn month_cell_highlights_event_under_cursor() {
        let mut app = app(ViewMode::Month).await;
        let sel = hex_to_color(&app.theme.selected_bg);

        let buf = buffer(&app);
        assert_eq!(bg_of(&buf, "Check-up Luna"), sel);
        assert_ne!(bg_of(&buf, "Grooming Session"), sel);

        app.event_cursor = 1;
        let buf = buffer(&app);
        assert_ne!(bg_of(&buf, "Check-up Luna"), sel);
        assert_eq!(bg_of(&buf, "Grooming Session"), sel);
    }

    #[tokio::test]
    async fn busy_day_overflow_lights_when_cursor_passes_cap() {
        let mut app = app(ViewMode::Month).await;
        let sel = hex_to_color(&app.theme.selected_bg);
        let template = app.events[0].clone();
        for i in 0..4 {
            let mut ev = template.clone();
            ev.id    = format!("extra-{i}");
            ev.title = format!("Walk {i}");
            app.events.push(ev);
        }
        // 2024-12-19 now holds six events: four chips, then "+2 more".
        let screen: String = buffer(&app).content().iter().map(|c| c.symbol()).collect();
        assert!(screen.contains("Walk 1"));
        assert!(!screen.contains("Walk 2"));
        assert!(screen.contains("+2 more"));

        app.event_cursor = 4;
        let buf = buffer(&app);
        assert_eq!(bg_of(&buf, "+2 more Walk 2"), sel);
        assert_ne!(bg_of(&buf, "Check-up Luna"), sel);
    }

    #[tokio::test]
    async fn hour_grid_highlights_event_under_cursor() {
        let mut app = app(ViewMode::Week).await;
        let sel = hex_to_color(&app.theme.selected_bg);
        assert_eq!(bg_of(&buffer(&app), "Check-up Luna"), sel);

        // Grooming Session has no hour row, so nothing in the grid is lit.
        app.event_cursor = 1;
        assert_ne!(bg_of(&buffer(&app), "Check-up Luna"), sel);
    }

    #[tokio::test]
    async fn week_view_shows_hour_rows() {
        let screen = render(ViewMode::Week).await;
        assert!(screen.contains("08:00"));
        assert!(screen.contains("19:00"));
        assert!(screen.contains("Thu 19"));
    }

    #[tokio::test]
    async fn day_view_lists_unbinned_events() {
        let screen = render(ViewMode::Day).await;
        assert!(screen.contains("Grooming Session"));
    }
}
