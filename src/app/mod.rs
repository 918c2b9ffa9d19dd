use anyhow::Result;
use chrono::Duration;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;

use crate::{
    bins::{events_on, has_display_hour},
    calendar::{nav::NavState, visible_range, ViewMode},
    db::Database,
    model::CalendarEvent,
    theme::ThemeConfig,
    ui::draw,
};

// ─── Panel focus model ────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub enum Panel {
    Calendar,
    EventDetail,
    Help,
}

// ─── App state ────────────────────────────────────────────────────────────────

pub struct App {
    pub db:           Database,
    pub theme:        ThemeConfig,
    pub theme_idx:    usize,
    pub nav:          NavState,
    pub active_panel: Panel,
    /// Events of the visible range, in store order.
    pub events:       Vec<CalendarEvent>,
    /// Cursor over the events of the reference date.
    pub event_cursor: usize,
    pub selected:     Option<CalendarEvent>,
    pub status:       String,
    pub running:      bool,
}

impl App {
    pub fn new(db: Database, theme: ThemeConfig, nav: NavState) -> Self {
        let idx = ThemeConfig::all_themes().iter()
            .position(|t| t.name == theme.name)
            .unwrap_or(0);
        Self {
            db, theme, theme_idx: idx, nav,
            active_panel: Panel::Calendar,
            events:       Vec::new(),
            event_cursor: 0,
            selected:     None,
            status:       String::new(),
            running:      true,
        }
    }

    // ── TUI loop ──────────────────────────────────────────────────────────────

    pub async fn run(&mut self) -> Result<()> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
        let backend  = CrosstermBackend::new(stdout);
        let mut term = Terminal::new(backend)?;

        let result = self.event_loop(&mut term).await;

        disable_raw_mode()?;
        execute!(term.backend_mut(), LeaveAlternateScreen, DisableMouseCapture)?;
        term.show_cursor()?;
        result
    }

    async fn event_loop(
        &mut self,
        term: &mut Terminal<CrosstermBackend<io::Stdout>>,
    ) -> Result<()> {
        self.refresh().await;

        let tick = std::time::Duration::from_millis(50);
        while self.running {
            term.draw(|f| draw(f, self))?;

            if event::poll(tick)? {
                if let Event::Key(key) = event::read()? {
                    self.on_key(key).await;
                }
            }
        }
        Ok(())
    }

    // ── Input ─────────────────────────────────────────────────────────────────

    pub async fn on_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') => { self.running = false; return; }
            KeyCode::Char('?') => {
                self.active_panel = if self.active_panel == Panel::Help { Panel::Calendar } else { Panel::Help };
                return;
            }
            KeyCode::Esc => {
                self.active_panel = Panel::Calendar;
                self.selected     = None;
                return;
            }
            _ => {}
        }

        match self.active_panel {
            Panel::Calendar    => self.key_calendar(key).await,
            Panel::EventDetail
            | Panel::Help      => {
                self.active_panel = Panel::Calendar;
                self.selected     = None;
            }
        }
    }

    async fn key_calendar(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char(']') | KeyCode::Right => { self.nav.next(); self.refresh().await; }
            KeyCode::Char('[') | KeyCode::Left  => { self.nav.prev(); self.refresh().await; }
            KeyCode::Char('l') => self.shift_day(1).await,
            KeyCode::Char('h') => self.shift_day(-1).await,
            KeyCode::Char('t') => { self.nav.today(); self.refresh().await; }
            KeyCode::Char('m') => self.switch_view(ViewMode::Month).await,
            KeyCode::Char('w') => self.switch_view(ViewMode::Week).await,
            KeyCode::Char('d') => self.switch_view(ViewMode::Day).await,
            KeyCode::Down | KeyCode::Char('j') => {
                if self.event_cursor + 1 < self.day_events().len() { self.event_cursor += 1; }
            }
            KeyCode::Up | KeyCode::Char('k') => {
                self.event_cursor = self.event_cursor.saturating_sub(1);
            }
            KeyCode::Enter => self.open_selected(),
            // T (Shift+T) — cycle through themes
            KeyCode::Char('T') => {
                let themes = ThemeConfig::all_themes();
                self.theme_idx = (self.theme_idx + 1) % themes.len();
                self.theme     = themes[self.theme_idx].clone();
                if let Err(e) = self.theme.save() {
                    tracing::warn!("saving theme: {e:#}");
                }
            }
            _ => {}
        }
    }

    // ── Helpers ───────────────────────────────────────────────────────────────

    /// Events bound to the reference date.
    pub fn day_events(&self) -> Vec<&CalendarEvent> {
        events_on(&self.events, self.nav.reference)
    }

    /// Event of the reference date under the j/k cursor.
    pub fn cursor_event(&self) -> Option<&CalendarEvent> {
        self.day_events().get(self.event_cursor).copied()
    }

    fn open_selected(&mut self) {
        let picked = self.cursor_event().cloned();
        if let Some(ev) = picked {
            tracing::debug!("Opening event {}", ev.id);
            self.selected     = Some(ev);
            self.active_panel = Panel::EventDetail;
        }
    }

    async fn switch_view(&mut self, view: ViewMode) {
        if self.nav.view != view {
            self.nav.set_view(view);
            self.refresh().await;
        }
    }

    async fn shift_day(&mut self, d: i64) {
        let date = self.nav.reference + Duration::days(d);
        self.nav.jump_to(date);
        self.refresh().await;
    }

    /// Reloads the events of the visible range. Grid cells and hour bins are
    /// rebuilt from them on the next draw.
    pub async fn refresh(&mut self) {
        let (from, to) = visible_range(self.nav.reference, self.nav.view);
        match self.db.events_between(from, to).await {
            Ok(evs) => {
                tracing::debug!("Loaded {} events for {from}..={to}", evs.len());
                let off_grid = evs.iter().filter(|e| !has_display_hour(e)).count();
                if off_grid > 0 {
                    tracing::debug!("{off_grid} event(s) outside the hour grid");
                }
                self.events = evs;
                self.status.clear();
            }
            Err(e) => {
                tracing::error!("loading events: {e:#}");
                self.events.clear();
                self.status = format!("✗ {e}");
            }
        }
        let n = self.day_events().len();
        self.event_cursor = self.event_cursor.min(n.saturating_sub(1));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use crossterm::event::KeyModifiers;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn key(c: KeyCode) -> KeyEvent { KeyEvent::new(c, KeyModifiers::NONE) }

    async fn app(view: ViewMode) -> App {
        let db = Database::in_memory().await.unwrap();
        db.migrate().await.unwrap();
        db.seed_samples().await.unwrap();
        let mut app = App::new(db, ThemeConfig::default(), NavState::new(date(2024, 12, 19), view));
        app.refresh().await;
        app
    }

    #[tokio::test]
    async fn month_loads_whole_month() {
        let app = app(ViewMode::Month).await;
        assert_eq!(app.events.len(), 7);
        let titles: Vec<_> = app.day_events().iter().map(|e| e.title.as_str()).collect();
        assert_eq!(titles, ["Check-up Luna", "Grooming Session"]);
    }

    #[tokio::test]
    async fn week_navigation_reloads() {
        let mut app = app(ViewMode::Week).await;
        assert_eq!(app.events.len(), 4);
        app.on_key(key(KeyCode::Char(']'))).await;
        assert_eq!(app.nav.reference, date(2024, 12, 26));
        assert_eq!(app.events.len(), 3);
    }

    #[tokio::test]
    async fn view_switch_keeps_reference() {
        let mut app = app(ViewMode::Month).await;
        app.on_key(key(KeyCode::Char('d'))).await;
        assert_eq!(app.nav.view, ViewMode::Day);
        assert_eq!(app.nav.reference, date(2024, 12, 19));
        assert_eq!(app.events.len(), 2);
    }

    #[tokio::test]
    async fn enter_opens_event_under_cursor() {
        let mut app = app(ViewMode::Day).await;
        app.on_key(key(KeyCode::Char('j'))).await;
        app.on_key(key(KeyCode::Enter)).await;
        assert_eq!(app.active_panel, Panel::EventDetail);
        assert_eq!(app.selected.as_ref().map(|e| e.title.as_str()), Some("Grooming Session"));

        app.on_key(key(KeyCode::Esc)).await;
        assert_eq!(app.active_panel, Panel::Calendar);
        assert!(app.selected.is_none());
    }

    #[tokio::test]
    async fn cursor_event_follows_j_and_k() {
        let mut app = app(ViewMode::Month).await;
        assert_eq!(app.cursor_event().map(|e| e.title.as_str()), Some("Check-up Luna"));
        app.on_key(key(KeyCode::Char('j'))).await;
        assert_eq!(app.cursor_event().map(|e| e.title.as_str()), Some("Grooming Session"));
        app.on_key(key(KeyCode::Char('k'))).await;
        assert_eq!(app.cursor_event().map(|e| e.title.as_str()), Some("Check-up Luna"));

        app.on_key(key(KeyCode::Char('l'))).await;
        assert_eq!(app.cursor_event().map(|e| e.title.as_str()), Some("Dental Surgery"));
    }

    #[tokio::test]
    async fn cursor_is_clamped_after_move() {
        let mut app = app(ViewMode::Day).await;
        app.on_key(key(KeyCode::Char('j'))).await;
        app.on_key(key(KeyCode::Char('j'))).await;
        assert_eq!(app.event_cursor, 1);
        app.on_key(key(KeyCode::Char('l'))).await;
        assert_eq!(app.nav.reference, date(2024, 12, 20));
        assert_eq!(app.event_cursor, 0);
    }

    #[tokio::test]
    async fn question_mark_toggles_help() {
        let mut app = app(ViewMode::Month).await;
        app.on_key(key(KeyCode::Char('?'))).await;
        assert_eq!(app.active_panel, Panel::Help);
        app.on_key(key(KeyCode::Char('?'))).await;
        assert_eq!(app.active_panel, Panel::Calendar);
    }

    #[tokio::test]
    async fn quit() {
        let mut app = app(ViewMode::Month).await;
        app.on_key(key(KeyCode::Char('q'))).await;
        assert!(!app.running);
    }
}
