mod app;
mod bins;
mod calendar;
mod config;
mod db;
mod model;
mod theme;
mod ui;

use anyhow::{anyhow, Context, Result};
use app::App;
use calendar::{nav::NavState, visible_range, ViewMode};
use chrono::{Local, NaiveDate};
use config::AppConfig;
use db::Database;
use theme::ThemeConfig;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().collect();

    match args.get(1).map(|s| s.as_str()) {
        // ── pawcal print [view] [date] ────────────────────────────────────────
        Some("print") => cmd_print(&args[2..]).await,
        // ── pawcal list ───────────────────────────────────────────────────────
        Some("list")  => cmd_list().await,
        // ── pawcal seed ───────────────────────────────────────────────────────
        Some("seed")  => cmd_seed().await,
        // ── pawcal (TUI) ──────────────────────────────────────────────────────
        None          => run_tui().await,
        Some(other)   => Err(anyhow!("unknown command `{other}` (expected print, list or seed)")),
    }
}

fn init_stderr_logging() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

async fn open_db(cfg: &AppConfig) -> Result<Database> {
    let db = Database::connect(&cfg.database_path()).await?;
    db.migrate().await?;
    if cfg.data.seed_samples {
        db.seed_samples().await?;
    }
    Ok(db)
}

// ─── Print command ────────────────────────────────────────────────────────────

/// Reads `[view] [YYYY-MM-DD]` in any order; missing parts fall back to the
/// configured default view and today.
fn parse_print_args(args: &[String], default_view: ViewMode) -> Result<NavState> {
    let mut nav = NavState::new(Local::now().date_naive(), default_view);
    for arg in args {
        if let Ok(date) = NaiveDate::parse_from_str(arg, "%Y-%m-%d") {
            nav.jump_to(date);
        } else {
            nav.set_view(arg.parse().with_context(|| format!("bad argument `{arg}`"))?);
        }
    }
    Ok(nav)
}

async fn cmd_print(args: &[String]) -> Result<()> {
    init_stderr_logging();

    let cfg = AppConfig::load()?;
    let nav = parse_print_args(args, cfg.calendar.default_view)?;
    let db  = open_db(&cfg).await?;

    let (from, to) = visible_range(nav.reference, nav.view);
    let events     = db.events_between(from, to).await?;
    print!("{}", ui::text::render(&nav, &events));
    Ok(())
}

// ─── List command ─────────────────────────────────────────────────────────────

async fn cmd_list() -> Result<()> {
    init_stderr_logging();

    let cfg    = AppConfig::load()?;
    let db     = open_db(&cfg).await?;
    let events = db.all_events().await?;
    print!("{}", ui::text::agenda(&events));
    Ok(())
}

// ─── Seed command ─────────────────────────────────────────────────────────────

async fn cmd_seed() -> Result<()> {
    init_stderr_logging();

    let cfg = AppConfig::load()?;
    let db  = Database::connect(&cfg.database_path()).await?;
    db.migrate().await?;
    match db.seed_samples().await? {
        0 => println!("Appointment book already has data; nothing seeded."),
        n => println!("Seeded {n} sample appointments into {}", cfg.database_path().display()),
    }
    Ok(())
}

// ─── TUI ─────────────────────────────────────────────────────────────────────

async fn run_tui() -> Result<()> {
    let log_dir = config::data_dir();
    std::fs::create_dir_all(&log_dir)?;
    let file_appender = tracing_appender::rolling::daily(&log_dir, "pawcal.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().with_writer(non_blocking))
        .init();

    tracing::info!("Starting pawcal");

    let cfg   = AppConfig::load().unwrap_or_else(|e| {
        tracing::warn!("config: {e:#}; using defaults");
        AppConfig::default()
    });
    let theme = ThemeConfig::load()?;
    let db    = open_db(&cfg).await?;

    let nav     = NavState::new(Local::now().date_naive(), cfg.calendar.default_view);
    let mut app = App::new(db, theme, nav);
    app.run().await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(a: &[&str]) -> Vec<String> { a.iter().map(|s| s.to_string()).collect() }

    #[test]
    fn print_args_in_any_order() {
        let nav = parse_print_args(&args(&["2024-12-19", "week"]), ViewMode::Month).unwrap();
        assert_eq!(nav.view, ViewMode::Week);
        assert_eq!(nav.reference, NaiveDate::from_ymd_opt(2024, 12, 19).unwrap());

        let nav = parse_print_args(&args(&[]), ViewMode::Day).unwrap();
        assert_eq!(nav.view, ViewMode::Day);
    }

    #[test]
    fn print_args_reject_garbage() {
        let err = parse_print_args(&args(&["fortnight"]), ViewMode::Month).unwrap_err();
        assert!(err.to_string().contains("fortnight"));
    }
}
