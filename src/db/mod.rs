use anyhow::{Context, Result};
use chrono::NaiveDate;
use sqlx::{sqlite::{SqlitePool, SqlitePoolOptions, SqliteRow}, Row};
use std::path::Path;
use uuid::Uuid;

use crate::model::{CalendarEvent, Category, Status, SubjectKind};

// ─── Database ─────────────────────────────────────────────────────────────────

/// Read side of the appointment book. Editing appointments belongs to the
/// back office; the calendar only reads them (and seeds a demo schedule).
#[derive(Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    pub async fn connect(path: &Path) -> Result<Self> {
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("creating {}", dir.display()))?;
        }
        let url = format!("sqlite://{}?mode=rwc", path.display());
        let pool = SqlitePool::connect(&url).await
            .with_context(|| format!("opening {}", path.display()))?;
        Ok(Self { pool })
    }

    /// Single-connection in-memory database; every pooled connection to
    /// `sqlite::memory:` would otherwise see its own empty database.
    pub async fn in_memory() -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:").await?;
        Ok(Self { pool })
    }

    pub async fn migrate(&self) -> Result<()> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS appointments (
                id TEXT PRIMARY KEY, title TEXT NOT NULL,
                date TEXT NOT NULL, time TEXT NOT NULL,
                category TEXT NOT NULL,
                subject_name TEXT NOT NULL, owner_name TEXT NOT NULL,
                subject_kind TEXT NOT NULL, status TEXT NOT NULL,
                notes TEXT
            )"
        ).execute(&self.pool).await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_appointments_date ON appointments(date)")
            .execute(&self.pool).await?;

        tracing::info!("DB migrations complete");
        Ok(())
    }

    // ── Queries ───────────────────────────────────────────────────────────────

    /// Appointments dated within `[from, to]`, ordered by date and then by
    /// the order they were entered in.
    pub async fn events_between(&self, from: NaiveDate, to: NaiveDate) -> Result<Vec<CalendarEvent>> {
        let rows = sqlx::query(
            "SELECT * FROM appointments WHERE date >= ? AND date <= ? ORDER BY date, rowid"
        )
        .bind(from.to_string()).bind(to.to_string())
        .fetch_all(&self.pool).await?;
        rows.iter().map(row_to_event).collect()
    }

    pub async fn all_events(&self) -> Result<Vec<CalendarEvent>> {
        let rows = sqlx::query("SELECT * FROM appointments ORDER BY date, rowid")
            .fetch_all(&self.pool).await?;
        rows.iter().map(row_to_event).collect()
    }

    pub async fn count(&self) -> Result<i64> {
        let row = sqlx::query("SELECT COUNT(*) AS n FROM appointments")
            .fetch_one(&self.pool).await?;
        Ok(row.get("n"))
    }

    // ── Seeding ───────────────────────────────────────────────────────────────

    async fn insert(&self, e: &CalendarEvent) -> Result<()> {
        sqlx::query(
            "INSERT INTO appointments
                (id,title,date,time,category,subject_name,owner_name,subject_kind,status,notes)
             VALUES (?,?,?,?,?,?,?,?,?,?)"
        )
        .bind(&e.id).bind(&e.title)
        .bind(e.date.to_string()).bind(&e.time)
        .bind(e.category.as_str())
        .bind(&e.subject_name).bind(&e.owner_name)
        .bind(e.subject_kind.as_str()).bind(e.status.as_str())
        .bind(&e.notes)
        .execute(&self.pool).await?;
        Ok(())
    }

    /// Loads the demo schedule into an empty book. Returns how many rows
    /// were inserted (0 when appointments already exist).
    pub async fn seed_samples(&self) -> Result<usize> {
        if self.count().await? > 0 {
            return Ok(0);
        }
        let samples = sample_events();
        let mut inserted = 0;
        for e in &samples {
            self.insert(e).await?;
            inserted += 1;
        }
        tracing::info!("Seeded {inserted} sample appointments");
        Ok(inserted)
    }
}

// ─── Sample schedule ──────────────────────────────────────────────────────────

pub fn sample_events() -> Vec<CalendarEvent> {
    const ROWS: &[(&str, (i32, u32, u32), &str, Category, &str, &str, SubjectKind, Status)] = &[
        ("Check-up Luna",          (2024, 12, 19), "10:00 AM", Category::Appointment,  "Luna",     "Sarah Johnson",  SubjectKind::Dog, Status::Confirmed),
        ("Grooming Session",       (2024, 12, 19), "2:30 PM",  Category::Grooming,     "Max",      "Mike Chen",      SubjectKind::Dog, Status::Pending),
        ("Dental Surgery",         (2024, 12, 20), "9:00 AM",  Category::Surgery,      "Bella",    "Emily Davis",    SubjectKind::Dog, Status::Confirmed),
        ("Nutrition Consultation", (2024, 12, 21), "11:00 AM", Category::Consultation, "Whiskers", "Tom Wilson",     SubjectKind::Cat, Status::Confirmed),
        ("Morning Walk",           (2024, 12, 23), "8:00 AM",  Category::Walk,         "Rocky",    "Anna Martinez",  SubjectKind::Dog, Status::Confirmed),
        ("Vaccination Milo",       (2024, 12, 24), "3:00 PM",  Category::Appointment,  "Milo",     "James Brown",    SubjectKind::Cat, Status::Cancelled),
        ("Follow-up Bella",        (2024, 12, 27), "10:30 AM", Category::Consultation, "Bella",    "Emily Davis",    SubjectKind::Dog, Status::Pending),
    ];

    ROWS.iter().filter_map(|&(title, (y, m, d), time, category, subject, owner, kind, status)| {
        Some(CalendarEvent {
            id:           Uuid::new_v4().to_string(),
            title:        title.to_owned(),
            date:         NaiveDate::from_ymd_opt(y, m, d)?,
            time:         time.to_owned(),
            category,
            subject_name: subject.to_owned(),
            owner_name:   owner.to_owned(),
            subject_kind: kind,
            status,
            notes:        None,
        })
    }).collect()
}

// ─── Row helpers ─────────────────────────────────────────────────────────────

fn row_to_event(row: &SqliteRow) -> Result<CalendarEvent> {
    let id: String = row.get("id");
    let parse = || -> Result<CalendarEvent> {
        let date: String = row.get("date");
        Ok(CalendarEvent {
            id:           id.clone(),
            title:        row.get("title"),
            date:         NaiveDate::parse_from_str(&date, "%Y-%m-%d")?,
            time:         row.get("time"),
            category:     row.get::<String, _>("category").parse()?,
            subject_name: row.get("subject_name"),
            owner_name:   row.get("owner_name"),
            subject_kind: row.get::<String, _>("subject_kind").parse()?,
            status:       row.get::<String, _>("status").parse()?,
            notes:        row.get("notes"),
        })
    };
    parse().with_context(|| format!("malformed appointment row {id}"))
}
