use chrono::NaiveDate;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::bins::parse_hour;

// ─── Errors ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("unknown category `{0}`")]
    Category(String),
    #[error("unknown subject kind `{0}`")]
    SubjectKind(String),
    #[error("unknown status `{0}`")]
    Status(String),
    #[error("unknown view `{0}` (expected month, week or day)")]
    View(String),
}

// ─── Category ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Appointment,
    Consultation,
    Surgery,
    Grooming,
    Walk,
}

impl Category {
    pub const ALL: [Category; 5] = [
        Category::Appointment,
        Category::Consultation,
        Category::Surgery,
        Category::Grooming,
        Category::Walk,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Category::Appointment  => "appointment",
            Category::Consultation => "consultation",
            Category::Surgery      => "surgery",
            Category::Grooming     => "grooming",
            Category::Walk         => "walk",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Category::Appointment  => "Appointment",
            Category::Consultation => "Consultation",
            Category::Surgery      => "Surgery",
            Category::Grooming     => "Grooming",
            Category::Walk         => "Walk",
        }
    }

    /// Hex color used for the event chip.
    pub fn color(self) -> &'static str {
        match self {
            Category::Appointment  => "#3b82f6",
            Category::Consultation => "#22c55e",
            Category::Surgery      => "#ef4444",
            Category::Grooming     => "#a855f7",
            Category::Walk         => "#f97316",
        }
    }
}

impl FromStr for Category {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::ALL.into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ParseError::Category(s.to_owned()))
    }
}

// ─── Subject kind ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SubjectKind {
    Dog,
    Cat,
}

impl SubjectKind {
    pub fn as_str(self) -> &'static str {
        match self {
            SubjectKind::Dog => "dog",
            SubjectKind::Cat => "cat",
        }
    }

    pub fn icon(self) -> &'static str {
        match self {
            SubjectKind::Dog => "🐕",
            SubjectKind::Cat => "🐈",
        }
    }
}

impl FromStr for SubjectKind {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "dog" => Ok(SubjectKind::Dog),
            "cat" => Ok(SubjectKind::Cat),
            _     => Err(ParseError::SubjectKind(s.to_owned())),
        }
    }
}

// ─── Status ───────────────────────────────────────────────────────────────────

/// Display-only; no transitions are enforced anywhere in the calendar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Status {
    Confirmed,
    Pending,
    Cancelled,
}

impl Status {
    pub fn as_str(self) -> &'static str {
        match self {
            Status::Confirmed => "confirmed",
            Status::Pending   => "pending",
            Status::Cancelled => "cancelled",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Status::Confirmed => "Confirmed",
            Status::Pending   => "Pending",
            Status::Cancelled => "Cancelled",
        }
    }

    pub fn color(self) -> &'static str {
        match self {
            Status::Confirmed => "#22c55e",
            Status::Pending   => "#eab308",
            Status::Cancelled => "#ef4444",
        }
    }
}

impl FromStr for Status {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "confirmed" => Ok(Status::Confirmed),
            "pending"   => Ok(Status::Pending),
            "cancelled" => Ok(Status::Cancelled),
            _           => Err(ParseError::Status(s.to_owned())),
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ─── Event ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct CalendarEvent {
    pub id:           String,
    pub title:        String,
    pub date:         NaiveDate,
    /// Display string such as "10:00 AM".
    pub time:         String,
    pub category:     Category,
    pub subject_name: String,
    pub owner_name:   String,
    pub subject_kind: SubjectKind,
    pub status:       Status,
    pub notes:        Option<String>,
}

impl CalendarEvent {
    /// Hour bucket derived from `time`, if it has a leading hour number.
    pub fn hour(&self) -> Option<u32> {
        parse_hour(&self.time)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_parses_its_own_keys() {
        for c in Category::ALL {
            assert_eq!(c.as_str().parse::<Category>(), Ok(c));
        }
        assert_eq!("Grooming".parse::<Category>(), Ok(Category::Grooming));
    }

    #[test]
    fn unknown_category_is_rejected() {
        let err = "bath".parse::<Category>().unwrap_err();
        assert_eq!(err, ParseError::Category("bath".into()));
        assert_eq!(err.to_string(), "unknown category `bath`");
    }

    #[test]
    fn every_category_has_a_hex_color() {
        for c in Category::ALL {
            let hex = c.color();
            assert!(hex.starts_with('#') && hex.len() == 7, "{hex}");
        }
    }

    #[test]
    fn status_and_kind_parse() {
        assert_eq!(" pending ".parse::<Status>(), Ok(Status::Pending));
        assert_eq!("CAT".parse::<SubjectKind>(), Ok(SubjectKind::Cat));
        assert!("lizard".parse::<SubjectKind>().is_err());
        assert!("done".parse::<Status>().is_err());
    }
}
