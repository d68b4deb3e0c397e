//! Time-relative predicates over notes.
//!
//! Every query reads the clock when called; nothing is cached.

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Datelike, Local, NaiveDate, NaiveDateTime};

use super::Note;
use super::format::format_date;
use super::lifecycle::{EMPTY_LABEL, Status};
use crate::clock::Clock;

/// Parse a backend date or datetime into local time.
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    // date-only values are read at local noon.
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return date.and_hms_opt(12, 0, 0);
    }
    if let Ok(datetime) = DateTime::parse_from_rfc3339(raw) {
        return Some(datetime.with_timezone(&Local).naive_local());
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f").ok()
}

/// Overdue: a due date strictly before `today` on a note still in the workflow.
pub fn is_overdue(note: &Note, today: NaiveDate) -> bool {
    let archived = note.status().is_some_and(Status::is_archival);
    !archived && note.due_date.is_some_and(|due| due < today)
}

/// How long ago something happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recency {
    /// One minute or less.
    JustNow,
    Minutes(i64),
    Hours(i64),
    Yesterday,
    Days(i64),
    /// A week or more: shown as a date.
    On(NaiveDate),
}

impl Recency {
    /// Bucket the time elapsed from `then` to `now`.
    pub fn between(then: NaiveDateTime, now: NaiveDateTime) -> Self {
        let elapsed = now - then;
        let minutes = elapsed.num_minutes();
        let hours = elapsed.num_hours();
        let days = elapsed.num_days();

        if minutes < 60 {
            if minutes <= 1 {
                Recency::JustNow
            } else {
                Recency::Minutes(minutes)
            }
        } else if hours < 24 {
            Recency::Hours(hours)
        } else if days == 1 {
            Recency::Yesterday
        } else if days < 7 {
            Recency::Days(days)
        } else {
            Recency::On(then.date())
        }
    }
}

impl fmt::Display for Recency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Recency::JustNow => f.write_str("hace un momento"),
            Recency::Minutes(minutes) => write!(f, "hace {minutes} minutos"),
            Recency::Hours(1) => f.write_str("hace 1 hora"),
            Recency::Hours(hours) => write!(f, "hace {hours} horas"),
            Recency::Yesterday => f.write_str("ayer"),
            Recency::Days(days) => write!(f, "hace {days} días"),
            Recency::On(date) => f.write_str(&format_date(Some(*date))),
        }
    }
}

/// Counters shown on the dashboard.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Summary {
    pub total: usize,
    pub this_month: usize,
    pub today: usize,
    pub overdue: usize,
    pub pending: usize,
}

/// Calendar bound to a clock.
#[derive(Clone)]
pub struct Calendar {
    clock: Arc<dyn Clock>,
}

impl Calendar {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self { clock }
    }

    pub fn today(&self) -> NaiveDate {
        self.clock.now().date()
    }

    pub fn is_overdue(&self, note: &Note) -> bool {
        is_overdue(note, self.today())
    }

    pub fn recency(&self, then: NaiveDateTime) -> Recency {
        Recency::between(then, self.clock.now())
    }

    /// Recency of a raw backend value, `—` when absent or unreadable.
    pub fn recency_label(&self, raw: &str) -> String {
        parse_timestamp(raw)
            .map(|then| self.recency(then).to_string())
            .unwrap_or_else(|| EMPTY_LABEL.to_owned())
    }

    pub fn is_same_month(&self, date: NaiveDate) -> bool {
        let today = self.today();
        date.year() == today.year() && date.month() == today.month()
    }

    pub fn is_today(&self, date: NaiveDate) -> bool {
        date == self.today()
    }

    /// Count notes per dashboard bucket, keyed on the entry date.
    pub fn summarize<'a>(&self, notes: impl IntoIterator<Item = &'a Note>) -> Summary {
        let today = self.today();
        notes.into_iter().fold(Summary::default(), |mut summary, note| {
            summary.total += 1;
            if self.is_same_month(note.entry_date) {
                summary.this_month += 1;
            }
            if note.entry_date == today {
                summary.today += 1;
            }
            if is_overdue(note, today) {
                summary.overdue += 1;
            }
            if note.status().is_some_and(Status::is_pending) {
                summary.pending += 1;
            }
            summary
        })
    }
}
