//! Clock port and adapters.
//!
//! Calendar logic works on local wall-clock time.

use chrono::{Local, NaiveDateTime};

/// Port for getting the current time.
pub trait Clock: Send + Sync {
    /// Current local date and time.
    fn now(&self) -> NaiveDateTime;
}

/// System clock using the OS time and time zone.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl SystemClock {
    pub fn new() -> Self {
        Self
    }
}

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

#[cfg(test)]
pub struct FixedClock {
    now: NaiveDateTime,
}

#[cfg(test)]
impl FixedClock {
    pub fn new(now: NaiveDateTime) -> Self {
        Self { now }
    }

    /// Parse `YYYY-MM-DD HH:MM:SS`.
    pub fn at(datetime: &str) -> Self {
        Self::new(
            NaiveDateTime::parse_from_str(datetime, "%Y-%m-%d %H:%M:%S")
                .expect("valid test datetime"),
        )
    }
}

#[cfg(test)]
impl Clock for FixedClock {
    fn now(&self) -> NaiveDateTime {
        self.now
    }
}
