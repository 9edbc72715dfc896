//! Injected time source. The pipeline never reads the system clock itself.

use chrono::{Local, NaiveDateTime};

/// Supplies "now" to handlers, which pass it explicitly into the pipeline.
pub trait Clock: Send + Sync {
    fn now(&self) -> NaiveDateTime;
}

/// Wall-clock time in the server's local timezone.
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

/// Always returns the same instant. Used in tests.
pub struct FixedClock(pub NaiveDateTime);

impl Clock for FixedClock {
    fn now(&self) -> NaiveDateTime {
        self.0
    }
}

/// `"October 15, 2026"`
pub fn report_date(now: NaiveDateTime) -> String {
    now.format("%B %-d, %Y").to_string()
}

/// 24-hour `"HH:MM"`.
pub fn report_time(now: NaiveDateTime) -> String {
    now.format("%H:%M").to_string()
}
