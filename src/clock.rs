use std::cell::Cell;
use std::rc::Rc;

use chrono::{DateTime, Duration, Local, NaiveDate, NaiveTime, Utc};

/// Source of "now" for the task store.
pub trait Clock {
    /// Creation timestamps.
    fn now(&self) -> DateTime<Utc>;

    /// Local calendar date used for ledger keys and overdue checks.
    fn today(&self) -> NaiveDate;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }

    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}

/// A clock pinned to a given day. Clones share the same date, so a test can
/// move the day forward after handing the clock to a store.
#[derive(Debug, Clone)]
pub struct FixedClock {
    today: Rc<Cell<NaiveDate>>,
}

impl FixedClock {
    pub fn new(today: NaiveDate) -> Self {
        Self {
            today: Rc::new(Cell::new(today)),
        }
    }

    pub fn set_today(&self, today: NaiveDate) {
        self.today.set(today);
    }

    pub fn advance_days(&self, days: i64) {
        self.today.set(self.today.get() + Duration::days(days));
    }
}

impl Clock for FixedClock {
    /// Noon UTC on the pinned day.
    fn now(&self) -> DateTime<Utc> {
        self.today.get().and_time(NaiveTime::from_hms_opt(12, 0, 0).unwrap_or_default()).and_utc()
    }

    fn today(&self) -> NaiveDate {
        self.today.get()
    }
}
