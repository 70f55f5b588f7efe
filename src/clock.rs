use std::thread;
use std::time::Duration;

use chrono::{Local, NaiveDateTime};
#[cfg(test)]
use mockall::automock;

#[cfg_attr(test, automock)]
pub trait Clock {
    fn now(&self) -> NaiveDateTime;
    fn sleep(&self, duration: Duration);
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }

    fn sleep(&self, duration: Duration) {
        thread::sleep(duration)
    }
}

/// Always reports the same instant. Used to replay a pass "as of" a date.
pub struct PinnedClock {
    pub now: NaiveDateTime,
}

impl Clock for PinnedClock {
    fn now(&self) -> NaiveDateTime {
        self.now
    }

    fn sleep(&self, duration: Duration) {
        thread::sleep(duration)
    }
}
