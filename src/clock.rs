use std::cell::Cell;
use std::rc::Rc;

use chrono::{DateTime, Utc};

pub trait Clock {
    /// Monotonic milliseconds. Only differences are meaningful.
    fn now_ms(&self) -> u64;

    /// Wall-clock time, used to stamp finished sessions.
    fn wall_now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Hand-driven clock. Clones share the same time.
#[derive(Clone, Default)]
pub struct ManualClock {
    now_ms: Rc<Cell<u64>>,
    wall: Rc<Cell<Option<DateTime<Utc>>>>,
}

impl ManualClock {
    pub fn new(now_ms: u64) -> Self {
        let clock = Self::default();
        clock.set(now_ms);
        clock
    }

    pub fn set(&self, now_ms: u64) {
        self.now_ms.set(now_ms);
    }

    pub fn advance(&self, ms: u64) {
        self.now_ms.set(self.now_ms.get() + ms);
    }

    pub fn set_wall(&self, wall: DateTime<Utc>) {
        self.wall.set(Some(wall));
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> u64 {
        self.now_ms.get()
    }

    fn wall_now(&self) -> DateTime<Utc> {
        self.wall.get().unwrap_or_else(Utc::now)
    }
}
