//! Deterministic clocks shared by unit tests.

use chrono::{DateTime, Duration, Local, Utc};
use mockable::Clock;
use std::sync::atomic::{AtomicI64, Ordering};

/// A clock that advances by a fixed step on every reading.
#[derive(Debug)]
pub(crate) struct SteppingClock {
    start: DateTime<Utc>,
    step_millis: i64,
    ticks: AtomicI64,
}

impl SteppingClock {
    /// A clock moving forwards one millisecond per reading.
    pub(crate) fn forwards() -> Self {
        Self::with_step(1)
    }

    /// A clock moving backwards one second per reading.
    pub(crate) fn backwards() -> Self {
        Self::with_step(-1_000)
    }

    /// A clock that never moves.
    pub(crate) fn frozen() -> Self {
        Self::with_step(0)
    }

    fn with_step(step_millis: i64) -> Self {
        Self {
            start: DateTime::from_timestamp(1_735_689_600, 0).expect("valid epoch offset"),
            step_millis,
            ticks: AtomicI64::new(0),
        }
    }
}

impl Clock for SteppingClock {
    fn local(&self) -> DateTime<Local> {
        self.utc().with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        let tick = self.ticks.fetch_add(1, Ordering::SeqCst);
        self.start + Duration::milliseconds(tick * self.step_millis)
    }
}
