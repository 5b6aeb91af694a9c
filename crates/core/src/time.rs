use chrono::{DateTime, Duration, Local, Utc};

/// A simple clock abstraction for deterministic time in services and tests.
#[derive(Debug, Clone, Copy, Default)]
pub enum Clock {
    #[default]
    System,
    Fixed(DateTime<Utc>),
}

impl Clock {
    #[must_use]
    pub fn system() -> Self {
        Self::System
    }

    #[must_use]
    pub fn fixed(at: DateTime<Utc>) -> Self {
        Self::Fixed(at)
    }

    /// Returns the current time according to the clock.
    #[must_use]
    pub fn now(&self) -> DateTime<Utc> {
        match self {
            Clock::System => Utc::now(),
            Clock::Fixed(t) => *t,
        }
    }

    /// If this is a fixed clock, advance it by the given duration.
    ///
    /// Has no effect on `Clock::System`.
    pub fn advance(&mut self, delta: Duration) {
        if let Clock::Fixed(t) = self {
            *t += delta;
        }
    }
}

/// Stamp used in recording file names, one-second resolution (`20231114_221320`).
///
/// Fixed clocks format in UTC so tests stay machine independent; the system
/// clock uses local time, which is what a learner sees in a file browser.
#[must_use]
pub fn recording_stamp(clock: &Clock, at: DateTime<Utc>) -> String {
    match clock {
        Clock::System => at.with_timezone(&Local).format("%Y%m%d_%H%M%S").to_string(),
        Clock::Fixed(_) => at.format("%Y%m%d_%H%M%S").to_string(),
    }
}

/// Wall-clock label shown next to each asked question (`22:13:20`).
#[must_use]
pub fn clock_label(at: DateTime<Utc>) -> String {
    at.with_timezone(&Local).format("%H:%M:%S").to_string()
}

/// Local date and time for file listings (`2023-11-14 22:13:20`).
#[must_use]
pub fn listing_label(at: DateTime<Utc>) -> String {
    at.with_timezone(&Local)
        .format("%Y-%m-%d %H:%M:%S")
        .to_string()
}

/// Deterministic timestamp for tests and examples (2023-11-14T22:13:20Z).
pub const FIXED_TEST_TIMESTAMP: i64 = 1_700_000_000;

/// Returns a deterministic `DateTime<Utc>` for tests and doc examples.
///
/// # Panics
///
/// Panics if the fixed timestamp cannot be represented.
#[must_use]
pub fn fixed_now() -> DateTime<Utc> {
    DateTime::<Utc>::from_timestamp(FIXED_TEST_TIMESTAMP, 0)
        .expect("fixed timestamp should be valid")
}

/// Returns a `Clock` fixed at the deterministic test timestamp.
#[must_use]
pub fn fixed_clock() -> Clock {
    Clock::fixed(fixed_now())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_clock_advances() {
        let mut clock = fixed_clock();
        clock.advance(Duration::seconds(5));
        assert_eq!(clock.now(), fixed_now() + Duration::seconds(5));
    }

    #[test]
    fn recording_stamp_has_second_resolution() {
        let clock = fixed_clock();
        assert_eq!(recording_stamp(&clock, fixed_now()), "20231114_221320");
    }
}
