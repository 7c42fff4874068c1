//! Wall-clock time handling for the acquisition pipeline
//!
//! Samples are stamped with time-of-day at acquisition, so the reporting
//! side can print `HH:MM:SS:mmm` lines and compute response latencies
//! without carrying a full calendar around. The clock itself is an external
//! collaborator reached through the [`ClockSource`] trait:
//! - `SystemClock` (std) reads the host clock
//! - `FixedClock` is a controllable source for deterministic tests
//!
//! Timestamps are monotonic within a day; deltas are computed modulo
//! midnight so a sample taken at 23:59:59.900 and serviced at 00:00:00.050
//! still yields a 150 ms latency.

use core::fmt;

/// Milliseconds in one day.
pub const MILLIS_PER_DAY: u32 = 24 * 60 * 60 * 1000;

/// Time of day with millisecond resolution.
///
/// All fields are plain unsigned integers so the type stays `Copy` and fits
/// in four bytes alongside the sample it stamps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Timestamp {
    /// Hour of day, `0..24`
    pub hours: u8,
    /// Minute of hour, `0..60`
    pub minutes: u8,
    /// Second of minute, `0..60`
    pub seconds: u8,
    /// Millisecond of second, `0..1000`
    pub millis: u16,
}

impl Timestamp {
    /// Build a timestamp from explicit fields.
    pub const fn new(hours: u8, minutes: u8, seconds: u8, millis: u16) -> Self {
        Self {
            hours,
            minutes,
            seconds,
            millis,
        }
    }

    /// Build a timestamp from a millisecond offset into the day.
    ///
    /// Offsets past midnight wrap around.
    pub const fn from_millis_of_day(ms: u32) -> Self {
        let ms = ms % MILLIS_PER_DAY;
        Self {
            hours: (ms / 3_600_000) as u8,
            minutes: (ms / 60_000 % 60) as u8,
            seconds: (ms / 1_000 % 60) as u8,
            millis: (ms % 1_000) as u16,
        }
    }

    /// Millisecond offset into the day.
    pub const fn millis_of_day(&self) -> u32 {
        (self.hours as u32) * 3_600_000
            + (self.minutes as u32) * 60_000
            + (self.seconds as u32) * 1_000
            + self.millis as u32
    }

    /// Milliseconds elapsed since `earlier`, wrapping across midnight.
    ///
    /// The pipeline never holds a sample anywhere near a full day, so a
    /// wrapped difference is always the intended one.
    pub const fn delta_ms(&self, earlier: Timestamp) -> u32 {
        let now = self.millis_of_day();
        let then = earlier.millis_of_day();
        if now >= then {
            now - then
        } else {
            MILLIS_PER_DAY - then + now
        }
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:02}:{:02}:{:02}:{:03}",
            self.hours, self.minutes, self.seconds, self.millis
        )
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for Timestamp {
    fn format(&self, fmt: defmt::Formatter) {
        defmt::write!(
            fmt,
            "{}:{}:{}:{}",
            self.hours,
            self.minutes,
            self.seconds,
            self.millis
        );
    }
}

/// Source of wall-clock time for sample stamping.
///
/// Implementations must be shareable across the producer tasks and the
/// scheduler, hence the `Send + Sync` bound. Precision is expected to be
/// one millisecond or better; coarser sources inflate reported latencies
/// but do not break the pipeline.
pub trait ClockSource: Send + Sync {
    /// Current time of day.
    fn now(&self) -> Timestamp;
}

/// Host clock (std only).
#[cfg(feature = "std")]
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

#[cfg(feature = "std")]
impl ClockSource for SystemClock {
    fn now(&self) -> Timestamp {
        use std::time::{SystemTime, UNIX_EPOCH};

        let since_epoch = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default();
        Timestamp::from_millis_of_day((since_epoch.as_millis() % MILLIS_PER_DAY as u128) as u32)
    }
}

/// Controllable clock for deterministic tests.
///
/// Stores the time-of-day offset in an atomic so tests can advance it
/// through a shared reference while tasks are reading it.
#[derive(Debug, Default)]
pub struct FixedClock {
    millis_of_day: core::sync::atomic::AtomicU32,
}

impl FixedClock {
    /// Clock frozen at `ms` milliseconds into the day.
    pub fn new(ms: u32) -> Self {
        Self {
            millis_of_day: core::sync::atomic::AtomicU32::new(ms % MILLIS_PER_DAY),
        }
    }

    /// Move the clock to an absolute offset into the day.
    pub fn set(&self, ms: u32) {
        self.millis_of_day
            .store(ms % MILLIS_PER_DAY, core::sync::atomic::Ordering::Release);
    }

    /// Advance the clock by `ms` milliseconds.
    pub fn advance(&self, ms: u32) {
        let now = self
            .millis_of_day
            .load(core::sync::atomic::Ordering::Acquire);
        self.set(now.wrapping_add(ms));
    }
}

impl ClockSource for FixedClock {
    fn now(&self) -> Timestamp {
        Timestamp::from_millis_of_day(
            self.millis_of_day
                .load(core::sync::atomic::Ordering::Acquire),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_round_trip() {
        let ts = Timestamp::new(13, 59, 7, 250);
        assert_eq!(Timestamp::from_millis_of_day(ts.millis_of_day()), ts);
    }

    #[test]
    fn delta_within_day() {
        let earlier = Timestamp::new(10, 0, 0, 0);
        let later = Timestamp::new(10, 0, 1, 500);
        assert_eq!(later.delta_ms(earlier), 1_500);
    }

    #[test]
    fn delta_wraps_midnight() {
        let earlier = Timestamp::new(23, 59, 59, 900);
        let later = Timestamp::new(0, 0, 0, 50);
        assert_eq!(later.delta_ms(earlier), 150);
    }

    #[test]
    fn fixed_clock_advances() {
        let clock = FixedClock::new(1_000);
        assert_eq!(clock.now(), Timestamp::new(0, 0, 1, 0));

        clock.advance(500);
        assert_eq!(clock.now(), Timestamp::new(0, 0, 1, 500));
    }

    #[test]
    fn display_is_zero_padded() {
        #[cfg(feature = "std")]
        {
            let ts = Timestamp::new(1, 2, 3, 45);
            assert_eq!(std::format!("{ts}"), "01:02:03:045");
        }
    }
}
