// ==============================================================================
// clock.rs - Injected Time Source
// ==============================================================================
// Description: Wall-clock and monotonic time for envelope timestamps and
//              request durations
// Created: 2026-10-19
// Modified: 2026-10-19
// Version: 1.0.0
// ==============================================================================

use chrono::{DateTime, SecondsFormat, Utc};
use std::time::{Duration, Instant};

/// Time source shared by the pipeline stages
pub trait Clock: Send + Sync {
    /// Current wall-clock instant
    fn now(&self) -> DateTime<Utc>;

    /// Monotonic reading used for durations
    fn monotonic(&self) -> Instant;

    /// Time since `start`, never negative
    fn elapsed_since(&self, start: Instant) -> Duration {
        self.monotonic().saturating_duration_since(start)
    }

    /// Current instant as ISO-8601 with millisecond precision (`...T12:00:00.000Z`)
    fn timestamp(&self) -> String {
        self.now().to_rfc3339_opts(SecondsFormat::Millis, true)
    }
}

/// Operating system clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }

    fn monotonic(&self) -> Instant {
        Instant::now()
    }
}

#[cfg(test)]
pub use manual::ManualClock;


#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_timestamp_is_iso_8601() {
        let clock = ManualClock::new(Utc.with_ymd_and_hms(2026, 10, 19, 12, 30, 5).unwrap());
        let stamp = clock.timestamp();

        assert_eq!(stamp, "2026-10-19T12:30:05.000Z");
        assert!(DateTime::parse_from_rfc3339(&stamp).is_ok());
    }

    #[test]
    fn test_manual_clock_elapsed() {
        let clock = ManualClock::new(Utc::now());
        let start = clock.monotonic();

        clock.advance(Duration::from_millis(42));

        assert_eq!(clock.elapsed_since(start), Duration::from_millis(42));
    }

    #[test]
    fn test_elapsed_never_negative() {
        let clock = SystemClock;
        let later = clock.monotonic() + Duration::from_secs(60);

        assert_eq!(clock.elapsed_since(later), Duration::ZERO);
    }
}
