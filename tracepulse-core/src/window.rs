// Copyright 2025 Tracepulse (https://github.com/tracepulse)
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.

//! Half-open query time windows.

use serde::{Deserialize, Serialize};

use crate::error::{Result, TracepulseError};

/// Microseconds in one minute.
pub const MINUTE_US: u64 = 60 * 1_000_000;

/// Microseconds in one hour.
pub const HOUR_US: u64 = 60 * MINUTE_US;

/// Microseconds in one day.
pub const DAY_US: u64 = 24 * HOUR_US;

/// A half-open `[gte, lt)` time interval in microseconds since epoch.
///
/// Construction validates `gte < lt`; a `TimeWindow` in hand is always a
/// non-empty interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeWindow {
    pub gte_us: u64,
    pub lt_us: u64,
}

impl TimeWindow {
    pub fn new(gte_us: u64, lt_us: u64) -> Result<Self> {
        if gte_us >= lt_us {
            return Err(TracepulseError::InvalidWindow { gte_us, lt_us });
        }
        Ok(Self { gte_us, lt_us })
    }

    /// Window length in microseconds.
    pub fn duration_us(&self) -> u64 {
        self.lt_us - self.gte_us
    }

    /// Window length in minutes, for rate denominators.
    pub fn minutes(&self) -> f64 {
        self.duration_us() as f64 / MINUTE_US as f64
    }

    pub fn contains(&self, timestamp_us: u64) -> bool {
        timestamp_us >= self.gte_us && timestamp_us < self.lt_us
    }

    /// Number of buckets of `step_us` needed to cover the window.
    ///
    /// A window shorter than one step still yields exactly one bucket.
    pub fn bucket_count(&self, step_us: u64) -> usize {
        debug_assert!(step_us > 0);
        (self.duration_us()).div_ceil(step_us) as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_inverted_window() {
        assert!(TimeWindow::new(1000, 1000).is_err());
        assert!(TimeWindow::new(2000, 1000).is_err());
        assert!(TimeWindow::new(1000, 2000).is_ok());
    }

    #[test]
    fn test_bucket_count_rounds_up() {
        let w = TimeWindow::new(0, HOUR_US).unwrap();
        assert_eq!(w.bucket_count(15 * MINUTE_US), 4);

        // 30 second window at a 1 minute step is still one bucket
        let w = TimeWindow::new(0, 30 * 1_000_000).unwrap();
        assert_eq!(w.bucket_count(MINUTE_US), 1);

        let w = TimeWindow::new(0, HOUR_US + 1).unwrap();
        assert_eq!(w.bucket_count(HOUR_US), 2);
    }

    #[test]
    fn test_minutes() {
        let w = TimeWindow::new(0, 90 * 1_000_000).unwrap();
        assert!((w.minutes() - 1.5).abs() < f64::EPSILON);
    }
}
