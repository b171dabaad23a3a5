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

//! Rollup selection: which precomputed table to read, at which step.
//!
//! Long windows must not emit fine-grained buckets: a week of minute
//! buckets is ten thousand points. The selector walks a fixed step
//! ladder until the bucket count fits the configured ceiling, then reads
//! the coarsest rollup able to serve that step. The chosen step is used
//! both for stage-1 grouping and for gap filling, so the two always
//! agree on bucket boundaries.

use tracepulse_core::{GroupBy, TimeWindow, DAY_US, HOUR_US, MINUTE_US};

/// Available precomputed granularities, with their minimum bucket step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RollupGranularity {
    /// Exact event timestamps; any step.
    Raw,
    /// Per-minute rollup; steps of one minute and up.
    Minute,
    /// Per-hour rollup; steps of one hour and up.
    Hour,
}

impl RollupGranularity {
    /// Smallest bucket step this granularity can serve.
    pub fn min_step_us(&self) -> u64 {
        match self {
            RollupGranularity::Raw => 0,
            RollupGranularity::Minute => MINUTE_US,
            RollupGranularity::Hour => HOUR_US,
        }
    }
}

/// Outcome of rollup selection for one query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RollupChoice {
    pub granularity: RollupGranularity,
    pub step_us: u64,
}

/// Step ladder in minutes: sub-hour steps, then whole hours up to a day.
/// Windows too long for a one-day step fall through to whole-day steps.
const STEP_LADDER_MINUTES: &[u64] = &[
    1, 2, 3, 5, 10, 15, 30, 60, 120, 180, 240, 300, 360, 480, 720, 1440,
];

/// Picks the coarsest granularity and bucket step for a window.
#[derive(Debug, Clone, Copy)]
pub struct RollupSelector {
    max_points: usize,
}

impl RollupSelector {
    pub fn new(max_points: usize) -> Self {
        Self {
            max_points: max_points.max(1),
        }
    }

    /// Select granularity and step for a rollup-backed dimension.
    ///
    /// Never fails: every window gets some valid pair, and the step is
    /// monotonic in window length.
    pub fn select(&self, window: &TimeWindow) -> RollupChoice {
        let step_us = self.step_for(window);
        RollupChoice {
            granularity: Self::coarsest_for(step_us),
            step_us,
        }
    }

    /// Like [`select`](Self::select), but forces raw reads for
    /// dimensions without a rollup table (arbitrary attributes).
    pub fn select_for(&self, window: &TimeWindow, group_by: &GroupBy) -> RollupChoice {
        let mut choice = self.select(window);
        if !group_by.has_rollup() {
            choice.granularity = RollupGranularity::Raw;
        }
        choice
    }

    /// Smallest ladder step keeping the bucket count within the ceiling.
    fn step_for(&self, window: &TimeWindow) -> u64 {
        for &minutes in STEP_LADDER_MINUTES {
            let step_us = minutes * MINUTE_US;
            if window.bucket_count(step_us) <= self.max_points {
                return step_us;
            }
        }

        // Beyond the ladder: whole days, rounded up to fit the ceiling.
        let days = window
            .duration_us()
            .div_ceil(self.max_points as u64 * DAY_US);
        days.max(1) * DAY_US
    }

    /// Coarsest granularity whose minimum step can serve `step_us`.
    fn coarsest_for(step_us: u64) -> RollupGranularity {
        for granularity in [RollupGranularity::Hour, RollupGranularity::Minute] {
            if granularity.min_step_us() <= step_us {
                return granularity;
            }
        }
        RollupGranularity::Raw
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn window(minutes: u64) -> TimeWindow {
        TimeWindow::new(0, minutes * MINUTE_US).unwrap()
    }

    #[test]
    fn test_short_window_uses_minute_rollup() {
        let choice = RollupSelector::new(120).select(&window(30));
        assert_eq!(choice.granularity, RollupGranularity::Minute);
        assert_eq!(choice.step_us, MINUTE_US);
    }

    #[test]
    fn test_month_window_uses_hour_rollup() {
        let choice = RollupSelector::new(120).select(&window(30 * 24 * 60));
        assert_eq!(choice.granularity, RollupGranularity::Hour);
        assert!(choice.step_us >= HOUR_US);
    }

    #[test]
    fn test_step_is_monotonic_in_window_length() {
        let selector = RollupSelector::new(120);
        let mut last_step = 0;
        for minutes in [5, 30, 60, 360, 1440, 7 * 1440, 30 * 1440, 365 * 1440] {
            let step = selector.select(&window(minutes)).step_us;
            assert!(step >= last_step, "step shrank at {minutes} minutes");
            last_step = step;
        }
    }

    #[test]
    fn test_bucket_count_stays_within_ceiling() {
        let selector = RollupSelector::new(100);
        for minutes in [1, 90, 1000, 100_000, 1_000_000] {
            let w = window(minutes);
            let step = selector.select(&w).step_us;
            assert!(w.bucket_count(step) <= 100, "{minutes} minute window");
        }
    }

    #[test]
    fn test_window_below_step_yields_one_bucket() {
        let w = TimeWindow::new(0, 30 * 1_000_000).unwrap();
        let choice = RollupSelector::new(120).select(&w);
        assert_eq!(w.bucket_count(choice.step_us), 1);
    }

    #[test]
    fn test_attr_grouping_forces_raw() {
        let selector = RollupSelector::new(120);
        let by_attr = GroupBy::Attr("enduser.id".into());
        let choice = selector.select_for(&window(30), &by_attr);
        assert_eq!(choice.granularity, RollupGranularity::Raw);
        assert_eq!(choice.step_us, MINUTE_US);

        let choice = selector.select_for(&window(30), &GroupBy::System);
        assert_eq!(choice.granularity, RollupGranularity::Minute);
    }

    #[test]
    fn test_compact_ceiling_coarsens_step() {
        let full = RollupSelector::new(120).select(&window(120)).step_us;
        let compact = RollupSelector::new(60).select(&window(120)).step_us;
        assert!(compact >= full);
        assert_eq!(compact, 2 * MINUTE_US);
    }
}
