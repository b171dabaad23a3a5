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

//! Gap filling: sparse bucket results into dense, regular series.
//!
//! Aggregation only produces buckets that contain data; charts need a
//! point for every step of the timeline. The filler walks the expected
//! bucket starts and zero-fills whatever the pipeline did not produce,
//! so the series length depends on the window and step alone, never on
//! how much data exists.

use std::collections::BTreeMap;

use tracepulse_core::TimeWindow;

use crate::result::SeriesPoint;

/// Start of the bucket containing `timestamp_us`, on the timeline
/// anchored at the window start. Anchoring at the window start (rather
/// than at an absolute epoch boundary) guarantees the first series point
/// falls exactly on the window's lower bound.
pub fn bucket_of(timestamp_us: u64, gte_us: u64, step_us: u64) -> u64 {
    debug_assert!(step_us > 0);
    let offset = timestamp_us.saturating_sub(gte_us);
    gte_us + (offset / step_us) * step_us
}

/// Densify a sparse bucket map over `[window.gte, window.lt)`.
///
/// Emits exactly `window.bucket_count(step_us)` points in chronological
/// order, each `step_us` apart, starting at `window.gte_us`. Missing
/// buckets become all-zero points. Filling an already-dense map returns
/// it unchanged.
pub fn fill(
    window: &TimeWindow,
    step_us: u64,
    mut points: BTreeMap<u64, SeriesPoint>,
) -> Vec<SeriesPoint> {
    let mut series = Vec::with_capacity(window.bucket_count(step_us));
    let mut time_us = window.gte_us;
    while time_us < window.lt_us {
        let point = points
            .remove(&time_us)
            .unwrap_or_else(|| SeriesPoint::zero(time_us));
        series.push(point);
        time_us += step_us;
    }
    series
}
