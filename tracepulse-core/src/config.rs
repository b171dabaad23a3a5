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

//! Tunables for stats queries.
//!
//! Everything here is external configuration: the point ceilings drive
//! rollup selection, the compression bounds digest memory, and the
//! quantile set fixes which percentiles responses carry. Nothing in the
//! pipeline hardcodes these.

use serde::{Deserialize, Serialize};

/// Default ceiling on points per series for full-width charts.
pub const DEFAULT_MAX_SERIES_POINTS: usize = 120;

/// Default ceiling for compact charts (attribute overview sparklines).
pub const DEFAULT_COMPACT_SERIES_POINTS: usize = 60;

/// Default t-digest compression parameter.
pub const DEFAULT_DIGEST_COMPRESSION: f64 = 200.0;

/// Stats query configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatsConfig {
    /// Maximum series points a query may return; longer windows get
    /// coarser bucket steps to stay under this.
    pub max_series_points: usize,

    /// Point ceiling used for compact attribute-overview series.
    pub compact_series_points: usize,

    /// Digest size/accuracy trade-off; higher is more accurate and
    /// larger. Memory per digest is O(compression).
    pub digest_compression: f64,

    /// Quantiles reported for durations, ascending, filling the
    /// p50/p90/p99 slots of the response. The maximum is tracked exactly
    /// and is not part of this set.
    pub quantiles: [f64; 3],
}

impl Default for StatsConfig {
    fn default() -> Self {
        Self {
            max_series_points: DEFAULT_MAX_SERIES_POINTS,
            compact_series_points: DEFAULT_COMPACT_SERIES_POINTS,
            digest_compression: DEFAULT_DIGEST_COMPRESSION,
            quantiles: [0.50, 0.90, 0.99],
        }
    }
}

impl StatsConfig {
    /// Config for tests that want few, predictable buckets.
    pub fn with_max_points(max_series_points: usize) -> Self {
        Self {
            max_series_points,
            compact_series_points: max_series_points.min(DEFAULT_COMPACT_SERIES_POINTS),
            ..Self::default()
        }
    }
}
