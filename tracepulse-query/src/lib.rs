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

//! Tracepulse Query Engine
//!
//! Rollup-aware health statistics for groups of spans: pick the
//! coarsest precomputed granularity that satisfies the query
//! resolution, aggregate in two stages with mergeable duration digests,
//! and gap-fill the resulting series for fixed-step timelines.

pub mod digest;
pub mod engine;
pub mod gapfill;
pub mod pipeline;
pub mod result;
pub mod rollup;
pub mod source;

pub use digest::TDigest;
pub use engine::StatsEngine;
pub use pipeline::AggregationPipeline;
pub use result::{GroupResult, GroupSeries, GroupTotals, SeriesPoint, SystemSummary};
pub use rollup::{RollupChoice, RollupGranularity, RollupSelector};
pub use source::{DataSource, DurationValue, MemorySource, SourceQuery, SourceRow};
