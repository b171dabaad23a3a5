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

//! High-level stats query API.
//!
//! `StatsEngine` wires the collaborators together: the rollup selector
//! turns the window into a granularity and bucket step, the pipeline
//! aggregates, and the event policy decides field suppression. The
//! engine holds no per-query state, so one instance serves concurrent
//! queries without locking.

use std::sync::Arc;

use tracing::debug;

use tracepulse_core::{
    CancelToken, EventSystemPolicy, GroupBy, Result, SpanFilter, StatsConfig, TimeWindow,
};

use crate::pipeline::AggregationPipeline;
use crate::result::{GroupResult, SystemSummary};
use crate::rollup::RollupSelector;
use crate::source::{DataSource, SourceQuery};

/// Entry point for span health statistics.
pub struct StatsEngine {
    source: Arc<dyn DataSource>,
    config: StatsConfig,
    policy: EventSystemPolicy,
}

impl StatsEngine {
    /// Engine with default config and event policy.
    pub fn new(source: Arc<dyn DataSource>) -> Self {
        Self::with_config(source, StatsConfig::default(), EventSystemPolicy::default())
    }

    pub fn with_config(
        source: Arc<dyn DataSource>,
        config: StatsConfig,
        policy: EventSystemPolicy,
    ) -> Self {
        Self {
            source,
            config,
            policy,
        }
    }

    /// Per-group totals and dense series for the window, ordered by
    /// group key. Attribute grouping uses the compact point ceiling, so
    /// overview sparklines stay cheap.
    pub fn group_stats(
        &self,
        filter: SpanFilter,
        group_by: GroupBy,
        window: TimeWindow,
        cancel: &CancelToken,
    ) -> Result<Vec<GroupResult>> {
        let max_points = match group_by {
            GroupBy::Attr(_) => self.config.compact_series_points,
            _ => self.config.max_series_points,
        };
        let choice = RollupSelector::new(max_points).select_for(&window, &group_by);
        debug!(
            ?group_by,
            granularity = ?choice.granularity,
            step_us = choice.step_us,
            window_minutes = window.minutes(),
            "running group stats"
        );

        let query = SourceQuery {
            filter,
            group_by,
            window,
            granularity: choice.granularity,
            step_us: choice.step_us,
        };
        AggregationPipeline::new(&self.config, &self.policy).run(
            self.source.as_ref(),
            &query,
            cancel,
        )
    }

    /// Totals-only listing of systems in the window, ordered by system.
    pub fn system_summaries(
        &self,
        filter: SpanFilter,
        window: TimeWindow,
        cancel: &CancelToken,
    ) -> Result<Vec<SystemSummary>> {
        let choice =
            RollupSelector::new(self.config.max_series_points).select(&window);
        let query = SourceQuery {
            filter,
            group_by: GroupBy::System,
            window,
            granularity: choice.granularity,
            step_us: choice.step_us,
        };
        AggregationPipeline::new(&self.config, &self.policy).run_totals(
            self.source.as_ref(),
            &query,
            cancel,
        )
    }
}
