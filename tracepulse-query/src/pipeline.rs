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

//! Two-stage aggregation over bucketed span rows.
//!
//! Stage 1 groups fetched rows by (group key, time bucket) into partial
//! stats: counts, error counts, and a weighted duration digest. Stage 2
//! folds each group's buckets into whole-window totals - summing counts
//! and merging digests - while finalizing every bucket into a series
//! point from its own, un-merged stats. Gap filling then densifies each
//! series onto the window's timeline.
//!
//! Counts and sums are exact across the two stages; quantiles carry the
//! digest's bounded approximation error. That trade is what lets group
//! totals be computed from bucket partials without re-scanning samples.
//!
//! Everything here is per-query state. A failed source read or a fired
//! cancellation token aborts the whole query; there are no partial
//! results and no retries.

use std::collections::BTreeMap;

use tracing::debug;

use tracepulse_core::{CancelToken, GroupBy, Result, StatsConfig, EventSystemPolicy, MINUTE_US};

use crate::digest::TDigest;
use crate::gapfill::{self, bucket_of};
use crate::result::{GroupResult, GroupSeries, GroupTotals, SeriesPoint, SystemSummary};
use crate::source::{DataSource, DurationValue, SourceQuery, SourceRow};

/// Unmerged per-(group, bucket) aggregate. Never leaves the pipeline.
struct PartialBucketStat {
    count: u64,
    error_count: u64,
    digest: TDigest,
}

impl PartialBucketStat {
    fn new(compression: f64) -> Self {
        Self {
            count: 0,
            error_count: 0,
            digest: TDigest::new(compression),
        }
    }

    fn absorb(&mut self, row: &SourceRow) {
        self.count += row.count;
        self.error_count += row.error_count;
        match &row.duration {
            DurationValue::Sample(value) => self.digest.insert(*value, row.count as f64),
            DurationValue::Digest(state) => self.digest.merge(state),
            DurationValue::None => {}
        }
    }
}

/// `numerator / denominator`, `0.0` when the denominator is zero. Keeps
/// empty buckets and groups NaN-free.
fn ratio(numerator: f64, denominator: f64) -> f64 {
    if denominator > 0.0 {
        numerator / denominator
    } else {
        0.0
    }
}

/// The rollup-aware aggregation pipeline.
pub struct AggregationPipeline<'a> {
    config: &'a StatsConfig,
    policy: &'a EventSystemPolicy,
}

impl<'a> AggregationPipeline<'a> {
    pub fn new(config: &'a StatsConfig, policy: &'a EventSystemPolicy) -> Self {
        Self { config, policy }
    }

    /// Full two-stage aggregation: per-group totals plus dense series,
    /// ordered by group key ascending.
    pub fn run(
        &self,
        source: &dyn DataSource,
        query: &SourceQuery,
        cancel: &CancelToken,
    ) -> Result<Vec<GroupResult>> {
        cancel.check()?;
        let rows = source.fetch(query, cancel)?;
        cancel.check()?;

        let grouped = self.stage1(&rows, query);
        debug!(
            rows = rows.len(),
            groups = grouped.len(),
            step_us = query.step_us,
            "stage 1 complete"
        );

        let mut results = Vec::with_capacity(grouped.len());
        for (key, buckets) in grouped {
            cancel.check()?;
            results.push(self.stage2(key, buckets, query));
        }
        Ok(results)
    }

    /// Totals-only aggregation for the system listing: no series, no
    /// digest work, ordered by group key ascending.
    pub fn run_totals(
        &self,
        source: &dyn DataSource,
        query: &SourceQuery,
        cancel: &CancelToken,
    ) -> Result<Vec<SystemSummary>> {
        cancel.check()?;
        let rows = source.fetch(query, cancel)?;
        cancel.check()?;

        let mut groups: BTreeMap<String, (u64, u64)> = BTreeMap::new();
        for row in &rows {
            let entry = groups.entry(row.group_key.clone()).or_insert((0, 0));
            entry.0 += row.count;
            entry.1 += row.error_count;
        }

        let window_minutes = query.window.minutes();
        Ok(groups
            .into_iter()
            .map(|(system, (count, error_count))| {
                let is_event = self.is_event_group(query, &system);
                SystemSummary {
                    is_event,
                    count,
                    rate: ratio(count as f64, window_minutes),
                    error_count: (!is_event).then_some(error_count),
                    error_pct: (!is_event)
                        .then(|| ratio(error_count as f64, count as f64)),
                    system,
                }
            })
            .collect())
    }

    /// Group rows by (key, bucket). BTreeMaps give the lexicographic
    /// group order and chronological bucket order the response requires.
    fn stage1(
        &self,
        rows: &[SourceRow],
        query: &SourceQuery,
    ) -> BTreeMap<String, BTreeMap<u64, PartialBucketStat>> {
        let mut grouped: BTreeMap<String, BTreeMap<u64, PartialBucketStat>> = BTreeMap::new();
        for row in rows {
            let bucket = bucket_of(row.timestamp_us, query.window.gte_us, query.step_us);
            grouped
                .entry(row.group_key.clone())
                .or_default()
                .entry(bucket)
                .or_insert_with(|| PartialBucketStat::new(self.config.digest_compression))
                .absorb(row);
        }
        grouped
    }

    /// Merge one group's buckets into totals and finalize its series.
    fn stage2(
        &self,
        key: String,
        buckets: BTreeMap<u64, PartialBucketStat>,
        query: &SourceQuery,
    ) -> GroupResult {
        let is_event = self.is_event_group(query, &key);
        let step_minutes = query.step_us as f64 / MINUTE_US as f64;

        let mut total_count = 0u64;
        let mut total_errors = 0u64;
        let mut duration_max = 0.0f64;
        let mut group_digest = TDigest::new(self.config.digest_compression);
        let mut points: BTreeMap<u64, SeriesPoint> = BTreeMap::new();

        for (bucket, mut stat) in buckets {
            total_count += stat.count;
            total_errors += stat.error_count;

            // Bucket-local stats come from the bucket's own partials,
            // computed once here - never re-derived from group totals.
            let quantiles = if is_event {
                [0.0; 3]
            } else {
                let qs = stat.digest.quantiles(&self.config.quantiles);
                [qs[0], qs[1], qs[2]]
            };
            points.insert(
                bucket,
                SeriesPoint {
                    time_us: bucket,
                    count: stat.count,
                    rate: ratio(stat.count as f64, step_minutes),
                    error_count: stat.error_count,
                    error_pct: ratio(stat.error_count as f64, stat.count as f64),
                    duration_p50: quantiles[0],
                    duration_p90: quantiles[1],
                    duration_p99: quantiles[2],
                    duration_max: stat.digest.max(),
                },
            );

            if !is_event {
                duration_max = duration_max.max(stat.digest.max());
                group_digest.merge(&stat.digest);
            }
        }

        let series_points = gapfill::fill(&query.window, query.step_us, points);
        debug_assert_eq!(
            series_points.iter().map(|p| p.count).sum::<u64>(),
            total_count
        );

        let totals = if is_event {
            GroupTotals {
                count: total_count,
                rate: ratio(total_count as f64, query.window.minutes()),
                error_count: None,
                error_pct: None,
                duration_p50: None,
                duration_p90: None,
                duration_p99: None,
                duration_max: None,
            }
        } else {
            // Group quantiles from the merged digest; max re-merged
            // exactly from the bucket maxima, not estimated.
            let qs = group_digest.quantiles(&self.config.quantiles);
            GroupTotals {
                count: total_count,
                rate: ratio(total_count as f64, query.window.minutes()),
                error_count: Some(total_errors),
                error_pct: Some(ratio(total_errors as f64, total_count as f64)),
                duration_p50: Some(qs[0]),
                duration_p90: Some(qs[1]),
                duration_p99: Some(qs[2]),
                duration_max: Some(duration_max),
            }
        };

        GroupResult {
            series: GroupSeries::from_points(&series_points, is_event),
            key,
            is_event,
            totals,
        }
    }

    /// Event classification for a result group. System groups classify
    /// their own key; other dimensions inherit the classification of the
    /// filtered system, defaulting to span semantics when the filter
    /// carries none.
    fn is_event_group(&self, query: &SourceQuery, key: &str) -> bool {
        match &query.group_by {
            GroupBy::System => self.policy.is_event(key),
            _ => query
                .filter
                .system
                .as_deref()
                .is_some_and(|system| self.policy.is_event(system)),
        }
    }
}
