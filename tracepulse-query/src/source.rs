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

//! Data-source contract consumed by the aggregation pipeline.
//!
//! The pipeline never talks to storage directly: it asks a `DataSource`
//! for pre-filtered rows and aggregates whatever comes back. Sources are
//! free to pre-aggregate by bucket (rollup tables return digest state)
//! or to return raw rows one span at a time; the pipeline handles both.
//!
//! `MemorySource` is the reference implementation, serving every
//! granularity from an in-memory span vec. Production deployments put a
//! columnar store behind the same trait.

use std::collections::BTreeMap;

use parking_lot::RwLock;

use tracepulse_core::{
    CancelToken, GroupBy, Result, SpanFilter, SpanRecord, TimeWindow,
    DEFAULT_DIGEST_COMPRESSION, INTERNAL_SPAN_SYSTEM,
};

use crate::digest::TDigest;
use crate::gapfill::bucket_of;
use crate::rollup::RollupGranularity;

/// One fetch request: predicate, grouping, window, and the rollup choice
/// made by the selector.
#[derive(Debug, Clone)]
pub struct SourceQuery {
    pub filter: SpanFilter,
    pub group_by: GroupBy,
    pub window: TimeWindow,
    pub granularity: RollupGranularity,
    pub step_us: u64,
}

/// Duration payload of a source row.
#[derive(Debug, Clone)]
pub enum DurationValue {
    /// No duration information (e.g. event rows).
    None,
    /// One duration sample, weighted by the row's count.
    Sample(f64),
    /// Pre-aggregated digest state from a rollup table.
    Digest(TDigest),
}

/// One row handed to stage 1 of the pipeline.
#[derive(Debug, Clone)]
pub struct SourceRow {
    pub group_key: String,
    pub timestamp_us: u64,
    pub count: u64,
    pub error_count: u64,
    pub duration: DurationValue,
}

/// Abstract tabular source of span rows.
///
/// Returned rows carry timestamps inside the query window; the pipeline
/// buckets them but never re-filters. `fetch` must respect the
/// cancellation token: a fired token aborts the scan promptly with
/// `Cancelled` and no partial rows. Read failures are surfaced as
/// `Source`; the pipeline performs no retries.
pub trait DataSource: Send + Sync {
    fn fetch(&self, query: &SourceQuery, cancel: &CancelToken) -> Result<Vec<SourceRow>>;
}

/// Check the cancel token every this many scanned records.
const CANCEL_CHECK_INTERVAL: usize = 1024;

/// In-memory data source.
///
/// Stores raw span records and serves all three granularities from
/// them: raw fetches return one row per span, rollup fetches
/// pre-aggregate into per-bucket digest rows the way a real rollup
/// table would.
#[derive(Debug, Default)]
pub struct MemorySource {
    spans: RwLock<Vec<SpanRecord>>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, span: SpanRecord) {
        self.spans.write().push(span);
    }

    pub fn insert_batch(&self, spans: impl IntoIterator<Item = SpanRecord>) {
        self.spans.write().extend(spans);
    }

    pub fn len(&self) -> usize {
        self.spans.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.spans.read().is_empty()
    }

    fn row_matches(query: &SourceQuery, span: &SpanRecord) -> bool {
        if !query.window.contains(span.timestamp_us) {
            return false;
        }
        // Internal spans never surface in system stats.
        if query.group_by == GroupBy::System && span.system == INTERNAL_SPAN_SYSTEM {
            return false;
        }
        query.filter.matches(span)
    }
}

impl DataSource for MemorySource {
    fn fetch(&self, query: &SourceQuery, cancel: &CancelToken) -> Result<Vec<SourceRow>> {
        cancel.check()?;
        let spans = self.spans.read();

        if query.granularity == RollupGranularity::Raw {
            let mut rows = Vec::new();
            for (i, span) in spans.iter().enumerate() {
                if i % CANCEL_CHECK_INTERVAL == 0 {
                    cancel.check()?;
                }
                if !Self::row_matches(query, span) {
                    continue;
                }
                let Some(key) = query.group_by.key_of(span) else {
                    continue;
                };
                rows.push(SourceRow {
                    group_key: key,
                    timestamp_us: span.timestamp_us,
                    count: span.count,
                    error_count: if span.is_error { span.count } else { 0 },
                    duration: DurationValue::Sample(span.duration_us as f64),
                });
            }
            return Ok(rows);
        }

        // Rollup fetch: pre-aggregate per (group, bucket) with digest
        // state, like a rollup table scan would return.
        let mut buckets: BTreeMap<(String, u64), (u64, u64, TDigest)> = BTreeMap::new();
        for (i, span) in spans.iter().enumerate() {
            if i % CANCEL_CHECK_INTERVAL == 0 {
                cancel.check()?;
            }
            if !Self::row_matches(query, span) {
                continue;
            }
            let Some(key) = query.group_by.key_of(span) else {
                continue;
            };

            let bucket = bucket_of(span.timestamp_us, query.window.gte_us, query.step_us);
            let entry = buckets
                .entry((key, bucket))
                .or_insert_with(|| (0, 0, TDigest::new(DEFAULT_DIGEST_COMPRESSION)));
            entry.0 += span.count;
            if span.is_error {
                entry.1 += span.count;
            }
            entry.2.insert(span.duration_us as f64, span.count as f64);
        }

        Ok(buckets
            .into_iter()
            .map(|((key, bucket), (count, errors, digest))| SourceRow {
                group_key: key,
                timestamp_us: bucket,
                count,
                error_count: errors,
                duration: DurationValue::Digest(digest),
            })
            .collect())
    }
}
