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

//! Raw span rows consumed by the aggregation pipeline.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// System id of spans created by Tracepulse itself. Excluded from
/// system-grouped stats so instrumentation overhead never shows up as a
/// user-facing system.
pub const INTERNAL_SPAN_SYSTEM: &str = "internal";

/// One observed span (or a pre-aggregated batch of identical spans).
///
/// `count` is 1 for raw ingested spans; rollup jobs may store rows that
/// stand for `count` spans sharing the same attributes.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SpanRecord {
    /// Classified system, e.g. `http:server` or `log:error`.
    pub system: String,
    pub service: String,
    pub host: String,
    pub env: String,
    pub timestamp_us: u64,
    pub duration_us: u64,
    /// Whether the span finished with an error status.
    pub is_error: bool,
    /// How many spans this row stands for.
    pub count: u64,
    /// Free-form attributes for arbitrary group-by dimensions.
    pub attrs: HashMap<String, String>,
}

impl SpanRecord {
    pub fn new(system: impl Into<String>, timestamp_us: u64, duration_us: u64) -> Self {
        Self {
            system: system.into(),
            timestamp_us,
            duration_us,
            count: 1,
            ..Default::default()
        }
    }

    pub fn attr(&self, key: &str) -> Option<&str> {
        self.attrs.get(key).map(String::as_str)
    }
}
