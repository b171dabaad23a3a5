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

//! Externally visible result shapes.
//!
//! One concrete result type with optional members, selected once per
//! group: event-classified groups carry `None` for every error/duration
//! member, which serde omits from the serialized form entirely. Field
//! names follow the established wire names (`errorCount`,
//! `durationP50`, ...).

use serde::{Deserialize, Serialize};

/// One finalized series bucket. Internal currency between stage 2 and
/// gap filling; the serialized form is the parallel arrays of
/// [`GroupSeries`].
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesPoint {
    pub time_us: u64,
    pub count: u64,
    pub rate: f64,
    pub error_count: u64,
    pub error_pct: f64,
    pub duration_p50: f64,
    pub duration_p90: f64,
    pub duration_p99: f64,
    pub duration_max: f64,
}

impl SeriesPoint {
    /// The gap-fill point: every numeric field zero.
    pub fn zero(time_us: u64) -> Self {
        Self {
            time_us,
            count: 0,
            rate: 0.0,
            error_count: 0,
            error_pct: 0.0,
            duration_p50: 0.0,
            duration_p90: 0.0,
            duration_p99: 0.0,
            duration_max: 0.0,
        }
    }
}

/// Whole-window scalar summary for one group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupTotals {
    pub count: u64,
    pub rate: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_count: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_pct: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_p50: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_p90: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_p99: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_max: Option<f64>,
}

/// Dense, index-aligned series arrays for one group. Every array has
/// one entry per bucket of the window; the optional arrays are absent
/// for event-classified groups.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupSeries {
    /// Bucket start times in microseconds since epoch.
    pub time: Vec<u64>,
    pub count: Vec<u64>,
    pub rate: Vec<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_count: Option<Vec<u64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_pct: Option<Vec<f64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_p50: Option<Vec<f64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_p90: Option<Vec<f64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_p99: Option<Vec<f64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_max: Option<Vec<f64>>,
}

impl GroupSeries {
    /// Transpose dense points into parallel arrays, dropping the
    /// error/duration arrays for event groups.
    pub fn from_points(points: &[SeriesPoint], is_event: bool) -> Self {
        let time = points.iter().map(|p| p.time_us).collect();
        let count = points.iter().map(|p| p.count).collect();
        let rate = points.iter().map(|p| p.rate).collect();

        if is_event {
            return Self {
                time,
                count,
                rate,
                error_count: None,
                error_pct: None,
                duration_p50: None,
                duration_p90: None,
                duration_p99: None,
                duration_max: None,
            };
        }

        Self {
            time,
            count,
            rate,
            error_count: Some(points.iter().map(|p| p.error_count).collect()),
            error_pct: Some(points.iter().map(|p| p.error_pct).collect()),
            duration_p50: Some(points.iter().map(|p| p.duration_p50).collect()),
            duration_p90: Some(points.iter().map(|p| p.duration_p90).collect()),
            duration_p99: Some(points.iter().map(|p| p.duration_p99).collect()),
            duration_max: Some(points.iter().map(|p| p.duration_max).collect()),
        }
    }

    /// Number of buckets; all arrays share it.
    pub fn len(&self) -> usize {
        self.time.len()
    }

    pub fn is_empty(&self) -> bool {
        self.time.is_empty()
    }
}

/// Stats for one group over the whole window: totals plus dense series,
/// ordered by `key` in the response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupResult {
    pub key: String,
    pub is_event: bool,
    pub totals: GroupTotals,
    pub series: GroupSeries,
}

/// Totals-only row for the system listing (no series, no digest work).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SystemSummary {
    pub system: String,
    pub is_event: bool,
    pub count: u64,
    pub rate: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_count: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_pct: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_points() -> Vec<SeriesPoint> {
        vec![
            SeriesPoint {
                time_us: 0,
                count: 10,
                rate: 10.0,
                error_count: 1,
                error_pct: 0.1,
                duration_p50: 5.0,
                duration_p90: 9.0,
                duration_p99: 9.9,
                duration_max: 10.0,
            },
            SeriesPoint::zero(60_000_000),
        ]
    }

    #[test]
    fn test_event_series_drops_optional_arrays() {
        let series = GroupSeries::from_points(&sample_points(), true);
        assert_eq!(series.len(), 2);
        assert!(series.error_count.is_none());
        assert!(series.duration_p99.is_none());

        let json = serde_json::to_value(&series).unwrap();
        let obj = json.as_object().unwrap();
        assert!(obj.contains_key("time"));
        assert!(obj.contains_key("rate"));
        assert!(!obj.contains_key("errorCount"));
        assert!(!obj.contains_key("durationP50"));
    }

    #[test]
    fn test_span_series_keeps_all_arrays_aligned() {
        let series = GroupSeries::from_points(&sample_points(), false);
        assert_eq!(series.error_count.as_ref().unwrap().len(), series.len());
        assert_eq!(series.duration_max.as_ref().unwrap().len(), series.len());

        let json = serde_json::to_value(&series).unwrap();
        assert_eq!(json["errorCount"], serde_json::json!([1, 0]));
        assert_eq!(json["durationMax"], serde_json::json!([10.0, 0.0]));
    }

    #[test]
    fn test_totals_wire_names() {
        let totals = GroupTotals {
            count: 15,
            rate: 0.25,
            error_count: Some(1),
            error_pct: Some(1.0 / 15.0),
            duration_p50: Some(4.0),
            duration_p90: Some(8.0),
            duration_p99: Some(9.0),
            duration_max: Some(12.0),
        };
        let json = serde_json::to_value(&totals).unwrap();
        let obj = json.as_object().unwrap();
        assert!(obj.contains_key("errorPct"));
        assert!(obj.contains_key("durationP90"));
    }
}
