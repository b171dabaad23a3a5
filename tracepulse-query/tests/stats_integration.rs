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

//! End-to-end stats queries against the in-memory source.

use std::sync::Arc;

use tracepulse_core::{
    CancelToken, GroupBy, SpanFilter, SpanRecord, StatsConfig, EventSystemPolicy, TimeWindow,
    TracepulseError, HOUR_US, MINUTE_US,
};
use tracepulse_query::{MemorySource, StatsEngine};

fn span(
    system: &str,
    service: &str,
    minute: u64,
    duration_us: u64,
    is_error: bool,
) -> SpanRecord {
    SpanRecord {
        service: service.to_string(),
        env: "prod".to_string(),
        host: "host-1".to_string(),
        is_error,
        ..SpanRecord::new(system, minute * MINUTE_US, duration_us)
    }
}

/// An hour of traffic: http spans in two bursts, db spans spread out,
/// log events interleaved.
fn seeded_engine() -> StatsEngine {
    let source = MemorySource::new();

    for i in 0..10 {
        source.insert(span("http:server", "checkout", 2, 1_000 + i * 100, i == 0));
    }
    for i in 0..5 {
        source.insert(span("http:server", "checkout", 47, 2_000 + i * 100, false));
    }
    for minute in [5, 15, 25, 35, 45, 55] {
        source.insert(span("db:postgresql", "checkout", minute, 500, false));
    }
    for minute in [10, 40] {
        source.insert(span("log:error", "checkout", minute, 0, true));
    }

    StatsEngine::new(Arc::new(source))
}

#[test]
fn test_system_stats_end_to_end() {
    let engine = seeded_engine();
    let window = TimeWindow::new(0, HOUR_US).unwrap();
    let results = engine
        .group_stats(
            SpanFilter::new(),
            GroupBy::System,
            window,
            &CancelToken::new(),
        )
        .unwrap();

    // Lexicographic group order.
    let keys: Vec<&str> = results.iter().map(|g| g.key.as_str()).collect();
    assert_eq!(keys, vec!["db:postgresql", "http:server", "log:error"]);

    for group in &results {
        // Densification is mandatory: every group covers the full hour
        // at the selected step.
        let step = group.series.time[1] - group.series.time[0];
        assert_eq!(group.series.len(), (HOUR_US / step) as usize);
        assert_eq!(group.series.time[0], 0);

        // Merge-then-split is lossless in count.
        let series_sum: u64 = group.series.count.iter().sum();
        assert_eq!(series_sum, group.totals.count);
    }

    let http = &results[1];
    assert_eq!(http.totals.count, 15);
    assert_eq!(http.totals.error_count, Some(1));
    assert!(http.totals.duration_max.unwrap() >= 2_400.0);

    let log = &results[2];
    assert!(log.is_event);
    assert_eq!(log.totals.count, 2);
    assert!(log.totals.error_count.is_none());
    assert!(log.series.duration_p50.is_none());
}

#[test]
fn test_event_fields_absent_in_json() {
    let engine = seeded_engine();
    let window = TimeWindow::new(0, HOUR_US).unwrap();
    let results = engine
        .group_stats(
            SpanFilter::new(),
            GroupBy::System,
            window,
            &CancelToken::new(),
        )
        .unwrap();

    let json = serde_json::to_value(&results).unwrap();
    for group in json.as_array().unwrap() {
        let is_event = group["isEvent"].as_bool().unwrap();
        let totals = group["totals"].as_object().unwrap();
        let series = group["series"].as_object().unwrap();
        if is_event {
            assert!(!totals.contains_key("errorCount"));
            assert!(!totals.contains_key("durationP50"));
            assert!(!series.contains_key("errorPct"));
            assert!(!series.contains_key("durationMax"));
        } else {
            assert!(totals.contains_key("errorCount"));
            assert!(totals.contains_key("durationP99"));
            assert!(series.contains_key("errorPct"));
        }
    }
}

#[test]
fn test_filter_narrows_groups() {
    let engine = seeded_engine();
    let window = TimeWindow::new(0, HOUR_US).unwrap();

    let results = engine
        .group_stats(
            SpanFilter::new().with_system("db:postgresql"),
            GroupBy::System,
            window,
            &CancelToken::new(),
        )
        .unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].key, "db:postgresql");
    assert_eq!(results[0].totals.count, 6);

    let results = engine
        .group_stats(
            SpanFilter::new().with_env("staging"),
            GroupBy::System,
            window,
            &CancelToken::new(),
        )
        .unwrap();
    assert!(results.is_empty());
}

#[test]
fn test_attribute_grouping_reads_raw_spans() {
    let source = MemorySource::new();
    let mut a = span("http:server", "checkout", 1, 1_000, false);
    a.attrs.insert("region".to_string(), "eu".to_string());
    let mut b = span("http:server", "checkout", 2, 3_000, false);
    b.attrs.insert("region".to_string(), "us".to_string());
    // No region attribute: dropped from the grouping.
    let c = span("http:server", "checkout", 3, 9_000, false);
    source.insert_batch([a, b, c]);

    let engine = StatsEngine::new(Arc::new(source));
    let window = TimeWindow::new(0, HOUR_US).unwrap();
    let results = engine
        .group_stats(
            SpanFilter::new().with_system("http:server"),
            GroupBy::Attr("region".to_string()),
            window,
            &CancelToken::new(),
        )
        .unwrap();

    let keys: Vec<&str> = results.iter().map(|g| g.key.as_str()).collect();
    assert_eq!(keys, vec!["eu", "us"]);
    // Filtered system is a span system, so duration stats stay present.
    assert!(results[0].totals.duration_p50.is_some());
}

#[test]
fn test_system_summaries_listing() {
    let engine = seeded_engine();
    let window = TimeWindow::new(0, HOUR_US).unwrap();
    let summaries = engine
        .system_summaries(SpanFilter::new(), window, &CancelToken::new())
        .unwrap();

    assert_eq!(summaries.len(), 3);
    let http = summaries.iter().find(|s| s.system == "http:server").unwrap();
    assert_eq!(http.count, 15);
    assert!((http.rate - 0.25).abs() < 1e-9);
    assert_eq!(http.error_count, Some(1));

    let log = summaries.iter().find(|s| s.system == "log:error").unwrap();
    assert!(log.is_event);
    assert!(log.error_pct.is_none());
}

#[test]
fn test_long_window_coarsens_step() {
    let source = MemorySource::new();
    source.insert(span("http:server", "checkout", 10, 1_000, false));
    let engine = StatsEngine::new(Arc::new(source));

    // 30 days: steps must be at least an hour to respect the ceiling.
    let window = TimeWindow::new(0, 30 * 24 * HOUR_US).unwrap();
    let results = engine
        .group_stats(
            SpanFilter::new(),
            GroupBy::System,
            window,
            &CancelToken::new(),
        )
        .unwrap();

    let series = &results[0].series;
    let step = series.time[1] - series.time[0];
    assert!(step >= HOUR_US);
    assert!(series.len() <= StatsConfig::default().max_series_points);
    assert_eq!(series.count.iter().sum::<u64>(), 1);
}

#[test]
fn test_invalid_window_rejected_before_query() {
    assert!(matches!(
        TimeWindow::new(HOUR_US, HOUR_US),
        Err(TracepulseError::InvalidWindow { .. })
    ));
}

#[test]
fn test_cancelled_query_returns_no_partial_output() {
    let engine = seeded_engine();
    let window = TimeWindow::new(0, HOUR_US).unwrap();
    let cancel = CancelToken::new();
    cancel.cancel();

    let err = engine
        .group_stats(SpanFilter::new(), GroupBy::System, window, &cancel)
        .unwrap_err();
    assert!(matches!(err, TracepulseError::Cancelled));
}

#[test]
fn test_custom_event_policy() {
    let source = MemorySource::new();
    source.insert(span("audit:login", "auth", 1, 100, false));
    let engine = StatsEngine::with_config(
        Arc::new(source),
        StatsConfig::default(),
        EventSystemPolicy::with_event_systems(["audit"]),
    );

    let window = TimeWindow::new(0, HOUR_US).unwrap();
    let results = engine
        .group_stats(
            SpanFilter::new(),
            GroupBy::System,
            window,
            &CancelToken::new(),
        )
        .unwrap();
    assert!(results[0].is_event);
}
