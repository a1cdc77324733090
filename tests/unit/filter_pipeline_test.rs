// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use std::collections::BTreeSet;

use tvbox_aggregator::application::dto::aggregate_options::AggregateOptions;
use tvbox_aggregator::application::use_cases::aggregate_config::apply_filters;
use tvbox_aggregator::domain::models::source::{SourceRecord, SourceStatus};

fn record(id: &str, priority: u32, tags: &[&str]) -> SourceRecord {
    SourceRecord::new(id, id, format!("http://{id}.test/config.json"))
        .with_priority(priority)
        .with_tags(tags.iter().copied())
}

fn tags(values: &[&str]) -> BTreeSet<String> {
    values.iter().map(|v| v.to_string()).collect()
}

fn ids(records: &[SourceRecord]) -> Vec<&str> {
    records.iter().map(|r| r.id.as_str()).collect()
}

#[test]
fn defaults_keep_enabled_sources_sorted_by_priority() {
    let mut disabled = record("off", 99, &[]);
    disabled.enabled = false;
    let sources = vec![
        record("low", 10, &[]),
        disabled,
        record("high", 90, &[]),
        record("mid", 50, &[]),
    ];

    let selected = apply_filters(sources, &AggregateOptions::default());

    assert_eq!(ids(&selected), vec!["high", "mid", "low"]);
}

#[test]
fn equal_priorities_keep_registry_order() {
    let sources = vec![
        record("first", 50, &[]),
        record("top", 80, &[]),
        record("second", 50, &[]),
        record("third", 50, &[]),
    ];

    let selected = apply_filters(sources, &AggregateOptions::default());

    assert_eq!(ids(&selected), vec!["top", "first", "second", "third"]);
}

#[test]
fn tag_filters_and_min_priority() {
    let sources = vec![
        record("movie", 80, &["movie"]),
        record("movie-adult", 90, &["movie", "adult"]),
        record("live", 70, &["live"]),
        record("movie-low", 20, &["movie"]),
        record("untagged", 95, &[]),
    ];
    let options = AggregateOptions {
        include_tags: tags(&["movie", "live"]),
        exclude_tags: tags(&["adult"]),
        min_priority: Some(50),
        ..Default::default()
    };

    let selected = apply_filters(sources, &options);

    assert_eq!(ids(&selected), vec!["movie", "live"]);
}

#[test]
fn exclude_failed_drops_only_failed_sources() {
    let mut failed = record("failed", 90, &[]);
    failed.status = SourceStatus::Failed;
    let mut timeout = record("timeout", 80, &[]);
    timeout.status = SourceStatus::Timeout;
    let mut degraded = record("degraded", 70, &[]);
    degraded.status = SourceStatus::Degraded;
    let sources = vec![failed, timeout, degraded, record("unknown", 60, &[])];

    let kept = apply_filters(sources.clone(), &AggregateOptions::default());
    assert_eq!(kept.len(), 4);

    let options = AggregateOptions {
        exclude_failed: true,
        ..Default::default()
    };
    let selected = apply_filters(sources, &options);
    assert_eq!(ids(&selected), vec!["timeout", "degraded", "unknown"]);
}

#[test]
fn max_sources_truncates_after_sorting() {
    let sources = (0..15).map(|i| record(&format!("s{i}"), i * 5, &[])).collect();
    let options = AggregateOptions {
        max_sources: Some(3),
        ..Default::default()
    };

    let selected = apply_filters(sources, &options);

    assert_eq!(ids(&selected), vec!["s14", "s13", "s12"]);
}
