//! Batch traversal tests for sieve-pipeline

use sieve::{SieveConfig, Timestamp};
use sieve_pipeline::*;
use std::io::Write;
use std::time::Duration;

// ============================================================================
// Helpers
// ============================================================================

/// Removes every metric
struct SiftAll;

impl MetricFilter for SiftAll {
    fn sift(&mut self, _metric: &mut Metric) -> bool {
        true
    }
}

/// Removes nothing
struct KeepAll;

impl MetricFilter for KeepAll {
    fn sift(&mut self, _metric: &mut Metric) -> bool {
        false
    }
}

/// Removes only metrics with the given name
struct SingleMetric(&'static str);

impl MetricFilter for SingleMetric {
    fn sift(&mut self, metric: &mut Metric) -> bool {
        metric.name == self.0
    }
}

fn gauge(name: &str) -> Metric {
    Metric::gauge(
        name,
        vec![NumberDataPoint::double(Timestamp::from_secs(0), 0.0)],
    )
}

/// One resource per argument, each a list of (scope, metric names)
fn batch(resources: Vec<Vec<(&str, Vec<&str>)>>) -> MetricsBatch {
    MetricsBatch {
        resource_metrics: resources
            .into_iter()
            .enumerate()
            .map(|(i, scopes)| ResourceMetrics {
                resource: [("host.name".to_string(), format!("node-{}", i))]
                    .into_iter()
                    .collect(),
                scope_metrics: scopes
                    .into_iter()
                    .map(|(scope, names)| ScopeMetrics {
                        scope: Scope {
                            name: scope.to_string(),
                            version: String::new(),
                        },
                        metrics: names.into_iter().map(gauge).collect(),
                    })
                    .collect(),
            })
            .collect(),
    }
}

fn names(scope: &ScopeMetrics) -> Vec<&str> {
    scope.metrics.iter().map(|m| m.name.as_str()).collect()
}

// ============================================================================
// 1. Container pruning
// ============================================================================

#[test]
fn test_sift_all_from_empty() {
    let mut processor = FrequencyProcessor::new(SiftAll);
    let out = processor.process(batch(vec![]));
    assert_eq!(out.resource_count(), 0);
}

#[test]
fn test_sift_all_from_nonempty() {
    let mut processor = FrequencyProcessor::new(SiftAll);
    let input = batch(vec![
        vec![("lib-1", vec!["m1", "m2"]), ("lib-2", vec!["m1", "m3"])],
        vec![
            ("lib-1", vec!["m1", "m2"]),
            ("lib-3", vec!["m1", "m3"]),
            ("lib-4", vec!["m2", "m3"]),
        ],
    ]);

    let out = processor.process(input);

    assert_eq!(out.resource_count(), 0);
    assert_eq!(processor.stats().metrics_removed, 10);
    assert_eq!(processor.stats().points_out, 0);
}

#[test]
fn test_keep_all_from_empty() {
    let mut processor = FrequencyProcessor::new(KeepAll);
    let out = processor.process(batch(vec![]));
    assert_eq!(out.resource_count(), 0);
}

#[test]
fn test_keep_all_from_nonempty() {
    let mut processor = FrequencyProcessor::new(KeepAll);
    let input = batch(vec![
        vec![("lib-1", vec!["m1", "m2"]), ("lib-2", vec!["m1", "m2", "m3"])],
        vec![
            ("lib-1", vec!["m1"]),
            ("lib-3", vec!["m1", "m3"]),
            ("lib-4", vec!["m2", "m3", "m4"]),
        ],
    ]);

    let out = processor.process(input.clone());

    assert_eq!(out, input);
    let first = &out.resource_metrics[0].scope_metrics;
    assert_eq!(first.len(), 2);
    assert_eq!(first[0].metrics.len(), 2);
    assert_eq!(first[1].metrics.len(), 3);
    let second = &out.resource_metrics[1].scope_metrics;
    assert_eq!(second.len(), 3);
    assert_eq!(second[0].metrics.len(), 1);
    assert_eq!(second[1].metrics.len(), 2);
    assert_eq!(second[2].metrics.len(), 3);
}

#[test]
fn test_single_metric_removed() {
    let mut processor = FrequencyProcessor::new(SingleMetric("m1"));
    let out = processor.process(batch(vec![vec![("lib-1", vec!["m1"])]]));
    assert_eq!(out.resource_count(), 0);
}

#[test]
fn test_emptied_resource_removed() {
    let mut processor = FrequencyProcessor::new(SingleMetric("m1"));
    let out = processor.process(batch(vec![vec![("lib-1", vec!["m1"])], vec![("lib-1", vec!["m2"])]]));

    assert_eq!(out.resource_count(), 1);
    let resource = &out.resource_metrics[0];
    assert_eq!(resource.resource["host.name"], "node-1");
    assert_eq!(names(&resource.scope_metrics[0]), vec!["m2"]);
}

#[test]
fn test_emptied_scope_removed() {
    let mut processor = FrequencyProcessor::new(SingleMetric("m1"));
    let out = processor.process(batch(vec![vec![("lib-1", vec!["m1"]), ("lib-2", vec!["m1", "m2"])]]));

    assert_eq!(out.resource_count(), 1);
    let scopes = &out.resource_metrics[0].scope_metrics;
    assert_eq!(scopes.len(), 1);
    assert_eq!(scopes[0].scope.name, "lib-2");
    assert_eq!(names(&scopes[0]), vec!["m2"]);
}

// ============================================================================
// 2. Frequency filter end to end
// ============================================================================

fn frequency_config() -> SieveConfig {
    SieveConfig {
        min_point_accumulation_time: Duration::ZERO,
        constant_metrics_report_frequency: Duration::from_secs(30),
        ..Default::default()
    }
}

fn single_gauge_batch(name: &str, points: Vec<NumberDataPoint>) -> MetricsBatch {
    MetricsBatch {
        resource_metrics: vec![ResourceMetrics {
            resource: Attributes::new(),
            scope_metrics: vec![ScopeMetrics {
                scope: Scope::default(),
                metrics: vec![Metric::gauge(name, points)],
            }],
        }],
    }
}

#[test]
fn test_constant_gauge_across_batches() {
    let mut processor = FrequencyProcessor::from_config(frequency_config()).unwrap();
    let mut forwarded = Vec::new();

    for secs in (0..=40).step_by(10) {
        let input = single_gauge_batch(
            "system.cpu.idle",
            vec![NumberDataPoint::double(Timestamp::from_secs(secs), 90.0)],
        );
        let out = processor.process(input);
        forwarded.push(!out.is_empty());
    }

    assert_eq!(forwarded, vec![true, false, false, true, false]);
    assert_eq!(processor.stats().batches, 5);
    assert_eq!(processor.stats().points_in, 5);
    assert_eq!(processor.stats().points_out, 2);
    assert!((processor.stats().point_reduction() - 0.6).abs() < 1e-12);
}

#[test]
fn test_points_within_one_metric_in_order() {
    let mut processor = FrequencyProcessor::from_config(frequency_config()).unwrap();
    let points = (0..=40)
        .step_by(10)
        .map(|secs| NumberDataPoint::int(Timestamp::from_secs(secs), 7))
        .collect();

    let out = processor.process(single_gauge_batch("queue.depth", points));

    let metric = out.metrics().next().unwrap();
    match &metric.data {
        MetricData::Gauge { data_points } => {
            let kept: Vec<Timestamp> = data_points.iter().map(|p| p.timestamp).collect();
            assert_eq!(kept, vec![Timestamp::from_secs(0), Timestamp::from_secs(30)]);
            assert!(data_points
                .iter()
                .all(|p| p.value == NumberValue::Int(7)));
        }
        other => panic!("expected gauge, got {:?}", other),
    }
}

#[test]
fn test_non_gauge_metrics_pass_through() {
    let mut processor = FrequencyProcessor::from_config(frequency_config()).unwrap();
    let counter = Metric::sum(
        "http.requests",
        vec![
            NumberDataPoint::int(Timestamp::from_secs(0), 1),
            NumberDataPoint::int(Timestamp::from_secs(1), 1),
        ],
        true,
    );
    let histogram = Metric {
        name: "http.latency".to_string(),
        description: String::new(),
        unit: "ms".to_string(),
        data: MetricData::Histogram {
            data_points: vec![HistogramDataPoint {
                timestamp: Timestamp::from_secs(0),
                count: 3,
                sum: 12.0,
                bucket_counts: vec![1, 2],
                explicit_bounds: vec![5.0],
                attributes: Attributes::new(),
            }],
        },
    };
    let input = MetricsBatch {
        resource_metrics: vec![ResourceMetrics {
            resource: Attributes::new(),
            scope_metrics: vec![ScopeMetrics {
                scope: Scope::default(),
                metrics: vec![counter, histogram],
            }],
        }],
    };

    for _ in 0..3 {
        let out = processor.process(input.clone());
        assert_eq!(out, input);
    }
    assert_eq!(processor.filter().sieve().identity_count(), 0);
}

#[test]
fn test_identities_are_metric_names() {
    let mut processor = FrequencyProcessor::from_config(frequency_config()).unwrap();
    let input = batch(vec![vec![("lib-1", vec!["a", "b"])], vec![("lib-2", vec!["a"])]]);

    let out = processor.process(input);

    // "a" in the second resource is a repeat of the same identity
    assert_eq!(out.metric_count(), 2);
    assert_eq!(processor.filter().sieve().identity_count(), 2);
}

#[test]
fn test_forwarded_nan_survives_json() {
    let mut processor = FrequencyProcessor::from_config(frequency_config()).unwrap();
    let input = single_gauge_batch(
        "disk.latency",
        vec![
            NumberDataPoint::double(Timestamp::from_secs(0), 1.0),
            NumberDataPoint::double(Timestamp::from_secs(10), f64::NAN),
        ],
    );

    let out = processor.process(input);
    assert_eq!(out.data_point_count(), 2);

    let restored = MetricsBatch::from_json(&out.to_json().unwrap()).unwrap();
    match &restored.metrics().next().unwrap().data {
        MetricData::Gauge { data_points } => {
            assert_eq!(data_points[0].value, NumberValue::Double(1.0));
            assert!(data_points[1].value.as_f64().is_nan());
        }
        other => panic!("expected gauge, got {:?}", other),
    };
}

// ============================================================================
// 3. Batch input
// ============================================================================

#[test]
fn test_batch_from_file() {
    let json = r#"{
        "resource_metrics": [{
            "scope_metrics": [{
                "scope": { "name": "hostmetrics", "version": "0.1" },
                "metrics": [{
                    "name": "system.memory.free",
                    "unit": "By",
                    "data": {
                        "type": "gauge",
                        "data_points": [
                            { "timestamp": 0, "value": { "int": 1024 } },
                            { "timestamp": 10000000000, "value": { "int": 1024 } }
                        ]
                    }
                }]
            }]
        }]
    }"#;
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(json.as_bytes()).unwrap();

    let input = MetricsBatch::from_file(file.path()).unwrap();
    let mut processor = FrequencyProcessor::from_config(frequency_config()).unwrap();
    let out = processor.process(input);

    assert_eq!(out.data_point_count(), 1);
    assert_eq!(out.resource_metrics[0].scope_metrics[0].scope.version, "0.1");
}

#[test]
fn test_missing_batch_file() {
    let result = MetricsBatch::from_file("/nonexistent/batch.json");
    assert!(matches!(result, Err(PipelineError::Io(_))));
}

#[test]
fn test_invalid_config_surfaces() {
    let config = SieveConfig {
        iqr_anomaly_coefficient: -1.0,
        ..Default::default()
    };
    let result = FrequencyProcessor::from_config(config);
    assert!(matches!(result, Err(PipelineError::Sieve(_))));
}
