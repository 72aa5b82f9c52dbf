/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::metric::{
    HistogramSnapshot, MeterSnapshot, MetricSnapshot, MetricsRegistry, PERCENTILES,
    TimerSnapshot,
};
use crate::{FieldSkip, FieldSkipReason, FieldValue, HekaEventHandler, HekaIdentity, HekaMessage};

const PERCENTILE_NAMES: [&str; 5] = [
    "50-percentile",
    "75-percentile",
    "95-percentile",
    "99-percentile",
    "999-percentile",
];
const DISTRIBUTION_NAMES: [&str; 2] = ["mean", "std-dev"];
const METER_RATE_NAMES: [&str; 4] = ["one-minute", "five-minute", "fifteen-minute", "mean"];
const TIMER_RATE_NAMES: [&str; 4] = ["one-minute", "five-minute", "fifteen-minute", "mean-rate"];
const COUNT_MIN_MAX_NAMES: [&str; 3] = ["count", "min", "max"];

/// Flatten a registry snapshot into a single heka message
pub struct SnapshotEncoder {
    identity: HekaIdentity,
    handler: Arc<dyn HekaEventHandler>,
}

impl SnapshotEncoder {
    pub fn new(identity: HekaIdentity, handler: Arc<dyn HekaEventHandler>) -> Self {
        SnapshotEncoder { identity, handler }
    }

    #[inline]
    pub fn identity(&self) -> &HekaIdentity {
        &self.identity
    }

    pub fn encode<R>(&self, registry: &R, time: DateTime<Utc>) -> HekaMessage
    where
        R: MetricsRegistry + ?Sized,
    {
        let timestamp = time.timestamp_nanos_opt().unwrap_or_default();
        let mut builder = MessageBuilder {
            msg: HekaMessage::new(&self.identity, timestamp),
            handler: self.handler.as_ref(),
        };
        registry.foreach_metric(&mut |name, metric| builder.add_metric(name, metric));
        builder.msg
    }
}

struct MessageBuilder<'a> {
    msg: HekaMessage,
    handler: &'a dyn HekaEventHandler,
}

impl MessageBuilder<'_> {
    fn add_metric(&mut self, name: &str, metric: MetricSnapshot<'_>) {
        match metric {
            MetricSnapshot::Counter(v) => self.add_field(name.to_string(), FieldValue::Integer(v)),
            MetricSnapshot::Gauge(v) => self.add_field(name.to_string(), FieldValue::Integer(v)),
            MetricSnapshot::GaugeFloat(v) => {
                self.add_field(name.to_string(), FieldValue::Double(v))
            }
            MetricSnapshot::Histogram(h) => self.add_histogram(name, h),
            MetricSnapshot::Meter(m) => self.add_meter(name, m),
            MetricSnapshot::Timer(t) => self.add_timer(name, t),
        }
    }

    fn add_histogram(&mut self, name: &str, h: &dyn HistogramSnapshot) {
        let prefix = format!("{name}.histogram");
        // separate mappings so missing percentiles never shift mean/std-dev into their names
        self.add_float_mapping(&prefix, &PERCENTILE_NAMES, &h.percentiles(&PERCENTILES));
        self.add_float_mapping(&prefix, &DISTRIBUTION_NAMES, &[h.mean(), h.std_dev()]);
        self.add_int_mapping(&prefix, &COUNT_MIN_MAX_NAMES, &[h.count(), h.min(), h.max()]);
    }

    fn add_meter(&mut self, name: &str, m: &dyn MeterSnapshot) {
        self.add_field(format!("{name}.count"), FieldValue::Integer(m.count()));
        self.add_float_mapping(
            name,
            &METER_RATE_NAMES,
            &[m.rate1(), m.rate5(), m.rate15(), m.rate_mean()],
        );
    }

    fn add_timer(&mut self, name: &str, t: &dyn TimerSnapshot) {
        let prefix = format!("{name}.timer");
        // same separation as for histograms
        self.add_float_mapping(&prefix, &PERCENTILE_NAMES, &t.percentiles(&PERCENTILES));
        self.add_float_mapping(&prefix, &DISTRIBUTION_NAMES, &[t.mean(), t.std_dev()]);
        self.add_float_mapping(
            &prefix,
            &TIMER_RATE_NAMES,
            &[t.rate1(), t.rate5(), t.rate15(), t.rate_mean()],
        );
        self.add_int_mapping(&prefix, &COUNT_MIN_MAX_NAMES, &[t.count(), t.min(), t.max()]);
    }

    /// names and values are positional pairs, names without a value are skipped
    fn add_float_mapping(&mut self, prefix: &str, names: &[&str], values: &[f64]) {
        for (i, name) in names.iter().enumerate() {
            let name = format!("{prefix}.{name}");
            match values.get(i) {
                Some(v) => self.add_field(name, FieldValue::Double(*v)),
                None => self.skip(name, FieldSkipReason::MissingValue),
            }
        }
    }

    fn add_int_mapping(&mut self, prefix: &str, names: &[&str], values: &[i64]) {
        for (name, v) in names.iter().zip(values) {
            self.add_field(format!("{prefix}.{name}"), FieldValue::Integer(*v));
        }
    }

    fn add_field(&mut self, name: String, value: FieldValue) {
        // the name is only kept for reporting when the field is rejected
        if let Err(reason) = self.msg.add_field(name.clone(), value) {
            self.skip(name, reason);
        }
    }

    fn skip(&mut self, name: String, reason: FieldSkipReason) {
        self.msg.add_skipped();
        self.handler.field_skipped(&FieldSkip { name, reason });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use crate::metric::{HistogramValues, MeterValues, RateValues, TimerValues};
    use crate::{HekaEncodeError, HekaSendError, LOGGER_NAME, SEVERITY};

    enum TestMetric {
        Counter(i64),
        Gauge(i64),
        GaugeFloat(f64),
        Histogram(HistogramValues),
        Meter(MeterValues),
        Timer(TimerValues),
    }

    #[derive(Default)]
    struct TestRegistry {
        metrics: Vec<(String, TestMetric)>,
    }

    impl TestRegistry {
        fn with(mut self, name: &str, metric: TestMetric) -> Self {
            self.metrics.push((name.to_string(), metric));
            self
        }
    }

    impl MetricsRegistry for TestRegistry {
        fn foreach_metric(&self, call: &mut dyn FnMut(&str, MetricSnapshot<'_>)) {
            for (name, metric) in &self.metrics {
                let snapshot = match metric {
                    TestMetric::Counter(v) => MetricSnapshot::Counter(*v),
                    TestMetric::Gauge(v) => MetricSnapshot::Gauge(*v),
                    TestMetric::GaugeFloat(v) => MetricSnapshot::GaugeFloat(*v),
                    TestMetric::Histogram(h) => MetricSnapshot::Histogram(h),
                    TestMetric::Meter(m) => MetricSnapshot::Meter(m),
                    TestMetric::Timer(t) => MetricSnapshot::Timer(t),
                };
                call(name, snapshot);
            }
        }
    }

    #[derive(Default)]
    struct RecordHandler {
        skipped: Mutex<Vec<FieldSkip>>,
    }

    impl HekaEventHandler for RecordHandler {
        fn field_skipped(&self, skip: &FieldSkip) {
            self.skipped.lock().unwrap().push(skip.clone());
        }

        fn encode_failed(&self, _e: &HekaEncodeError) {}

        fn send_failed(&self, _e: &HekaSendError) {}
    }

    fn test_identity() -> HekaIdentity {
        HekaIdentity {
            pid: 1234,
            hostname: "test-host".to_string(),
            msg_type: "test.metrics".to_string(),
        }
    }

    fn full_quantiles(values: [f64; 5]) -> Vec<(f64, f64)> {
        PERCENTILES.iter().copied().zip(values).collect()
    }

    fn field_names(msg: &HekaMessage) -> Vec<&str> {
        msg.fields().iter().map(|f| f.name()).collect()
    }

    fn encode(registry: &TestRegistry) -> (HekaMessage, Arc<RecordHandler>) {
        let handler = Arc::new(RecordHandler::default());
        let encoder = SnapshotEncoder::new(test_identity(), handler.clone());
        let msg = encoder.encode(registry, Utc::now());
        (msg, handler)
    }

    #[test]
    fn counter_and_gauge_float() {
        let registry = TestRegistry::default()
            .with("requests", TestMetric::Counter(42))
            .with("cpu.load", TestMetric::GaugeFloat(0.73));
        let time = Utc::now();
        let encoder = SnapshotEncoder::new(test_identity(), Arc::new(RecordHandler::default()));
        let msg = encoder.encode(&registry, time);

        assert_eq!(msg.fields().len(), 2);
        assert_eq!(msg.field("requests"), Some(FieldValue::Integer(42)));
        assert_eq!(msg.field("cpu.load"), Some(FieldValue::Double(0.73)));
        assert_eq!(msg.msg_type(), "test.metrics");
        assert_eq!(msg.logger(), LOGGER_NAME);
        assert_eq!(msg.severity(), SEVERITY);
        assert_eq!(msg.pid(), 1234);
        assert_eq!(msg.hostname(), "test-host");
        assert_eq!(msg.payload(), "");
        assert_eq!(msg.timestamp(), time.timestamp_nanos_opt().unwrap());
        assert_eq!(msg.skipped_fields(), 0);
    }

    #[test]
    fn gauge_is_integer() {
        let registry = TestRegistry::default().with("queue.depth", TestMetric::Gauge(-3));
        let (msg, _) = encode(&registry);
        assert_eq!(field_names(&msg), vec!["queue.depth"]);
        assert_eq!(msg.field("queue.depth"), Some(FieldValue::Integer(-3)));
    }

    #[test]
    fn histogram_fields() {
        let h = HistogramValues {
            count: 5,
            min: 1,
            max: 9,
            mean: 4.5,
            std_dev: 2.5,
            quantiles: full_quantiles([4.0, 6.0, 8.0, 9.0, 9.0]),
        };
        let registry = TestRegistry::default().with("latency", TestMetric::Histogram(h));
        let (msg, _) = encode(&registry);

        assert_eq!(
            field_names(&msg),
            vec![
                "latency.histogram.50-percentile",
                "latency.histogram.75-percentile",
                "latency.histogram.95-percentile",
                "latency.histogram.99-percentile",
                "latency.histogram.999-percentile",
                "latency.histogram.mean",
                "latency.histogram.std-dev",
                "latency.histogram.count",
                "latency.histogram.min",
                "latency.histogram.max",
            ]
        );
        assert_eq!(
            msg.field("latency.histogram.75-percentile"),
            Some(FieldValue::Double(6.0))
        );
        assert_eq!(
            msg.field("latency.histogram.std-dev"),
            Some(FieldValue::Double(2.5))
        );
        assert_eq!(
            msg.field("latency.histogram.count"),
            Some(FieldValue::Integer(5))
        );
        assert_eq!(
            msg.field("latency.histogram.max"),
            Some(FieldValue::Integer(9))
        );
    }

    #[test]
    fn meter_fields() {
        let m = MeterValues {
            count: 300,
            rates: RateValues {
                rate1: 1.0,
                rate5: 2.0,
                rate15: 3.0,
                rate_mean: 4.0,
            },
        };
        let registry = TestRegistry::default().with("events", TestMetric::Meter(m));
        let (msg, _) = encode(&registry);

        assert_eq!(
            field_names(&msg),
            vec![
                "events.count",
                "events.one-minute",
                "events.five-minute",
                "events.fifteen-minute",
                "events.mean",
            ]
        );
        assert_eq!(msg.field("events.count"), Some(FieldValue::Integer(300)));
        assert_eq!(
            msg.field("events.fifteen-minute"),
            Some(FieldValue::Double(3.0))
        );
        assert_eq!(msg.field("events.mean"), Some(FieldValue::Double(4.0)));
    }

    #[test]
    fn timer_fields() {
        let t = TimerValues {
            histogram: HistogramValues {
                count: 10,
                min: 1,
                max: 100,
                mean: 50.0,
                std_dev: 20.0,
                quantiles: full_quantiles([50.0, 75.0, 95.0, 99.0, 100.0]),
            },
            rates: RateValues {
                rate1: 2.0,
                rate5: 1.5,
                rate15: 1.2,
                rate_mean: 1.0,
            },
        };
        let registry = TestRegistry::default().with("x", TestMetric::Timer(t));
        let (msg, handler) = encode(&registry);

        assert_eq!(
            field_names(&msg),
            vec![
                "x.timer.50-percentile",
                "x.timer.75-percentile",
                "x.timer.95-percentile",
                "x.timer.99-percentile",
                "x.timer.999-percentile",
                "x.timer.mean",
                "x.timer.std-dev",
                "x.timer.one-minute",
                "x.timer.five-minute",
                "x.timer.fifteen-minute",
                "x.timer.mean-rate",
                "x.timer.count",
                "x.timer.min",
                "x.timer.max",
            ]
        );
        assert_eq!(msg.field("x.timer.count"), Some(FieldValue::Integer(10)));
        assert_eq!(msg.field("x.timer.min"), Some(FieldValue::Integer(1)));
        assert_eq!(msg.field("x.timer.max"), Some(FieldValue::Integer(100)));
        assert_eq!(msg.field("x.timer.mean"), Some(FieldValue::Double(50.0)));
        assert_eq!(msg.field("x.timer.std-dev"), Some(FieldValue::Double(20.0)));
        assert_eq!(
            msg.field("x.timer.one-minute"),
            Some(FieldValue::Double(2.0))
        );
        assert_eq!(
            msg.field("x.timer.mean-rate"),
            Some(FieldValue::Double(1.0))
        );
        assert!(handler.skipped.lock().unwrap().is_empty());
    }

    #[test]
    fn missing_percentiles_skipped() {
        let h = HistogramValues {
            count: 2,
            min: 3,
            max: 4,
            mean: 3.5,
            std_dev: 0.5,
            quantiles: vec![(0.5, 3.0), (0.75, 4.0)],
        };
        let registry = TestRegistry::default()
            .with("size", TestMetric::Histogram(h))
            .with("after", TestMetric::Counter(1));
        let (msg, handler) = encode(&registry);

        assert_eq!(
            field_names(&msg),
            vec![
                "size.histogram.50-percentile",
                "size.histogram.75-percentile",
                "size.histogram.mean",
                "size.histogram.std-dev",
                "size.histogram.count",
                "size.histogram.min",
                "size.histogram.max",
                "after",
            ]
        );
        assert_eq!(msg.field("size.histogram.mean"), Some(FieldValue::Double(3.5)));
        assert_eq!(msg.skipped_fields(), 3);

        let skipped = handler.skipped.lock().unwrap();
        let names: Vec<&str> = skipped.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "size.histogram.95-percentile",
                "size.histogram.99-percentile",
                "size.histogram.999-percentile",
            ]
        );
        assert!(
            skipped
                .iter()
                .all(|s| s.reason == FieldSkipReason::MissingValue)
        );
    }

    #[test]
    fn duplicate_and_empty_names_skipped() {
        let m = MeterValues {
            count: 7,
            ..Default::default()
        };
        let registry = TestRegistry::default()
            .with("hits.count", TestMetric::Counter(3))
            .with("hits", TestMetric::Meter(m))
            .with("", TestMetric::Gauge(1));
        let (msg, handler) = encode(&registry);

        assert_eq!(msg.field("hits.count"), Some(FieldValue::Integer(3)));
        assert!(msg.field("hits.one-minute").is_some());
        assert_eq!(msg.fields().len(), 5);

        let skipped = handler.skipped.lock().unwrap();
        assert_eq!(
            *skipped,
            vec![
                FieldSkip {
                    name: "hits.count".to_string(),
                    reason: FieldSkipReason::DuplicateName,
                },
                FieldSkip {
                    name: String::new(),
                    reason: FieldSkipReason::EmptyName,
                },
            ]
        );
    }

    #[test]
    fn encode_is_idempotent() {
        let h = HistogramValues {
            count: 1,
            min: 2,
            max: 2,
            mean: 2.0,
            std_dev: 0.0,
            quantiles: full_quantiles([2.0; 5]),
        };
        let registry = TestRegistry::default()
            .with("a", TestMetric::Counter(1))
            .with("b", TestMetric::Histogram(h));

        let (msg1, _) = encode(&registry);
        let (msg2, _) = encode(&registry);
        assert_eq!(msg1.fields(), msg2.fields());
        assert_ne!(msg1.uuid(), msg2.uuid());
    }
}
