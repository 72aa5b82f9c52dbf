/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

mod values;
pub use values::{HistogramValues, MeterValues, RateValues, TimerValues};

mod hdr;

/// The quantiles reported for every histogram and timer, in emit order
pub const PERCENTILES: [f64; 5] = [0.5, 0.75, 0.95, 0.99, 0.999];

pub trait HistogramSnapshot {
    fn count(&self) -> i64;
    fn min(&self) -> i64;
    fn max(&self) -> i64;
    fn mean(&self) -> f64;
    fn std_dev(&self) -> f64;
    /// Return the values at each of the requested quantiles, in the same order.
    ///
    /// The returned vec may be shorter than `quantiles`, the trailing
    /// quantiles are considered as missing then.
    fn percentiles(&self, quantiles: &[f64]) -> Vec<f64>;
}

pub trait RateSnapshot {
    fn rate1(&self) -> f64;
    fn rate5(&self) -> f64;
    fn rate15(&self) -> f64;
    fn rate_mean(&self) -> f64;
}

pub trait MeterSnapshot: RateSnapshot {
    fn count(&self) -> i64;
}

pub trait TimerSnapshot: HistogramSnapshot + RateSnapshot {}

impl<T: HistogramSnapshot + RateSnapshot> TimerSnapshot for T {}

/// A point-in-time read of one registered metric
#[derive(Clone, Copy)]
pub enum MetricSnapshot<'a> {
    Counter(i64),
    Gauge(i64),
    GaugeFloat(f64),
    Histogram(&'a dyn HistogramSnapshot),
    Meter(&'a dyn MeterSnapshot),
    Timer(&'a dyn TimerSnapshot),
}

/// The application side metrics store.
///
/// No visiting order is required.
pub trait MetricsRegistry {
    fn foreach_metric(&self, call: &mut dyn FnMut(&str, MetricSnapshot<'_>));
}
