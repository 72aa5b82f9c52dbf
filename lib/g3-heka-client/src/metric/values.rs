/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use super::{HistogramSnapshot, MeterSnapshot, RateSnapshot};

/// Histogram values already computed by the application
#[derive(Clone, Debug, Default, PartialEq)]
pub struct HistogramValues {
    pub count: i64,
    pub min: i64,
    pub max: i64,
    pub mean: f64,
    pub std_dev: f64,
    /// (quantile, value) pairs
    pub quantiles: Vec<(f64, f64)>,
}

impl HistogramSnapshot for HistogramValues {
    fn count(&self) -> i64 {
        self.count
    }

    fn min(&self) -> i64 {
        self.min
    }

    fn max(&self) -> i64 {
        self.max
    }

    fn mean(&self) -> f64 {
        self.mean
    }

    fn std_dev(&self) -> f64 {
        self.std_dev
    }

    fn percentiles(&self, quantiles: &[f64]) -> Vec<f64> {
        // stop at the first unknown quantile to keep the values positional
        quantiles
            .iter()
            .map_while(|q| {
                self.quantiles
                    .iter()
                    .find(|(k, _)| k == q)
                    .map(|(_, v)| *v)
            })
            .collect()
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct RateValues {
    pub rate1: f64,
    pub rate5: f64,
    pub rate15: f64,
    pub rate_mean: f64,
}

impl RateSnapshot for RateValues {
    fn rate1(&self) -> f64 {
        self.rate1
    }

    fn rate5(&self) -> f64 {
        self.rate5
    }

    fn rate15(&self) -> f64 {
        self.rate15
    }

    fn rate_mean(&self) -> f64 {
        self.rate_mean
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct MeterValues {
    pub count: i64,
    pub rates: RateValues,
}

impl RateSnapshot for MeterValues {
    fn rate1(&self) -> f64 {
        self.rates.rate1
    }

    fn rate5(&self) -> f64 {
        self.rates.rate5
    }

    fn rate15(&self) -> f64 {
        self.rates.rate15
    }

    fn rate_mean(&self) -> f64 {
        self.rates.rate_mean
    }
}

impl MeterSnapshot for MeterValues {
    fn count(&self) -> i64 {
        self.count
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct TimerValues {
    pub histogram: HistogramValues,
    pub rates: RateValues,
}

impl HistogramSnapshot for TimerValues {
    fn count(&self) -> i64 {
        self.histogram.count
    }

    fn min(&self) -> i64 {
        self.histogram.min
    }

    fn max(&self) -> i64 {
        self.histogram.max
    }

    fn mean(&self) -> f64 {
        self.histogram.mean
    }

    fn std_dev(&self) -> f64 {
        self.histogram.std_dev
    }

    fn percentiles(&self, quantiles: &[f64]) -> Vec<f64> {
        self.histogram.percentiles(quantiles)
    }
}

impl RateSnapshot for TimerValues {
    fn rate1(&self) -> f64 {
        self.rates.rate1
    }

    fn rate5(&self) -> f64 {
        self.rates.rate5
    }

    fn rate15(&self) -> f64 {
        self.rates.rate15
    }

    fn rate_mean(&self) -> f64 {
        self.rates.rate_mean
    }
}
