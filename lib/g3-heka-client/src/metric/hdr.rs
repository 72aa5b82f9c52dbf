/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use hdrhistogram::{Counter, Histogram};

use super::HistogramSnapshot;

fn clamp_i64(v: u64) -> i64 {
    i64::try_from(v).unwrap_or(i64::MAX)
}

impl<T: Counter> HistogramSnapshot for Histogram<T> {
    fn count(&self) -> i64 {
        clamp_i64(self.len())
    }

    fn min(&self) -> i64 {
        if self.is_empty() {
            0
        } else {
            clamp_i64(Histogram::min(self))
        }
    }

    fn max(&self) -> i64 {
        if self.is_empty() {
            0
        } else {
            clamp_i64(Histogram::max(self))
        }
    }

    fn mean(&self) -> f64 {
        Histogram::mean(self)
    }

    fn std_dev(&self) -> f64 {
        self.stdev()
    }

    fn percentiles(&self, quantiles: &[f64]) -> Vec<f64> {
        if self.is_empty() {
            return vec![0.0; quantiles.len()];
        }
        quantiles
            .iter()
            .map(|q| self.value_at_quantile(*q) as f64)
            .collect()
    }
}
