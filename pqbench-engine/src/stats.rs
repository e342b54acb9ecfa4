// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Statistical summaries of timing samples.
//!
//! Samples are raw nanosecond durations; summaries are reported in
//! microseconds. Percentiles use linear interpolation between order
//! statistics: for quantile `q` over `n` sorted samples the rank is
//! `q * (n - 1)`, and the result is interpolated between the samples at
//! `floor(rank)` and `ceil(rank)`.

use serde::{Deserialize, Serialize};
use thiserror::Error;

const NANOS_PER_MICRO: f64 = 1_000.0;
const MICROS_PER_SEC: f64 = 1_000_000.0;

/// Raw samples above this count are downsampled before being stored.
const RAW_SAMPLE_LIMIT: usize = 10_000;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum StatsError {
    #[error("Cannot summarize an empty sample set")]
    EmptySampleSet,
}

/// Fixed statistical digest of one operation's timing samples.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatSummary {
    /// Arithmetic mean latency in microseconds
    #[serde(rename = "avg_us")]
    pub mean_us: f64,
    /// Median (p50) latency in microseconds
    pub median_us: f64,
    /// 99th percentile latency in microseconds
    pub p99_us: f64,
    /// Minimum observed latency in microseconds
    pub min_us: f64,
    /// Maximum observed latency in microseconds
    pub max_us: f64,
    /// Sample standard deviation in microseconds (0 for a single sample)
    pub std_dev_us: f64,
    /// Operations per second at the mean latency (0 when the mean is 0)
    pub throughput_ops_sec: f64,
    /// Number of samples summarized
    pub samples: usize,
    /// Sorted raw samples in nanoseconds (optional, may be downsampled)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_samples_ns: Option<Vec<u64>>,
}

impl StatSummary {
    /// Summarize a vector of latency samples (in nanoseconds).
    pub fn from_samples(mut samples: Vec<u64>, keep_raw: bool) -> Result<Self, StatsError> {
        if samples.is_empty() {
            return Err(StatsError::EmptySampleSet);
        }

        samples.sort_unstable();
        let len = samples.len();

        let min_ns = samples[0] as f64;
        let max_ns = samples[len - 1] as f64;
        let sum: u128 = samples.iter().map(|&s| s as u128).sum();
        let mean_ns = (sum as f64 / len as f64).clamp(min_ns, max_ns);

        let sorted: Vec<f64> = samples.iter().map(|&s| s as f64).collect();
        let median_ns = percentile(&sorted, 0.5);
        let p99_ns = percentile(&sorted, 0.99);

        let std_dev_ns = if len > 1 {
            let variance = sorted
                .iter()
                .map(|&x| {
                    let diff = x - mean_ns;
                    diff * diff
                })
                .sum::<f64>()
                / (len - 1) as f64;
            variance.sqrt()
        } else {
            0.0
        };

        let mean_us = mean_ns / NANOS_PER_MICRO;
        let throughput_ops_sec = if mean_us > 0.0 {
            MICROS_PER_SEC / mean_us
        } else {
            0.0
        };

        let raw_samples_ns = if keep_raw {
            if len > RAW_SAMPLE_LIMIT {
                let step = len / 1000;
                let mut kept: Vec<u64> = samples.iter().step_by(step).copied().collect();
                // Always keep the maximum
                if (len - 1) % step != 0 {
                    kept.push(samples[len - 1]);
                }
                Some(kept)
            } else {
                Some(samples)
            }
        } else {
            None
        };

        Ok(Self {
            mean_us,
            median_us: median_ns / NANOS_PER_MICRO,
            p99_us: p99_ns / NANOS_PER_MICRO,
            min_us: min_ns / NANOS_PER_MICRO,
            max_us: max_ns / NANOS_PER_MICRO,
            std_dev_us: std_dev_ns / NANOS_PER_MICRO,
            throughput_ops_sec,
            samples: len,
            raw_samples_ns,
        })
    }
}

/// Linearly interpolated quantile `q` (0.0..=1.0) of an ascending slice.
///
/// Returns 0.0 for an empty slice.
pub fn percentile(sorted: &[f64], q: f64) -> f64 {
    match sorted.len() {
        0 => 0.0,
        1 => sorted[0],
        len => {
            let rank = q.clamp(0.0, 1.0) * (len - 1) as f64;
            let lower = rank.floor() as usize;
            let upper = rank.ceil() as usize;
            let weight = rank - lower as f64;
            sorted[lower] + (sorted[upper] - sorted[lower]) * weight
        }
    }
}

/// Format a latency given in microseconds (auto-selects ns/μs/ms/s).
pub fn format_latency(us: f64) -> String {
    if us < 1.0 {
        format!("{:.0}ns", us * 1_000.0)
    } else if us < 1_000.0 {
        format!("{:.2}μs", us)
    } else if us < 1_000_000.0 {
        format!("{:.2}ms", us / 1_000.0)
    } else {
        format!("{:.2}s", us / 1_000_000.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn micros(values: impl IntoIterator<Item = u64>) -> Vec<u64> {
        values.into_iter().map(|us| us * 1_000).collect()
    }

    #[test]
    fn test_summary_from_samples() {
        let samples = micros([100, 200, 300, 400, 500, 600, 700, 800, 900, 1000]);
        let summary = StatSummary::from_samples(samples, false).unwrap();

        assert_eq!(summary.min_us, 100.0);
        assert_eq!(summary.max_us, 1000.0);
        assert!((summary.median_us - 550.0).abs() < 1e-9);
        assert!((summary.mean_us - 550.0).abs() < 1e-9);
        assert!((summary.throughput_ops_sec - 1_000_000.0 / 550.0).abs() < 1e-6);
        assert_eq!(summary.samples, 10);
        assert!(summary.raw_samples_ns.is_none());
    }

    #[test]
    fn test_empty_sample_set() {
        assert_eq!(
            StatSummary::from_samples(Vec::new(), false),
            Err(StatsError::EmptySampleSet)
        );
    }

    #[test]
    fn test_single_sample() {
        let summary = StatSummary::from_samples(vec![4_200], false).unwrap();
        assert_eq!(summary.std_dev_us, 0.0);
        assert_eq!(summary.mean_us, 4.2);
        assert_eq!(summary.median_us, summary.mean_us);
        assert_eq!(summary.min_us, summary.mean_us);
        assert_eq!(summary.max_us, summary.mean_us);
        assert_eq!(summary.p99_us, summary.mean_us);
    }

    #[test]
    fn test_p99_linear_interpolation() {
        // rank = 0.99 * 99 = 98.01, between 99μs and 100μs
        let summary = StatSummary::from_samples(micros(1..=100), false).unwrap();
        assert!((summary.p99_us - 99.01).abs() < 1e-9, "p99 = {}", summary.p99_us);
        assert!((summary.median_us - 50.5).abs() < 1e-9);
    }

    #[test]
    fn test_sample_std_dev() {
        // Sample variance of [2, 4, 4, 4, 5, 5, 7, 9] is 32 / 7
        let summary = StatSummary::from_samples(micros([2, 4, 4, 4, 5, 5, 7, 9]), false).unwrap();
        assert!((summary.std_dev_us - (32.0f64 / 7.0).sqrt()).abs() < 1e-9);
    }

    #[test]
    fn test_zero_mean_has_zero_throughput() {
        let summary = StatSummary::from_samples(vec![0, 0, 0], false).unwrap();
        assert_eq!(summary.mean_us, 0.0);
        assert_eq!(summary.throughput_ops_sec, 0.0);
    }

    #[test]
    fn test_ordering_invariants_on_skewed_data() {
        let mut samples = vec![1_000; 98];
        samples.extend([250_000, 900_000]);
        let summary = StatSummary::from_samples(samples, false).unwrap();

        assert!(summary.min_us <= summary.median_us);
        assert!(summary.median_us <= summary.max_us);
        assert!(summary.min_us <= summary.mean_us && summary.mean_us <= summary.max_us);
        assert!(summary.mean_us > summary.median_us);
        assert!(summary.std_dev_us >= 0.0);
        assert!((summary.throughput_ops_sec - 1_000_000.0 / summary.mean_us).abs() < 1e-6);
    }

    #[test]
    fn test_raw_samples_kept_sorted_and_downsampled() {
        let summary = StatSummary::from_samples(vec![30, 10, 20], true).unwrap();
        assert_eq!(summary.raw_samples_ns, Some(vec![10, 20, 30]));

        let many: Vec<u64> = (0..20_000).rev().collect();
        let summary = StatSummary::from_samples(many, true).unwrap();
        let raw = summary.raw_samples_ns.unwrap();
        assert_eq!(raw.len(), 1001);
        assert!(raw.windows(2).all(|w| w[0] <= w[1]));
        assert_eq!(raw.first(), Some(&0));
        assert_eq!(raw.last(), Some(&19_999));

        // Step lands on the last index: no duplicate
        let exact: Vec<u64> = (0..10_021).collect();
        let raw = StatSummary::from_samples(exact, true)
            .unwrap()
            .raw_samples_ns
            .unwrap();
        assert_eq!(raw.len(), 1003);
        assert_eq!(raw.last(), Some(&10_020));
    }

    #[test]
    fn test_percentile_edges() {
        assert_eq!(percentile(&[], 0.5), 0.0);
        assert_eq!(percentile(&[3.0], 0.99), 3.0);
        assert_eq!(percentile(&[1.0, 2.0, 3.0], 0.0), 1.0);
        assert_eq!(percentile(&[1.0, 2.0, 3.0], 1.0), 3.0);
    }

    #[test]
    fn test_latency_format() {
        assert_eq!(format_latency(0.5), "500ns");
        assert_eq!(format_latency(1.5), "1.50μs");
        assert_eq!(format_latency(1_500.0), "1.50ms");
        assert_eq!(format_latency(1_500_000.0), "1.50s");
    }

    #[test]
    fn test_serialized_field_names() {
        let summary = StatSummary::from_samples(vec![1_000, 2_000], false).unwrap();
        let json = serde_json::to_value(&summary).unwrap();
        assert!(json.get("avg_us").is_some());
        assert!(json.get("throughput_ops_sec").is_some());
        assert!(json.get("raw_samples_ns").is_none());
    }
}
