//! Statistics for the recommendations served by one advisor run.

use crate::types::recommendation::CropLabel;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::RwLock;
use std::time::{Duration, Instant};
use tracing::info;

/// Metrics collector for inference requests
pub struct InferenceMetrics {
    /// Successful recommendations
    pub predictions: AtomicU64,
    /// Failed requests
    pub failures: AtomicU64,
    /// Failures by error kind
    failures_by_kind: RwLock<BTreeMap<String, u64>>,
    /// Recommendations per crop
    crops: RwLock<BTreeMap<String, u64>>,
    /// Inference latencies (in microseconds)
    latencies: RwLock<Vec<u64>>,
    start_time: Instant,
}

impl InferenceMetrics {
    pub fn new() -> Self {
        Self {
            predictions: AtomicU64::new(0),
            failures: AtomicU64::new(0),
            failures_by_kind: RwLock::new(BTreeMap::new()),
            crops: RwLock::new(BTreeMap::new()),
            latencies: RwLock::new(Vec::new()),
            start_time: Instant::now(),
        }
    }

    /// Record a successful recommendation
    pub fn record_prediction(&self, latency: Duration, crop: &CropLabel) {
        self.predictions.fetch_add(1, Ordering::Relaxed);

        if let Ok(mut latencies) = self.latencies.write() {
            latencies.push(latency.as_micros() as u64);
            // Keep only the last 10000
            if latencies.len() > 10_000 {
                latencies.drain(0..5_000);
            }
        }

        if let Ok(mut crops) = self.crops.write() {
            *crops.entry(crop.as_str().to_string()).or_insert(0) += 1;
        }
    }

    /// Record a failed request
    pub fn record_failure(&self, kind: &str) {
        self.failures.fetch_add(1, Ordering::Relaxed);

        if let Ok(mut by_kind) = self.failures_by_kind.write() {
            *by_kind.entry(kind.to_string()).or_insert(0) += 1;
        }
    }

    /// Latency statistics over the recorded predictions
    pub fn get_latency_stats(&self) -> LatencyStats {
        let mut sorted = match self.latencies.read() {
            Ok(latencies) if !latencies.is_empty() => latencies.clone(),
            _ => return LatencyStats::default(),
        };
        sorted.sort_unstable();

        let count = sorted.len();
        let sum: u64 = sorted.iter().sum();
        let percentile = |p: f64| sorted[((count as f64 * p) as usize).min(count - 1)];

        LatencyStats {
            count: count as u64,
            mean_us: sum / count as u64,
            p50_us: percentile(0.50),
            p95_us: percentile(0.95),
            max_us: sorted[count - 1],
        }
    }

    pub fn get_crop_counts(&self) -> BTreeMap<String, u64> {
        self.crops.read().map(|c| c.clone()).unwrap_or_default()
    }

    pub fn get_failures_by_kind(&self) -> BTreeMap<String, u64> {
        self.failures_by_kind
            .read()
            .map(|f| f.clone())
            .unwrap_or_default()
    }

    /// Log summary statistics
    pub fn print_summary(&self) {
        let predictions = self.predictions.load(Ordering::Relaxed);
        let failures = self.failures.load(Ordering::Relaxed);
        let latency = self.get_latency_stats();

        info!(
            predictions = predictions,
            failures = failures,
            uptime_s = self.start_time.elapsed().as_secs(),
            "Advisor session summary"
        );
        if latency.count > 0 {
            info!(
                mean_us = latency.mean_us,
                p50_us = latency.p50_us,
                p95_us = latency.p95_us,
                max_us = latency.max_us,
                "Inference latency"
            );
        }
        for (crop, count) in self.get_crop_counts() {
            info!(crop = %crop, count = count, "Recommended");
        }
        for (kind, count) in self.get_failures_by_kind() {
            info!(kind = %kind, count = count, "Failed");
        }
    }
}

impl Default for InferenceMetrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Inference latency statistics
#[derive(Debug, Default, PartialEq, Eq)]
pub struct LatencyStats {
    pub count: u64,
    pub mean_us: u64,
    pub p50_us: u64,
    pub p95_us: u64,
    pub max_us: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_recording() {
        let metrics = InferenceMetrics::new();

        metrics.record_prediction(Duration::from_micros(100), &CropLabel::from("rice"));
        metrics.record_prediction(Duration::from_micros(300), &CropLabel::from("rice"));
        metrics.record_prediction(Duration::from_micros(200), &CropLabel::from("maize"));
        metrics.record_failure("shape_mismatch");

        assert_eq!(metrics.predictions.load(Ordering::Relaxed), 3);
        assert_eq!(metrics.failures.load(Ordering::Relaxed), 1);
        assert_eq!(metrics.get_crop_counts().get("rice"), Some(&2));
        assert_eq!(metrics.get_failures_by_kind().get("shape_mismatch"), Some(&1));
    }

    #[test]
    fn test_latency_stats() {
        let metrics = InferenceMetrics::new();
        assert_eq!(metrics.get_latency_stats(), LatencyStats::default());

        for us in [100, 200, 300, 400] {
            metrics.record_prediction(Duration::from_micros(us), &CropLabel::from("jute"));
        }
        let stats = metrics.get_latency_stats();
        assert_eq!(stats.count, 4);
        assert_eq!(stats.mean_us, 250);
        assert_eq!(stats.p50_us, 300);
        assert_eq!(stats.max_us, 400);
    }
}
