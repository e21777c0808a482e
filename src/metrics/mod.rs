// Private module declaration
mod server;

use prometheus::{HistogramOpts, HistogramVec, IntCounter, IntCounterVec, Opts, Registry};

// Re-export for public API
pub use server::start_metrics_server;

// ============================================================================
// Metrics Module - Prometheus metrics for store operations
// ============================================================================
//
// Provides:
// - Operation counts by outcome (modified, unchanged, not_found, error, ...)
// - Operation latency
// - Number of posts appended
//
// All metrics are registered with Prometheus and can be scraped via /metrics
// ============================================================================

pub struct Metrics {
    registry: Registry,

    pub store_operations: IntCounterVec,
    pub store_operation_duration: HistogramVec,
    pub posts_appended: IntCounter,
}

impl Metrics {
    pub fn new() -> anyhow::Result<Self> {
        let registry = Registry::new();

        let store_operations = IntCounterVec::new(
            Opts::new("store_operations_total", "Total store operations by outcome"),
            &["operation", "outcome"],
        )?;
        registry.register(Box::new(store_operations.clone()))?;

        let store_operation_duration = HistogramVec::new(
            HistogramOpts::new("store_operation_duration_seconds", "Store operation duration")
                .buckets(vec![0.001, 0.005, 0.01, 0.05, 0.1, 0.5, 1.0, 5.0]),
            &["operation"],
        )?;
        registry.register(Box::new(store_operation_duration.clone()))?;

        let posts_appended = IntCounter::new(
            "store_posts_appended_total",
            "Total posts appended to users",
        )?;
        registry.register(Box::new(posts_appended.clone()))?;

        Ok(Self {
            registry,
            store_operations,
            store_operation_duration,
            posts_appended,
        })
    }

    /// Get the Prometheus registry for exposing metrics via HTTP
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn record_operation(&self, operation: &str, outcome: &str, duration_secs: f64) {
        self.store_operations.with_label_values(&[operation, outcome]).inc();
        self.store_operation_duration.with_label_values(&[operation]).observe(duration_secs);
    }

    pub fn record_posts_appended(&self, count: usize) {
        self.posts_appended.inc_by(count as u64);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_creation() {
        let metrics = Metrics::new().unwrap();
        metrics.record_operation("insert", "ok", 0.01);
        assert!(!metrics.registry.gather().is_empty());
    }

    #[test]
    fn test_record_operation_by_outcome() {
        let metrics = Metrics::new().unwrap();
        metrics.record_operation("update_post", "modified", 0.02);
        metrics.record_operation("update_post", "unchanged", 0.01);
        metrics.record_operation("update_post", "modified", 0.03);

        let gathered = metrics.registry.gather();
        let ops = gathered.iter().find(|m| m.name() == "store_operations_total").unwrap();
        assert_eq!(ops.metric.len(), 2); // Two different outcome labels

        let duration = gathered
            .iter()
            .find(|m| m.name() == "store_operation_duration_seconds")
            .unwrap();
        assert_eq!(duration.metric[0].histogram.sample_count, Some(3));
    }

    #[test]
    fn test_record_posts_appended() {
        let metrics = Metrics::new().unwrap();
        metrics.record_posts_appended(2);
        metrics.record_posts_appended(1);

        let gathered = metrics.registry.gather();
        let appended = gathered.iter().find(|m| m.name() == "store_posts_appended_total").unwrap();
        assert_eq!(appended.metric[0].counter.value, Some(3.0));
    }
}
