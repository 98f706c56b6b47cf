use crate::services::rate_limit_service::SlidingWindowLimiter;
use opentelemetry::{global, metrics::Counter};
use std::sync::Arc;
use std::time::Duration;
use tracing::Instrument;

#[derive(Clone, Debug)]
struct Metrics {
    identifiers_pruned: Counter<u64>,
}

impl Metrics {
    fn new() -> Self {
        let meter = global::meter("ads-contact-server");
        Self {
            identifiers_pruned: meter
                .u64_counter("rate_limit_identifiers_pruned_total")
                .with_description("Idle rate-limiter identifiers removed by the cleanup worker")
                .build(),
        }
    }
}

/// Periodically drops limiter identifiers whose attempts have all aged out,
/// so idle clients do not accumulate in memory.
#[derive(Debug)]
pub struct RateLimitCleanupWorker {
    limiters: Vec<Arc<SlidingWindowLimiter>>,
    interval_secs: u64,
    metrics: Metrics,
}

impl RateLimitCleanupWorker {
    #[must_use]
    pub fn new(limiters: Vec<Arc<SlidingWindowLimiter>>, interval_secs: u64) -> Self {
        Self { limiters, interval_secs, metrics: Metrics::new() }
    }

    pub async fn run(self, mut shutdown: tokio::sync::watch::Receiver<bool>) {
        let mut interval = tokio::time::interval(Duration::from_secs(self.interval_secs));

        while !*shutdown.borrow() {
            tokio::select! {
                _ = interval.tick() => {
                    self.perform_cleanup()
                        .instrument(tracing::info_span!("rate_limit_cleanup_iteration"))
                        .await;
                }
                _ = shutdown.changed() => {}
            }
        }
        tracing::info!("Rate limit cleanup loop shutting down...");
    }

    async fn perform_cleanup(&self) {
        let mut pruned = 0;
        for limiter in &self.limiters {
            pruned += limiter.purge_expired();
        }

        if pruned > 0 {
            tracing::debug!(count = %pruned, "Pruned idle rate-limit identifiers");
            self.metrics.identifiers_pruned.add(pruned as u64, &[]);
        }
    }
}
