use dashmap::DashMap;
use ipnetwork::IpNetwork;
use opentelemetry::{KeyValue, global, metrics::Counter};
use std::net::IpAddr;
use std::time::Duration;
use time::OffsetDateTime;

#[derive(Clone, Debug)]
struct Metrics {
    decisions_total: Counter<u64>,
}

impl Metrics {
    fn new() -> Self {
        let meter = global::meter("ads-contact-server");
        Self {
            decisions_total: meter
                .u64_counter("rate_limit_decisions_total")
                .with_description("Rate limit decisions (allowed/throttled)")
                .build(),
        }
    }
}

fn unix_millis() -> i64 {
    #[allow(clippy::cast_possible_truncation)]
    {
        (OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000) as i64
    }
}

/// Counts attempts per identifier over a sliding window.
///
/// Each check prunes entries older than the window, rejects once the
/// remaining count reaches the limit (without recording the rejected
/// attempt), and otherwise records the attempt. The whole read-modify-write
/// runs under the map's per-key entry guard, so two simultaneous checks for
/// the same identifier cannot both slip under the threshold.
#[derive(Debug)]
pub struct SlidingWindowLimiter {
    name: &'static str,
    max_attempts: u32,
    window: Duration,
    attempts: DashMap<String, Vec<i64>>,
    metrics: Metrics,
}

impl SlidingWindowLimiter {
    #[must_use]
    pub fn new(name: &'static str, max_attempts: u32, window: Duration) -> Self {
        Self { name, max_attempts, window, attempts: DashMap::new(), metrics: Metrics::new() }
    }

    /// Returns true when the attempt is accepted (and recorded).
    pub fn check(&self, identifier: &str) -> bool {
        let accepted = self.check_at(identifier, unix_millis());
        let label = if accepted { "allowed" } else { "throttled" };
        self.metrics
            .decisions_total
            .add(1, &[KeyValue::new("limiter", self.name), KeyValue::new("status", label)]);
        if !accepted {
            tracing::warn!(limiter = self.name, identifier = %identifier, "Rate limit exceeded");
        }
        accepted
    }

    fn window_millis(&self) -> i64 {
        i64::try_from(self.window.as_millis()).unwrap_or(i64::MAX)
    }

    fn check_at(&self, identifier: &str, now_millis: i64) -> bool {
        let cutoff = now_millis - self.window_millis();
        let mut entry = self.attempts.entry(identifier.to_string()).or_default();
        entry.retain(|&stamp| stamp > cutoff);
        if entry.len() >= self.max_attempts as usize {
            return false;
        }
        entry.push(now_millis);
        true
    }

    /// Drops identifiers whose every recorded attempt has aged out of the
    /// window. Returns how many identifiers were removed.
    pub fn purge_expired(&self) -> usize {
        let cutoff = unix_millis() - self.window_millis();
        let before = self.attempts.len();
        self.attempts.retain(|_, stamps| {
            stamps.retain(|&stamp| stamp > cutoff);
            !stamps.is_empty()
        });
        before.saturating_sub(self.attempts.len())
    }

    #[must_use]
    pub fn tracked_identifiers(&self) -> usize {
        self.attempts.len()
    }
}

/// Resolves the real client IP behind trusted reverse proxies.
///
/// `X-Forwarded-For` is only honored when the peer itself is a trusted
/// proxy; the chain is walked right to left and the first untrusted hop
/// wins.
#[derive(Clone, Debug)]
pub struct ClientIpResolver {
    trusted_proxies: Vec<IpNetwork>,
}

impl ClientIpResolver {
    #[must_use]
    pub fn new(trusted_proxies: Vec<IpNetwork>) -> Self {
        Self { trusted_proxies }
    }

    #[must_use]
    pub fn identify_client_ip(&self, headers: &axum::http::HeaderMap, peer_addr: IpAddr) -> IpAddr {
        if !self.is_trusted(&peer_addr) {
            return peer_addr;
        }

        let xff = headers.get("x-forwarded-for").and_then(|v| v.to_str().ok());

        if let Some(xff_val) = xff
            && let Some(real_ip) =
                xff_val.rsplit(',').filter_map(|s| s.trim().parse::<IpAddr>().ok()).find(|ip| !self.is_trusted(ip))
        {
            return real_ip;
        }

        peer_addr
    }

    fn is_trusted(&self, ip: &IpAddr) -> bool {
        self.trusted_proxies.iter().any(|net| net.contains(*ip))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderMap;

    fn limiter(max: u32, window_secs: u64) -> SlidingWindowLimiter {
        SlidingWindowLimiter::new("test", max, Duration::from_secs(window_secs))
    }

    #[test]
    fn test_accepts_up_to_limit_then_rejects() {
        let limiter = limiter(5, 3600);
        let now = unix_millis();
        for attempt in 0..5 {
            assert!(limiter.check_at("203.0.113.7", now), "attempt {attempt} should pass");
        }
        assert!(!limiter.check_at("203.0.113.7", now));
        // rejected attempts are not recorded
        assert!(!limiter.check_at("203.0.113.7", now));
    }

    #[test]
    fn test_identifiers_are_independent() {
        let limiter = limiter(1, 3600);
        let now = unix_millis();
        assert!(limiter.check_at("203.0.113.7", now));
        assert!(limiter.check_at("203.0.113.8", now));
        assert!(!limiter.check_at("203.0.113.7", now));
    }

    #[test]
    fn test_window_expiry_frees_the_identifier() {
        let limiter = limiter(3, 60);
        let start = 1_000_000_000_000;
        for _ in 0..3 {
            assert!(limiter.check_at("client", start));
        }
        assert!(!limiter.check_at("client", start + 59_999));
        // all recorded attempts are now older than the window
        assert!(limiter.check_at("client", start + 60_001));
    }

    #[test]
    fn test_partial_expiry_only_forgets_old_attempts() {
        let limiter = limiter(2, 60);
        let start = 1_000_000_000_000;
        assert!(limiter.check_at("client", start));
        assert!(limiter.check_at("client", start + 30_000));
        // first attempt expired, second still counts
        assert!(limiter.check_at("client", start + 60_001));
        assert!(!limiter.check_at("client", start + 60_002));
    }

    #[test]
    fn test_purge_expired_drops_idle_identifiers() {
        let limiter = limiter(5, 0);
        assert!(limiter.check_at("stale", unix_millis() - 10_000));
        assert_eq!(limiter.tracked_identifiers(), 1);
        assert_eq!(limiter.purge_expired(), 1);
        assert_eq!(limiter.tracked_identifiers(), 0);
    }

    #[test]
    fn test_untrusted_peer_ignores_forwarded_header() {
        let resolver = ClientIpResolver::new(vec!["10.0.0.0/8".parse().expect("valid cidr")]);
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", "198.51.100.1".parse().expect("valid header"));

        let peer: IpAddr = "203.0.113.50".parse().expect("valid ip");
        assert_eq!(resolver.identify_client_ip(&headers, peer), peer);
    }

    #[test]
    fn test_trusted_peer_walks_chain_right_to_left() {
        let resolver = ClientIpResolver::new(vec!["10.0.0.0/8".parse().expect("valid cidr")]);
        let mut headers = HeaderMap::new();
        headers.insert(
            "x-forwarded-for",
            "198.51.100.1, 203.0.113.9, 10.1.2.3".parse().expect("valid header"),
        );

        let peer: IpAddr = "10.0.0.1".parse().expect("valid ip");
        let resolved = resolver.identify_client_ip(&headers, peer);
        assert_eq!(resolved, "203.0.113.9".parse::<IpAddr>().expect("valid ip"));
    }

    #[test]
    fn test_trusted_peer_without_header_keeps_peer() {
        let resolver = ClientIpResolver::new(vec!["10.0.0.0/8".parse().expect("valid cidr")]);
        let peer: IpAddr = "10.0.0.1".parse().expect("valid ip");
        assert_eq!(resolver.identify_client_ip(&HeaderMap::new(), peer), peer);
    }
}
