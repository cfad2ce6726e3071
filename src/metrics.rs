// ═══════════════════════════════════════════════════════════════
// METRICS COLLECTOR - how many questions, how many answers, how many paywalls
// ═══════════════════════════════════════════════════════════════
//
// Atomic counters, no locks. A tiny HTTP listener serves the snapshot as
// JSON so whoever runs this thing can see whether the provider is healthy
// and how often free users hit the deep-dive limit.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::watch;
use tracing::{info, error};
use serde::Serialize;

use crate::circuit_breaker::{CircuitBreaker, CircuitBreakerSnapshot};

/// What gets serialized to JSON.
#[derive(Debug, Serialize, Clone)]
pub struct MetricsSnapshot {
    pub mode: String,
    pub http_requests: u64,
    pub gateway_calls: u64,
    pub gateway_failures: u64,
    pub decode_failures: u64,
    pub circuit_rejections: u64,
    pub demo_reports: u64,
    pub deep_dives_granted: u64,
    pub paywall_rejections: u64,
    pub mean_gateway_latency_ms: f64,
    pub uptime_seconds: u64,
    pub circuit_breaker: Option<CircuitBreakerSnapshot>,
}

pub struct MetricsCollector {
    mode: &'static str,
    http_requests: AtomicU64,
    gateway_calls: AtomicU64,
    gateway_failures: AtomicU64,
    decode_failures: AtomicU64,
    circuit_rejections: AtomicU64,
    demo_reports: AtomicU64,
    deep_dives_granted: AtomicU64,
    paywall_rejections: AtomicU64,
    gateway_seconds_total: portable_atomic::AtomicF64,
    start_time: Instant,
}

impl MetricsCollector {
    /// `mode` is "live" or "demo", reported verbatim.
    pub fn new(mode: &'static str) -> Self {
        Self {
            mode,
            http_requests: AtomicU64::new(0),
            gateway_calls: AtomicU64::new(0),
            gateway_failures: AtomicU64::new(0),
            decode_failures: AtomicU64::new(0),
            circuit_rejections: AtomicU64::new(0),
            demo_reports: AtomicU64::new(0),
            deep_dives_granted: AtomicU64::new(0),
            paywall_rejections: AtomicU64::new(0),
            gateway_seconds_total: portable_atomic::AtomicF64::new(0.0),
            start_time: Instant::now(),
        }
    }

    pub fn increment_http_requests(&self) {
        self.http_requests.fetch_add(1, Ordering::Relaxed);
    }

    /// One provider round trip finished, successfully or not.
    pub fn record_gateway_call(&self, elapsed: Duration) {
        self.gateway_calls.fetch_add(1, Ordering::Relaxed);
        self.gateway_seconds_total
            .fetch_add(elapsed.as_secs_f64(), Ordering::Relaxed);
    }

    pub fn increment_gateway_failures(&self) {
        self.gateway_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_decode_failures(&self) {
        self.decode_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_circuit_rejections(&self) {
        self.circuit_rejections.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_demo_reports(&self) {
        self.demo_reports.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_deep_dives_granted(&self) {
        self.deep_dives_granted.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_paywall_rejections(&self) {
        self.paywall_rejections.fetch_add(1, Ordering::Relaxed);
    }

    /// Lock-free snapshot of every counter.
    pub fn snapshot(&self, breaker: Option<&CircuitBreaker>) -> MetricsSnapshot {
        let calls = self.gateway_calls.load(Ordering::Relaxed);
        let total_secs = self.gateway_seconds_total.load(Ordering::Relaxed);
        let mean_gateway_latency_ms = if calls > 0 {
            total_secs * 1000.0 / calls as f64
        } else {
            0.0
        };

        MetricsSnapshot {
            mode: self.mode.to_string(),
            http_requests: self.http_requests.load(Ordering::Relaxed),
            gateway_calls: calls,
            gateway_failures: self.gateway_failures.load(Ordering::Relaxed),
            decode_failures: self.decode_failures.load(Ordering::Relaxed),
            circuit_rejections: self.circuit_rejections.load(Ordering::Relaxed),
            demo_reports: self.demo_reports.load(Ordering::Relaxed),
            deep_dives_granted: self.deep_dives_granted.load(Ordering::Relaxed),
            paywall_rejections: self.paywall_rejections.load(Ordering::Relaxed),
            mean_gateway_latency_ms,
            uptime_seconds: self.start_time.elapsed().as_secs(),
            circuit_breaker: breaker.map(CircuitBreaker::snapshot),
        }
    }
}

/// Serve the metrics snapshot as JSON on `addr` until shutdown.
pub async fn run_metrics_server(
    metrics: Arc<MetricsCollector>,
    breaker: Option<Arc<CircuitBreaker>>,
    addr: String,
    shutdown: &mut watch::Receiver<bool>,
) {
    use tokio::net::TcpListener;
    use tokio::io::AsyncWriteExt;

    let listener = match TcpListener::bind(&addr).await {
        Ok(l) => l,
        Err(e) => {
            error!("Failed to bind metrics server on {}: {}", addr, e);
            return;
        }
    };

    info!("📊 Metrics server listening on http://{}", addr);

    loop {
        tokio::select! {
            accept_result = listener.accept() => {
                match accept_result {
                    Ok((mut stream, _addr)) => {
                        let snapshot = metrics.snapshot(breaker.as_deref());
                        let json = serde_json::to_string_pretty(&snapshot)
                            .unwrap_or_else(|_| "{}".to_string());

                        let response = format!(
                            "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nAccess-Control-Allow-Origin: *\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                            json.len(),
                            json,
                        );

                        let _ = stream.write_all(response.as_bytes()).await;
                    }
                    Err(e) => {
                        error!("Metrics server accept error: {}", e);
                    }
                }
            }
            _ = shutdown.changed() => {
                info!("Metrics server: shutting down");
                break;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mean_latency() {
        let metrics = MetricsCollector::new("live");
        metrics.record_gateway_call(Duration::from_millis(100));
        metrics.record_gateway_call(Duration::from_millis(300));
        let snap = metrics.snapshot(None);
        assert_eq!(snap.gateway_calls, 2);
        assert!((snap.mean_gateway_latency_ms - 200.0).abs() < 1e-6);
        assert_eq!(snap.mode, "live");
    }

    #[test]
    fn test_snapshot_includes_breaker() {
        let metrics = MetricsCollector::new("live");
        let breaker = CircuitBreaker::new("provider", 2, Duration::from_secs(1), 1);
        let snap = metrics.snapshot(Some(&breaker));
        assert_eq!(snap.circuit_breaker.map(|b| b.name), Some("provider".to_string()));
    }
}
