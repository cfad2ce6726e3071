// =============================================================================
// circuit_breaker.rs - PROVIDER OUTAGE GUARD
// =============================================================================
//
// The model gateway never retries. One request, one answer, or one error.
// But when the provider is down hard, there is no point sending every
// dashboard load to it just to collect the same 503 again.
//
// So: after N consecutive failures the breaker OPENS and calls fail straight
// away without touching the network. After the reset timeout the breaker goes
// HALF_OPEN and lets calls through again. Recorded outcomes decide: enough
// successes and we are CLOSED, one failure and we are back to OPEN. Calls
// that arrive while half-open are not held back; each one is a probe.
// =============================================================================

use parking_lot::RwLock;
use std::time::{Duration, Instant};
use tracing::{info, warn};

/// Breaker states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub enum CircuitState {
    /// Requests flow.
    Closed,
    /// Requests are refused until the reset timeout passes.
    Open,
    /// Requests flow again; the next recorded outcomes decide what happens.
    HalfOpen,
}

impl std::fmt::Display for CircuitState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CircuitState::Closed => write!(f, "CLOSED"),
            CircuitState::Open => write!(f, "OPEN"),
            CircuitState::HalfOpen => write!(f, "HALF_OPEN"),
        }
    }
}

struct CircuitBreakerInner {
    state: CircuitState,
    failure_count: u32,
    success_count: u32,
    opened_at: Option<Instant>,
    total_trips: u64,
}

/// Thread-safe circuit breaker guarding one upstream.
pub struct CircuitBreaker {
    /// Upstream name, for the logs.
    name: String,
    inner: RwLock<CircuitBreakerInner>,
    failure_threshold: u32,
    reset_timeout: Duration,
    success_threshold: u32,
}

impl CircuitBreaker {
    /// Create a breaker.
    ///
    /// # Arguments
    /// * `name` - Human-readable upstream name for logging
    /// * `failure_threshold` - Consecutive failures before opening
    /// * `reset_timeout` - How long to stay open
    /// * `success_threshold` - Half-open successes needed to close
    pub fn new(
        name: impl Into<String>,
        failure_threshold: u32,
        reset_timeout: Duration,
        success_threshold: u32,
    ) -> Self {
        let name = name.into();
        info!(
            name = %name,
            failure_threshold = failure_threshold,
            reset_timeout_secs = reset_timeout.as_secs(),
            success_threshold = success_threshold,
            "Circuit breaker initialized"
        );

        Self {
            name,
            inner: RwLock::new(CircuitBreakerInner {
                state: CircuitState::Closed,
                failure_count: 0,
                success_count: 0,
                opened_at: None,
                total_trips: 0,
            }),
            failure_threshold: failure_threshold.max(1),
            reset_timeout,
            success_threshold: success_threshold.max(1),
        }
    }

    /// Whether a request may go out right now.
    ///
    /// An open breaker whose timeout has expired moves to half-open here.
    /// Half-open admits every caller until a success or failure is recorded.
    pub fn allow_request(&self) -> bool {
        let mut inner = self.inner.write();

        match inner.state {
            CircuitState::Closed | CircuitState::HalfOpen => true,
            CircuitState::Open => {
                let expired = inner
                    .opened_at
                    .map(|at| at.elapsed() >= self.reset_timeout)
                    .unwrap_or(true);
                if expired {
                    info!(name = %self.name, "Circuit breaker OPEN -> HALF_OPEN, letting requests through");
                    inner.state = CircuitState::HalfOpen;
                    inner.success_count = 0;
                    true
                } else {
                    warn!(name = %self.name, "Circuit breaker OPEN, request refused");
                    false
                }
            }
        }
    }

    /// Record a successful call.
    pub fn record_success(&self) {
        let mut inner = self.inner.write();

        match inner.state {
            CircuitState::Closed => inner.failure_count = 0,
            CircuitState::HalfOpen => {
                inner.success_count += 1;
                if inner.success_count >= self.success_threshold {
                    info!(name = %self.name, "Circuit breaker HALF_OPEN -> CLOSED, upstream healthy again");
                    inner.state = CircuitState::Closed;
                    inner.failure_count = 0;
                    inner.success_count = 0;
                    inner.opened_at = None;
                }
            }
            CircuitState::Open => {
                warn!(name = %self.name, "Success recorded while circuit is OPEN");
            }
        }
    }

    /// Record a failed call.
    pub fn record_failure(&self) {
        let mut inner = self.inner.write();

        match inner.state {
            CircuitState::Closed => {
                inner.failure_count += 1;
                if inner.failure_count >= self.failure_threshold {
                    warn!(
                        name = %self.name,
                        failures = inner.failure_count,
                        "Circuit breaker TRIPPED, CLOSED -> OPEN"
                    );
                    inner.state = CircuitState::Open;
                    inner.opened_at = Some(Instant::now());
                    inner.total_trips += 1;
                } else {
                    warn!(
                        name = %self.name,
                        failures = inner.failure_count,
                        threshold = self.failure_threshold,
                        "Upstream failure {}/{} before circuit trips",
                        inner.failure_count,
                        self.failure_threshold
                    );
                }
            }
            CircuitState::HalfOpen => {
                warn!(name = %self.name, "Trial request failed, HALF_OPEN -> OPEN");
                inner.state = CircuitState::Open;
                inner.opened_at = Some(Instant::now());
                inner.total_trips += 1;
            }
            CircuitState::Open => {
                inner.opened_at = Some(Instant::now());
            }
        }
    }

    #[cfg(test)]
    pub fn state(&self) -> CircuitState {
        self.inner.read().state
    }

    /// Serializable view for the metrics endpoint.
    pub fn snapshot(&self) -> CircuitBreakerSnapshot {
        let inner = self.inner.read();
        CircuitBreakerSnapshot {
            name: self.name.clone(),
            state: inner.state,
            failure_count: inner.failure_count,
            total_trips: inner.total_trips,
        }
    }
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct CircuitBreakerSnapshot {
    pub name: String,
    pub state: CircuitState,
    pub failure_count: u32,
    pub total_trips: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_closed() {
        let cb = CircuitBreaker::new("test", 3, Duration::from_secs(5), 1);
        assert_eq!(cb.state(), CircuitState::Closed);
        assert!(cb.allow_request());
    }

    #[test]
    fn test_trips_after_threshold_failures() {
        let cb = CircuitBreaker::new("test", 3, Duration::from_secs(5), 1);
        cb.record_failure();
        cb.record_failure();
        assert_eq!(cb.state(), CircuitState::Closed);
        cb.record_failure();
        assert_eq!(cb.state(), CircuitState::Open);
        assert!(!cb.allow_request());
        assert_eq!(cb.snapshot().total_trips, 1);
    }

    #[test]
    fn test_success_resets_failure_count() {
        let cb = CircuitBreaker::new("test", 3, Duration::from_secs(5), 1);
        cb.record_failure();
        cb.record_failure();
        cb.record_success();
        cb.record_failure();
        assert_eq!(cb.state(), CircuitState::Closed);
    }

    #[test]
    fn test_half_open_trial_closes_on_success() {
        let cb = CircuitBreaker::new("test", 1, Duration::from_millis(0), 1);
        cb.record_failure();
        assert_eq!(cb.state(), CircuitState::Open);
        // zero timeout: the next request is the trial
        assert!(cb.allow_request());
        assert_eq!(cb.state(), CircuitState::HalfOpen);
        cb.record_success();
        assert_eq!(cb.state(), CircuitState::Closed);
    }

    #[test]
    fn test_half_open_admits_every_caller_until_a_verdict() {
        let cb = CircuitBreaker::new("test", 1, Duration::from_millis(0), 2);
        cb.record_failure();
        assert!(cb.allow_request());
        assert!(cb.allow_request());
        assert!(cb.allow_request());
        assert_eq!(cb.state(), CircuitState::HalfOpen);
        cb.record_success();
        assert_eq!(cb.state(), CircuitState::HalfOpen);
        cb.record_success();
        assert_eq!(cb.state(), CircuitState::Closed);
    }

    #[test]
    fn test_half_open_trial_failure_reopens() {
        let cb = CircuitBreaker::new("test", 1, Duration::from_millis(0), 1);
        cb.record_failure();
        assert!(cb.allow_request());
        cb.record_failure();
        assert_eq!(cb.state(), CircuitState::Open);
        assert_eq!(cb.snapshot().total_trips, 2);
    }
}
