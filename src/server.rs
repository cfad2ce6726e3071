// =============================================================================
// server.rs - THE DASHBOARD COUNTER
// =============================================================================
//
// A deliberately small HTTP/1.1 server on a raw tokio TcpListener, same
// school as the metrics endpoint: read one request, answer with JSON, close
// the connection. Every connection gets its own task, so a slow model call
// for Brazil does not hold up the landing page for anybody else.
//
// Status codes:
//   200  the view model
//   400  the request made no sense (bad query params, unknown tier)
//   402  the paywall said no
//   404  no such route
//   502  the model failed us; one generic message, details only in the logs
// =============================================================================

use chrono::Utc;
use serde::Serialize;
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

use crate::activity::{build_feed, ActivityItem};
use crate::landing;
use crate::metrics::MetricsCollector;
use crate::models::{
    Alert, Bill, CityData, CountryData, DeepDiveResult, GovernmentLevel, GovernmentReport,
    LocationSearchResult, RiskBand, StateData,
};
use crate::query::DeepDiveRequest;
use crate::routes::{self, slugify, Route, RouteError};
use crate::source::{AnalysisError, ReportSource};
use crate::suggestions::{suggestions_for, DeepDiveSuggestion};
use crate::usage::{UsageCounter, UsageSnapshot};

/// The only thing a user ever learns about a failed analysis.
pub const ANALYSIS_FAILED: &str = "Failed to complete comprehensive analysis. Please try again.";

/// Alerts and bills shown on a country dashboard before "view all".
pub const DEFAULT_VISIBLE: usize = 3;
/// How many alerts and bills feed the activity stream by default.
pub const FEED_SOURCE_ITEMS: usize = 5;
pub const FEED_CAP: usize = 10;
pub const FEED_CAP_ALL: usize = 50;

const MAX_REQUEST_BYTES: usize = 64 * 1024;
/// A client gets this long to deliver its whole request.
pub const REQUEST_READ_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Error, Debug)]
pub enum ServerError {
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },
    #[error("connection I/O: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed HTTP request: {0}")]
    BadRequest(String),
    #[error("request larger than 64 KiB")]
    TooLarge,
    #[error("request not received within {0:?}")]
    Timeout(Duration),
}

/// Everything a request handler needs. Cheap to clone.
#[derive(Clone)]
pub struct AppState {
    pub source: Arc<dyn ReportSource>,
    pub usage: Arc<UsageCounter>,
    pub metrics: Arc<MetricsCollector>,
}

// =============================================================================
// View models
// =============================================================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchView {
    pub query: String,
    pub results: Vec<LocationSearchResult>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CountryDashboard {
    pub mode: &'static str,
    pub view_all: bool,
    pub risk_band: RiskBand,
    /// The report exactly as decoded.
    pub report: GovernmentReport,
    pub visible_alerts: Vec<Alert>,
    pub visible_bills: Vec<Bill>,
    pub activity: Vec<ActivityItem>,
    pub suggestions: Vec<DeepDiveSuggestion>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CountryProfileView {
    pub mode: &'static str,
    pub risk_band: RiskBand,
    pub country: CountryData,
    pub dashboard_href: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CityLink {
    pub name: String,
    pub corruption_risk: u32,
    pub href: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StateDashboard {
    pub mode: &'static str,
    pub risk_band: RiskBand,
    pub state: StateData,
    pub cities: Vec<CityLink>,
    pub back_href: String,
    pub suggestions: Vec<DeepDiveSuggestion>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CityDashboard {
    pub mode: &'static str,
    pub risk_band: RiskBand,
    pub city: CityData,
    pub back_href: String,
    pub suggestions: Vec<DeepDiveSuggestion>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeepDiveView {
    pub mode: &'static str,
    pub result: DeepDiveResult,
    pub usage: UsageSnapshot,
}

pub fn country_dashboard(
    mode: &'static str,
    report: GovernmentReport,
    view_all: bool,
    now: chrono::DateTime<Utc>,
) -> CountryDashboard {
    let (feed_limit, cap, visible) = if view_all {
        (usize::MAX, FEED_CAP_ALL, usize::MAX)
    } else {
        (FEED_SOURCE_ITEMS, FEED_CAP, DEFAULT_VISIBLE)
    };

    let head = |len: usize, limit: usize| len.min(limit);
    let activity = build_feed(
        &report.alerts[..head(report.alerts.len(), feed_limit)],
        &report.active_bills[..head(report.active_bills.len(), feed_limit)],
        now,
        cap,
    );

    let location = if report.display_name.is_empty() {
        report.country.as_str()
    } else {
        report.display_name.as_str()
    };

    CountryDashboard {
        mode,
        view_all,
        risk_band: RiskBand::from_score(report.corruption_risk),
        visible_alerts: report.alerts.iter().take(visible).cloned().collect(),
        visible_bills: report.active_bills.iter().take(visible).cloned().collect(),
        activity,
        suggestions: suggestions_for(location, GovernmentLevel::Country),
        report,
    }
}

// =============================================================================
// HTTP plumbing
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: String,
    pub target: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub status: u16,
    pub body: String,
}

impl Response {
    pub fn json<T: Serialize>(status: u16, value: &T) -> Self {
        match serde_json::to_string(value) {
            Ok(body) => Response { status, body },
            Err(e) => {
                error!("Failed to serialize response body: {}", e);
                Response {
                    status: 500,
                    body: r#"{"error":"internal error"}"#.to_string(),
                }
            }
        }
    }

    pub fn error(status: u16, message: impl Into<String>) -> Self {
        let message: String = message.into();
        Self::json(status, &serde_json::json!({ "error": message }))
    }

    fn reason(&self) -> &'static str {
        match self.status {
            200 => "OK",
            400 => "Bad Request",
            402 => "Payment Required",
            404 => "Not Found",
            408 => "Request Timeout",
            502 => "Bad Gateway",
            _ => "Internal Server Error",
        }
    }

    fn to_http(&self) -> String {
        format!(
            "HTTP/1.1 {} {}\r\nContent-Type: application/json\r\nAccess-Control-Allow-Origin: *\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            self.status,
            self.reason(),
            self.body.len(),
            self.body,
        )
    }
}

/// Read one request: the request line, the headers, and whatever body the
/// Content-Length announces (read and discarded; no route takes a body).
pub async fn read_request<S: AsyncRead + Unpin>(stream: &mut S) -> Result<HttpRequest, ServerError> {
    let mut buf = Vec::with_capacity(1024);
    let mut chunk = [0u8; 4096];

    let header_end = loop {
        if let Some(pos) = find_header_end(&buf) {
            break pos;
        }
        if buf.len() > MAX_REQUEST_BYTES {
            return Err(ServerError::TooLarge);
        }
        let n = stream.read(&mut chunk).await?;
        if n == 0 {
            return Err(ServerError::BadRequest("connection closed before headers ended".into()));
        }
        buf.extend_from_slice(&chunk[..n]);
    };

    let head = std::str::from_utf8(&buf[..header_end])
        .map_err(|_| ServerError::BadRequest("headers are not UTF-8".into()))?;
    let mut lines = head.split("\r\n");
    let request_line = lines.next().unwrap_or_default();
    let mut parts = request_line.split_whitespace();
    let (method, target) = match (parts.next(), parts.next()) {
        (Some(m), Some(t)) => (m.to_string(), t.to_string()),
        _ => return Err(ServerError::BadRequest(format!("bad request line '{request_line}'"))),
    };

    let content_length = lines
        .filter_map(|line| line.split_once(':'))
        .find(|(name, _)| name.trim().eq_ignore_ascii_case("content-length"))
        .and_then(|(_, value)| value.trim().parse::<usize>().ok())
        .unwrap_or(0);
    if content_length > MAX_REQUEST_BYTES {
        return Err(ServerError::TooLarge);
    }

    let mut body_read = buf.len() - (header_end + 4);
    while body_read < content_length {
        let n = stream.read(&mut chunk).await?;
        if n == 0 {
            break;
        }
        body_read += n;
    }

    Ok(HttpRequest { method, target })
}

/// [`read_request`] with a deadline. A silent client is cut off instead of
/// holding its task open forever.
pub async fn read_request_within<S: AsyncRead + Unpin>(
    stream: &mut S,
    limit: Duration,
) -> Result<HttpRequest, ServerError> {
    tokio::time::timeout(limit, read_request(stream))
        .await
        .unwrap_or_else(|_| Err(ServerError::Timeout(limit)))
}

fn find_header_end(buf: &[u8]) -> Option<usize> {
    buf.windows(4).position(|w| w == b"\r\n\r\n")
}

async fn write_response<S: AsyncWrite + Unpin>(
    stream: &mut S,
    response: &Response,
) -> Result<(), ServerError> {
    stream.write_all(response.to_http().as_bytes()).await?;
    stream.shutdown().await?;
    Ok(())
}

// =============================================================================
// Routing
// =============================================================================

/// Answer one request. Pure with respect to the socket, so tests can call it
/// directly.
pub async fn handle(state: &AppState, method: &str, target: &str) -> Response {
    let route = match routes::parse(method, target) {
        Ok(route) => route,
        Err(e @ RouteError::NotFound { .. }) => return Response::error(404, e.to_string()),
        Err(e) => return Response::error(400, e.to_string()),
    };

    let mode = state.source.mode();
    match route {
        Route::Landing => Response::json(200, &landing::landing_view(mode)),

        Route::Search { query } => {
            let results = state.source.search_locations(&query).await;
            Response::json(200, &SearchView { query, results })
        }

        Route::Country { country, view_all } => {
            match state.source.government_report(&country).await {
                Ok(report) => Response::json(200, &country_dashboard(mode, report, view_all, Utc::now())),
                Err(e) => analysis_failed(&country, e),
            }
        }

        Route::CountryProfile { country } => match state.source.country_profile(&country).await {
            Ok(profile) => Response::json(
                200,
                &CountryProfileView {
                    mode,
                    risk_band: RiskBand::from_score(profile.corruption_risk),
                    dashboard_href: format!("/dashboard/{}", slugify(&country)),
                    country: profile,
                },
            ),
            Err(e) => analysis_failed(&country, e),
        },

        Route::State { country, state: region } => {
            let both = futures::future::try_join(
                state.source.state_report(&country, &region),
                state.source.city_listing(&country, &region),
            )
            .await;
            match both {
                Ok((report, cities)) => {
                    let base = format!("/dashboard/{}/{}", slugify(&country), slugify(&region));
                    let view = StateDashboard {
                        mode,
                        risk_band: RiskBand::from_score(report.corruption_risk),
                        cities: cities
                            .into_iter()
                            .map(|c| CityLink {
                                href: format!("{base}/{}", slugify(&c.name)),
                                name: c.name,
                                corruption_risk: c.corruption_risk,
                            })
                            .collect(),
                        back_href: format!("/dashboard/{}", slugify(&country)),
                        suggestions: suggestions_for(&region, GovernmentLevel::State),
                        state: report,
                    };
                    Response::json(200, &view)
                }
                Err(e) => analysis_failed(&region, e),
            }
        }

        Route::City { country, state: region, city } => {
            match state.source.city_report(&country, &region, &city).await {
                Ok(report) => Response::json(
                    200,
                    &CityDashboard {
                        mode,
                        risk_band: RiskBand::from_score(report.corruption_risk),
                        back_href: format!("/dashboard/{}/{}", slugify(&country), slugify(&region)),
                        suggestions: suggestions_for(&city, GovernmentLevel::City),
                        city: report,
                    },
                ),
                Err(e) => analysis_failed(&city, e),
            }
        }

        Route::DeepDive(request) => deep_dive(state, request).await,

        Route::Usage => Response::json(200, &state.usage.snapshot()),

        Route::Upgrade(tier) => Response::json(200, &state.usage.upgrade(tier)),

        Route::Access(feature) => match state.usage.check_feature(feature) {
            Ok(()) => Response::json(200, &state.usage.snapshot()),
            Err(prompt) => {
                state.metrics.increment_paywall_rejections();
                Response::json(402, &prompt)
            }
        },

        Route::DismissPaywall => {
            state.usage.dismiss_paywall();
            Response::json(200, &state.usage.snapshot())
        }
    }
}

/// Paywall first. A refused request never gets as far as the model.
async fn deep_dive(state: &AppState, request: DeepDiveRequest) -> Response {
    let usage = match state.usage.try_begin_deep_dive() {
        Ok(usage) => {
            state.metrics.increment_deep_dives_granted();
            usage
        }
        Err(prompt) => {
            state.metrics.increment_paywall_rejections();
            return Response::json(402, &prompt);
        }
    };

    match state.source.deep_dive(&request).await {
        Ok(result) => Response::json(
            200,
            &DeepDiveView {
                mode: state.source.mode(),
                result,
                usage,
            },
        ),
        Err(e) => analysis_failed(&request.location, e),
    }
}

fn analysis_failed(location: &str, err: AnalysisError) -> Response {
    match &err {
        AnalysisError::Gateway(e) => error!(%location, error = %e, "Analysis failed at the model gateway"),
        AnalysisError::Decode(e) => error!(%location, error = %e, "Analysis failed decoding the model output"),
    }
    Response::error(502, ANALYSIS_FAILED)
}

// =============================================================================
// Accept loop
// =============================================================================

/// Bind `addr` and serve until shutdown.
pub async fn run_server(
    state: AppState,
    addr: String,
    shutdown: &mut watch::Receiver<bool>,
) -> Result<(), ServerError> {
    let listener = TcpListener::bind(&addr)
        .await
        .map_err(|source| ServerError::Bind { addr: addr.clone(), source })?;
    info!("🏛️ Dashboard server listening on http://{}", addr);
    serve(listener, state, shutdown).await;
    Ok(())
}

pub async fn serve(listener: TcpListener, state: AppState, shutdown: &mut watch::Receiver<bool>) {
    loop {
        tokio::select! {
            accept_result = listener.accept() => {
                match accept_result {
                    Ok((stream, peer)) => {
                        let state = state.clone();
                        tokio::spawn(async move {
                            if let Err(e) = handle_connection(stream, &state).await {
                                debug!(%peer, error = %e, "Connection ended badly");
                            }
                        });
                    }
                    Err(e) => {
                        error!("Dashboard server accept error: {}", e);
                    }
                }
            }
            _ = shutdown.changed() => {
                info!("Dashboard server: shutting down");
                break;
            }
        }
    }
}

async fn handle_connection<S: AsyncRead + AsyncWrite + Unpin>(
    mut stream: S,
    state: &AppState,
) -> Result<(), ServerError> {
    state.metrics.increment_http_requests();
    let started = Instant::now();

    let request = match read_request_within(&mut stream, REQUEST_READ_TIMEOUT).await {
        Ok(request) => request,
        Err(e) => {
            let status = if matches!(e, ServerError::Timeout(_)) { 408 } else { 400 };
            warn!(error = %e, status, "Rejecting request");
            write_response(&mut stream, &Response::error(status, e.to_string())).await?;
            return Err(e);
        }
    };

    let response = handle(state, &request.method, &request.target).await;
    info!(
        method = %request.method,
        target = %request.target,
        status = response.status,
        elapsed_ms = started.elapsed().as_millis() as u64,
        "Request served"
    );
    write_response(&mut stream, &response).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::circuit_breaker::CircuitBreaker;
    use crate::gateway::tests::FakeTransport;
    use crate::gateway::ModelGateway;
    use crate::source::{DemoSource, LiveSource};
    use serde_json::Value;
    use std::sync::atomic::Ordering;
    use std::time::Duration;

    fn demo_state(limit: u32) -> AppState {
        let metrics = Arc::new(MetricsCollector::new("demo"));
        AppState {
            source: Arc::new(DemoSource::new(metrics.clone())),
            usage: Arc::new(UsageCounter::new(limit)),
            metrics,
        }
    }

    fn live_state(transport: Arc<FakeTransport>, limit: u32) -> AppState {
        let metrics = Arc::new(MetricsCollector::new("live"));
        let breaker = Arc::new(CircuitBreaker::new("test", 5, Duration::from_secs(60), 1));
        let gateway = ModelGateway::new(transport, breaker, metrics.clone());
        AppState {
            source: Arc::new(LiveSource::new(gateway, None, metrics.clone())),
            usage: Arc::new(UsageCounter::new(limit)),
            metrics,
        }
    }

    fn body(response: &Response) -> Value {
        serde_json::from_str(&response.body).unwrap()
    }

    #[tokio::test]
    async fn test_united_states_end_to_end() {
        let state = demo_state(3);
        let path = format!("/dashboard/{}", slugify("United States"));
        assert_eq!(path, "/dashboard/united-states");

        let first = handle(&state, "GET", &path).await;
        assert_eq!(first.status, 200);
        let json = body(&first);
        assert_eq!(json["report"]["corruptionRisk"], 67);
        assert_eq!(json["report"]["activeBills"].as_array().unwrap().len(), 6);
        assert_eq!(json["report"]["displayName"], "United States");
        assert_eq!(json["visibleBills"].as_array().unwrap().len(), 3);
        assert_eq!(json["riskBand"], "Medium");

        // same report every time
        let second = body(&handle(&state, "GET", &path).await);
        assert_eq!(json["report"], second["report"]);
    }

    #[tokio::test]
    async fn test_view_all_shows_everything() {
        let state = demo_state(3);
        let json = body(&handle(&state, "GET", "/dashboard/united-states?view=all").await);
        assert_eq!(json["visibleBills"].as_array().unwrap().len(), 6);
        assert_eq!(json["activity"].as_array().unwrap().len(), 9);

        let json = body(&handle(&state, "GET", "/dashboard/united-states").await);
        assert_eq!(json["activity"].as_array().unwrap().len(), 8);
    }

    #[tokio::test]
    async fn test_state_dashboard_links_cities() {
        let state = demo_state(3);
        let response = handle(&state, "GET", "/dashboard/united-states/texas").await;
        assert_eq!(response.status, 200);
        let json = body(&response);
        assert_eq!(json["state"]["corruptionRisk"], 42);
        assert_eq!(json["cities"][1]["href"], "/dashboard/united-states/texas/metro-city");
        assert_eq!(json["backHref"], "/dashboard/united-states");
    }

    #[tokio::test]
    async fn test_country_profile_card() {
        let state = demo_state(3);
        let json = body(&handle(&state, "GET", "/profile/south-africa").await);
        assert_eq!(json["country"]["name"], "South Africa");
        assert_eq!(json["country"]["corruptionRisk"], 55);
        assert_eq!(json["riskBand"], "Medium");
        assert_eq!(json["dashboardHref"], "/dashboard/south-africa");
    }

    #[tokio::test]
    async fn test_city_dashboard() {
        let state = demo_state(3);
        let json = body(&handle(&state, "GET", "/dashboard/united-states/texas/austin").await);
        assert_eq!(json["city"]["name"], "Austin");
        assert_eq!(json["suggestions"][4]["id"], "development-projects");
    }

    #[tokio::test]
    async fn test_deep_dive_paywall_over_http() {
        let state = demo_state(3);
        let target = "/deep-dive?location=Austin&topic=Zoning&level=city";
        for used in 1..=3 {
            let response = handle(&state, "GET", target).await;
            assert_eq!(response.status, 200);
            assert_eq!(body(&response)["usage"]["deepDivesUsed"], used);
        }

        let refused = handle(&state, "GET", target).await;
        assert_eq!(refused.status, 402);
        assert_eq!(body(&refused)["feature"], "Deep Dive Investigation");

        assert_eq!(handle(&state, "POST", "/upgrade/pro").await.status, 200);
        assert_eq!(handle(&state, "GET", target).await.status, 200);
    }

    #[tokio::test]
    async fn test_refused_deep_dive_never_calls_the_model() {
        let transport = Arc::new(FakeTransport::answering(Some("{}")));
        let state = live_state(transport.clone(), 0);
        let response = handle(&state, "GET", "/deep-dive?location=Austin&topic=Zoning").await;
        assert_eq!(response.status, 402);
        assert_eq!(transport.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_model_failure_is_a_generic_502() {
        let transport = Arc::new(FakeTransport::failing());
        let state = live_state(transport.clone(), 3);
        let response = handle(&state, "GET", "/dashboard/brazil").await;
        assert_eq!(response.status, 502);
        assert_eq!(body(&response)["error"], ANALYSIS_FAILED);
        assert_eq!(transport.calls.load(Ordering::SeqCst), 1);

        let transport = Arc::new(FakeTransport::answering(Some("not json at all")));
        let response = handle(&live_state(transport, 3), "GET", "/dashboard/brazil").await;
        assert_eq!(response.status, 502);
        assert_eq!(body(&response)["error"], ANALYSIS_FAILED);
    }

    #[tokio::test]
    async fn test_status_codes() {
        let state = demo_state(3);
        assert_eq!(handle(&state, "GET", "/nope").await.status, 404);
        assert_eq!(handle(&state, "GET", "/deep-dive?topic=x").await.status, 400);
        assert_eq!(handle(&state, "POST", "/upgrade/platinum").await.status, 400);
        assert_eq!(handle(&state, "GET", "/").await.status, 200);
        assert_eq!(handle(&state, "GET", "/usage").await.status, 200);
    }

    #[tokio::test]
    async fn test_feature_access_and_dismiss() {
        let state = demo_state(3);
        let refused = handle(&state, "GET", "/access/historical-analysis").await;
        assert_eq!(refused.status, 402);
        assert_eq!(body(&refused)["feature"], "Historical Analysis");
        assert!(!body(&handle(&state, "GET", "/usage").await)["paywall"].is_null());

        let dismissed = handle(&state, "POST", "/paywall/dismiss").await;
        assert!(body(&dismissed)["paywall"].is_null());

        handle(&state, "POST", "/upgrade/premium").await;
        assert_eq!(handle(&state, "GET", "/access/api-access").await.status, 200);
    }

    #[tokio::test]
    async fn test_search_route() {
        let state = demo_state(3);
        let json = body(&handle(&state, "GET", "/search?q=pau").await);
        assert_eq!(json["results"][0]["name"], "São Paulo");
    }

    #[tokio::test]
    async fn test_serves_over_tcp() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (shutdown_tx, mut shutdown_rx) = watch::channel(false);
        let server = tokio::spawn(async move {
            serve(listener, demo_state(3), &mut shutdown_rx).await;
        });

        let mut stream = tokio::net::TcpStream::connect(addr).await.unwrap();
        stream
            .write_all(b"GET /dashboard/united-states HTTP/1.1\r\nHost: localhost\r\n\r\n")
            .await
            .unwrap();
        let mut raw = String::new();
        stream.read_to_string(&mut raw).await.unwrap();

        assert!(raw.starts_with("HTTP/1.1 200 OK\r\n"));
        let (_, json) = raw.split_once("\r\n\r\n").unwrap();
        let json: Value = serde_json::from_str(json).unwrap();
        assert_eq!(json["report"]["corruptionRisk"], 67);

        shutdown_tx.send(true).unwrap();
        server.await.unwrap();
    }

    #[tokio::test]
    async fn test_silent_client_times_out() {
        // client half stays open and never writes
        let (_client, mut server_side) = tokio::io::duplex(1024);
        let started = Instant::now();
        let err = read_request_within(&mut server_side, Duration::from_millis(50))
            .await
            .unwrap_err();
        assert!(matches!(err, ServerError::Timeout(_)));
        assert!(started.elapsed() < Duration::from_secs(5));
    }

    #[tokio::test]
    async fn test_prompt_client_within_deadline() {
        let (mut client, mut server_side) = tokio::io::duplex(1024);
        client.write_all(b"GET /usage HTTP/1.1\r\n\r\n").await.unwrap();
        let request = read_request_within(&mut server_side, Duration::from_secs(5))
            .await
            .unwrap();
        assert_eq!(request.target, "/usage");
    }

    #[tokio::test]
    async fn test_read_request_consumes_body() {
        let raw = b"POST /upgrade/pro HTTP/1.1\r\nContent-Length: 5\r\n\r\nhello".to_vec();
        let mut reader = std::io::Cursor::new(raw);
        let request = read_request(&mut reader).await.unwrap();
        assert_eq!(request.method, "POST");
        assert_eq!(request.target, "/upgrade/pro");
    }
}
