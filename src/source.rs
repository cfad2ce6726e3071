// =============================================================================
// source.rs - WHERE REPORTS COME FROM
// =============================================================================
//
// Two implementations of the same question-answering contract:
//
//   LiveSource  prompt -> model gateway -> decoder
//   DemoSource  canned fixtures, never fails, never touches the network
//
// Which one runs is decided exactly once, at startup, by whether an API key
// is configured. Handlers hold an Arc<dyn ReportSource> and never ask again.
// =============================================================================

use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, info_span, warn, Instrument};
use uuid::Uuid;

use crate::circuit_breaker::CircuitBreaker;
use crate::config::Config;
use crate::decoder::{self, DecodeError};
use crate::demo;
use crate::gateway::{GatewayError, HttpTransport, ModelGateway};
use crate::metrics::MetricsCollector;
use crate::models::{
    CityData, CountryData, DeepDiveResult, GovernmentReport, LocationSearchResult, StateData,
};
use crate::query::{build_prompt, DeepDiveRequest, ReportRequest};

/// Why an analysis produced nothing. The user sees the same message for
/// both; the logs do not.
#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("model gateway: {0}")]
    Gateway(#[from] GatewayError),
    #[error("response decoding: {0}")]
    Decode(#[from] DecodeError),
}

#[async_trait]
pub trait ReportSource: Send + Sync {
    async fn government_report(&self, country: &str) -> Result<GovernmentReport, AnalysisError>;

    /// The short country card: flag, code, coordinates, headline risk.
    async fn country_profile(&self, country: &str) -> Result<CountryData, AnalysisError>;

    async fn state_report(&self, country: &str, state: &str) -> Result<StateData, AnalysisError>;

    async fn city_listing(&self, country: &str, state: &str) -> Result<Vec<CityData>, AnalysisError>;

    async fn city_report(
        &self,
        country: &str,
        state: &str,
        city: &str,
    ) -> Result<CityData, AnalysisError>;

    async fn deep_dive(&self, request: &DeepDiveRequest) -> Result<DeepDiveResult, AnalysisError>;

    /// Never fails: any error is an empty list.
    async fn search_locations(&self, query: &str) -> Vec<LocationSearchResult>;

    /// "live" or "demo".
    fn mode(&self) -> &'static str;
}

/// Pick the source for this process.
pub fn select(
    config: &Config,
    breaker: Arc<CircuitBreaker>,
    metrics: Arc<MetricsCollector>,
) -> Result<Arc<dyn ReportSource>, GatewayError> {
    match &config.openai_api_key {
        Some(key) => {
            let transport = HttpTransport::new(
                &config.openai_base_url,
                key.clone(),
                config.request_timeout,
            )?;
            let gateway = ModelGateway::new(Arc::new(transport), breaker, metrics.clone());
            info!(base_url = %config.openai_base_url, "Live mode: reports come from the language model");
            Ok(Arc::new(LiveSource::new(gateway, config.model_override.clone(), metrics)))
        }
        None => {
            info!("Demo mode: no API key configured, serving fixture reports");
            Ok(Arc::new(DemoSource::new(metrics)))
        }
    }
}

// =============================================================================
// Live
// =============================================================================

pub struct LiveSource {
    gateway: ModelGateway,
    model_override: Option<String>,
    metrics: Arc<MetricsCollector>,
}

impl LiveSource {
    pub fn new(
        gateway: ModelGateway,
        model_override: Option<String>,
        metrics: Arc<MetricsCollector>,
    ) -> Self {
        Self {
            gateway,
            model_override,
            metrics,
        }
    }

    /// Build, send, decode. One gateway call, no second chances.
    async fn analyze<T: Send>(
        &self,
        request: ReportRequest,
        decode: fn(&str) -> Result<T, DecodeError>,
    ) -> Result<T, AnalysisError> {
        let request_id = Uuid::new_v4();
        let kind = request.kind();
        let span = info_span!("analysis", %request_id, %kind);

        async move {
            let prompt = build_prompt(&request).with_model(self.model_override.as_deref());
            let raw = self.gateway.complete(&prompt).await?;

            decode(&raw).map_err(|e| {
                self.metrics.increment_decode_failures();
                warn!(error = %e, bytes = raw.len(), "Model answered with something we could not read");
                AnalysisError::from(e)
            })
        }
        .instrument(span)
        .await
    }
}

#[async_trait]
impl ReportSource for LiveSource {
    async fn government_report(&self, country: &str) -> Result<GovernmentReport, AnalysisError> {
        let request = ReportRequest::Country { country: country.to_string() };
        self.analyze(request, decoder::decode_government_report).await
    }

    async fn country_profile(&self, country: &str) -> Result<CountryData, AnalysisError> {
        let request = ReportRequest::CountryProfile { country: country.to_string() };
        self.analyze(request, decoder::decode_country).await
    }

    async fn state_report(&self, country: &str, state: &str) -> Result<StateData, AnalysisError> {
        let request = ReportRequest::State {
            country: country.to_string(),
            state: state.to_string(),
        };
        self.analyze(request, decoder::decode_state).await
    }

    async fn city_listing(&self, country: &str, state: &str) -> Result<Vec<CityData>, AnalysisError> {
        let request = ReportRequest::CityListing {
            country: country.to_string(),
            state: state.to_string(),
        };
        self.analyze(request, decoder::decode_city_listing).await
    }

    async fn city_report(
        &self,
        country: &str,
        state: &str,
        city: &str,
    ) -> Result<CityData, AnalysisError> {
        let request = ReportRequest::City {
            country: country.to_string(),
            state: state.to_string(),
            city: city.to_string(),
        };
        self.analyze(request, decoder::decode_city).await
    }

    async fn deep_dive(&self, request: &DeepDiveRequest) -> Result<DeepDiveResult, AnalysisError> {
        self.analyze(ReportRequest::DeepDive(request.clone()), decoder::decode_deep_dive)
            .await
    }

    async fn search_locations(&self, query: &str) -> Vec<LocationSearchResult> {
        let query = query.trim();
        if query.chars().count() < demo::MIN_SEARCH_LEN {
            return Vec::new();
        }
        let request = ReportRequest::LocationSearch { query: query.to_string() };
        match self.analyze(request, decoder::decode_location_search).await {
            Ok(results) => results,
            Err(e) => {
                warn!(error = %e, "Location search failed, showing no suggestions");
                Vec::new()
            }
        }
    }

    fn mode(&self) -> &'static str {
        "live"
    }
}

// =============================================================================
// Demo
// =============================================================================

pub struct DemoSource {
    metrics: Arc<MetricsCollector>,
}

impl DemoSource {
    pub fn new(metrics: Arc<MetricsCollector>) -> Self {
        Self { metrics }
    }
}

#[async_trait]
impl ReportSource for DemoSource {
    async fn government_report(&self, country: &str) -> Result<GovernmentReport, AnalysisError> {
        self.metrics.increment_demo_reports();
        Ok(demo::government_report(country))
    }

    async fn country_profile(&self, country: &str) -> Result<CountryData, AnalysisError> {
        self.metrics.increment_demo_reports();
        Ok(demo::country_profile(country))
    }

    async fn state_report(&self, country: &str, state: &str) -> Result<StateData, AnalysisError> {
        self.metrics.increment_demo_reports();
        Ok(demo::state_report(country, state))
    }

    async fn city_listing(&self, country: &str, state: &str) -> Result<Vec<CityData>, AnalysisError> {
        Ok(demo::city_listing(country, state))
    }

    async fn city_report(
        &self,
        country: &str,
        state: &str,
        city: &str,
    ) -> Result<CityData, AnalysisError> {
        self.metrics.increment_demo_reports();
        Ok(demo::city_report(country, state, city))
    }

    async fn deep_dive(&self, request: &DeepDiveRequest) -> Result<DeepDiveResult, AnalysisError> {
        self.metrics.increment_demo_reports();
        Ok(demo::deep_dive(&request.location, &request.topic))
    }

    async fn search_locations(&self, query: &str) -> Vec<LocationSearchResult> {
        demo::search_locations(query)
    }

    fn mode(&self) -> &'static str {
        "demo"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::tests::FakeTransport;
    use crate::models::GovernmentLevel;
    use std::sync::atomic::Ordering;
    use std::time::Duration;

    fn live(transport: Arc<FakeTransport>) -> LiveSource {
        let metrics = Arc::new(MetricsCollector::new("live"));
        let breaker = Arc::new(CircuitBreaker::new("test", 5, Duration::from_secs(60), 1));
        LiveSource::new(
            ModelGateway::new(transport, breaker, metrics.clone()),
            Some("gpt-4o-mini".to_string()),
            metrics,
        )
    }

    #[test]
    fn test_select_without_key_is_demo() {
        let metrics = Arc::new(MetricsCollector::new("demo"));
        let breaker = Arc::new(CircuitBreaker::new("test", 5, Duration::from_secs(60), 1));
        let source = select(&Config::default(), breaker, metrics).unwrap();
        assert_eq!(source.mode(), "demo");
    }

    #[test]
    fn test_select_with_key_is_live() {
        let config = Config {
            openai_api_key: Some("sk-test".to_string()),
            ..Config::default()
        };
        let metrics = Arc::new(MetricsCollector::new("live"));
        let breaker = Arc::new(CircuitBreaker::new("test", 5, Duration::from_secs(60), 1));
        assert_eq!(select(&config, breaker, metrics).unwrap().mode(), "live");
    }

    #[tokio::test]
    async fn test_live_report_decodes_model_output() {
        let body = serde_json::to_string(&demo::government_report("Brazil")).unwrap();
        let transport = Arc::new(FakeTransport::answering(Some(body.as_str())));
        let report = live(transport.clone()).government_report("Brazil").await.unwrap();
        assert_eq!(report.corruption_risk, 67);

        let sent = transport.last_request.lock().clone().unwrap();
        assert_eq!(sent.model, "gpt-4o-mini");
    }

    #[tokio::test]
    async fn test_live_country_profile_tolerates_nulls() {
        let transport = Arc::new(FakeTransport::answering(Some(
            r#"{"name": "Kenya", "code": "KE", "population": null, "corruptionRisk": 61.2}"#,
        )));
        let profile = live(transport.clone()).country_profile("Kenya").await.unwrap();
        assert_eq!(profile.corruption_risk, 61);
        assert_eq!(profile.population, "");

        let sent = transport.last_request.lock().clone().unwrap();
        assert_eq!(sent.messages[1].content, "Analyze country: Kenya");
    }

    #[tokio::test]
    async fn test_live_decode_failure_is_reported() {
        let transport = Arc::new(FakeTransport::answering(Some("{\"country\": \"Bra")));
        let err = live(transport).government_report("Brazil").await.unwrap_err();
        assert!(matches!(err, AnalysisError::Decode(_)));
    }

    #[tokio::test]
    async fn test_live_gateway_failure_is_reported() {
        let transport = Arc::new(FakeTransport::failing());
        let dive = DeepDiveRequest {
            location: "Austin".to_string(),
            topic: "Zoning".to_string(),
            level: GovernmentLevel::City,
            previous_context: None,
        };
        let err = live(transport.clone()).deep_dive(&dive).await.unwrap_err();
        assert!(matches!(err, AnalysisError::Gateway(_)));
        assert_eq!(transport.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_live_search_swallows_errors() {
        let transport = Arc::new(FakeTransport::failing());
        assert!(live(transport).search_locations("Berlin").await.is_empty());
    }

    #[tokio::test]
    async fn test_live_search_skips_short_queries() {
        let transport = Arc::new(FakeTransport::failing());
        let source = live(transport.clone());
        assert!(source.search_locations("B").await.is_empty());
        assert_eq!(transport.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_demo_never_fails() {
        let source = DemoSource::new(Arc::new(MetricsCollector::new("demo")));
        assert_eq!(source.government_report("Brazil").await.unwrap().active_bills.len(), 6);
        assert_eq!(source.city_listing("Brazil", "Bahia").await.unwrap().len(), 3);
        assert_eq!(source.country_profile("Brazil").await.unwrap().corruption_risk, 55);
        assert_eq!(source.search_locations("tex").await[0].name, "Texas");
    }
}
