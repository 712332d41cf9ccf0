// Backend API client - reqwest adapter that never fails to the caller
use crate::application::environment_api::EnvironmentApi;
use crate::domain::envelope::{FetchEnvelope, RateLimitInfo};
use crate::domain::environment::{
    AirQualityReport, AnomalyReport, CurrentWeather, DashboardOverview, ErrorBody,
    ForecastReport, HealthStatus, HeatIslandReport, IndicesReport, RealTimeAirQuality,
    RealTimeUpdate, UrbanDevelopmentReport, WaterResourcesReport,
};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, ACCEPT, CONTENT_TYPE};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
enum ClientError {
    #[error("{0}")]
    Transport(#[from] reqwest::Error),

    #[error("invalid response body: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("HTTP {status}")]
    Http { status: u16, message: Option<String> },
}

impl ClientError {
    fn status(&self) -> u16 {
        match self {
            ClientError::Http { status, .. } => *status,
            _ => 0,
        }
    }

    fn message(&self) -> String {
        match self {
            ClientError::Http {
                message: Some(message),
                ..
            } => message.clone(),
            other => other.to_string(),
        }
    }
}

/// Per-call overrides merged over the client's JSON defaults.
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    pub headers: HeaderMap,
    pub query: Vec<(String, String)>,
}

impl RequestOptions {
    pub fn query(mut self, key: &str, value: impl ToString) -> Self {
        self.query.push((key.to_string(), value.to_string()));
        self
    }

    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }
}

#[derive(Debug, Clone)]
pub struct ApiClient {
    client: reqwest::Client,
    base_url: String,
    weather_path: String,
    air_quality_path: String,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            weather_path: "/weather/current".to_string(),
            air_quality_path: "/air-quality/real-time".to_string(),
        })
    }

    pub fn with_dashboard_paths(
        mut self,
        weather_path: impl Into<String>,
        air_quality_path: impl Into<String>,
    ) -> Self {
        self.weather_path = weather_path.into();
        self.air_quality_path = air_quality_path.into();
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn build_url(&self, endpoint: &str, query: &[(String, String)]) -> String {
        let mut url = format!("{}{}", self.base_url, endpoint);
        for (i, (key, value)) in query.iter().enumerate() {
            let sep = if i == 0 && !endpoint.contains('?') { '?' } else { '&' };
            url.push(sep);
            url.push_str(&urlencoding::encode(key));
            url.push('=');
            url.push_str(&urlencoding::encode(value));
        }
        url
    }

    /// Issue a GET against `base_url + endpoint` and normalize the outcome.
    pub async fn request<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        options: RequestOptions,
    ) -> FetchEnvelope<T> {
        let url = self.build_url(endpoint, &options.query);
        match self.execute(&url, options.headers).await {
            Ok((data, status, rate_limit)) => {
                FetchEnvelope::success(data, status).with_rate_limit(rate_limit)
            }
            Err(e) => {
                tracing::warn!(url = %url, status = e.status(), "API request failed: {}", e);
                FetchEnvelope::failure(e.message(), e.status())
            }
        }
    }

    async fn execute<T: DeserializeOwned>(
        &self,
        url: &str,
        overrides: HeaderMap,
    ) -> Result<(T, u16, Option<RateLimitInfo>), ClientError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.extend(overrides);

        tracing::debug!("GET {}", url);
        let response = self.client.get(url).headers(headers).send().await?;

        let status = response.status();
        let rate_limit = parse_rate_limit(response.headers());
        if let Some(info) = &rate_limit {
            tracing::debug!(
                limit = ?info.limit,
                remaining = ?info.remaining,
                reset = ?info.reset,
                "Rate limit reported by backend"
            );
        }

        let body = response.bytes().await?;

        if !status.is_success() {
            return Err(http_error(status, &body));
        }

        let data = serde_json::from_slice::<T>(&body)?;
        Ok((data, status.as_u16(), rate_limit))
    }

    async fn get<T: DeserializeOwned>(&self, endpoint: &str) -> FetchEnvelope<T> {
        self.request(endpoint, RequestOptions::default()).await
    }

    async fn get_days<T: DeserializeOwned>(&self, endpoint: &str, days: u32) -> FetchEnvelope<T> {
        self.request(endpoint, RequestOptions::default().query("days", days))
            .await
    }
}

fn http_error(status: StatusCode, body: &[u8]) -> ClientError {
    let message = serde_json::from_slice::<ErrorBody>(body)
        .ok()
        .and_then(|b| b.error)
        .map(|e| e.message().to_string());

    ClientError::Http {
        status: status.as_u16(),
        message,
    }
}

fn parse_rate_limit(headers: &HeaderMap) -> Option<RateLimitInfo> {
    let read = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.trim().parse::<u64>().ok())
    };

    let info = RateLimitInfo {
        limit: read("x-ratelimit-limit"),
        remaining: read("x-ratelimit-remaining"),
        reset: read("x-ratelimit-reset"),
    };

    (!info.is_empty()).then_some(info)
}

#[async_trait]
impl EnvironmentApi for ApiClient {
    async fn health_check(&self) -> FetchEnvelope<HealthStatus> {
        self.get("/health").await
    }

    async fn get_dashboard_overview(&self) -> FetchEnvelope<DashboardOverview> {
        self.get("/dashboard/overview").await
    }

    async fn get_air_quality(&self, days: u32) -> FetchEnvelope<AirQualityReport> {
        self.get_days("/air-quality", days).await
    }

    async fn get_heat_island(&self, days: u32) -> FetchEnvelope<HeatIslandReport> {
        self.get_days("/heat-island", days).await
    }

    async fn get_water_resources(&self, days: u32) -> FetchEnvelope<WaterResourcesReport> {
        self.get_days("/water-resources", days).await
    }

    async fn get_urban_development(&self, days: u32) -> FetchEnvelope<UrbanDevelopmentReport> {
        self.get_days("/urban-development", days).await
    }

    async fn get_indices(&self) -> FetchEnvelope<IndicesReport> {
        self.get("/indices").await
    }

    async fn get_anomalies(&self, days: u32) -> FetchEnvelope<AnomalyReport> {
        self.get_days("/anomalies", days).await
    }

    async fn get_forecasts(&self, horizon: u32) -> FetchEnvelope<ForecastReport> {
        self.request(
            "/forecasts",
            RequestOptions::default().query("horizon", horizon),
        )
        .await
    }

    async fn get_real_time_update(&self) -> FetchEnvelope<RealTimeUpdate> {
        self.get("/real-time-update").await
    }

    async fn get_current_weather(&self) -> FetchEnvelope<CurrentWeather> {
        self.get(&self.weather_path).await
    }

    async fn get_real_time_air_quality(&self) -> FetchEnvelope<RealTimeAirQuality> {
        self.get(&self.air_quality_path).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::extract::{Query, State};
    use axum::http::{HeaderMap as AxumHeaderMap, StatusCode as AxumStatus};
    use axum::response::IntoResponse;
    use axum::routing::get;
    use axum::{Json, Router};
    use serde_json::{json, Value};
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    type Seen = Arc<Mutex<Vec<String>>>;

    async fn spawn_backend() -> (String, Seen) {
        let seen: Seen = Arc::new(Mutex::new(Vec::new()));

        let router = Router::new()
            .route(
                "/api/health",
                get(|| async {
                    (
                        [("X-RateLimit-Limit", "100"), ("X-RateLimit-Remaining", "97")],
                        Json(json!({
                            "status": "healthy",
                            "timestamp": "2025-10-04T10:00:00",
                            "models_loaded": ["environmental_health"],
                            "data_sources": ["NASA MODIS"]
                        })),
                    )
                }),
            )
            .route(
                "/api/dashboard/overview",
                get(|| async {
                    (
                        AxumStatus::SERVICE_UNAVAILABLE,
                        Json(json!({"error": "Service unavailable"})),
                    )
                }),
            )
            .route(
                "/api/indices",
                get(|| async {
                    (
                        AxumStatus::TOO_MANY_REQUESTS,
                        Json(json!({"error": {
                            "code": "RATE_LIMIT_EXCEEDED",
                            "message": "Too many requests",
                            "details": {"retry_after": 30}
                        }})),
                    )
                }),
            )
            .route(
                "/api/anomalies",
                get(|| async { (AxumStatus::BAD_GATEWAY, "upstream exploded").into_response() }),
            )
            .route("/api/real-time-update", get(|| async { "not json at all" }))
            .route(
                "/api/echo",
                get(
                    |State(seen): State<Seen>,
                     headers: AxumHeaderMap,
                     Query(params): Query<HashMap<String, String>>| async move {
                        let trace = headers
                            .get("x-trace")
                            .and_then(|v| v.to_str().ok())
                            .unwrap_or_default()
                            .to_string();
                        let accept = headers
                            .get("accept")
                            .and_then(|v| v.to_str().ok())
                            .unwrap_or_default()
                            .to_string();
                        seen.lock().unwrap().push(format!("{:?}", params.get("days")));
                        Json(json!({"days": params.get("days"), "trace": trace, "accept": accept}))
                    },
                ),
            )
            .with_state(seen.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });

        (format!("http://{}/api", addr), seen)
    }

    fn client(base_url: &str) -> ApiClient {
        ApiClient::new(base_url, Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn test_success_populates_data_only() {
        let (base, _) = spawn_backend().await;
        let env = client(&base).health_check().await;

        assert_eq!(env.status, 200);
        assert!(env.error.is_none());
        assert_eq!(env.data.unwrap().status, "healthy");
        let rate_limit = env.rate_limit.unwrap();
        assert_eq!(rate_limit.limit, Some(100));
        assert_eq!(rate_limit.remaining, Some(97));
        assert_eq!(rate_limit.reset, None);
    }

    #[tokio::test]
    async fn test_http_failure_uses_server_message() {
        let (base, _) = spawn_backend().await;
        let env = client(&base).get_dashboard_overview().await;

        assert_eq!(env.status, 503);
        assert!(env.data.is_none());
        assert_eq!(env.error.as_deref(), Some("Service unavailable"));
    }

    #[tokio::test]
    async fn test_http_failure_structured_error() {
        let (base, _) = spawn_backend().await;
        let env = client(&base).get_indices().await;

        assert_eq!(env.status, 429);
        assert!(env.data.is_none());
        assert_eq!(env.error.as_deref(), Some("Too many requests"));
    }

    #[tokio::test]
    async fn test_http_failure_without_json_body() {
        let (base, _) = spawn_backend().await;
        let env = client(&base).get_anomalies(30).await;

        assert_eq!(env.status, 502);
        assert!(env.data.is_none());
        assert_eq!(env.error.as_deref(), Some("HTTP 502"));
    }

    #[tokio::test]
    async fn test_undecodable_success_body_is_status_zero() {
        let (base, _) = spawn_backend().await;
        let env = client(&base).get_real_time_update().await;

        assert_eq!(env.status, 0);
        assert!(env.data.is_none());
        assert!(env.error.unwrap().starts_with("invalid response body"));
    }

    #[tokio::test]
    async fn test_network_failure_is_status_zero() {
        // Bind then drop to get a port nothing listens on
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let env = client(&format!("http://{}/api", addr)).health_check().await;

        assert_eq!(env.status, 0);
        assert!(env.data.is_none());
        assert!(env.error.is_some());
    }

    #[tokio::test]
    async fn test_query_and_header_overrides() {
        let (base, seen) = spawn_backend().await;
        let options = RequestOptions::default()
            .query("days", 7)
            .header(HeaderName::from_static("x-trace"), HeaderValue::from_static("abc"))
            .header(ACCEPT, HeaderValue::from_static("application/vnd.pulse+json"));

        let env: FetchEnvelope<Value> = client(&base).request("/echo", options).await;
        let body = env.data.unwrap();

        assert_eq!(body["days"], "7");
        assert_eq!(body["trace"], "abc");
        assert_eq!(body["accept"], "application/vnd.pulse+json");
        assert_eq!(seen.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_build_url() {
        let c = client("http://localhost:5000/api/");
        assert_eq!(c.base_url(), "http://localhost:5000/api");
        assert_eq!(
            c.build_url("/forecasts", &[("horizon".to_string(), "7".to_string())]),
            "http://localhost:5000/api/forecasts?horizon=7"
        );
        assert_eq!(
            c.build_url("/x?a=1", &[("b".to_string(), "two words".to_string())]),
            "http://localhost:5000/api/x?a=1&b=two%20words"
        );
    }
}
