// Environmental data models - One structured type per backend response schema
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One dated row of a historical series. The backend varies the reading
/// columns per endpoint, so they are kept keyed by column name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoricalRecord {
    pub date: String,
    #[serde(flatten)]
    pub readings: BTreeMap<String, serde_json::Value>,
}

impl HistoricalRecord {
    pub fn reading(&self, column: &str) -> Option<f64> {
        self.readings.get(column).and_then(|v| v.as_f64())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ForecastSeries {
    #[serde(default)]
    pub dates: Vec<String>,
    #[serde(default)]
    pub values: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskLevel {
    pub level: i32,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskAssessment {
    pub aqi_risk: RiskLevel,
    pub flood_risk: RiskLevel,
    pub heat_risk: RiskLevel,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TimeSeriesForecasts {
    #[serde(default)]
    pub aqi_forecast: ForecastSeries,
    #[serde(default)]
    pub flood_forecast: ForecastSeries,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnomalyFlag {
    pub is_anomaly: bool,
    pub anomaly_score: f64,
    pub severity: String,
    #[serde(default)]
    pub detected_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnvironmentalImpact {
    pub correlation: f64,
    pub impact_strength: f64,
    pub significant: bool,
    pub direction: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UrbanImpact {
    pub current_value: f64,
    #[serde(default)]
    pub environmental_impacts: BTreeMap<String, EnvironmentalImpact>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    pub timestamp: String,
    #[serde(default)]
    pub models_loaded: Vec<String>,
    #[serde(default)]
    pub data_sources: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentConditions {
    pub aqi: Option<f64>,
    pub temperature: Option<f64>,
    pub humidity: Option<f64>,
    pub heat_index: Option<f64>,
    pub flood_risk: Option<f64>,
    pub air_quality_status: Option<String>,
    pub heat_risk_level: Option<String>,
}

/// `/dashboard/overview`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardOverview {
    pub timestamp: String,
    pub location: String,
    pub current_conditions: CurrentConditions,
    pub environmental_health_score: Option<f64>,
    pub risk_assessment: Option<RiskAssessment>,
    pub forecasts: Option<TimeSeriesForecasts>,
    pub anomalies: Option<AnomalyFlag>,
    #[serde(default)]
    pub urban_impact: BTreeMap<String, UrbanImpact>,
    pub data_quality: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthRecommendation {
    pub level: String,
    pub message: String,
    pub color: String,
}

/// `/air-quality`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AirQualityReport {
    pub current_aqi: f64,
    pub aqi_category: String,
    pub pm25_estimated: f64,
    pub no2_levels: f64,
    pub aod_550nm: f64,
    #[serde(default)]
    pub historical_data: Vec<HistoricalRecord>,
    #[serde(default)]
    pub forecast: ForecastSeries,
    pub health_recommendations: HealthRecommendation,
    pub data_source: String,
}

/// `/heat-island`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeatIslandReport {
    pub current_temperature: f64,
    pub heat_index: f64,
    pub heat_risk_level: String,
    pub max_temperature: f64,
    pub min_temperature: f64,
    pub humidity: f64,
    #[serde(default)]
    pub historical_data: Vec<HistoricalRecord>,
    pub risk_predictions: Option<RiskLevel>,
    pub data_source: String,
}

/// `/water-resources`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WaterResourcesReport {
    pub soil_moisture: f64,
    pub precipitation: f64,
    pub ndwi: f64,
    pub flood_risk_score: f64,
    pub flood_risk_category: String,
    pub is_monsoon_season: bool,
    #[serde(default)]
    pub historical_data: Vec<HistoricalRecord>,
    #[serde(default)]
    pub flood_forecast: ForecastSeries,
    pub water_stress_index: f64,
    pub data_source: String,
}

/// `/urban-development`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UrbanDevelopmentReport {
    pub economic_activity_index: f64,
    pub radiance_levels: f64,
    pub activity_level: String,
    pub urban_environmental_load: f64,
    #[serde(default)]
    pub historical_trends: Vec<HistoricalRecord>,
    #[serde(default)]
    pub urban_impact_analysis: BTreeMap<String, UrbanImpact>,
    pub data_source: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentIndices {
    pub environmental_stress_index: f64,
    pub air_quality_composite: f64,
    pub water_stress_index: f64,
    pub urban_environmental_load: f64,
    pub overall_health_score: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskThreshold {
    pub min: f64,
    pub max: f64,
    pub color: String,
}

/// `/indices`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndicesReport {
    pub current_indices: CurrentIndices,
    #[serde(default)]
    pub historical_trends: Vec<HistoricalRecord>,
    #[serde(default)]
    pub index_explanations: BTreeMap<String, String>,
    #[serde(default)]
    pub risk_thresholds: BTreeMap<String, RiskThreshold>,
    pub last_updated: String,
}

/// `/anomalies`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnomalyReport {
    pub anomaly_summary: String,
    #[serde(default)]
    pub detected_anomalies: Vec<AnomalyFlag>,
    pub anomaly_score: f64,
    #[serde(default)]
    pub affected_parameters: Vec<String>,
    pub severity_levels: String,
    #[serde(default)]
    pub recommendations: Vec<String>,
    pub detection_timestamp: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastConfidence {
    pub confidence: f64,
    pub margin_of_error: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ForecastSet {
    #[serde(default)]
    pub aqi_forecast: ForecastSeries,
    #[serde(default)]
    pub flood_forecast: ForecastSeries,
    #[serde(default)]
    pub environmental_health_trend: ForecastSeries,
}

/// `/forecasts`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastReport {
    pub forecast_horizon_days: u32,
    pub forecasts: ForecastSet,
    #[serde(default)]
    pub confidence_intervals: BTreeMap<String, ForecastConfidence>,
    pub generated_at: String,
}

/// `/real-time-update`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RealTimeUpdate {
    pub update_available: bool,
    pub last_update: String,
    #[serde(default)]
    pub data_sources_updated: Vec<String>,
    pub next_update_expected: String,
    pub data_quality: f64,
}

/// Current weather used by the dashboard cards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentWeather {
    pub temperature: Option<f64>,
    pub humidity: Option<f64>,
    pub heat_index: Option<f64>,
    #[serde(default)]
    pub timestamp: Option<String>,
}

/// Real-time air quality used by the dashboard AQI card.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RealTimeAirQuality {
    pub aqi: Option<f64>,
    pub category: Option<String>,
    pub pm2_5: Option<f64>,
    pub pm10: Option<f64>,
    #[serde(default)]
    pub timestamp: Option<String>,
}

/// Error codes enumerated by the backend contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ApiErrorCode {
    InvalidParameters,
    DataNotFound,
    RateLimitExceeded,
    ServiceUnavailable,
    InternalError,
    #[serde(untagged)]
    Other(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiErrorDetail {
    pub code: ApiErrorCode,
    pub message: String,
    #[serde(default)]
    pub details: Option<serde_json::Value>,
}

/// The `error` field of a failed response: either a bare message or the
/// structured `{ code, message, details }` form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ApiError {
    Message(String),
    Detailed(ApiErrorDetail),
}

impl ApiError {
    pub fn message(&self) -> &str {
        match self {
            ApiError::Message(message) => message,
            ApiError::Detailed(detail) => &detail.message,
        }
    }
}

/// Body of a non-success response.
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub error: Option<ApiError>,
}
