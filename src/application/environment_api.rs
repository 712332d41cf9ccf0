// Environment API trait - Backend access used by the controller and pages
use crate::domain::envelope::FetchEnvelope;
use crate::domain::environment::{
    AirQualityReport, AnomalyReport, CurrentWeather, DashboardOverview, ForecastReport,
    HealthStatus, HeatIslandReport, IndicesReport, RealTimeAirQuality, RealTimeUpdate,
    UrbanDevelopmentReport, WaterResourcesReport,
};
use async_trait::async_trait;

pub const DEFAULT_DAYS: u32 = 7;
pub const DEFAULT_HORIZON: u32 = 7;

/// Every call resolves to an envelope; implementations never fail.
#[async_trait]
pub trait EnvironmentApi: Send + Sync {
    async fn health_check(&self) -> FetchEnvelope<HealthStatus>;

    async fn get_dashboard_overview(&self) -> FetchEnvelope<DashboardOverview>;

    async fn get_air_quality(&self, days: u32) -> FetchEnvelope<AirQualityReport>;

    async fn get_heat_island(&self, days: u32) -> FetchEnvelope<HeatIslandReport>;

    async fn get_water_resources(&self, days: u32) -> FetchEnvelope<WaterResourcesReport>;

    async fn get_urban_development(&self, days: u32) -> FetchEnvelope<UrbanDevelopmentReport>;

    async fn get_indices(&self) -> FetchEnvelope<IndicesReport>;

    async fn get_anomalies(&self, days: u32) -> FetchEnvelope<AnomalyReport>;

    async fn get_forecasts(&self, horizon: u32) -> FetchEnvelope<ForecastReport>;

    async fn get_real_time_update(&self) -> FetchEnvelope<RealTimeUpdate>;

    /// Current weather for the dashboard cards
    async fn get_current_weather(&self) -> FetchEnvelope<CurrentWeather>;

    /// Real-time air quality for the dashboard AQI card
    async fn get_real_time_air_quality(&self) -> FetchEnvelope<RealTimeAirQuality>;
}
