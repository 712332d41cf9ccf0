// Static demo source - Fixed Mumbai readings for running without a backend
use crate::application::environment_api::EnvironmentApi;
use crate::domain::envelope::FetchEnvelope;
use crate::domain::environment::{
    AirQualityReport, AnomalyFlag, AnomalyReport, CurrentConditions, CurrentIndices,
    CurrentWeather, DashboardOverview, ForecastReport, ForecastSeries, ForecastSet,
    HealthRecommendation, HealthStatus, HeatIslandReport, HistoricalRecord, IndicesReport,
    RealTimeAirQuality, RealTimeUpdate, RiskAssessment, RiskLevel, TimeSeriesForecasts,
    UrbanDevelopmentReport, WaterResourcesReport,
};
use async_trait::async_trait;
use chrono::{Duration, Local, NaiveDate};
use std::collections::BTreeMap;

const STATUS_OK: u16 = 200;
const DATA_SOURCE: &str = "Static demo data";

#[derive(Debug, Clone)]
pub struct StaticEnvironmentApi {
    anchor: NaiveDate,
}

impl Default for StaticEnvironmentApi {
    fn default() -> Self {
        Self::new(Local::now().date_naive())
    }
}

impl StaticEnvironmentApi {
    pub fn new(anchor: NaiveDate) -> Self {
        Self { anchor }
    }

    fn now(&self) -> String {
        self.anchor.and_hms_opt(12, 0, 0).map(|t| t.to_string()).unwrap_or_default()
    }

    /// Stops early at the end of the representable calendar.
    fn dates(&self, from: i64, count: u32) -> Vec<String> {
        (0..i64::from(count))
            .map_while(|i| {
                let offset = Duration::try_days(from + i)?;
                self.anchor.checked_add_signed(offset)
            })
            .map(|date| date.format("%Y-%m-%d").to_string())
            .collect()
    }

    /// Gentle sine wiggle around `base` so charts have something to draw.
    fn series(base: f64, amplitude: f64, count: u32) -> Vec<f64> {
        (0..count)
            .map(|i| {
                let v = base + amplitude * (i as f64 * 0.9).sin();
                (v * 10.0).round() / 10.0
            })
            .collect()
    }

    fn forecast(&self, base: f64, amplitude: f64, horizon: u32) -> ForecastSeries {
        let dates = self.dates(1, horizon);
        let values = Self::series(base, amplitude, dates.len() as u32);
        ForecastSeries { dates, values }
    }

    fn history(
        &self,
        days: u32,
        column: &str,
        base: f64,
        amplitude: f64,
    ) -> Vec<HistoricalRecord> {
        let start = -i64::from(days) + 1;
        let dates = self.dates(start, days);
        let values = Self::series(base, amplitude, dates.len() as u32);
        dates
            .into_iter()
            .zip(values)
            .map(|(date, value)| {
                let mut readings = BTreeMap::new();
                readings.insert(column.to_string(), serde_json::json!(value));
                HistoricalRecord { date, readings }
            })
            .collect()
    }

    fn risk(level: i32, description: &str) -> RiskLevel {
        RiskLevel {
            level,
            description: description.to_string(),
        }
    }
}

#[async_trait]
impl EnvironmentApi for StaticEnvironmentApi {
    async fn health_check(&self) -> FetchEnvelope<HealthStatus> {
        FetchEnvelope::success(
            HealthStatus {
                status: "healthy".to_string(),
                timestamp: self.now(),
                models_loaded: Vec::new(),
                data_sources: vec![DATA_SOURCE.to_string()],
            },
            STATUS_OK,
        )
    }

    async fn get_dashboard_overview(&self) -> FetchEnvelope<DashboardOverview> {
        FetchEnvelope::success(
            DashboardOverview {
                timestamp: self.now(),
                location: "Mumbai, India".to_string(),
                current_conditions: CurrentConditions {
                    aqi: Some(118.0),
                    temperature: Some(31.4),
                    humidity: Some(79.0),
                    heat_index: Some(39.2),
                    flood_risk: Some(24.0),
                    air_quality_status: Some("Unhealthy for Sensitive Groups".to_string()),
                    heat_risk_level: Some("Extreme Caution".to_string()),
                },
                environmental_health_score: Some(62.0),
                risk_assessment: Some(RiskAssessment {
                    aqi_risk: Self::risk(2, "Moderate Risk"),
                    flood_risk: Self::risk(1, "Low Risk"),
                    heat_risk: Self::risk(3, "High Risk"),
                }),
                forecasts: Some(TimeSeriesForecasts {
                    aqi_forecast: self.forecast(115.0, 12.0, 7),
                    flood_forecast: self.forecast(25.0, 6.0, 7),
                }),
                anomalies: Some(AnomalyFlag {
                    is_anomaly: false,
                    anomaly_score: 0.18,
                    severity: "Low".to_string(),
                    detected_at: Some(self.now()),
                }),
                urban_impact: BTreeMap::new(),
                data_quality: Some("static_demo_data".to_string()),
            },
            STATUS_OK,
        )
    }

    async fn get_air_quality(&self, days: u32) -> FetchEnvelope<AirQualityReport> {
        FetchEnvelope::success(
            AirQualityReport {
                current_aqi: 118.0,
                aqi_category: "Unhealthy for Sensitive Groups".to_string(),
                pm25_estimated: 42.5,
                no2_levels: 0.00012,
                aod_550nm: 0.61,
                historical_data: self.history(days, "aqi_estimated", 110.0, 15.0),
                forecast: self.forecast(115.0, 12.0, 7),
                health_recommendations: HealthRecommendation {
                    level: "Unhealthy for Sensitive Groups".to_string(),
                    message: "Sensitive individuals should avoid outdoor activities.".to_string(),
                    color: "orange".to_string(),
                },
                data_source: DATA_SOURCE.to_string(),
            },
            STATUS_OK,
        )
    }

    async fn get_heat_island(&self, days: u32) -> FetchEnvelope<HeatIslandReport> {
        FetchEnvelope::success(
            HeatIslandReport {
                current_temperature: 31.4,
                heat_index: 39.2,
                heat_risk_level: "Extreme Caution".to_string(),
                max_temperature: 33.8,
                min_temperature: 26.1,
                humidity: 79.0,
                historical_data: self.history(days, "T2M", 30.5, 1.5),
                risk_predictions: Some(Self::risk(3, "High Risk")),
                data_source: DATA_SOURCE.to_string(),
            },
            STATUS_OK,
        )
    }

    async fn get_water_resources(&self, days: u32) -> FetchEnvelope<WaterResourcesReport> {
        FetchEnvelope::success(
            WaterResourcesReport {
                soil_moisture: 0.31,
                precipitation: 4.2,
                ndwi: 0.12,
                flood_risk_score: 24.0,
                flood_risk_category: "Moderate".to_string(),
                is_monsoon_season: false,
                historical_data: self.history(days, "precipitation_mm", 5.0, 4.0),
                flood_forecast: self.forecast(25.0, 6.0, 7),
                water_stress_index: 0.42,
                data_source: DATA_SOURCE.to_string(),
            },
            STATUS_OK,
        )
    }

    async fn get_urban_development(&self, days: u32) -> FetchEnvelope<UrbanDevelopmentReport> {
        FetchEnvelope::success(
            UrbanDevelopmentReport {
                economic_activity_index: 0.74,
                radiance_levels: 48.3,
                activity_level: "High".to_string(),
                urban_environmental_load: 0.58,
                historical_trends: self.history(days, "radiance_nw_cm2_sr", 47.0, 2.0),
                urban_impact_analysis: BTreeMap::new(),
                data_source: DATA_SOURCE.to_string(),
            },
            STATUS_OK,
        )
    }

    async fn get_indices(&self) -> FetchEnvelope<IndicesReport> {
        FetchEnvelope::success(
            IndicesReport {
                current_indices: CurrentIndices {
                    environmental_stress_index: 2.6,
                    air_quality_composite: 0.55,
                    water_stress_index: 0.42,
                    urban_environmental_load: 0.58,
                    overall_health_score: Some(62.0),
                },
                historical_trends: self.history(30, "environmental_stress_index", 2.5, 0.4),
                index_explanations: BTreeMap::new(),
                risk_thresholds: BTreeMap::new(),
                last_updated: self.now(),
            },
            STATUS_OK,
        )
    }

    async fn get_anomalies(&self, _days: u32) -> FetchEnvelope<AnomalyReport> {
        FetchEnvelope::success(
            AnomalyReport {
                anomaly_summary: "0 anomalies detected".to_string(),
                detected_anomalies: Vec::new(),
                anomaly_score: 0.18,
                affected_parameters: Vec::new(),
                severity_levels: "Low".to_string(),
                recommendations: Vec::new(),
                detection_timestamp: self.now(),
            },
            STATUS_OK,
        )
    }

    async fn get_forecasts(&self, horizon: u32) -> FetchEnvelope<ForecastReport> {
        FetchEnvelope::success(
            ForecastReport {
                forecast_horizon_days: horizon,
                forecasts: ForecastSet {
                    aqi_forecast: self.forecast(115.0, 12.0, horizon),
                    flood_forecast: self.forecast(25.0, 6.0, horizon),
                    environmental_health_trend: self.forecast(62.0, 3.0, horizon),
                },
                confidence_intervals: BTreeMap::new(),
                generated_at: self.now(),
            },
            STATUS_OK,
        )
    }

    async fn get_real_time_update(&self) -> FetchEnvelope<RealTimeUpdate> {
        FetchEnvelope::success(
            RealTimeUpdate {
                update_available: false,
                last_update: self.now(),
                data_sources_updated: Vec::new(),
                next_update_expected: self.now(),
                data_quality: 0.75,
            },
            STATUS_OK,
        )
    }

    async fn get_current_weather(&self) -> FetchEnvelope<CurrentWeather> {
        FetchEnvelope::success(
            CurrentWeather {
                temperature: Some(31.9),
                humidity: Some(77.0),
                heat_index: Some(40.1),
                timestamp: Some(self.now()),
            },
            STATUS_OK,
        )
    }

    async fn get_real_time_air_quality(&self) -> FetchEnvelope<RealTimeAirQuality> {
        FetchEnvelope::success(
            RealTimeAirQuality {
                aqi: Some(124.0),
                category: Some("Unhealthy for Sensitive Groups".to_string()),
                pm2_5: Some(44.0),
                pm10: Some(96.0),
                timestamp: Some(self.now()),
            },
            STATUS_OK,
        )
    }
}
