// Metric card resolution - Fallback precedence across data sources
use super::environment::{CurrentWeather, DashboardOverview, RealTimeAirQuality};
use serde::Serialize;

pub const DEFAULT_AQI: f64 = 85.0;
pub const DEFAULT_TEMPERATURE_C: f64 = 28.0;
pub const DEFAULT_HUMIDITY_PCT: f64 = 75.0;
pub const DEFAULT_HEAT_INDEX_C: f64 = 32.0;
pub const DEFAULT_AIR_QUALITY_STATUS: &str = "Moderate";

/// Which tier supplied a displayed value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricSource {
    RealTime,
    Overview,
    Default,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedMetric<T> {
    pub value: T,
    pub source: MetricSource,
}

/// Specialized real-time value, then the overview value, then the literal
/// default.
pub fn resolve_metric<T>(
    specialized: Option<T>,
    overview: Option<T>,
    default: T,
) -> ResolvedMetric<T> {
    match (specialized, overview) {
        (Some(value), _) => ResolvedMetric {
            value,
            source: MetricSource::RealTime,
        },
        (None, Some(value)) => ResolvedMetric {
            value,
            source: MetricSource::Overview,
        },
        (None, None) => ResolvedMetric {
            value: default,
            source: MetricSource::Default,
        },
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardMetrics {
    pub aqi: ResolvedMetric<f64>,
    pub temperature: ResolvedMetric<f64>,
    pub humidity: ResolvedMetric<f64>,
    pub heat_index: ResolvedMetric<f64>,
    pub air_quality_status: ResolvedMetric<String>,
}

impl DashboardMetrics {
    /// Resolve every card independently; a source missing one field still
    /// contributes the others.
    pub fn merge(
        overview: Option<&DashboardOverview>,
        weather: Option<&CurrentWeather>,
        air_quality: Option<&RealTimeAirQuality>,
    ) -> Self {
        let conditions = overview.map(|o| &o.current_conditions);

        Self {
            aqi: resolve_metric(
                air_quality.and_then(|a| a.aqi),
                conditions.and_then(|c| c.aqi),
                DEFAULT_AQI,
            ),
            temperature: resolve_metric(
                weather.and_then(|w| w.temperature),
                conditions.and_then(|c| c.temperature),
                DEFAULT_TEMPERATURE_C,
            ),
            humidity: resolve_metric(
                weather.and_then(|w| w.humidity),
                conditions.and_then(|c| c.humidity),
                DEFAULT_HUMIDITY_PCT,
            ),
            heat_index: resolve_metric(
                weather.and_then(|w| w.heat_index),
                conditions.and_then(|c| c.heat_index),
                DEFAULT_HEAT_INDEX_C,
            ),
            air_quality_status: resolve_metric(
                air_quality.and_then(|a| a.category.clone()),
                conditions.and_then(|c| c.air_quality_status.clone()),
                DEFAULT_AIR_QUALITY_STATUS.to_string(),
            ),
        }
    }

    /// True when every numeric card is backed by fetched data.
    pub fn all_fetched(&self) -> bool {
        [&self.aqi, &self.temperature, &self.humidity, &self.heat_index]
            .iter()
            .all(|m| m.source != MetricSource::Default)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::environment::CurrentConditions;

    fn overview(aqi: Option<f64>, temperature: Option<f64>) -> DashboardOverview {
        DashboardOverview {
            timestamp: "2025-10-04T10:00:00".to_string(),
            location: "Mumbai, India".to_string(),
            current_conditions: CurrentConditions {
                aqi,
                temperature,
                humidity: Some(70.0),
                heat_index: None,
                flood_risk: None,
                air_quality_status: Some("Moderate".to_string()),
                heat_risk_level: None,
            },
            environmental_health_score: None,
            risk_assessment: None,
            forecasts: None,
            anomalies: None,
            urban_impact: Default::default(),
            data_quality: None,
        }
    }

    #[test]
    fn test_resolve_metric_precedence() {
        assert_eq!(resolve_metric(Some(1), Some(2), 3).value, 1);
        assert_eq!(resolve_metric(None, Some(2), 3).source, MetricSource::Overview);
        assert_eq!(resolve_metric::<i32>(None, None, 3).source, MetricSource::Default);
    }

    #[test]
    fn test_metrics_resolve_independently() {
        let overview = overview(Some(120.0), Some(30.0));
        let weather = CurrentWeather {
            temperature: None,
            humidity: Some(82.0),
            heat_index: Some(36.0),
            timestamp: None,
        };

        let metrics = DashboardMetrics::merge(Some(&overview), Some(&weather), None);

        assert_eq!(metrics.aqi.value, 120.0);
        assert_eq!(metrics.aqi.source, MetricSource::Overview);
        assert_eq!(metrics.temperature.value, 30.0);
        assert_eq!(metrics.temperature.source, MetricSource::Overview);
        assert_eq!(metrics.humidity.value, 82.0);
        assert_eq!(metrics.humidity.source, MetricSource::RealTime);
        assert_eq!(metrics.heat_index.source, MetricSource::RealTime);
        assert!(metrics.all_fetched());
    }

    #[test]
    fn test_metrics_fall_back_to_defaults() {
        let metrics = DashboardMetrics::merge(None, None, None);
        assert_eq!(metrics.aqi.value, DEFAULT_AQI);
        assert_eq!(metrics.temperature.value, DEFAULT_TEMPERATURE_C);
        assert_eq!(metrics.air_quality_status.value, DEFAULT_AIR_QUALITY_STATUS);
        assert!(!metrics.all_fetched());
    }
}
