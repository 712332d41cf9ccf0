// Dashboard domain model
use super::environment::{CurrentWeather, DashboardOverview, RealTimeAirQuality};
use super::metrics::DashboardMetrics;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardState {
    pub dashboard_data: Option<DashboardOverview>,
    pub weather_data: Option<CurrentWeather>,
    pub air_quality_data: Option<RealTimeAirQuality>,
    pub loading: bool,
    pub error: Option<String>,
    pub last_updated: Option<String>,
}

impl Default for DashboardState {
    fn default() -> Self {
        Self {
            dashboard_data: None,
            weather_data: None,
            air_quality_data: None,
            loading: true,
            error: None,
            last_updated: None,
        }
    }
}

impl DashboardState {
    pub fn metrics(&self) -> DashboardMetrics {
        DashboardMetrics::merge(
            self.dashboard_data.as_ref(),
            self.weather_data.as_ref(),
            self.air_quality_data.as_ref(),
        )
    }

    pub fn view(&self) -> DashboardView {
        DashboardView::from_state(self)
    }
}

/// What the dashboard page shows for a given state.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DashboardView {
    Loading,
    /// No overview data has ever arrived and the last attempt failed; the
    /// page offers a manual retry instead of a partial dashboard.
    Blocked { message: String },
    /// Stale data stays on screen when a later refresh fails.
    Ready {
        metrics: DashboardMetrics,
        stale_error: Option<String>,
    },
}

impl DashboardView {
    pub fn from_state(state: &DashboardState) -> Self {
        match (&state.dashboard_data, &state.error) {
            (None, Some(message)) => DashboardView::Blocked {
                message: message.clone(),
            },
            (None, None) if state.loading => DashboardView::Loading,
            _ => DashboardView::Ready {
                metrics: state.metrics(),
                stale_error: state.error.clone(),
            },
        }
    }

    pub fn is_blocked(&self) -> bool {
        matches!(self, DashboardView::Blocked { .. })
    }
}
