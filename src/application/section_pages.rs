// Section pages - One polling hook per detail page
use crate::application::environment_api::EnvironmentApi;
use crate::application::polling::{PollingHook, PollingOptions, PollingState};
use crate::domain::envelope::FetchEnvelope;
use crate::domain::environment::{
    AirQualityReport, AnomalyReport, ForecastReport, HeatIslandReport, IndicesReport,
    RealTimeUpdate, UrbanDevelopmentReport, WaterResourcesReport,
};
use crate::infrastructure::config::PollingSettings;
use serde::Serialize;
use std::future::Future;
use std::str::FromStr;
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    AirQuality,
    HeatIsland,
    WaterResources,
    UrbanDevelopment,
    Indices,
    Anomalies,
    Forecasts,
    RealTimeUpdate,
}

impl Section {
    pub const ALL: [Section; 8] = [
        Section::AirQuality,
        Section::HeatIsland,
        Section::WaterResources,
        Section::UrbanDevelopment,
        Section::Indices,
        Section::Anomalies,
        Section::Forecasts,
        Section::RealTimeUpdate,
    ];

    pub fn slug(&self) -> &'static str {
        match self {
            Section::AirQuality => "air-quality",
            Section::HeatIsland => "heat-island",
            Section::WaterResources => "water-resources",
            Section::UrbanDevelopment => "urban-development",
            Section::Indices => "indices",
            Section::Anomalies => "anomalies",
            Section::Forecasts => "forecasts",
            Section::RealTimeUpdate => "real-time-update",
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown section: {0}")]
pub struct UnknownSection(pub String);

impl FromStr for Section {
    type Err = UnknownSection;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Section::ALL
            .into_iter()
            .find(|section| section.slug() == s)
            .ok_or_else(|| UnknownSection(s.to_string()))
    }
}

fn options<T>(settings: &PollingSettings) -> PollingOptions<T> {
    PollingOptions::default()
        .with_poll_interval(settings.poll_interval())
        .with_retry(settings.retry_attempts, settings.retry_delay())
}

/// Mount a hook whose attempts fail whenever the envelope carries an error.
fn page<T, F, Fut>(
    section: Section,
    api: &Arc<dyn EnvironmentApi>,
    settings: &PollingSettings,
    fetch: F,
) -> PollingHook<T>
where
    T: Clone + Send + Sync + 'static,
    F: Fn(Arc<dyn EnvironmentApi>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = FetchEnvelope<T>> + Send + 'static,
{
    let api = Arc::clone(api);
    PollingHook::mount(
        section.slug(),
        move || {
            let envelope = fetch(Arc::clone(&api));
            async move { envelope.await.into_result() }
        },
        options(settings),
    )
}

fn to_json<T: Serialize>(state: PollingState<T>) -> serde_json::Result<serde_json::Value> {
    serde_json::to_value(state)
}

pub struct SectionPages {
    air_quality: PollingHook<AirQualityReport>,
    heat_island: PollingHook<HeatIslandReport>,
    water_resources: PollingHook<WaterResourcesReport>,
    urban_development: PollingHook<UrbanDevelopmentReport>,
    indices: PollingHook<IndicesReport>,
    anomalies: PollingHook<AnomalyReport>,
    forecasts: PollingHook<ForecastReport>,
    real_time_update: PollingHook<RealTimeUpdate>,
}

impl SectionPages {
    pub fn mount(api: Arc<dyn EnvironmentApi>, settings: &PollingSettings) -> Self {
        let days = settings.days;
        let horizon = settings.horizon;

        Self {
            air_quality: page(Section::AirQuality, &api, settings, move |api| async move {
                api.get_air_quality(days).await
            }),
            heat_island: page(Section::HeatIsland, &api, settings, move |api| async move {
                api.get_heat_island(days).await
            }),
            water_resources: page(Section::WaterResources, &api, settings, move |api| async move {
                api.get_water_resources(days).await
            }),
            urban_development: page(
                Section::UrbanDevelopment,
                &api,
                settings,
                move |api| async move { api.get_urban_development(days).await },
            ),
            indices: page(Section::Indices, &api, settings, |api| async move {
                api.get_indices().await
            }),
            anomalies: page(Section::Anomalies, &api, settings, move |api| async move {
                api.get_anomalies(days).await
            }),
            forecasts: page(Section::Forecasts, &api, settings, move |api| async move {
                api.get_forecasts(horizon).await
            }),
            real_time_update: page(Section::RealTimeUpdate, &api, settings, |api| async move {
                api.get_real_time_update().await
            }),
        }
    }

    /// Current polling state of a section as JSON.
    pub fn snapshot(&self, section: Section) -> serde_json::Result<serde_json::Value> {
        match section {
            Section::AirQuality => to_json(self.air_quality.state()),
            Section::HeatIsland => to_json(self.heat_island.state()),
            Section::WaterResources => to_json(self.water_resources.state()),
            Section::UrbanDevelopment => to_json(self.urban_development.state()),
            Section::Indices => to_json(self.indices.state()),
            Section::Anomalies => to_json(self.anomalies.state()),
            Section::Forecasts => to_json(self.forecasts.state()),
            Section::RealTimeUpdate => to_json(self.real_time_update.state()),
        }
    }

    pub fn refresh(&self, section: Section) {
        tracing::info!(section = section.slug(), "Manual page refresh");
        match section {
            Section::AirQuality => drop(self.air_quality.refresh()),
            Section::HeatIsland => drop(self.heat_island.refresh()),
            Section::WaterResources => drop(self.water_resources.refresh()),
            Section::UrbanDevelopment => drop(self.urban_development.refresh()),
            Section::Indices => drop(self.indices.refresh()),
            Section::Anomalies => drop(self.anomalies.refresh()),
            Section::Forecasts => drop(self.forecasts.refresh()),
            Section::RealTimeUpdate => drop(self.real_time_update.refresh()),
        }
    }

    pub fn unmount_all(&self) {
        self.air_quality.unmount();
        self.heat_island.unmount();
        self.water_resources.unmount();
        self.urban_development.unmount();
        self.indices.unmount();
        self.anomalies.unmount();
        self.forecasts.unmount();
        self.real_time_update.unmount();
    }
}
