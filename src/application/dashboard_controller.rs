// Dashboard controller - Parallel refresh of the three dashboard sources
use crate::application::environment_api::EnvironmentApi;
use crate::domain::dashboard::{DashboardState, DashboardView};
use crate::domain::envelope::FetchEnvelope;
use crate::domain::environment::{CurrentWeather, DashboardOverview, RealTimeAirQuality};
use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

pub const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_secs(5 * 60);

/// Fold one settled cycle into the state. Each source is inspected on its
/// own; only the overview error reaches the user.
pub fn apply_cycle(
    state: &mut DashboardState,
    overview: FetchEnvelope<DashboardOverview>,
    weather: FetchEnvelope<CurrentWeather>,
    air_quality: FetchEnvelope<RealTimeAirQuality>,
    completed_at: String,
) {
    match (overview.data, overview.error) {
        (Some(data), _) => {
            state.dashboard_data = Some(data);
            state.error = None;
        }
        (None, Some(error)) => state.error = Some(error),
        (None, None) => state.error = Some(format!("HTTP {}", overview.status)),
    }

    match weather.data {
        Some(data) => state.weather_data = Some(data),
        None => tracing::debug!(
            status = weather.status,
            "Weather refresh failed: {:?}",
            weather.error
        ),
    }

    match air_quality.data {
        Some(data) => state.air_quality_data = Some(data),
        None => tracing::debug!(
            status = air_quality.status,
            "Air quality refresh failed: {:?}",
            air_quality.error
        ),
    }

    state.last_updated = Some(completed_at);
    state.loading = false;
}

pub struct DashboardController {
    api: Arc<dyn EnvironmentApi>,
    state: watch::Sender<DashboardState>,
}

impl DashboardController {
    pub fn new(api: Arc<dyn EnvironmentApi>) -> Self {
        let (state, _) = watch::channel(DashboardState::default());
        Self { api, state }
    }

    pub fn state(&self) -> DashboardState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<DashboardState> {
        self.state.subscribe()
    }

    /// One polling cycle: all three fetches settle before anything is
    /// committed.
    pub async fn refresh_cycle(&self) {
        let (overview, weather, air_quality) = tokio::join!(
            self.api.get_dashboard_overview(),
            self.api.get_current_weather(),
            self.api.get_real_time_air_quality(),
        );

        if let Some(error) = &overview.error {
            tracing::warn!(
                status = overview.status,
                "Dashboard overview refresh failed: {}",
                error
            );
        }

        let completed_at = Utc::now().to_rfc3339();
        let mut all_fetched = false;
        self.state.send_modify(|state| {
            apply_cycle(state, overview, weather, air_quality, completed_at);
            all_fetched = state.metrics().all_fetched();
        });

        tracing::info!(all_fetched, "Dashboard refreshed");
    }

    /// Run a cycle now and then every `interval` until the returned handle
    /// is unmounted or dropped.
    /// A zero interval falls back to `DEFAULT_REFRESH_INTERVAL`.
    pub fn mount(self, interval: Duration) -> DashboardHandle {
        let interval = if interval.is_zero() {
            tracing::warn!(
                "Zero dashboard refresh interval, using {}s",
                DEFAULT_REFRESH_INTERVAL.as_secs()
            );
            DEFAULT_REFRESH_INTERVAL
        } else {
            interval
        };
        let controller = Arc::new(self);
        let (retry_tx, mut retry_rx) = mpsc::channel::<()>(1);

        let task = tokio::spawn({
            let controller = Arc::clone(&controller);
            async move {
                let mut ticker = tokio::time::interval(interval);
                ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
                loop {
                    tokio::select! {
                        _ = ticker.tick() => {}
                        Some(()) = retry_rx.recv() => {
                            tracing::info!("Manual dashboard retry");
                            ticker.reset();
                        }
                    }
                    controller.refresh_cycle().await;
                }
            }
        });

        DashboardHandle {
            controller,
            task,
            retry_tx,
        }
    }
}

pub struct DashboardHandle {
    controller: Arc<DashboardController>,
    task: JoinHandle<()>,
    retry_tx: mpsc::Sender<()>,
}

impl DashboardHandle {
    pub fn state(&self) -> DashboardState {
        self.controller.state()
    }

    pub fn view(&self) -> DashboardView {
        self.controller.state().view()
    }

    pub fn subscribe(&self) -> watch::Receiver<DashboardState> {
        self.controller.subscribe()
    }

    /// Queue an immediate cycle. Returns false if one is already queued or
    /// the controller is unmounted.
    pub fn retry(&self) -> bool {
        !self.task.is_finished() && self.retry_tx.try_send(()).is_ok()
    }

    pub fn unmount(&self) {
        self.task.abort();
    }

    pub fn is_mounted(&self) -> bool {
        !self.task.is_finished()
    }
}

impl Drop for DashboardHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}
