use crate::application::dashboard_controller::DEFAULT_REFRESH_INTERVAL;
use crate::application::environment_api::{DEFAULT_DAYS, DEFAULT_HORIZON};
use crate::application::polling::{DEFAULT_RETRY_ATTEMPTS, DEFAULT_RETRY_DELAY};
use serde::Deserialize;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "http://localhost:5000/api";

#[derive(Debug, Deserialize, Clone)]
pub struct PulseConfig {
    pub api: ApiSettings,
    pub dashboard: DashboardSettings,
    pub polling: PollingSettings,
    pub server: ServerSettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ApiSettings {
    pub base_url: String,
    pub timeout_secs: u64,
    pub weather_path: String,
    pub air_quality_path: String,
}

/// Where the dashboard reads from: the backend, or built-in demo data.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DataSource {
    Live,
    Static,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DashboardSettings {
    pub refresh_interval_secs: u64,
    pub source: DataSource,
}

#[derive(Debug, Deserialize, Clone)]
pub struct PollingSettings {
    /// Zero disables periodic re-fetching of section pages.
    pub poll_interval_secs: u64,
    pub retry_attempts: u32,
    pub retry_delay_ms: u64,
    pub days: u32,
    pub horizon: u32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerSettings {
    pub bind: String,
}

impl PulseConfig {
    fn validate(self) -> anyhow::Result<Self> {
        if self.dashboard.refresh_interval_secs == 0 {
            anyhow::bail!("dashboard.refresh_interval_secs must be greater than zero");
        }
        Ok(self)
    }
}

impl DashboardSettings {
    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval_secs)
    }
}

impl PollingSettings {
    pub fn poll_interval(&self) -> Option<Duration> {
        (self.poll_interval_secs > 0).then(|| Duration::from_secs(self.poll_interval_secs))
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }
}

impl ApiSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

fn with_defaults(
    builder: config::ConfigBuilder<config::builder::DefaultState>,
) -> Result<config::ConfigBuilder<config::builder::DefaultState>, config::ConfigError> {
    builder
        .set_default("api.base_url", DEFAULT_BASE_URL)?
        .set_default("api.timeout_secs", 30)?
        .set_default("api.weather_path", "/weather/current")?
        .set_default("api.air_quality_path", "/air-quality/real-time")?
        .set_default(
            "dashboard.refresh_interval_secs",
            DEFAULT_REFRESH_INTERVAL.as_secs() as i64,
        )?
        .set_default("dashboard.source", "live")?
        .set_default("polling.poll_interval_secs", 0)?
        .set_default("polling.retry_attempts", i64::from(DEFAULT_RETRY_ATTEMPTS))?
        .set_default("polling.retry_delay_ms", DEFAULT_RETRY_DELAY.as_millis() as i64)?
        .set_default("polling.days", i64::from(DEFAULT_DAYS))?
        .set_default("polling.horizon", i64::from(DEFAULT_HORIZON))?
        .set_default("server.bind", "0.0.0.0:8080")
}

/// Defaults, then `config/pulse.{toml,yaml,json}` if present, then
/// `PULSE_<SECTION>__<KEY>` environment variables.
pub fn load_pulse_config() -> anyhow::Result<PulseConfig> {
    let settings = with_defaults(config::Config::builder())?
        .add_source(config::File::with_name("config/pulse").required(false))
        .add_source(
            config::Environment::with_prefix("PULSE")
                .prefix_separator("_")
                .separator("__"),
        )
        .build()?;

    settings.try_deserialize::<PulseConfig>()?.validate()
}
