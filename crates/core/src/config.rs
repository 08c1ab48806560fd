use serde::Deserialize;

use crate::error::{CampaignError, CampaignResult};

/// Root application configuration. Loaded from an optional
/// `config/groom-campaigns.*` file and environment variables with the
/// prefix `GROOM_CAMPAIGNS__`.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub metrics: MetricsConfig,
    #[serde(default)]
    pub preview: PreviewConfig,
    #[serde(default)]
    pub scheduling: SchedulingConfig,
    #[serde(default)]
    pub loyalty: LoyaltyConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_http_port")]
    pub http_port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MetricsConfig {
    #[serde(default = "default_metrics_port")]
    pub port: u16,
}

/// Audience preview settings.
#[derive(Debug, Clone, Deserialize)]
pub struct PreviewConfig {
    /// Number of customers returned in a preview sample.
    #[serde(default = "default_sample_size")]
    pub sample_size: usize,
    /// JSON array of already-annotated customer activity.
    #[serde(default)]
    pub population_file: Option<String>,
    /// JSON document of raw customer, appointment and membership rows.
    /// Activity is derived from it on every load. Takes precedence over
    /// `population_file`.
    #[serde(default)]
    pub records_file: Option<String>,
}

/// Window in which a one-off campaign may be scheduled.
#[derive(Debug, Clone, Deserialize)]
pub struct SchedulingConfig {
    #[serde(default = "default_min_lead_minutes")]
    pub min_lead_minutes: i64,
    #[serde(default = "default_max_horizon_days")]
    pub max_horizon_days: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoyaltyConfig {
    /// Completed grooms needed inside the window to earn a reward.
    #[serde(default = "default_visits_required")]
    pub visits_required: u32,
    #[serde(default = "default_qualifying_window_days")]
    pub qualifying_window_days: u32,
}

// Default functions
fn default_host() -> String {
    "0.0.0.0".to_string()
}
fn default_http_port() -> u16 {
    8080
}
fn default_metrics_port() -> u16 {
    9091
}
fn default_sample_size() -> usize {
    5
}
fn default_min_lead_minutes() -> i64 {
    60
}
fn default_max_horizon_days() -> i64 {
    365
}
fn default_visits_required() -> u32 {
    10
}
fn default_qualifying_window_days() -> u32 {
    365
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            http_port: default_http_port(),
        }
    }
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            port: default_metrics_port(),
        }
    }
}

impl Default for PreviewConfig {
    fn default() -> Self {
        Self {
            sample_size: default_sample_size(),
            population_file: None,
            records_file: None,
        }
    }
}

impl Default for SchedulingConfig {
    fn default() -> Self {
        Self {
            min_lead_minutes: default_min_lead_minutes(),
            max_horizon_days: default_max_horizon_days(),
        }
    }
}

impl Default for LoyaltyConfig {
    fn default() -> Self {
        Self {
            visits_required: default_visits_required(),
            qualifying_window_days: default_qualifying_window_days(),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api: ApiConfig::default(),
            metrics: MetricsConfig::default(),
            preview: PreviewConfig::default(),
            scheduling: SchedulingConfig::default(),
            loyalty: LoyaltyConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from an optional config file and environment variables.
    pub fn load() -> CampaignResult<Self> {
        let builder = config::Config::builder()
            .add_source(config::File::with_name("config/groom-campaigns").required(false))
            .add_source(
                config::Environment::with_prefix("GROOM_CAMPAIGNS")
                    .separator("__")
                    .try_parsing(true),
            );

        builder
            .build()
            .and_then(|config| config.try_deserialize())
            .map_err(|e| CampaignError::Config(e.to_string()))
    }
}
