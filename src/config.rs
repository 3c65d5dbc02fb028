use serde::Deserialize;

use crate::recorder::{MAX_TICK_INTERVAL_MS, MIN_TICK_INTERVAL_MS};

#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub monitoring: MonitoringConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_db_path")]
    pub path: String,
}

fn default_db_path() -> String {
    "system_data.db".into()
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct MonitoringConfig {
    /// Sampling interval in milliseconds, 1..=1000.
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,
}

fn default_tick_interval_ms() -> u64 {
    1000
}

impl Default for MonitoringConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: default_tick_interval_ms(),
        }
    }
}

impl AppConfig {
    /// Load `config.toml` from the working directory; the app runs with
    /// defaults when the file is absent.
    pub fn load() -> anyhow::Result<Self> {
        match std::fs::read_to_string("config.toml") {
            Ok(s) => Self::load_from_str(&s),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err(e.into()),
        }
    }

    /// Parse and validate config from a string (e.g. for tests).
    pub fn load_from_str(s: &str) -> anyhow::Result<Self> {
        let config: AppConfig = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(
            !self.database.path.is_empty(),
            "database.path must be non-empty"
        );
        anyhow::ensure!(
            (MIN_TICK_INTERVAL_MS..=MAX_TICK_INTERVAL_MS)
                .contains(&self.monitoring.tick_interval_ms),
            "monitoring.tick_interval_ms must be between {} and {}, got {}",
            MIN_TICK_INTERVAL_MS,
            MAX_TICK_INTERVAL_MS,
            self.monitoring.tick_interval_ms
        );
        Ok(())
    }
}
