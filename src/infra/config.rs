//! Loads the TOML configuration and normalizes it into `AppConfig`.
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use tokio::fs;

use crate::domain::model::{
    AppConfig, AppMode, BrowserSettings, HttpConfig, RefreshConfig,
};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
    #[error("toml: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Deserialize)]
struct RawFile {
    #[serde(default)]
    app: RawApp,
    #[serde(default)]
    http: RawHttp,
    #[serde(default)]
    refresh: RawRefresh,
    #[serde(default)]
    browser: RawBrowser,
}

#[derive(Debug, Deserialize, Default)]
struct RawApp {
    mode: Option<String>,
    log_level: Option<String>,
    db_path: Option<String>,
    bootstrap_url: Option<String>,
    refresh_interval_seconds: Option<u64>,
}

#[derive(Debug, Deserialize, Default)]
struct RawHttp {
    host: Option<String>,
    port: Option<u16>,
}

#[derive(Debug, Deserialize, Default)]
struct RawRefresh {
    max_concurrent_sessions: Option<usize>,
    page_load_timeout_ms: Option<u64>,
    probe_max_attempts: Option<u32>,
    probe_poll_interval_ms: Option<u64>,
    reset_latest_count_on_failure: Option<bool>,
}

#[derive(Debug, Deserialize, Default)]
struct RawBrowser {
    headless: Option<bool>,
}

pub struct ConfigLoader;

impl ConfigLoader {
    pub async fn load(path: &Path) -> Result<AppConfig, ConfigError> {
        let text = fs::read_to_string(path).await?;
        let raw: RawFile = toml::from_str(&text)?;
        Self::normalize(raw)
    }

    fn normalize(raw: RawFile) -> Result<AppConfig, ConfigError> {
        let mode = match raw.app.mode.as_deref() {
            None | Some("prod") => AppMode::Prod,
            Some("dev") => AppMode::Dev,
            Some(other) => {
                return Err(ConfigError::Invalid(format!("unknown app mode: {other}")))
            }
        };

        let defaults = RefreshConfig::default();
        let max_concurrent_sessions = raw
            .refresh
            .max_concurrent_sessions
            .unwrap_or(defaults.max_concurrent_sessions);
        if max_concurrent_sessions == 0 {
            return Err(ConfigError::Invalid(
                "refresh.max_concurrent_sessions must be at least 1".to_string(),
            ));
        }

        let refresh = RefreshConfig {
            max_concurrent_sessions,
            page_load_timeout: raw
                .refresh
                .page_load_timeout_ms
                .map(Duration::from_millis)
                .unwrap_or(defaults.page_load_timeout),
            probe_max_attempts: raw
                .refresh
                .probe_max_attempts
                .unwrap_or(defaults.probe_max_attempts),
            probe_poll_interval: raw
                .refresh
                .probe_poll_interval_ms
                .map(Duration::from_millis)
                .unwrap_or(defaults.probe_poll_interval),
            reset_latest_count_on_failure: raw
                .refresh
                .reset_latest_count_on_failure
                .unwrap_or(defaults.reset_latest_count_on_failure),
        };

        Ok(AppConfig {
            mode,
            log_level: raw.app.log_level.unwrap_or_else(|| "info".to_string()),
            db_path: PathBuf::from(
                raw.app.db_path.unwrap_or_else(|| "data/pagefeed.db".to_string()),
            ),
            http: HttpConfig {
                host: raw.http.host.unwrap_or_else(|| "127.0.0.1".to_string()),
                port: raw.http.port.unwrap_or(7113),
            },
            bootstrap_url: raw.app.bootstrap_url,
            refresh_interval_seconds: raw.app.refresh_interval_seconds,
            refresh,
            browser: BrowserSettings {
                headless: raw.browser.headless.unwrap_or(true),
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_fill_missing_sections() {
        let raw: RawFile = toml::from_str("").expect("empty config parses");
        let cfg = ConfigLoader::normalize(raw).expect("normalizes");
        assert_eq!(cfg.refresh.max_concurrent_sessions, 3);
        assert_eq!(cfg.refresh.page_load_timeout, Duration::from_millis(5500));
        assert_eq!(cfg.refresh.probe_max_attempts, 5);
        assert!(!cfg.refresh.reset_latest_count_on_failure);
        assert!(cfg.browser.headless);
    }

    #[test]
    fn zero_concurrency_is_rejected() {
        let raw: RawFile =
            toml::from_str("[refresh]\nmax_concurrent_sessions = 0").expect("parses");
        assert!(ConfigLoader::normalize(raw).is_err());
    }

    #[test]
    fn unknown_mode_is_rejected() {
        let raw: RawFile = toml::from_str("[app]\nmode = \"staging\"").expect("parses");
        assert!(ConfigLoader::normalize(raw).is_err());
    }
}
