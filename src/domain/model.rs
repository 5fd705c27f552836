//! Core domain types: feed records, extracted items, the probe contract,
//! session outcomes, trigger/status messages and the normalized config.
use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// One extracted `{title, link}` pair. `title` is the dedup key within a feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubjectItem {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub link: String,
}

/// A persisted subscription record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Feed {
    pub id: i64,
    pub name: String,
    pub url: String,
    pub css_selector: String,
    pub items: Vec<SubjectItem>,
    pub latest_count: i64,
    pub created_at_ms: i64,
    pub updated_at_ms: i64,
}

/// Fields a caller supplies when creating a feed. The store assigns the id;
/// items start empty and `latest_count` at zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedDraft {
    #[serde(default)]
    pub name: String,
    pub url: String,
    pub css_selector: String,
}

/// Partial update merged onto an existing record; `None` fields are kept.
#[derive(Debug, Clone, Default)]
pub struct FeedPatch {
    pub name: Option<String>,
    pub url: Option<String>,
    pub css_selector: Option<String>,
    pub items: Option<Vec<SubjectItem>>,
    pub latest_count: Option<i64>,
}

impl FeedPatch {
    pub fn merged(items: Vec<SubjectItem>, added: i64) -> Self {
        Self {
            items: Some(items),
            latest_count: Some(added),
            ..Self::default()
        }
    }

    pub fn reset_latest_count() -> Self {
        Self {
            latest_count: Some(0),
            ..Self::default()
        }
    }
}

/// Arguments for one probe invocation. Crosses the execution-context boundary
/// serialized; the remote side never shares memory with the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProbeRequest {
    pub selector: String,
    pub max_attempts: u32,
    pub poll_interval_ms: u64,
}

/// Result of one page session for one feed.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionOutcome {
    /// Probe ran to completion; the list may be empty (extraction miss).
    Extracted(Vec<SubjectItem>),
    /// Feed missing url or selector; no tab was opened.
    Skipped,
    /// Page never signalled load-complete within the timeout.
    TimedOut,
    /// Tab lifecycle or probe error.
    Failed,
}

/// Inbound trigger messages (caller -> orchestrator).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TriggerMessage {
    PageRefresh,
    AddFeed { payload: FeedDraft },
}

/// Outbound status messages (orchestrator -> listeners).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StatusMessage {
    FeedsUpdateStart,
    FeedsUpdateEnd { success: bool },
    FeedUpdateEnd { success: bool },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppMode {
    Dev,
    Prod,
}

/// Refresh pipeline knobs. Defaults mirror the shipped behavior: batches of 3,
/// a 5.5s load race, a 5x1s probe, and last-known-good `latest_count`.
#[derive(Debug, Clone)]
pub struct RefreshConfig {
    pub max_concurrent_sessions: usize,
    pub page_load_timeout: Duration,
    pub probe_max_attempts: u32,
    pub probe_poll_interval: Duration,
    pub reset_latest_count_on_failure: bool,
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self {
            max_concurrent_sessions: 3,
            page_load_timeout: Duration::from_millis(5500),
            probe_max_attempts: 5,
            probe_poll_interval: Duration::from_millis(1000),
            reset_latest_count_on_failure: false,
        }
    }
}

impl RefreshConfig {
    pub fn probe_request(&self, selector: &str) -> ProbeRequest {
        ProbeRequest {
            selector: selector.to_string(),
            max_attempts: self.probe_max_attempts,
            poll_interval_ms: self.probe_poll_interval.as_millis() as u64,
        }
    }
}

#[derive(Debug, Clone)]
pub struct HttpConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone)]
pub struct BrowserSettings {
    pub headless: bool,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub mode: AppMode,
    pub log_level: String,
    pub db_path: PathBuf,
    pub http: HttpConfig,
    pub bootstrap_url: Option<String>,
    pub refresh_interval_seconds: Option<u64>,
    pub refresh: RefreshConfig,
    pub browser: BrowserSettings,
}
