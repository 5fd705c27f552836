//! Browser abstraction: ephemeral tab lifecycle plus the probe RPC.
use thiserror::Error;

use crate::domain::model::{ProbeRequest, SubjectItem};

#[derive(Debug, Error)]
pub enum BrowserError {
    #[error("browser launch error: {0}")]
    Launch(String),

    #[error("tab error: {0}")]
    Tab(String),

    #[error("script error: {0}")]
    Script(String),
}

/// One background tab per call; the session controller owns the lifecycle.
///
/// `wait_for_load` resolves when the tab signals navigation-complete and may
/// pend forever on pages that never settle, so callers race it against a
/// timeout. `run_probe` executes the extraction probe inside the tab's
/// context; request and response cross a serialization boundary.
#[async_trait::async_trait]
pub trait Browser: Send + Sync {
    type Tab: Send + Sync;

    async fn open_tab(&self, url: &str) -> Result<Self::Tab, BrowserError>;
    async fn wait_for_load(&self, tab: &Self::Tab) -> Result<(), BrowserError>;
    async fn run_probe(
        &self,
        tab: &Self::Tab,
        probe: &ProbeRequest,
    ) -> Result<Vec<SubjectItem>, BrowserError>;
    async fn close_tab(&self, tab: Self::Tab) -> Result<(), BrowserError>;
}
