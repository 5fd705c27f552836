//! Headless Chrome adapter implementing the `Browser` port via chromiumoxide.
use chromiumoxide::browser::{Browser as CdpBrowser, BrowserConfig};
use chromiumoxide::cdp::js_protocol::runtime::EvaluateParams;
use chromiumoxide::page::Page;
use futures::StreamExt;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::domain::model::{BrowserSettings, ProbeRequest, SubjectItem};
use crate::infra::probe::render_probe_script;
use crate::ports::browser::{Browser, BrowserError};

pub struct ChromiumBrowser {
    browser: CdpBrowser,
    _event_loop: JoinHandle<()>,
}

impl ChromiumBrowser {
    /// Launches a Chrome process and spawns the CDP event loop task.
    pub async fn launch(settings: &BrowserSettings) -> Result<Self, BrowserError> {
        let mut builder = BrowserConfig::builder();
        if !settings.headless {
            builder = builder.with_head();
        }
        let config = builder.build().map_err(BrowserError::Launch)?;

        let (browser, mut handler) = CdpBrowser::launch(config)
            .await
            .map_err(|e| BrowserError::Launch(e.to_string()))?;

        let event_loop = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    warn!(error = %e, "browser event loop error");
                    break;
                }
            }
        });

        Ok(Self {
            browser,
            _event_loop: event_loop,
        })
    }
}

#[async_trait::async_trait]
impl Browser for ChromiumBrowser {
    type Tab = Page;

    async fn open_tab(&self, url: &str) -> Result<Self::Tab, BrowserError> {
        debug!(url, "opening tab");
        self.browser
            .new_page(url)
            .await
            .map_err(|e| BrowserError::Tab(e.to_string()))
    }

    async fn wait_for_load(&self, tab: &Self::Tab) -> Result<(), BrowserError> {
        tab.wait_for_navigation()
            .await
            .map(|_| ())
            .map_err(|e| BrowserError::Tab(e.to_string()))
    }

    async fn run_probe(
        &self,
        tab: &Self::Tab,
        probe: &ProbeRequest,
    ) -> Result<Vec<SubjectItem>, BrowserError> {
        let script = render_probe_script(probe);
        let params = EvaluateParams::builder()
            .expression(script)
            .await_promise(true)
            .return_by_value(true)
            .build()
            .map_err(BrowserError::Script)?;

        let evaluation = tab
            .evaluate(params)
            .await
            .map_err(|e| BrowserError::Script(e.to_string()))?;
        evaluation
            .into_value::<Vec<SubjectItem>>()
            .map_err(|e| BrowserError::Script(format!("probe result decode: {e}")))
    }

    async fn close_tab(&self, tab: Self::Tab) -> Result<(), BrowserError> {
        tab.close()
            .await
            .map_err(|e| BrowserError::Tab(e.to_string()))
    }
}
