//! Page session controller: one ephemeral tab per feed, closed on every exit path.
use tracing::{debug, info, warn};

use crate::domain::model::{Feed, RefreshConfig, SessionOutcome};
use crate::ports::browser::Browser;

/// Opens a background tab for `feed.url`, races load-complete against the
/// configured timeout, runs the extraction probe, and closes the tab.
///
/// The losing side of the race is dropped (cancelled) and the tab is closed
/// before returning, so a page that never settles cannot leak a tab. Errors
/// are contained here; retry policy belongs to the caller, which has none.
pub async fn run_session<B>(browser: &B, cfg: &RefreshConfig, feed: &Feed) -> SessionOutcome
where
    B: Browser + ?Sized,
{
    if feed.url.is_empty() || feed.css_selector.is_empty() {
        info!(feed_id = feed.id, "skipping feed: missing url or css selector");
        return SessionOutcome::Skipped;
    }

    debug!(feed_id = feed.id, url = %feed.url, "session start");
    let tab = match browser.open_tab(&feed.url).await {
        Ok(tab) => tab,
        Err(e) => {
            warn!(feed_id = feed.id, url = %feed.url, error = %e, "failed to open tab");
            return SessionOutcome::Failed;
        }
    };

    match tokio::time::timeout(cfg.page_load_timeout, browser.wait_for_load(&tab)).await {
        Err(_) => {
            info!(
                feed_id = feed.id,
                url = %feed.url,
                timeout_ms = cfg.page_load_timeout.as_millis() as u64,
                "page load timed out"
            );
            close_tab(browser, tab, feed.id).await;
            return SessionOutcome::TimedOut;
        }
        Ok(Err(e)) => {
            warn!(feed_id = feed.id, url = %feed.url, error = %e, "navigation failed");
            close_tab(browser, tab, feed.id).await;
            return SessionOutcome::Failed;
        }
        Ok(Ok(())) => {}
    }

    let probe = cfg.probe_request(&feed.css_selector);
    let result = browser.run_probe(&tab, &probe).await;
    close_tab(browser, tab, feed.id).await;

    match result {
        Ok(items) => {
            debug!(feed_id = feed.id, found = items.len(), "probe finished");
            SessionOutcome::Extracted(items)
        }
        Err(e) => {
            warn!(feed_id = feed.id, selector = %feed.css_selector, error = %e, "probe failed");
            SessionOutcome::Failed
        }
    }
}

async fn close_tab<B>(browser: &B, tab: B::Tab, feed_id: i64)
where
    B: Browser + ?Sized,
{
    if let Err(e) = browser.close_tab(tab).await {
        warn!(feed_id, error = %e, "failed to close tab");
    }
}
