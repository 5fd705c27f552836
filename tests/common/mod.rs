#![allow(dead_code)]
//! Fake ports shared by the integration tests: in-memory repo, scripted
//! browser with lifecycle instrumentation, fixed clock, counting seed source.
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicI64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use tokio::sync::broadcast;

use pagefeed::app::context::AppContext;
use pagefeed::app::orchestrator::Orchestrator;
use pagefeed::domain::model::{
    AppConfig, AppMode, BrowserSettings, Feed, FeedDraft, FeedPatch, HttpConfig, ProbeRequest,
    RefreshConfig, StatusMessage, SubjectItem,
};
use pagefeed::ports::browser::{Browser, BrowserError};
use pagefeed::ports::clock::Clock;
use pagefeed::ports::repo::FeedRepo;
use pagefeed::ports::seed::SeedSource;

pub fn item(title: &str, link: &str) -> SubjectItem {
    SubjectItem {
        title: title.to_string(),
        link: link.to_string(),
    }
}

pub fn draft(name: &str, url: &str, selector: &str) -> FeedDraft {
    FeedDraft {
        name: name.to_string(),
        url: url.to_string(),
        css_selector: selector.to_string(),
    }
}

// ---------------------------------------------------------------------------
// MemoryRepo
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct MemoryRepo {
    feeds: Mutex<Vec<Feed>>,
    next_id: AtomicI64,
    fail_get_all: AtomicBool,
}

impl MemoryRepo {
    pub fn new() -> Self {
        Self {
            feeds: Mutex::new(Vec::new()),
            next_id: AtomicI64::new(1),
            fail_get_all: AtomicBool::new(false),
        }
    }

    /// Makes every subsequent `get_all` fail, simulating a broken store.
    pub fn fail_reads(&self) {
        self.fail_get_all.store(true, Ordering::SeqCst);
    }

    pub fn snapshot(&self) -> Vec<Feed> {
        self.feeds.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl FeedRepo for MemoryRepo {
    async fn migrate(&self) -> Result<(), String> {
        Ok(())
    }

    async fn get_all(&self) -> Result<Vec<Feed>, String> {
        if self.fail_get_all.load(Ordering::SeqCst) {
            return Err("scripted read failure".to_string());
        }
        Ok(self.snapshot())
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<Feed>, String> {
        Ok(self
            .feeds
            .lock()
            .unwrap()
            .iter()
            .find(|f| f.id == id)
            .cloned())
    }

    async fn get_by_url(&self, url: &str) -> Result<Option<Feed>, String> {
        Ok(self
            .feeds
            .lock()
            .unwrap()
            .iter()
            .find(|f| f.url == url)
            .cloned())
    }

    async fn add(&self, draft: &FeedDraft, now_ms: i64) -> Result<i64, String> {
        let mut feeds = self.feeds.lock().unwrap();
        if feeds.iter().any(|f| f.url == draft.url) {
            return Err(format!("feed url already exists: {}", draft.url));
        }
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        feeds.push(Feed {
            id,
            name: draft.name.clone(),
            url: draft.url.clone(),
            css_selector: draft.css_selector.clone(),
            items: Vec::new(),
            latest_count: 0,
            created_at_ms: now_ms,
            updated_at_ms: now_ms,
        });
        Ok(id)
    }

    async fn update(&self, id: i64, patch: FeedPatch, now_ms: i64) -> Result<(), String> {
        let mut feeds = self.feeds.lock().unwrap();
        let feed = feeds
            .iter_mut()
            .find(|f| f.id == id)
            .ok_or_else(|| format!("feed {id} not found"))?;
        if let Some(name) = patch.name {
            feed.name = name;
        }
        if let Some(url) = patch.url {
            feed.url = url;
        }
        if let Some(selector) = patch.css_selector {
            feed.css_selector = selector;
        }
        if let Some(items) = patch.items {
            feed.items = items;
        }
        if let Some(count) = patch.latest_count {
            feed.latest_count = count;
        }
        feed.updated_at_ms = now_ms;
        Ok(())
    }

    async fn delete(&self, id: i64) -> Result<(), String> {
        self.feeds.lock().unwrap().retain(|f| f.id != id);
        Ok(())
    }

    async fn clear(&self) -> Result<(), String> {
        self.feeds.lock().unwrap().clear();
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// FakeBrowser
// ---------------------------------------------------------------------------

#[derive(Clone)]
pub enum FakeBehavior {
    /// Loads promptly and the probe returns these items.
    Items(Vec<SubjectItem>),
    /// Navigation never signals complete.
    NeverLoads,
    /// Tab creation fails.
    FailOpen,
    /// Navigation errors.
    FailLoad,
    /// Probe evaluation errors.
    FailProbe,
}

/// Scripted per-url browser that records tab lifecycle events.
#[derive(Default)]
pub struct FakeBrowser {
    behaviors: Mutex<HashMap<String, FakeBehavior>>,
    events: Mutex<Vec<String>>,
    inflight: AtomicUsize,
    max_inflight: AtomicUsize,
}

impl FakeBrowser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn script(&self, url: &str, behavior: FakeBehavior) {
        self.behaviors
            .lock()
            .unwrap()
            .insert(url.to_string(), behavior);
    }

    fn behavior(&self, url: &str) -> FakeBehavior {
        self.behaviors
            .lock()
            .unwrap()
            .get(url)
            .cloned()
            .unwrap_or(FakeBehavior::Items(Vec::new()))
    }

    fn record(&self, event: String) {
        self.events.lock().unwrap().push(event);
    }

    pub fn events(&self) -> Vec<String> {
        self.events.lock().unwrap().clone()
    }

    pub fn open_count(&self) -> usize {
        self.events()
            .iter()
            .filter(|e| e.starts_with("open:"))
            .count()
    }

    pub fn close_count(&self) -> usize {
        self.events()
            .iter()
            .filter(|e| e.starts_with("close:"))
            .count()
    }

    pub fn max_inflight(&self) -> usize {
        self.max_inflight.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl Browser for FakeBrowser {
    type Tab = String;

    async fn open_tab(&self, url: &str) -> Result<Self::Tab, BrowserError> {
        if matches!(self.behavior(url), FakeBehavior::FailOpen) {
            self.record(format!("openfail:{url}"));
            return Err(BrowserError::Tab("scripted open failure".to_string()));
        }
        self.record(format!("open:{url}"));
        let inflight = self.inflight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_inflight.fetch_max(inflight, Ordering::SeqCst);
        Ok(url.to_string())
    }

    async fn wait_for_load(&self, tab: &Self::Tab) -> Result<(), BrowserError> {
        match self.behavior(tab) {
            FakeBehavior::NeverLoads => {
                futures::future::pending::<()>().await;
                unreachable!()
            }
            FakeBehavior::FailLoad => Err(BrowserError::Tab("scripted nav failure".to_string())),
            _ => {
                // Keep the tab in flight briefly so batch overlap is observable.
                tokio::time::sleep(std::time::Duration::from_millis(5)).await;
                Ok(())
            }
        }
    }

    async fn run_probe(
        &self,
        tab: &Self::Tab,
        _probe: &ProbeRequest,
    ) -> Result<Vec<SubjectItem>, BrowserError> {
        match self.behavior(tab) {
            FakeBehavior::Items(items) => Ok(items),
            FakeBehavior::FailProbe => {
                Err(BrowserError::Script("scripted probe failure".to_string()))
            }
            _ => Ok(Vec::new()),
        }
    }

    async fn close_tab(&self, tab: Self::Tab) -> Result<(), BrowserError> {
        self.record(format!("close:{tab}"));
        self.inflight.fetch_sub(1, Ordering::SeqCst);
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Clock & seed fakes
// ---------------------------------------------------------------------------

pub struct FixedClock(pub i64);

#[async_trait::async_trait]
impl Clock for FixedClock {
    async fn now_epoch_ms(&self) -> i64 {
        self.0
    }
}

/// Counts fetches so single-flight initialization is observable.
pub struct CountingSeed {
    pub drafts: Vec<FeedDraft>,
    pub fetches: AtomicUsize,
}

impl CountingSeed {
    pub fn new(drafts: Vec<FeedDraft>) -> Self {
        Self {
            drafts,
            fetches: AtomicUsize::new(0),
        }
    }
}

#[async_trait::async_trait]
impl SeedSource for CountingSeed {
    async fn fetch_defaults(&self) -> Result<Vec<FeedDraft>, String> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        Ok(self.drafts.clone())
    }
}

// ---------------------------------------------------------------------------
// Wiring helpers
// ---------------------------------------------------------------------------

pub fn test_config(refresh: RefreshConfig) -> AppConfig {
    AppConfig {
        mode: AppMode::Prod,
        log_level: "info".to_string(),
        db_path: "test.db".into(),
        http: HttpConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
        },
        bootstrap_url: None,
        refresh_interval_seconds: None,
        refresh,
        browser: BrowserSettings { headless: true },
    }
}

pub type TestOrchestrator = Orchestrator<MemoryRepo, FakeBrowser, FixedClock>;

pub fn orchestrator(
    repo: Arc<MemoryRepo>,
    browser: Arc<FakeBrowser>,
    refresh: RefreshConfig,
    seed: Option<Arc<dyn SeedSource>>,
) -> (TestOrchestrator, broadcast::Receiver<StatusMessage>) {
    let (status_tx, status_rx) = broadcast::channel(64);
    let ctx = AppContext {
        cfg: Arc::new(test_config(refresh)),
        repo,
        browser,
        clock: Arc::new(FixedClock(1_000)),
        status: status_tx,
    };
    (Orchestrator::new(ctx, seed), status_rx)
}
