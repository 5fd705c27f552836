//! Refresh orchestrator: loads feeds, drives batched page sessions, merges
//! results into the store and reports aggregate status.
use std::sync::Arc;

use tokio::sync::OnceCell;
use tracing::{error, info, warn};

use crate::app::context::AppContext;
use crate::app::session::run_session;
use crate::domain::merge::merge;
use crate::domain::model::{
    Feed, FeedDraft, FeedPatch, SessionOutcome, StatusMessage, SubjectItem, TriggerMessage,
};
use crate::ports::{browser::Browser, clock::Clock, repo::FeedRepo, seed::SeedSource};

pub struct Orchestrator<R, B, C>
where
    R: FeedRepo + ?Sized,
    B: Browser + ?Sized,
    C: Clock + ?Sized,
{
    ctx: AppContext<R, B, C>,
    seed: Option<Arc<dyn SeedSource>>,
    init: OnceCell<()>,
}

impl<R, B, C> Orchestrator<R, B, C>
where
    R: FeedRepo + ?Sized,
    B: Browser + ?Sized,
    C: Clock + ?Sized,
{
    pub fn new(ctx: AppContext<R, B, C>, seed: Option<Arc<dyn SeedSource>>) -> Self {
        Self {
            ctx,
            seed,
            init: OnceCell::new(),
        }
    }

    /// Dispatches one trigger. Every trigger first awaits the single-flight
    /// initializer, then opens a cycle with a start notification.
    pub async fn handle(&self, msg: TriggerMessage) {
        self.ensure_ready().await;
        match msg {
            TriggerMessage::PageRefresh => self.refresh_all().await,
            TriggerMessage::AddFeed { payload } => self.add_feed_and_refresh(payload).await,
        }
    }

    /// One-time startup work shared by concurrent triggers: the bootstrap
    /// import of default feeds. Import failure is logged and never blocks
    /// trigger handling.
    async fn ensure_ready(&self) {
        self.init
            .get_or_init(|| async {
                let Some(seed) = &self.seed else {
                    return;
                };
                match seed.fetch_defaults().await {
                    Ok(drafts) => match self.import_missing(&drafts).await {
                        Ok(added) => {
                            info!(defaults = drafts.len(), added, "bootstrap import complete")
                        }
                        Err(e) => warn!(error = %e, "bootstrap import failed"),
                    },
                    Err(e) => warn!(error = %e, "failed to fetch default feeds"),
                }
            })
            .await;
    }

    async fn import_missing(&self, drafts: &[FeedDraft]) -> Result<usize, String> {
        let mut added = 0usize;
        for draft in drafts {
            if self.ctx.repo.get_by_url(&draft.url).await?.is_none() {
                let now_ms = self.ctx.clock.now_epoch_ms().await;
                self.ctx.repo.add(draft, now_ms).await?;
                added += 1;
            }
        }
        Ok(added)
    }

    /// Refreshes every stored feed in consecutive batches of
    /// `max_concurrent_sessions`. A batch fully settles before the next one
    /// starts; per-feed failures never abort siblings.
    pub async fn refresh_all(&self) {
        self.emit(StatusMessage::FeedsUpdateStart);
        let success = match self.refresh_all_inner().await {
            Ok(()) => true,
            Err(e) => {
                error!(error = %e, "refresh cycle failed");
                false
            }
        };
        self.emit(StatusMessage::FeedsUpdateEnd { success });
    }

    async fn refresh_all_inner(&self) -> Result<(), String> {
        let feeds = self.ctx.repo.get_all().await?;
        let batch_size = self.ctx.cfg.refresh.max_concurrent_sessions.max(1);
        info!(feeds = feeds.len(), batch_size, "refresh cycle start");

        for batch in feeds.chunks(batch_size) {
            futures::future::join_all(batch.iter().map(|feed| self.refresh_one(feed))).await;
        }
        Ok(())
    }

    /// Persists a new feed and immediately runs one session/merge cycle for it.
    pub async fn add_feed_and_refresh(&self, draft: FeedDraft) {
        self.emit(StatusMessage::FeedsUpdateStart);
        let success = match self.add_and_refresh_inner(draft).await {
            Ok(()) => true,
            Err(e) => {
                error!(error = %e, "add feed failed");
                false
            }
        };
        self.emit(StatusMessage::FeedUpdateEnd { success });
    }

    async fn add_and_refresh_inner(&self, draft: FeedDraft) -> Result<(), String> {
        let now_ms = self.ctx.clock.now_epoch_ms().await;
        let id = self.ctx.repo.add(&draft, now_ms).await?;
        let feed = self
            .ctx
            .repo
            .get_by_id(id)
            .await?
            .ok_or_else(|| format!("feed {id} missing right after insert"))?;
        info!(feed_id = id, url = %feed.url, "feed added");
        self.refresh_one(&feed).await;
        Ok(())
    }

    /// One feed's session + merge + persist. Errors are contained here so a
    /// batch settles regardless of individual outcomes.
    async fn refresh_one(&self, feed: &Feed) {
        let cfg = &self.ctx.cfg.refresh;
        match run_session(self.ctx.browser.as_ref(), cfg, feed).await {
            SessionOutcome::Extracted(items) if !items.is_empty() => {
                if let Err(e) = self.merge_and_persist(feed.id, &items).await {
                    warn!(feed_id = feed.id, error = %e, "failed to persist merged items");
                }
            }
            SessionOutcome::Extracted(_) => {
                error!(
                    feed_id = feed.id,
                    selector = %feed.css_selector,
                    "no elements matched selector"
                );
                self.note_unproductive_cycle(feed.id).await;
            }
            SessionOutcome::Skipped => {}
            SessionOutcome::TimedOut | SessionOutcome::Failed => {
                self.note_unproductive_cycle(feed.id).await;
            }
        }
    }

    async fn merge_and_persist(&self, feed_id: i64, items: &[SubjectItem]) -> Result<(), String> {
        // Re-read so the merge sees the current record, not the cycle snapshot.
        let current = self
            .ctx
            .repo
            .get_by_id(feed_id)
            .await?
            .ok_or_else(|| format!("feed {feed_id} disappeared mid-cycle"))?;

        let (merged, added) = merge(&current.items, items);
        let now_ms = self.ctx.clock.now_epoch_ms().await;
        self.ctx
            .repo
            .update(feed_id, FeedPatch::merged(merged.clone(), added as i64), now_ms)
            .await?;
        info!(
            feed_id,
            name = %current.name,
            fetched = items.len(),
            added,
            total = merged.len(),
            "feed updated"
        );
        Ok(())
    }

    /// Timed-out/failed/empty cycles leave the record untouched by default;
    /// `reset_latest_count_on_failure` opts into zeroing the stale count.
    async fn note_unproductive_cycle(&self, feed_id: i64) {
        if !self.ctx.cfg.refresh.reset_latest_count_on_failure {
            return;
        }
        let now_ms = self.ctx.clock.now_epoch_ms().await;
        if let Err(e) = self
            .ctx
            .repo
            .update(feed_id, FeedPatch::reset_latest_count(), now_ms)
            .await
        {
            warn!(feed_id, error = %e, "failed to reset latest count");
        }
    }

    fn emit(&self, msg: StatusMessage) {
        // Send fails only when no listener is subscribed, which is fine.
        let _ = self.ctx.status.send(msg);
    }
}
