//! Record store abstraction for feed subscriptions.
use crate::domain::model::{Feed, FeedDraft, FeedPatch};

/// Keyed feed storage with a uniqueness constraint on `url`.
///
/// `update` merges the patch onto the existing record, bumps `updated_at_ms`,
/// and fails without side effects when the id is absent.
#[async_trait::async_trait]
pub trait FeedRepo: Send + Sync {
    async fn migrate(&self) -> Result<(), String>;

    async fn get_all(&self) -> Result<Vec<Feed>, String>;
    async fn get_by_id(&self, id: i64) -> Result<Option<Feed>, String>;
    async fn get_by_url(&self, url: &str) -> Result<Option<Feed>, String>;

    async fn add(&self, draft: &FeedDraft, now_ms: i64) -> Result<i64, String>;
    async fn update(&self, id: i64, patch: FeedPatch, now_ms: i64) -> Result<(), String>;
    async fn delete(&self, id: i64) -> Result<(), String>;
    async fn clear(&self) -> Result<(), String>;
}
