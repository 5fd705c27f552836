//! Source of default feed definitions imported once at startup.
use crate::domain::model::FeedDraft;

#[async_trait::async_trait]
pub trait SeedSource: Send + Sync {
    async fn fetch_defaults(&self) -> Result<Vec<FeedDraft>, String>;
}
