//! Time source behind the record timestamps.
#[async_trait::async_trait]
pub trait Clock: Send + Sync {
    /// Current time as milliseconds since the Unix epoch.
    async fn now_epoch_ms(&self) -> i64;
}
