//! Shared handles threaded through the refresh pipeline.
use std::sync::Arc;

use tokio::sync::broadcast;

use crate::domain::model::{AppConfig, StatusMessage};
use crate::ports::{browser::Browser, clock::Clock, repo::FeedRepo};

pub struct AppContext<R, B, C>
where
    R: FeedRepo + ?Sized,
    B: Browser + ?Sized,
    C: Clock + ?Sized,
{
    pub cfg: Arc<AppConfig>,
    pub repo: Arc<R>,
    pub browser: Arc<B>,
    pub clock: Arc<C>,
    pub status: broadcast::Sender<StatusMessage>,
}

impl<R, B, C> Clone for AppContext<R, B, C>
where
    R: FeedRepo + ?Sized,
    B: Browser + ?Sized,
    C: Clock + ?Sized,
{
    fn clone(&self) -> Self {
        Self {
            cfg: self.cfg.clone(),
            repo: self.repo.clone(),
            browser: self.browser.clone(),
            clock: self.clock.clone(),
            status: self.status.clone(),
        }
    }
}
