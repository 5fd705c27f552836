//! Bootstrap import: fetches the remote follow list of default feeds.
use serde::Deserialize;
use tracing::debug;

use crate::domain::model::FeedDraft;
use crate::ports::seed::SeedSource;

/// Shape of the hosted follow list: `{ "default": [ {name, url, cssSelector} ] }`.
#[derive(Debug, Deserialize)]
struct FollowFile {
    default: Vec<FeedDraft>,
}

pub struct HttpSeedSource {
    client: reqwest::Client,
    url: String,
}

impl HttpSeedSource {
    pub fn new(url: String) -> Result<Self, String> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .map_err(|e| format!("http client build error: {e}"))?;
        Ok(Self { client, url })
    }
}

#[async_trait::async_trait]
impl SeedSource for HttpSeedSource {
    async fn fetch_defaults(&self) -> Result<Vec<FeedDraft>, String> {
        debug!(url = %self.url, "fetching default feeds");
        let resp = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| format!("follow list fetch error: {e}"))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(format!("follow list fetch failed: http {status}"));
        }

        let file: FollowFile = resp
            .json()
            .await
            .map_err(|e| format!("follow list decode error: {e}"))?;
        Ok(file.default)
    }
}
