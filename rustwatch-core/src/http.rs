//! HTTP access to the upstream profile service.
//!
//! [`ProfileFetcher`] is the seam: production code uses [`HttpProfileFetcher`]
//! (a thin wrapper over reqwest), tests plug in canned pages instead.

use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use crate::Error;
use rustwatch_common::models::PlayerId;
use rustwatch_common::traits::ProfileFetcher;

pub const BATTLEMETRICS_PLAYERS_URL: &str = "https://www.battlemetrics.com/players/";
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(15);

const USER_AGENT: &str = concat!("rustwatch/", env!("CARGO_PKG_VERSION"));

#[derive(Clone)]
pub struct HttpProfileFetcher {
    client: reqwest::Client,
    base_url: String,
}

impl HttpProfileFetcher {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, Error> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()?;

        let base_url = if base_url.ends_with('/') {
            base_url.to_string()
        } else {
            format!("{base_url}/")
        };

        Ok(Self { client, base_url })
    }

    pub fn profile_url(&self, id: &PlayerId) -> String {
        format!("{}{}", self.base_url, id)
    }
}

#[async_trait]
impl ProfileFetcher for HttpProfileFetcher {
    async fn fetch_profile(&self, id: &PlayerId) -> Result<String, Error> {
        let url = self.profile_url(id);
        debug!("GET {url}");

        let fetch_error = |reason: String| Error::Fetch {
            player_id: id.to_string(),
            reason,
        };

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| fetch_error(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(fetch_error(format!("unexpected HTTP status {status}")));
        }

        response.text().await.map_err(|e| fetch_error(e.to_string()))
    }
}
