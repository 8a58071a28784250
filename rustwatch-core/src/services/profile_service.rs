use std::sync::Arc;

use tracing::warn;

use crate::extract::{extract, is_valid_profile};
use rustwatch_common::models::{PlayerId, ProfileFacts};
use rustwatch_common::traits::ProfileFetcher;

/// Fetch + extract. Fetch failures are logged and come back as "nothing
/// known" rather than as errors.
#[derive(Clone)]
pub struct ProfileService {
    fetcher: Arc<dyn ProfileFetcher>,
}

impl ProfileService {
    pub fn new(fetcher: Arc<dyn ProfileFetcher>) -> Self {
        Self { fetcher }
    }

    pub async fn facts(&self, id: &PlayerId) -> ProfileFacts {
        match self.fetcher.fetch_profile(id).await {
            Ok(document) => extract(&document),
            Err(e) => {
                warn!("Profile fetch for {id} failed: {e}");
                ProfileFacts::default()
            }
        }
    }

    /// True if the identifier resolves to a real upstream profile.
    pub async fn exists(&self, id: &PlayerId) -> bool {
        match self.fetcher.fetch_profile(id).await {
            Ok(document) => is_valid_profile(&document),
            Err(e) => {
                warn!("Profile fetch for {id} failed: {e}");
                false
            }
        }
    }
}
