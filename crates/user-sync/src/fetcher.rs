//! Fetching the user list from the panel.

use std::future::Future;

use config::UserSyncConfig;
use url::Url;

use crate::{
    error::SyncError,
    identity::{Identity, UserList},
};

/// Something that can produce the current list of allowed users.
pub trait UserSource: Send + Sync + 'static {
    /// Performs a single retrieval. Retrying is up to the caller.
    fn fetch(&self) -> impl Future<Output = Result<Vec<Identity>, SyncError>> + Send;
}

/// Fetches the user list with one HTTP GET against the panel.
pub struct HttpUserSource {
    url: Url,
    client: reqwest::Client,
    max_response_size: usize,
}

impl HttpUserSource {
    /// Creates a source for the configured panel endpoint.
    pub fn new(config: &UserSyncConfig) -> Result<Self, SyncError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(SyncError::Client)?;

        Ok(Self {
            url: config.url.clone(),
            client,
            max_response_size: config.max_response_size,
        })
    }
}

impl UserSource for HttpUserSource {
    async fn fetch(&self) -> Result<Vec<Identity>, SyncError> {
        let mut response = self.client.get(self.url.clone()).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(SyncError::Status(status));
        }

        let limit = self.max_response_size;

        if let Some(length) = response.content_length()
            && length > limit as u64
        {
            return Err(SyncError::ResponseTooLarge { limit });
        }

        let mut body = Vec::new();

        while let Some(chunk) = response.chunk().await? {
            if body.len() + chunk.len() > limit {
                return Err(SyncError::ResponseTooLarge { limit });
            }

            body.extend_from_slice(&chunk);
        }

        let list: UserList = serde_json::from_slice(&body)?;
        log::debug!("Fetched {} users from the panel", list.users.len());

        Ok(list.users)
    }
}
