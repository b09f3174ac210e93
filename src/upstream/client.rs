use crate::entity::Entity;
use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, StatusCode};
use thiserror::Error;

/// Upstream fetch failures. Every variant is handled the same way by the
/// refresher (skip the cycle); they differ only in the diagnostic.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("unable to make request: {0}")]
    Request(#[source] reqwest::Error),

    #[error("got unexpected HTTP status: {0}")]
    Status(StatusCode),

    #[error("unable to read response body: {0}")]
    Body(#[source] reqwest::Error),

    #[error("unable to parse JSON response: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Source of the full upstream entity set.
///
/// Implementations must not touch the entity store; the refresher owns
/// filtering and writes.
#[async_trait]
pub trait EntitySource: Send + Sync {
    /// Fetch every entity currently known upstream
    async fn fetch_entities(&self) -> Result<Vec<Entity>, FetchError>;
}

/// HTTP client for the status endpoint (`GET /api/states`).
///
/// Authenticates with a long-lived Bearer token.
pub struct StatusClient {
    status_url: String,
    auth_token: String,
    http_client: Client,
}

impl StatusClient {
    pub fn new(status_url: String, auth_token: String) -> Result<Self, FetchError> {
        let http_client = Client::builder()
            .user_agent(concat!("roomtemp/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(FetchError::Request)?;

        Ok(Self {
            status_url,
            auth_token,
            http_client,
        })
    }

    pub fn status_url(&self) -> &str {
        &self.status_url
    }
}

#[async_trait]
impl EntitySource for StatusClient {
    async fn fetch_entities(&self) -> Result<Vec<Entity>, FetchError> {
        let response = self
            .http_client
            .get(&self.status_url)
            .header(CONTENT_TYPE, "application/json")
            .bearer_auth(&self.auth_token)
            .send()
            .await
            .map_err(FetchError::Request)?;

        if response.status() != StatusCode::OK {
            return Err(FetchError::Status(response.status()));
        }

        let body = response.bytes().await.map_err(FetchError::Body)?;
        let entities = serde_json::from_slice::<Vec<Entity>>(&body)?;

        Ok(entities)
    }
}
