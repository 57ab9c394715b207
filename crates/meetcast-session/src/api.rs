//! Account-level REST API client.

use crate::error::ApiError;
use meetcast_auth::Signer;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

/// Production REST API base URL.
pub const DEFAULT_API_BASE_URL: &str = "https://api.zoom.us/v2";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// The subset of meeting details the bot cares about.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct MeetingInfo {
    #[serde(default)]
    pub id: Option<u64>,
    #[serde(default)]
    pub topic: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub join_url: Option<String>,
}

/// REST client that signs every request with a freshly minted auth token.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    signer: Signer,
}

impl ApiClient {
    /// # Errors
    ///
    /// Returns `ApiError::Network` if the HTTP client cannot be built.
    pub fn new(base_url: impl Into<String>, signer: Signer) -> Result<Self, ApiError> {
        Ok(Self {
            http: build_http_client()?,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            signer,
        })
    }

    /// Fetches `GET {base}/meetings/{meeting_number}`.
    pub async fn meeting(&self, meeting_number: &str) -> Result<MeetingInfo, ApiError> {
        let token = self.signer.auth_token()?;
        let url = format!("{}/meetings/{}", self.base_url, meeting_number);
        debug!(%url, "fetching meeting details");

        let resp = self
            .http
            .get(&url)
            .bearer_auth(token.as_str())
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            return Err(ApiError::Status { status, body });
        }

        Ok(resp.json().await?)
    }
}

fn build_http_client() -> Result<reqwest::Client, reqwest::Error> {
    reqwest::Client::builder()
        .timeout(REQUEST_TIMEOUT)
        .user_agent(concat!("meetcast/", env!("CARGO_PKG_VERSION")))
        .build()
}
