//! Photos Library API client.
//!
//! [`AuthenticatedClient`] owns the token. Before every outbound request it
//! checks the expiry and, if needed, refreshes the access token first.

use photomirror_core::{BoxFuture, MediaApi, MirrorError, MirrorResult, Page};
use tokio::sync::Mutex;
use tracing::debug;

use crate::config::LibraryConfig;
use crate::oauth::OAuthClient;
use crate::tokens::Token;

/// An HTTP client holding a live, self-refreshing OAuth token.
///
/// Meant for sequential use by a single caller.
#[derive(Debug)]
pub struct AuthenticatedClient {
    oauth: OAuthClient,
    http_client: reqwest::Client,
    token: Mutex<Token>,
    library: LibraryConfig,
}

impl AuthenticatedClient {
    pub(crate) fn new(
        oauth: OAuthClient,
        token: Token,
        library: LibraryConfig,
    ) -> MirrorResult<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(library.timeout)
            .build()
            .map_err(|e| {
                MirrorError::configuration(format!("failed to create HTTP client: {}", e))
                    .with_source(e)
            })?;

        Ok(Self {
            oauth,
            http_client,
            token: Mutex::new(token),
            library,
        })
    }

    /// Returns a valid access token, refreshing an expired one first.
    async fn access_token(&self) -> MirrorResult<String> {
        let mut token = self.token.lock().await;
        if token.is_expired() {
            debug!("refreshing expired access token");
            self.oauth.refresh(&mut token).await?;
        }
        Ok(token.access_token.clone())
    }

    /// Fetches one page of the media item listing.
    ///
    /// The page token is always sent, empty for the first page.
    pub async fn list_media_items(&self, page_token: &str) -> MirrorResult<Page> {
        let access_token = self.access_token().await?;

        let mut request = self
            .http_client
            .get(&self.library.media_items_url)
            .bearer_auth(&access_token)
            .query(&[("pageToken", page_token)]);

        if let Some(size) = self.library.page_size {
            request = request.query(&[("pageSize", size.to_string())]);
        }

        let response = check_status(send(request).await?).await?;

        let body = response.text().await.map_err(|e| {
            MirrorError::transport(format!("failed to read response: {}", e)).with_source(e)
        })?;

        Page::from_json(&body).map_err(|e| {
            MirrorError::decode(format!("failed to parse media items page: {}", e)).with_source(e)
        })
    }

    /// Downloads the whole body at `url` into memory.
    pub async fn download_content(&self, url: &str) -> MirrorResult<Vec<u8>> {
        let access_token = self.access_token().await?;

        let request = self.http_client.get(url).bearer_auth(&access_token);
        let response = check_status(send(request).await?).await?;

        let bytes = response.bytes().await.map_err(|e| {
            MirrorError::transport(format!("failed to read content from {}: {}", url, e))
                .with_source(e)
        })?;
        Ok(bytes.to_vec())
    }
}

impl MediaApi for AuthenticatedClient {
    fn list_page<'a>(&'a self, page_token: &'a str) -> BoxFuture<'a, MirrorResult<Page>> {
        Box::pin(self.list_media_items(page_token))
    }

    fn download<'a>(&'a self, url: &'a str) -> BoxFuture<'a, MirrorResult<Vec<u8>>> {
        Box::pin(self.download_content(url))
    }
}

async fn send(request: reqwest::RequestBuilder) -> MirrorResult<reqwest::Response> {
    request.send().await.map_err(|e| {
        let message = if e.is_timeout() {
            "request timeout".to_string()
        } else if e.is_connect() {
            format!("connection failed: {}", e)
        } else {
            format!("request failed: {}", e)
        };
        MirrorError::transport(message).with_source(e)
    })
}

async fn check_status(response: reqwest::Response) -> MirrorResult<reqwest::Response> {
    let status = response.status();

    if status == reqwest::StatusCode::UNAUTHORIZED {
        return Err(MirrorError::authorization(
            "access token rejected by the server",
        ));
    }

    if !status.is_success() {
        let url = response.url().to_string();
        let body = response.text().await.unwrap_or_default();
        return Err(MirrorError::transport(format!(
            "GET {} failed ({}): {}",
            url, status, body
        )));
    }

    Ok(response)
}
