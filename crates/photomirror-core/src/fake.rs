//! In-memory [`MediaApi`] used by the unit tests.

use std::collections::HashMap;
use std::sync::Mutex;

use crate::api::{BoxFuture, MediaApi};
use crate::error::{ErrorCode, MirrorError, MirrorResult};
use crate::media::{MediaItem, Page};

type Canned<T> = Result<T, (ErrorCode, String)>;

/// Serves canned pages keyed by page token and records every call.
///
/// Downloads of URLs without a canned response return the URL itself as the
/// body, so tests can tell which URL a file came from.
#[derive(Default)]
pub struct FakeApi {
    pages: HashMap<String, Canned<Page>>,
    downloads: HashMap<String, Canned<Vec<u8>>>,
    listed: Mutex<Vec<String>>,
    downloaded: Mutex<Vec<String>>,
}

impl FakeApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_page(mut self, token: &str, page: Page) -> Self {
        self.pages.insert(token.to_string(), Ok(page));
        self
    }

    pub fn with_page_error(mut self, token: &str, error: MirrorError) -> Self {
        self.pages.insert(
            token.to_string(),
            Err((error.code(), error.message().to_string())),
        );
        self
    }

    pub fn with_download_error(mut self, url: &str, error: MirrorError) -> Self {
        self.downloads.insert(
            url.to_string(),
            Err((error.code(), error.message().to_string())),
        );
        self
    }

    pub fn listed_tokens(&self) -> Vec<String> {
        self.listed.lock().unwrap().clone()
    }

    pub fn downloaded_urls(&self) -> Vec<String> {
        self.downloaded.lock().unwrap().clone()
    }
}

impl MediaApi for FakeApi {
    fn list_page<'a>(&'a self, page_token: &'a str) -> BoxFuture<'a, MirrorResult<Page>> {
        self.listed.lock().unwrap().push(page_token.to_string());
        let result = match self.pages.get(page_token) {
            Some(Ok(page)) => Ok(page.clone()),
            Some(Err((code, message))) => Err(MirrorError::new(*code, message.clone())),
            None => Err(MirrorError::transport(format!(
                "no page for token {page_token:?}"
            ))),
        };
        Box::pin(async move { result })
    }

    fn download<'a>(&'a self, url: &'a str) -> BoxFuture<'a, MirrorResult<Vec<u8>>> {
        self.downloaded.lock().unwrap().push(url.to_string());
        let result = match self.downloads.get(url) {
            Some(Ok(body)) => Ok(body.clone()),
            Some(Err((code, message))) => Err(MirrorError::new(*code, message.clone())),
            None => Ok(url.as_bytes().to_vec()),
        };
        Box::pin(async move { result })
    }
}

pub fn item(filename: &str, base_url: &str) -> MediaItem {
    MediaItem {
        id: format!("id-{filename}"),
        description: String::new(),
        base_url: base_url.to_string(),
        mime_type: "image/jpeg".to_string(),
        filename: filename.to_string(),
    }
}

pub fn page(items: &[(&str, &str)], next: &str) -> Page {
    Page {
        media_items: items.iter().map(|(f, u)| item(f, u)).collect(),
        next_page_token: Some(next.to_string()),
    }
}
