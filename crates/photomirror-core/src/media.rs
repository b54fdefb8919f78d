//! Media library data model.
//!
//! [`MediaItem`] and [`Page`] mirror the JSON returned by the listing
//! endpoint; [`Library`] is the ordered aggregate of every page.

use serde::{Deserialize, Serialize};

/// Suffix appended to a base URL to request the original bytes.
pub const CONTENT_SUFFIX: &str = "=d";

/// A single remote media item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaItem {
    /// Remote identifier.
    pub id: String,
    /// User supplied description, empty when unset.
    #[serde(default)]
    pub description: String,
    /// Base content URL; needs [`CONTENT_SUFFIX`] to fetch full resolution.
    pub base_url: String,
    /// MIME type reported by the server.
    #[serde(default)]
    pub mime_type: String,
    /// Remote filename. Not unique and not filesystem-safe.
    pub filename: String,
}

impl MediaItem {
    /// URL that returns the original-resolution content.
    pub fn download_url(&self) -> String {
        format!("{}{}", self.base_url, CONTENT_SUFFIX)
    }

    /// Filename to use on disk.
    pub fn local_filename(&self) -> String {
        sanitize_filename(&self.filename)
    }
}

/// One response of the listing endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page {
    /// Items of this page in server order.
    #[serde(default)]
    pub media_items: Vec<MediaItem>,
    /// Continuation cursor; absent or empty on the last page.
    #[serde(default)]
    pub next_page_token: Option<String>,
}

impl Page {
    /// Parses a page from a JSON response body.
    pub fn from_json(body: &str) -> serde_json::Result<Self> {
        serde_json::from_str(body)
    }

    /// Returns the cursor for the next page, or `None` when this is the last.
    pub fn next_cursor(&self) -> Option<&str> {
        self.next_page_token.as_deref().filter(|t| !t.is_empty())
    }
}

/// The full media library, in server order across pages.
///
/// Duplicates returned by the server are kept.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Library {
    items: Vec<MediaItem>,
}

impl Library {
    /// Creates an empty library.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a page's items, preserving their order.
    pub fn extend_page(&mut self, page: Page) {
        self.items.extend(page.media_items);
    }

    /// Returns the items in order.
    pub fn items(&self) -> &[MediaItem] {
        &self.items
    }

    /// Returns an iterator over the items.
    pub fn iter(&self) -> std::slice::Iter<'_, MediaItem> {
        self.items.iter()
    }

    /// Number of items.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns true if the library holds no items.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Consumes the library and returns its items.
    pub fn into_items(self) -> Vec<MediaItem> {
        self.items
    }
}

impl From<Vec<MediaItem>> for Library {
    fn from(items: Vec<MediaItem>) -> Self {
        Self { items }
    }
}

impl<'a> IntoIterator for &'a Library {
    type Item = &'a MediaItem;
    type IntoIter = std::slice::Iter<'a, MediaItem>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

/// Replaces every path-separator character with `_`.
///
/// All other characters are kept verbatim. No collision handling is done.
pub fn sanitize_filename(name: &str) -> String {
    name.chars()
        .map(|c| if std::path::is_separator(c) { '_' } else { c })
        .collect()
}
