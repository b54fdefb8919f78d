//! Cursor-driven enumeration of the remote library.

use thiserror::Error;
use tracing::debug;

use crate::api::MediaApi;
use crate::error::MirrorError;
use crate::media::Library;

/// Pagination stopped early; carries what was accumulated so far.
#[derive(Debug, Error)]
#[error("library listing aborted after {} items: {error}", partial.len())]
pub struct IncompleteLibrary {
    /// Items collected before the failure.
    pub partial: Library,
    /// The failure that stopped pagination.
    #[source]
    pub error: MirrorError,
}

impl From<IncompleteLibrary> for MirrorError {
    fn from(incomplete: IncompleteLibrary) -> Self {
        incomplete.error
    }
}

/// Walks the listing endpoint until the continuation cursor runs out.
pub struct LibraryPaginator<'a> {
    api: &'a dyn MediaApi,
}

impl<'a> LibraryPaginator<'a> {
    /// Creates a paginator over the given API.
    pub fn new(api: &'a dyn MediaApi) -> Self {
        Self { api }
    }

    /// Fetches every page and returns the concatenated library.
    ///
    /// There is no upper bound on the number of pages and no delay between
    /// requests.
    pub async fn fetch_library(&self) -> Result<Library, IncompleteLibrary> {
        let mut library = Library::new();
        let mut cursor = String::new();
        let mut pages = 0usize;

        loop {
            let page = match self.api.list_page(&cursor).await {
                Ok(page) => page,
                Err(error) => {
                    return Err(IncompleteLibrary {
                        partial: library,
                        error,
                    });
                }
            };
            pages += 1;

            let next = page.next_cursor().map(str::to_owned);
            debug!(
                page = pages,
                items = page.media_items.len(),
                "fetched library page"
            );
            library.extend_page(page);

            match next {
                Some(token) => cursor = token,
                None => break,
            }
        }

        debug!("fetched {} items in {} pages", library.len(), pages);
        Ok(library)
    }
}
