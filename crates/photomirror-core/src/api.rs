//! MediaApi trait definition.
//!
//! [`MediaApi`] is the seam between the pipeline and the remote service:
//! the paginator and synchronizer only ever talk to a `&dyn MediaApi`, which
//! keeps them testable without a network.

use std::future::Future;
use std::pin::Pin;

use crate::error::MirrorResult;
use crate::media::Page;

/// A boxed future that is Send.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Authenticated access to a remote media library.
///
/// Implementations are used sequentially; they are not required to support
/// concurrent callers.
pub trait MediaApi: Send + Sync {
    /// Fetches one listing page.
    ///
    /// An empty `page_token` requests the first page.
    fn list_page<'a>(&'a self, page_token: &'a str) -> BoxFuture<'a, MirrorResult<Page>>;

    /// Downloads the full body at `url`.
    fn download<'a>(&'a self, url: &'a str) -> BoxFuture<'a, MirrorResult<Vec<u8>>>;
}
