//! Core types: media library model, pagination, synchronization, tracing.
//!
//! ```text
//! ┌──────────────────┐   list_page    ┌──────────────────┐
//! │ LibraryPaginator │ ─────────────▶ │                  │
//! └────────┬─────────┘                │     MediaApi     │
//!          │ Library                  │ (authenticated)  │
//!          ▼                          │                  │
//! ┌──────────────────┐   download     │                  │
//! │ MediaSynchronizer│ ─────────────▶ │                  │
//! └────────┬─────────┘                └──────────────────┘
//!          ▼
//!     local files
//! ```

pub mod api;
pub mod error;
pub mod library;
pub mod media;
pub mod sync;
pub mod tracing;

#[cfg(test)]
mod fake;

pub use api::{BoxFuture, MediaApi};
pub use error::{ErrorCode, MirrorError, MirrorResult};
pub use library::{IncompleteLibrary, LibraryPaginator};
pub use media::{CONTENT_SUFFIX, Library, MediaItem, Page, sanitize_filename};
pub use sync::{MediaSynchronizer, SyncProgress, SyncReport};
pub use self::tracing::{TracingConfig, TracingError, TracingOutputFormat, init_tracing};
