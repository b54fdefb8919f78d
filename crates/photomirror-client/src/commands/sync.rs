//! The `sync` command: list the whole library, then mirror it.

use std::path::PathBuf;

use photomirror_core::{LibraryPaginator, MediaApi, MediaSynchronizer, SyncProgress};
use tracing::info;

use crate::error::ClientResult;

/// Mirrors the library into `output_dir`.
pub async fn run(api: &dyn MediaApi, output_dir: PathBuf) -> ClientResult<()> {
    println!("Loading library...");
    let library = LibraryPaginator::new(api).fetch_library().await?;
    println!("Downloading {} items into {}", library.len(), output_dir.display());

    let synchronizer = MediaSynchronizer::new(output_dir);
    let report = synchronizer.sync(api, &library, print_progress).await?;

    info!(?report, "sync complete");
    println!(
        "Done: {} downloaded, {} already present",
        report.downloaded, report.skipped
    );
    Ok(())
}

fn print_progress(progress: &SyncProgress) {
    match progress {
        SyncProgress::Skipped { filename } => println!("Skipping {}", filename),
        SyncProgress::Downloading { filename } => println!("Downloading {}", filename),
        SyncProgress::Downloaded { .. } => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use photomirror_core::{BoxFuture, MirrorResult, Page};

    use crate::error::ClientError;
    use crate::interrupt::Interrupt;

    /// One-page library whose downloads never complete.
    struct StalledApi;

    impl MediaApi for StalledApi {
        fn list_page<'a>(&'a self, _page_token: &'a str) -> BoxFuture<'a, MirrorResult<Page>> {
            Box::pin(async {
                Ok(Page::from_json(
                    r#"{"mediaItems":[{"id":"1","baseUrl":"http://x/a","filename":"a.jpg"}]}"#,
                )
                .unwrap())
            })
        }

        fn download<'a>(&'a self, _url: &'a str) -> BoxFuture<'a, MirrorResult<Vec<u8>>> {
            Box::pin(std::future::pending::<MirrorResult<Vec<u8>>>())
        }
    }

    #[tokio::test]
    async fn interrupt_stops_a_running_sync() {
        let dir = tempfile::tempdir().unwrap();
        let interrupt = Interrupt::new();
        let remote = interrupt.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            remote.trigger();
        });

        let result = tokio::time::timeout(
            Duration::from_secs(5),
            interrupt.guard(run(&StalledApi, dir.path().to_path_buf())),
        )
        .await
        .unwrap();

        assert!(matches!(result, Err(ClientError::Interrupted)));
        assert!(!dir.path().join("a.jpg").exists());
    }
}
