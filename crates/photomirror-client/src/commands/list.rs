//! The `list` command: print every library item.

use photomirror_core::{LibraryPaginator, MediaApi, MediaItem, MirrorError};

use crate::error::{ClientError, ClientResult};

/// Prints the library, either as a table or as JSON lines.
pub async fn run(api: &dyn MediaApi, json: bool) -> ClientResult<()> {
    let library = LibraryPaginator::new(api).fetch_library().await?;

    for item in &library {
        println!("{}", render(item, json)?);
    }
    eprintln!("{} items", library.len());
    Ok(())
}

fn render(item: &MediaItem, json: bool) -> ClientResult<String> {
    if json {
        serde_json::to_string(item).map_err(serialization_error)
    } else {
        Ok(format!(
            "{}\t{}\t{}\t{}",
            item.id, item.mime_type, item.filename, item.description
        ))
    }
}

fn serialization_error(e: serde_json::Error) -> ClientError {
    MirrorError::internal(format!("failed to serialize item: {}", e))
        .with_source(e)
        .into()
}
