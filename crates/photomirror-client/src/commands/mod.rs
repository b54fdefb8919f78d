//! Command implementations.

pub mod list;
pub mod sync;

use std::future::Future;

use photomirror_google::{AuthenticatedClient, CodeSource, TokenAuthorizer};
use tokio::io::BufReader;
use tracing::{info, warn};

use crate::cli::AuthArgs;
use crate::config::ClientConfig;
use crate::error::ClientResult;

/// Runs the OAuth flow and returns a client ready for API calls.
///
/// Completion of `cancel` while waiting for the code aborts the run.
pub async fn authenticate(
    config: &ClientConfig,
    args: &AuthArgs,
    cancel: impl Future<Output = ()>,
) -> ClientResult<AuthenticatedClient> {
    let mut authorizer =
        TokenAuthorizer::new(config.auth_config(args), config.library_config())?;

    let source = if args.manual {
        CodeSource::Manual(Box::new(BufReader::new(tokio::io::stdin())))
    } else {
        CodeSource::LocalCallback
    };
    let manual = args.manual;
    let open_browser = args.open;

    let present = move |url: &str| {
        println!("Visit the URL for the auth dialog: {}", url);
        if manual {
            println!("Then paste the authorization code here:");
        }
        if open_browser && let Err(e) = open::that(url) {
            warn!("failed to open browser: {}", e);
        }
    };

    let client = authorizer.authorize(source, present, cancel).await?;
    info!("authorization complete");
    Ok(client)
}
