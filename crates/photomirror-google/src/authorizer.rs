//! Drives the authorization code grant end to end.
//!
//! ```text
//! Idle ──▶ AwaitingCode ──▶ Exchanging ──▶ Authenticated
//!   └───────────┴────────────────┴──────▶ Failed
//! ```

use std::future::Future;

use photomirror_core::{MirrorError, MirrorResult};
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::{debug, info};

use crate::callback::CallbackListener;
use crate::client::AuthenticatedClient;
use crate::config::{AuthConfig, LibraryConfig};
use crate::oauth::{OAuthClient, PkceFlow};

/// Where the authorization code comes from.
pub enum CodeSource {
    /// A transient listener on the redirect target receives the redirect.
    LocalCallback,
    /// The operator pastes the code; one line is read.
    Manual(Box<dyn AsyncBufRead + Send + Unpin>),
}

impl std::fmt::Debug for CodeSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::LocalCallback => f.write_str("LocalCallback"),
            Self::Manual(_) => f.write_str("Manual"),
        }
    }
}

/// Progress of an authorization attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthState {
    /// No attempt started yet.
    Idle,
    /// Consent URL presented; waiting for the code.
    AwaitingCode,
    /// Trading the code for tokens.
    Exchanging,
    /// Tokens obtained.
    Authenticated,
    /// The attempt ended in an error or was cancelled.
    Failed,
}

/// Obtains a token and wraps it in an [`AuthenticatedClient`].
#[derive(Debug)]
pub struct TokenAuthorizer {
    oauth: OAuthClient,
    library: LibraryConfig,
    state: AuthState,
}

impl TokenAuthorizer {
    /// Creates an authorizer; the configuration is validated up front.
    pub fn new(config: AuthConfig, library: LibraryConfig) -> MirrorResult<Self> {
        config.validate()?;
        Ok(Self {
            oauth: OAuthClient::new(config)?,
            library,
            state: AuthState::Idle,
        })
    }

    /// Current state.
    pub fn state(&self) -> AuthState {
        self.state
    }

    /// Runs the grant.
    ///
    /// `present` receives the consent URL. The wait for the code has no
    /// timeout; it ends early only when `cancel` completes, which is fatal.
    pub async fn authorize<P, C>(
        &mut self,
        source: CodeSource,
        present: P,
        cancel: C,
    ) -> MirrorResult<AuthenticatedClient>
    where
        P: FnOnce(&str),
        C: Future<Output = ()>,
    {
        let result = self.run(source, present, cancel).await;
        if result.is_err() {
            self.transition(AuthState::Failed);
        }
        result
    }

    async fn run<P, C>(
        &mut self,
        source: CodeSource,
        present: P,
        cancel: C,
    ) -> MirrorResult<AuthenticatedClient>
    where
        P: FnOnce(&str),
        C: Future<Output = ()>,
    {
        let pkce = PkceFlow::new();
        let config = self.oauth.config().clone();
        self.transition(AuthState::AwaitingCode);

        let (code, redirect_uri) = match source {
            CodeSource::LocalCallback => {
                let listener = CallbackListener::bind(config.callback_addr()?).await?;
                let redirect_uri = callback_redirect_uri(&config, listener.local_addr().port())?;
                let handoff = listener.spawn(Some(pkce.state.clone()));

                present(&pkce.build_auth_url(&config, &redirect_uri));
                info!("waiting for the authorization redirect on {}", redirect_uri);

                let code = tokio::select! {
                    received = handoff => received.map_err(|_| {
                        MirrorError::internal("callback listener stopped without a result")
                    })??,
                    () = cancel => return Err(cancelled()),
                };
                (code, redirect_uri)
            }
            CodeSource::Manual(mut reader) => {
                let redirect_uri = config.redirect_url.clone();
                present(&pkce.build_auth_url(&config, &redirect_uri));

                let code = tokio::select! {
                    read = read_code(&mut reader) => read?,
                    () = cancel => return Err(cancelled()),
                };
                (code, redirect_uri)
            }
        };

        info!("received authorization code, exchanging for tokens...");
        self.transition(AuthState::Exchanging);
        let token = self
            .oauth
            .exchange_code(&code, &pkce.verifier, &redirect_uri)
            .await?;

        let client = AuthenticatedClient::new(self.oauth.clone(), token, self.library.clone())?;
        self.transition(AuthState::Authenticated);
        Ok(client)
    }

    fn transition(&mut self, next: AuthState) {
        debug!("authorization state {:?} -> {:?}", self.state, next);
        self.state = next;
    }
}

fn cancelled() -> MirrorError {
    MirrorError::authorization("authorization cancelled while waiting for the code")
}

/// The configured redirect, with the port the listener actually bound.
fn callback_redirect_uri(config: &AuthConfig, port: u16) -> MirrorResult<String> {
    let mut url = config.redirect()?;
    if url.port_or_known_default() == Some(port) {
        return Ok(config.redirect_url.clone());
    }
    url.set_port(Some(port)).map_err(|()| {
        MirrorError::configuration(format!("cannot set port on {}", config.redirect_url))
    })?;
    Ok(url.to_string())
}

async fn read_code<R>(reader: &mut R) -> MirrorResult<String>
where
    R: AsyncBufRead + Unpin + ?Sized,
{
    let mut line = String::new();
    reader.read_line(&mut line).await.map_err(|e| {
        MirrorError::authorization(format!("failed to read authorization code: {}", e))
            .with_source(e)
    })?;

    let code = line.trim();
    if code.is_empty() {
        return Err(MirrorError::authorization("no authorization code entered"));
    }
    Ok(code.to_string())
}
