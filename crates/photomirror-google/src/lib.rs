//! Google OAuth 2.0 authorization and Photos Library API access.
//!
//! # Authentication Flow
//!
//! 1. The caller supplies an [`AuthConfig`] (client ID/secret from the environment)
//! 2. [`TokenAuthorizer`] builds the consent URL with a PKCE challenge
//! 3. The code arrives on a transient loopback listener, or is pasted by hand
//! 4. The code is exchanged for access and refresh tokens
//! 5. The resulting [`AuthenticatedClient`] refreshes the access token on demand
//!
//! # Example
//!
//! ```ignore
//! use photomirror_google::{AuthConfig, CodeSource, LibraryConfig, TokenAuthorizer};
//!
//! let mut authorizer = TokenAuthorizer::new(AuthConfig::from_env(), LibraryConfig::default())?;
//! let client = authorizer
//!     .authorize(CodeSource::LocalCallback, |url| println!("{url}"), ctrl_c)
//!     .await?;
//! let library = LibraryPaginator::new(&client).fetch_library().await?;
//! ```

mod authorizer;
mod callback;
mod client;
mod config;
mod oauth;
mod tokens;

#[cfg(test)]
mod testutil;

pub use authorizer::{AuthState, CodeSource, TokenAuthorizer};
pub use callback::CallbackListener;
pub use client::AuthenticatedClient;
pub use config::{AuthConfig, LibraryConfig};
pub use oauth::{OAuthClient, PkceFlow};
