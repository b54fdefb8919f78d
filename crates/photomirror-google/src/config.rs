//! OAuth and Photos Library configuration.

use std::net::SocketAddr;
use std::time::Duration;

use photomirror_core::{MirrorError, MirrorResult};
use url::Url;

/// OAuth 2.0 client configuration.
///
/// Built once at startup and handed to the authorizer; nothing reads the
/// environment after that.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// The OAuth 2.0 client ID.
    pub client_id: String,
    /// The OAuth 2.0 client secret.
    pub client_secret: String,
    /// OAuth scopes to request.
    pub scopes: Vec<String>,
    /// Consent page endpoint.
    pub auth_url: String,
    /// Token exchange and refresh endpoint.
    pub token_url: String,
    /// Where the consent page redirects with the authorization code.
    pub redirect_url: String,
    /// Timeout for token endpoint requests.
    pub timeout: Duration,
}

impl AuthConfig {
    /// Default timeout in seconds.
    pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

    /// Read-only access to the Photos library.
    pub const DEFAULT_SCOPE: &'static str =
        "https://www.googleapis.com/auth/photoslibrary.readonly";

    /// Google's consent page.
    pub const GOOGLE_AUTH_URL: &'static str = "https://accounts.google.com/o/oauth2/v2/auth";

    /// Google's token endpoint.
    pub const GOOGLE_TOKEN_URL: &'static str = "https://oauth2.googleapis.com/token";

    /// Default loopback redirect.
    pub const DEFAULT_REDIRECT_URL: &'static str = "http://localhost:8080";

    /// Environment variable holding the client ID.
    pub const CLIENT_ID_ENV: &'static str = "CLIENT_ID";

    /// Environment variable holding the client secret.
    pub const CLIENT_SECRET_ENV: &'static str = "CLIENT_SECRET";

    /// Creates a configuration for Google with the given credentials.
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            scopes: vec![Self::DEFAULT_SCOPE.to_string()],
            auth_url: Self::GOOGLE_AUTH_URL.to_string(),
            token_url: Self::GOOGLE_TOKEN_URL.to_string(),
            redirect_url: Self::DEFAULT_REDIRECT_URL.to_string(),
            timeout: Duration::from_secs(Self::DEFAULT_TIMEOUT_SECS),
        }
    }

    /// Reads the credentials from `CLIENT_ID` and `CLIENT_SECRET`.
    ///
    /// Missing variables become empty strings; the token endpoint rejects
    /// them later.
    pub fn from_env() -> Self {
        Self::new(
            std::env::var(Self::CLIENT_ID_ENV).unwrap_or_default(),
            std::env::var(Self::CLIENT_SECRET_ENV).unwrap_or_default(),
        )
    }

    /// Sets the OAuth scopes.
    pub fn with_scopes(mut self, scopes: Vec<String>) -> Self {
        self.scopes = scopes;
        self
    }

    /// Sets the redirect target.
    pub fn with_redirect_url(mut self, url: impl Into<String>) -> Self {
        self.redirect_url = url.into();
        self
    }

    /// Overrides the consent and token endpoints.
    pub fn with_endpoints(
        mut self,
        auth_url: impl Into<String>,
        token_url: impl Into<String>,
    ) -> Self {
        self.auth_url = auth_url.into();
        self.token_url = token_url.into();
        self
    }

    /// Sets the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Parses the redirect target.
    pub fn redirect(&self) -> MirrorResult<Url> {
        Url::parse(&self.redirect_url).map_err(|e| {
            MirrorError::configuration(format!("invalid redirect URL {}: {}", self.redirect_url, e))
        })
    }

    /// Address the callback listener binds, derived from the redirect target.
    ///
    /// `localhost` binds only the IPv4 loopback, `127.0.0.1`. A browser that
    /// resolves `localhost` to `::1` must fall back to IPv4; register
    /// `http://[::1]:<port>` to listen on the IPv6 loopback instead.
    pub fn callback_addr(&self) -> MirrorResult<SocketAddr> {
        let url = self.redirect()?;
        let host = match url.host_str() {
            Some("localhost") | None => "127.0.0.1",
            Some(host) => host.trim_start_matches('[').trim_end_matches(']'),
        };
        let port = url.port_or_known_default().ok_or_else(|| {
            MirrorError::configuration(format!("redirect URL {} has no port", self.redirect_url))
        })?;
        let ip = host.parse().map_err(|_| {
            MirrorError::configuration(format!(
                "redirect host {host} is not a loopback address the listener can bind"
            ))
        })?;
        Ok(SocketAddr::new(ip, port))
    }

    /// Validates the configuration.
    ///
    /// Credentials are deliberately not checked.
    pub fn validate(&self) -> MirrorResult<()> {
        if self.scopes.is_empty() {
            return Err(MirrorError::configuration(
                "at least one OAuth scope is required",
            ));
        }
        Url::parse(&self.auth_url)
            .map_err(|e| MirrorError::configuration(format!("invalid auth URL: {}", e)))?;
        Url::parse(&self.token_url)
            .map_err(|e| MirrorError::configuration(format!("invalid token URL: {}", e)))?;
        self.redirect()?;
        Ok(())
    }
}

/// Configuration of the Photos Library listing endpoint.
#[derive(Debug, Clone)]
pub struct LibraryConfig {
    /// The `mediaItems` listing endpoint.
    pub media_items_url: String,
    /// Requested page size; the server default applies when unset.
    pub page_size: Option<u32>,
    /// Timeout for listing and download requests.
    pub timeout: Duration,
}

impl LibraryConfig {
    /// Photos Library API v1 listing endpoint.
    pub const MEDIA_ITEMS_URL: &'static str = "https://photoslibrary.googleapis.com/v1/mediaItems";

    /// Default timeout in seconds; downloads of large videos need headroom.
    pub const DEFAULT_TIMEOUT_SECS: u64 = 300;

    /// Sets the listing endpoint.
    pub fn with_media_items_url(mut self, url: impl Into<String>) -> Self {
        self.media_items_url = url.into();
        self
    }

    /// Sets the page size.
    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = Some(page_size);
        self
    }

    /// Sets the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

impl Default for LibraryConfig {
    fn default() -> Self {
        Self {
            media_items_url: Self::MEDIA_ITEMS_URL.to_string(),
            page_size: None,
            timeout: Duration::from_secs(Self::DEFAULT_TIMEOUT_SECS),
        }
    }
}
