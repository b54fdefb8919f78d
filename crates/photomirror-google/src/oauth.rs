//! OAuth 2.0 authorization code flow with PKCE.
//!
//! [`PkceFlow`] builds the consent URL; [`OAuthClient`] talks to the token
//! endpoint for the initial code exchange and for later refreshes.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use photomirror_core::{MirrorError, MirrorResult};
use rand::Rng as _;
use sha2::{Digest, Sha256};
use tracing::{debug, info};

use crate::config::AuthConfig;
use crate::tokens::Token;

/// The PKCE code verifier length (in bytes, before base64 encoding).
const CODE_VERIFIER_LENGTH: usize = 32;

/// Client for the token endpoint.
#[derive(Debug, Clone)]
pub struct OAuthClient {
    config: AuthConfig,
    http_client: reqwest::Client,
}

impl OAuthClient {
    /// Creates a new OAuth client for the given configuration.
    pub fn new(config: AuthConfig) -> MirrorResult<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| {
                MirrorError::configuration(format!("failed to create HTTP client: {}", e))
                    .with_source(e)
            })?;

        Ok(Self {
            config,
            http_client,
        })
    }

    /// Returns the configuration.
    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    /// Exchanges an authorization code for a token.
    ///
    /// `redirect_uri` must be the one embedded in the consent URL.
    pub(crate) async fn exchange_code(
        &self,
        code: &str,
        verifier: &str,
        redirect_uri: &str,
    ) -> MirrorResult<Token> {
        let params = [
            ("client_id", self.config.client_id.as_str()),
            ("client_secret", self.config.client_secret.as_str()),
            ("code", code),
            ("code_verifier", verifier),
            ("grant_type", "authorization_code"),
            ("redirect_uri", redirect_uri),
        ];

        let response = self.post_token(&params, "token exchange").await?;

        info!("successfully obtained tokens");
        Ok(Token::new(
            response.access_token,
            response.refresh_token,
            response.expires_in,
        ))
    }

    /// Renews the access token in place using its refresh token.
    pub(crate) async fn refresh(&self, token: &mut Token) -> MirrorResult<()> {
        let refresh_token = token.refresh_token.clone().ok_or_else(|| {
            MirrorError::authorization("access token expired and no refresh token was issued")
        })?;

        let params = [
            ("client_id", self.config.client_id.as_str()),
            ("client_secret", self.config.client_secret.as_str()),
            ("refresh_token", refresh_token.as_str()),
            ("grant_type", "refresh_token"),
        ];

        let response = self.post_token(&params, "token refresh").await?;
        token.refreshed(
            response.access_token,
            response.refresh_token,
            response.expires_in,
        );

        info!("successfully refreshed access token");
        Ok(())
    }

    async fn post_token(&self, params: &[(&str, &str)], what: &str) -> MirrorResult<TokenResponse> {
        debug!("{} at {}", what, self.config.token_url);

        let response = self
            .http_client
            .post(&self.config.token_url)
            .form(params)
            .send()
            .await
            .map_err(|e| {
                MirrorError::authorization(format!("{} request failed: {}", what, e)).with_source(e)
            })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| {
            MirrorError::authorization(format!("failed to read {} response: {}", what, e))
                .with_source(e)
        })?;

        if !status.is_success() {
            return Err(MirrorError::authorization(format!(
                "{} failed ({}): {}",
                what, status, body
            )));
        }

        serde_json::from_str(&body).map_err(|e| {
            MirrorError::authorization(format!("invalid {} response: {}", what, e)).with_source(e)
        })
    }
}

/// PKCE flow state and utilities.
///
/// Implements RFC 7636 (Proof Key for Code Exchange).
#[derive(Debug)]
pub struct PkceFlow {
    /// The code verifier (high-entropy random string).
    pub verifier: String,
    /// The code challenge (SHA-256 hash of verifier, base64url encoded).
    pub challenge: String,
    /// Random state for CSRF protection.
    pub state: String,
}

impl PkceFlow {
    /// Creates a new PKCE flow with random verifier and state.
    pub fn new() -> Self {
        let verifier = Self::generate_verifier();
        let challenge = Self::compute_challenge(&verifier);
        let state = Self::generate_state();

        Self {
            verifier,
            challenge,
            state,
        }
    }

    fn generate_verifier() -> String {
        let mut rng = rand::rng();
        let bytes: Vec<u8> = (0..CODE_VERIFIER_LENGTH).map(|_| rng.random()).collect();
        URL_SAFE_NO_PAD.encode(&bytes)
    }

    fn compute_challenge(verifier: &str) -> String {
        let digest = Sha256::digest(verifier.as_bytes());
        URL_SAFE_NO_PAD.encode(digest)
    }

    fn generate_state() -> String {
        let mut rng = rand::rng();
        let bytes: Vec<u8> = (0..16).map(|_| rng.random()).collect();
        URL_SAFE_NO_PAD.encode(&bytes)
    }

    /// Builds the consent URL.
    ///
    /// Requests offline access so that a refresh token is issued.
    pub fn build_auth_url(&self, config: &AuthConfig, redirect_uri: &str) -> String {
        let scope = config.scopes.join(" ");
        let separator = if config.auth_url.contains('?') { '&' } else { '?' };

        format!(
            "{}{}client_id={}&redirect_uri={}&response_type=code&scope={}&\
            code_challenge={}&code_challenge_method=S256&state={}&\
            access_type=offline&prompt=consent",
            config.auth_url,
            separator,
            urlencoding::encode(&config.client_id),
            urlencoding::encode(redirect_uri),
            urlencoding::encode(&scope),
            urlencoding::encode(&self.challenge),
            urlencoding::encode(&self.state),
        )
    }
}

impl Default for PkceFlow {
    fn default() -> Self {
        Self::new()
    }
}

/// Response from the token endpoint.
#[derive(Debug, serde::Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(default)]
    expires_in: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{FakeResponse, FakeServer};
    use photomirror_core::ErrorCode;

    fn fixed_flow() -> PkceFlow {
        PkceFlow {
            verifier: "verifier".to_string(),
            challenge: "challenge".to_string(),
            state: "xyz".to_string(),
        }
    }

    #[test]
    fn pkce_verifier_length() {
        let flow = PkceFlow::new();
        // Base64 encoding of 32 bytes = 43 characters (no padding)
        assert_eq!(flow.verifier.len(), 43);
    }

    #[test]
    fn pkce_challenge_is_deterministic() {
        let verifier = "test-verifier-string";
        assert_eq!(
            PkceFlow::compute_challenge(verifier),
            PkceFlow::compute_challenge(verifier)
        );
    }

    #[test]
    fn pkce_state_is_random() {
        assert_ne!(PkceFlow::new().state, PkceFlow::new().state);
    }

    #[test]
    fn auth_url_format() {
        let config = AuthConfig::new("client.apps.googleusercontent.com", "secret");
        let url = fixed_flow().build_auth_url(&config, "http://localhost:8080");

        insta::assert_snapshot!(url, @"https://accounts.google.com/o/oauth2/v2/auth?client_id=client.apps.googleusercontent.com&redirect_uri=http%3A%2F%2Flocalhost%3A8080&response_type=code&scope=https%3A%2F%2Fwww.googleapis.com%2Fauth%2Fphotoslibrary.readonly&code_challenge=challenge&code_challenge_method=S256&state=xyz&access_type=offline&prompt=consent");
    }

    #[test]
    fn auth_url_joins_scopes() {
        let config = AuthConfig::new("id", "secret")
            .with_scopes(vec!["a".to_string(), "b".to_string()])
            .with_endpoints("http://127.0.0.1:1/auth?hl=en", "http://127.0.0.1:1/token");
        let url = fixed_flow().build_auth_url(&config, "http://127.0.0.1:9");

        assert!(url.starts_with("http://127.0.0.1:1/auth?hl=en&client_id=id&"));
        assert!(url.contains("&scope=a%20b&"));
    }

    #[tokio::test]
    async fn exchange_code_posts_form() {
        let server = FakeServer::start(|_| {
            FakeResponse::json(
                200,
                r#"{"access_token":"at-1","refresh_token":"rt-1","expires_in":3599,"token_type":"Bearer"}"#,
            )
        })
        .await;
        let config = AuthConfig::new("my-id", "my-secret")
            .with_endpoints("http://unused/auth", server.url("/token"));
        let client = OAuthClient::new(config).unwrap();

        let token = client
            .exchange_code("the-code", "the-verifier", "http://localhost:8080")
            .await
            .unwrap();

        assert_eq!(token.access_token, "at-1");
        assert_eq!(token.refresh_token.as_deref(), Some("rt-1"));
        assert!(!token.is_expired());

        let requests = server.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].method, "POST");
        assert_eq!(requests[0].path, "/token");
        let form = requests[0].form();
        assert_eq!(form.get("grant_type").map(String::as_str), Some("authorization_code"));
        assert_eq!(form.get("code").map(String::as_str), Some("the-code"));
        assert_eq!(form.get("code_verifier").map(String::as_str), Some("the-verifier"));
        assert_eq!(form.get("client_secret").map(String::as_str), Some("my-secret"));
        assert_eq!(
            form.get("redirect_uri").map(String::as_str),
            Some("http://localhost:8080")
        );
    }

    #[tokio::test]
    async fn exchange_rejection_is_authorization_error() {
        let server =
            FakeServer::start(|_| FakeResponse::json(400, r#"{"error":"invalid_grant"}"#)).await;
        let config = AuthConfig::new("id", "secret")
            .with_endpoints("http://unused/auth", server.url("/token"));
        let client = OAuthClient::new(config).unwrap();

        let err = client
            .exchange_code("bad", "v", "http://localhost:8080")
            .await
            .unwrap_err();

        assert_eq!(err.code(), ErrorCode::Authorization);
        assert!(err.message().contains("invalid_grant"));
        assert_eq!(server.requests().len(), 1);
    }

    #[tokio::test]
    async fn malformed_token_response_is_fatal() {
        let server = FakeServer::start(|_| FakeResponse::json(200, "<html>nope</html>")).await;
        let config = AuthConfig::new("id", "secret")
            .with_endpoints("http://unused/auth", server.url("/token"));
        let client = OAuthClient::new(config).unwrap();

        let err = client
            .exchange_code("code", "v", "http://localhost:8080")
            .await
            .unwrap_err();

        assert_eq!(err.code(), ErrorCode::Authorization);
    }

    #[tokio::test]
    async fn refresh_updates_token() {
        let server = FakeServer::start(|_| {
            FakeResponse::json(200, r#"{"access_token":"at-2","expires_in":3600}"#)
        })
        .await;
        let config = AuthConfig::new("id", "secret")
            .with_endpoints("http://unused/auth", server.url("/token"));
        let client = OAuthClient::new(config).unwrap();
        let mut token = Token::new("at-1", Some("rt-1".to_string()), Some(0));

        client.refresh(&mut token).await.unwrap();

        assert_eq!(token.access_token, "at-2");
        assert_eq!(token.refresh_token.as_deref(), Some("rt-1"));
        let form = server.requests()[0].form();
        assert_eq!(form.get("grant_type").map(String::as_str), Some("refresh_token"));
        assert_eq!(form.get("refresh_token").map(String::as_str), Some("rt-1"));
    }

    #[tokio::test]
    async fn refresh_without_refresh_token_fails() {
        let config = AuthConfig::new("id", "secret")
            .with_endpoints("http://unused/auth", "http://127.0.0.1:9/token");
        let client = OAuthClient::new(config).unwrap();
        let mut token = Token::new("at-1", None, Some(0));

        let err = client.refresh(&mut token).await.unwrap_err();
        assert_eq!(err.code(), ErrorCode::Authorization);
    }
}
