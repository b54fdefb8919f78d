//! Client configuration.
//!
//! Optional settings live in `~/.config/photomirror/config.toml`. Command
//! line flags take precedence over the file, and the file over built-in
//! defaults. Credentials are not read from the file; they come from
//! `CLIENT_ID` / `CLIENT_SECRET` or the matching flags.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use photomirror_google::{AuthConfig, LibraryConfig};

use crate::cli::AuthArgs;

/// Configuration for the photomirror client.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Debug mode.
    pub debug: bool,

    /// HTTP timeout in seconds for API and download requests.
    pub timeout: Option<u64>,

    /// OAuth settings.
    pub auth: AuthSettings,

    /// Listing settings.
    pub library: LibrarySettings,

    /// Mirroring settings.
    pub sync: SyncSettings,
}

/// OAuth settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthSettings {
    /// Redirect target registered for the OAuth client.
    pub redirect_url: Option<String>,

    /// Scopes to request instead of the read-only Photos scope.
    pub scopes: Vec<String>,
}

/// Listing settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LibrarySettings {
    /// Items per listing page.
    pub page_size: Option<u32>,
}

/// Mirroring settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncSettings {
    /// Destination directory.
    pub output_dir: Option<PathBuf>,
}

impl ClientConfig {
    /// Loads configuration from the default path, or defaults if absent.
    pub fn load() -> Result<Self, String> {
        let path = Self::default_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Loads configuration from a specific path.
    pub fn load_from(path: &Path) -> Result<Self, String> {
        let content =
            std::fs::read_to_string(path).map_err(|e| format!("failed to read config: {}", e))?;
        toml::from_str(&content).map_err(|e| format!("failed to parse config: {}", e))
    }

    /// Returns the default configuration file path.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("photomirror")
            .join("config.toml")
    }

    /// Builds the OAuth configuration.
    ///
    /// Missing credentials become empty strings and are left for the token
    /// endpoint to reject.
    pub fn auth_config(&self, args: &AuthArgs) -> AuthConfig {
        let mut config = AuthConfig::new(
            args.client_id.clone().unwrap_or_default(),
            args.client_secret.clone().unwrap_or_default(),
        );

        if let Some(url) = args
            .redirect_url
            .as_ref()
            .or(self.auth.redirect_url.as_ref())
        {
            config = config.with_redirect_url(url);
        }
        if !self.auth.scopes.is_empty() {
            config = config.with_scopes(self.auth.scopes.clone());
        }
        config
    }

    /// Builds the listing configuration.
    pub fn library_config(&self) -> LibraryConfig {
        let mut config = LibraryConfig::default();
        if let Some(size) = self.library.page_size {
            config = config.with_page_size(size);
        }
        if let Some(secs) = self.timeout {
            config = config.with_timeout(Duration::from_secs(secs));
        }
        config
    }

    /// Destination directory: flag, then file, then the current directory.
    pub fn output_dir(&self, flag: Option<PathBuf>) -> PathBuf {
        flag.or_else(|| self.sync.output_dir.clone())
            .unwrap_or_else(|| PathBuf::from("."))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args() -> AuthArgs {
        AuthArgs {
            client_id: Some("id".to_string()),
            client_secret: None,
            redirect_url: None,
            manual: false,
            open: false,
        }
    }

    #[test]
    fn parse_full_config() {
        let toml = r#"
            debug = true
            timeout = 60

            [auth]
            redirect_url = "http://127.0.0.1:9000"
            scopes = ["scope-a", "scope-b"]

            [library]
            page_size = 100

            [sync]
            output_dir = "/srv/photos"
        "#;

        let config: ClientConfig = toml::from_str(toml).unwrap();
        assert!(config.debug);
        assert_eq!(config.library.page_size, Some(100));

        let auth = config.auth_config(&args());
        assert_eq!(auth.client_id, "id");
        assert_eq!(auth.client_secret, "");
        assert_eq!(auth.redirect_url, "http://127.0.0.1:9000");
        assert_eq!(auth.scopes, vec!["scope-a", "scope-b"]);

        let library = config.library_config();
        assert_eq!(library.page_size, Some(100));
        assert_eq!(library.timeout, Duration::from_secs(60));

        assert_eq!(config.output_dir(None), PathBuf::from("/srv/photos"));
        assert_eq!(
            config.output_dir(Some(PathBuf::from("here"))),
            PathBuf::from("here")
        );
    }

    #[test]
    fn empty_config_uses_defaults() {
        let config: ClientConfig = toml::from_str("").unwrap();
        let auth = config.auth_config(&args());

        assert_eq!(auth.redirect_url, AuthConfig::DEFAULT_REDIRECT_URL);
        assert_eq!(auth.scopes, vec![AuthConfig::DEFAULT_SCOPE.to_string()]);
        assert_eq!(config.library_config().page_size, None);
        assert_eq!(config.output_dir(None), PathBuf::from("."));
    }

    #[test]
    fn redirect_flag_overrides_file() {
        let config: ClientConfig =
            toml::from_str("[auth]\nredirect_url = \"http://127.0.0.1:9000\"").unwrap();
        let mut args = args();
        args.redirect_url = Some("http://127.0.0.1:7000".to_string());

        assert_eq!(config.auth_config(&args).redirect_url, "http://127.0.0.1:7000");
    }

    #[test]
    fn load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[library]\npage_size = 50\n").unwrap();

        let config = ClientConfig::load_from(&path).unwrap();
        assert_eq!(config.library.page_size, Some(50));
    }

    #[test]
    fn load_from_invalid_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "page_size = [").unwrap();

        let err = ClientConfig::load_from(&path).unwrap_err();
        assert!(err.contains("parse"));

        let missing = ClientConfig::load_from(&dir.path().join("nope.toml")).unwrap_err();
        assert!(missing.contains("read"));
    }
}
