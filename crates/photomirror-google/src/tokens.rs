//! In-memory OAuth token state.
//!
//! Tokens live only inside an [`AuthenticatedClient`](crate::AuthenticatedClient)
//! and are dropped with it; nothing is written to disk.

use chrono::{DateTime, Duration, Utc};

/// Refresh this long before the server-reported expiry.
const EXPIRY_MARGIN_SECS: i64 = 60;

/// An access token and the means to renew it.
#[derive(Clone)]
pub(crate) struct Token {
    pub(crate) access_token: String,
    pub(crate) refresh_token: Option<String>,
    pub(crate) expires_at: Option<DateTime<Utc>>,
}

impl Token {
    /// Creates a token from token endpoint response data.
    pub(crate) fn new(
        access_token: impl Into<String>,
        refresh_token: Option<String>,
        expires_in_secs: Option<i64>,
    ) -> Self {
        Self {
            access_token: access_token.into(),
            refresh_token,
            expires_at: expires_in_secs.map(expiry_from_now),
        }
    }

    /// Returns true if the access token is expired or about to expire.
    pub(crate) fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }

    fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        match self.expires_at {
            Some(expires_at) => now >= expires_at,
            // No expiry reported: treat as valid until the server says otherwise.
            None => false,
        }
    }

    /// Applies a refresh response.
    ///
    /// The refresh token is only replaced when the server issued a new one.
    pub(crate) fn refreshed(
        &mut self,
        access_token: impl Into<String>,
        refresh_token: Option<String>,
        expires_in_secs: Option<i64>,
    ) {
        self.access_token = access_token.into();
        self.expires_at = expires_in_secs.map(expiry_from_now);
        if refresh_token.is_some() {
            self.refresh_token = refresh_token;
        }
    }
}

impl std::fmt::Debug for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Token")
            .field("access_token", &"<redacted>")
            .field("has_refresh_token", &self.refresh_token.is_some())
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

fn expiry_from_now(secs: i64) -> DateTime<Utc> {
    Utc::now() + Duration::seconds(secs) - Duration::seconds(EXPIRY_MARGIN_SECS)
}
