//! OAuth 2.0 token management for the Twitch API.
//!
//! Twitch hands out app access tokens through the client-credentials grant: the application
//! proves who it is with its own client id and secret, and no end-user is involved. This
//! module requests such tokens, refreshes them once they go stale, and validates them.

use crate::config::{Config, Credentials};
use crate::error::AuthError;
use jiff::Timestamp;
use serde::Deserialize;
use std::time::Duration;
use tracing::instrument;

/// An access token together with the moment it was issued and how long it lives.
///
/// Tokens are never mutated in place; refreshing one produces a new value.
#[derive(Debug, Clone)]
pub struct TimeBoundAccessToken {
    access_token: oauth2::AccessToken,
    refresh_token: Option<oauth2::RefreshToken>,
    lifetime: Duration,
    issued_at: Timestamp,
    scopes: Vec<String>,
    token_type: Option<String>,
}

impl TimeBoundAccessToken {
    /// Creates a token that was issued at `issued_at` and stays valid for `lifetime`.
    pub fn new(access_token: impl Into<String>, lifetime: Duration, issued_at: Timestamp) -> Self {
        Self {
            access_token: oauth2::AccessToken::new(access_token.into()),
            refresh_token: None,
            lifetime,
            issued_at,
            scopes: Vec::new(),
            token_type: None,
        }
    }

    pub fn with_refresh_token(mut self, refresh_token: impl Into<String>) -> Self {
        self.refresh_token = Some(oauth2::RefreshToken::new(refresh_token.into()));
        self
    }

    /// The bearer string to put in `Authorization` headers.
    pub fn secret(&self) -> &str {
        self.access_token.secret()
    }

    pub fn refresh_token(&self) -> Option<&oauth2::RefreshToken> {
        self.refresh_token.as_ref()
    }

    pub fn lifetime(&self) -> Duration {
        self.lifetime
    }

    pub fn issued_at(&self) -> Timestamp {
        self.issued_at
    }

    pub fn scopes(&self) -> &[String] {
        &self.scopes
    }

    pub fn token_type(&self) -> Option<&str> {
        self.token_type.as_deref()
    }

    /// The instant from which the token is stale.
    ///
    /// Saturates at [`Timestamp::MAX`] for lifetimes that run past the representable range.
    pub fn expires_at(&self) -> Timestamp {
        let lifetime = i64::try_from(self.lifetime.as_secs()).unwrap_or(i64::MAX);
        Timestamp::from_second(self.issued_at.as_second().saturating_add(lifetime))
            .unwrap_or(Timestamp::MAX)
    }

    pub fn is_expired_at(&self, now: Timestamp) -> bool {
        now >= self.expires_at()
    }
}

/// Body of a successful response from the token endpoint.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: oauth2::AccessToken,
    #[serde(default)]
    refresh_token: Option<oauth2::RefreshToken>,
    expires_in: u64,
    #[serde(default)]
    scope: Option<Scope>,
    #[serde(default)]
    token_type: Option<String>,
    /// Unix seconds. Twitch omits this, in which case the local clock is used.
    #[serde(default)]
    created_at: Option<i64>,
}

/// Twitch reports scopes as a list; other OAuth servers use a space-separated string.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Scope {
    Joined(String),
    List(Vec<String>),
}

impl Scope {
    fn into_vec(self) -> Vec<String> {
        match self {
            Scope::Joined(s) => s.split_whitespace().map(String::from).collect(),
            Scope::List(v) => v,
        }
    }
}

impl TryFrom<TokenResponse> for TimeBoundAccessToken {
    type Error = AuthError;

    fn try_from(response: TokenResponse) -> Result<Self, Self::Error> {
        if response.access_token.secret().is_empty() {
            return Err(AuthError::EmptyToken);
        }
        let issued_at = match response.created_at {
            Some(created_at) => Timestamp::from_second(created_at)
                .map_err(|_| AuthError::InvalidIssueTime { created_at })?,
            None => Timestamp::now(),
        };
        Ok(Self {
            access_token: response.access_token,
            refresh_token: response
                .refresh_token
                .filter(|token| !token.secret().is_empty()),
            lifetime: Duration::from_secs(response.expires_in),
            issued_at,
            scopes: response.scope.map(Scope::into_vec).unwrap_or_default(),
            token_type: response.token_type,
        })
    }
}

/// Requests, refreshes and validates Twitch access tokens for one application.
#[derive(Debug, Clone)]
pub struct OAuthManager {
    credentials: Credentials,
    token_url: String,
    validate_url: String,
    client: reqwest::Client,
}

impl OAuthManager {
    /// Creates a manager for the credentials and endpoints in `config`.
    ///
    /// `client` is shared with the rest of the run so connections can be reused.
    pub fn new(config: &Config, client: reqwest::Client) -> Self {
        Self {
            credentials: config.credentials.clone(),
            token_url: config.token_url.clone(),
            validate_url: config.validate_url.clone(),
            client,
        }
    }

    /// Obtains an app access token through the client-credentials grant.
    #[instrument(skip(self))]
    pub async fn request_app_token(&self) -> Result<TimeBoundAccessToken, AuthError> {
        let token = self
            .request_token(&[
                ("grant_type", "client_credentials"),
                ("client_id", self.credentials.client_id.as_str()),
                ("client_secret", self.credentials.client_secret.secret().as_str()),
            ])
            .await?;
        tracing::debug!(
            lifetime_secs = token.lifetime().as_secs(),
            "obtained app access token"
        );
        Ok(token)
    }

    /// Returns `token` unchanged while it is fresh at `now`, and a refreshed token otherwise.
    ///
    /// A stale token is exchanged through the refresh-token grant. App tokens from the
    /// client-credentials grant carry no refresh token, so for those a new app token is
    /// requested instead. Either way exactly one request is made. If the new token lacks a
    /// refresh token, the old one is carried over.
    #[instrument(skip(self, token), fields(expires_at = %token.expires_at()))]
    pub async fn refresh_if_expired(
        &self,
        token: TimeBoundAccessToken,
        now: Timestamp,
    ) -> Result<TimeBoundAccessToken, AuthError> {
        if !token.is_expired_at(now) {
            tracing::trace!("access token still fresh");
            return Ok(token);
        }

        let mut fresh = match token.refresh_token() {
            Some(refresh_token) => {
                tracing::debug!("access token expired, exchanging refresh token");
                self.request_token(&[
                    ("grant_type", "refresh_token"),
                    ("refresh_token", refresh_token.secret().as_str()),
                    ("client_id", self.credentials.client_id.as_str()),
                    ("client_secret", self.credentials.client_secret.secret().as_str()),
                ])
                .await?
            }
            None => {
                tracing::debug!("expired access token has no refresh token, requesting a new one");
                self.request_app_token().await?
            }
        };

        if fresh.refresh_token.is_none() {
            fresh.refresh_token = token.refresh_token;
        }
        Ok(fresh)
    }

    /// [`Self::refresh_if_expired`] against the current clock.
    pub async fn refresh_if_expired_now(
        &self,
        token: TimeBoundAccessToken,
    ) -> Result<TimeBoundAccessToken, AuthError> {
        self.refresh_if_expired(token, Timestamp::now()).await
    }

    /// Asks Twitch whether `token` is still accepted.
    ///
    /// # Returns
    ///
    /// * `Ok(true)` - Twitch accepts the token
    /// * `Ok(false)` - Twitch rejected the token as unauthorized
    /// * `Err(_)` - Network error or unexpected status
    #[instrument(skip_all, ret)]
    pub async fn validate(&self, token: &TimeBoundAccessToken) -> Result<bool, AuthError> {
        let response = self
            .client
            .get(&self.validate_url)
            .header(http::header::AUTHORIZATION, format!("OAuth {}", token.secret()))
            .send()
            .await
            .map_err(|source| AuthError::Request {
                url: self.validate_url.clone(),
                source,
            })?;

        let status = response.status();
        if status.is_success() {
            return Ok(true);
        }
        if status == http::StatusCode::UNAUTHORIZED {
            tracing::warn!("access token rejected by validation endpoint");
            return Ok(false);
        }
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "unknown error".to_string());
        Err(AuthError::Status {
            url: self.validate_url.clone(),
            status,
            body,
        })
    }

    /// Posts a form to the token endpoint and decodes the resulting token.
    #[instrument(skip_all, fields(grant_type = form.first().map(|(_, v)| *v)))]
    async fn request_token(
        &self,
        form: &[(&str, &str)],
    ) -> Result<TimeBoundAccessToken, AuthError> {
        let request_error = |source: reqwest::Error| AuthError::Request {
            url: self.token_url.clone(),
            source,
        };

        // `form` also sets `Content-Type: application/x-www-form-urlencoded`.
        let response = self
            .client
            .post(&self.token_url)
            .form(form)
            .send()
            .await
            .map_err(request_error)?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown error".to_string());
            tracing::warn!(%status, "token request rejected");
            return Err(AuthError::Status {
                url: self.token_url.clone(),
                status,
                body,
            });
        }

        let body = response.text().await.map_err(request_error)?;
        let response: TokenResponse =
            serde_json::from_str(&body).map_err(|source| AuthError::Decode { source })?;
        TimeBoundAccessToken::try_from(response)
    }
}
