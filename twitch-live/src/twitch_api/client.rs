//! Core Helix API client functionality.

use crate::config::Config;
use crate::error::LookupError;
use crate::oauth::TimeBoundAccessToken;
use crate::twitch_api::{streams::Stream, types::DataResponse, users::User};
use http::Method;
use oauth2::ClientId;
use serde::de::DeserializeOwned;
use tracing::instrument;

/// Client for the Twitch Helix API.
///
/// Every request carries the application's client id in `Client-ID` and the access token as a
/// bearer credential. The token is used as given; call
/// [`crate::oauth::OAuthManager::refresh_if_expired`] and build a new client to swap it.
#[derive(Debug, Clone)]
pub struct TwitchClient {
    token: TimeBoundAccessToken,
    client_id: ClientId,
    /// Helix base URL, without a trailing slash.
    api_url: String,
    /// HTTP client for API requests
    client: reqwest::Client,
}

impl TwitchClient {
    /// Creates a Helix client for the endpoints and client id in `config`.
    pub fn new(config: &Config, token: TimeBoundAccessToken, client: reqwest::Client) -> Self {
        Self {
            token,
            client_id: config.credentials.client_id.clone(),
            api_url: config.api_url.clone(),
            client,
        }
    }

    pub fn token(&self) -> &TimeBoundAccessToken {
        &self.token
    }

    /// Makes an authenticated request to a Helix endpoint and returns the response body.
    ///
    /// This method consolidates the shared logic across Helix requests:
    /// - `Client-ID` and bearer `Authorization` headers
    /// - Query parameters
    /// - Status code validation, so error bodies are never decoded as data
    ///
    /// `resource` is the path below the Helix base URL, e.g. `users`.
    #[instrument(skip(self), level = tracing::Level::TRACE)]
    pub(crate) async fn make_authenticated_request(
        &self,
        method: Method,
        resource: &'static str,
        query_params: &[(&str, &str)],
    ) -> Result<String, LookupError> {
        let url = format!("{}/{}", self.api_url, resource);
        let request_error = |source: reqwest::Error| LookupError::Request {
            resource,
            url: url.clone(),
            source,
        };

        let response = self
            .client
            .request(method, &url)
            .header("Client-ID", self.client_id.as_str())
            .bearer_auth(self.token.secret())
            .query(query_params)
            .send()
            .await
            .map_err(request_error)?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown error".to_string());
            tracing::warn!(%status, resource, "Helix request failed");
            return Err(LookupError::Status {
                resource,
                url: url.clone(),
                status,
                body,
            });
        }

        response.text().await.map_err(request_error)
    }

    /// Fetches a Helix list endpoint and returns the first matching resource, if any.
    async fn get_first<T: DeserializeOwned>(
        &self,
        resource: &'static str,
        query_params: &[(&str, &str)],
    ) -> Result<Option<T>, LookupError> {
        let body = self
            .make_authenticated_request(Method::GET, resource, query_params)
            .await?;
        let response: DataResponse<T> = serde_json::from_str(&body)
            .map_err(|source| LookupError::Decode { resource, source })?;
        Ok(response.into_first())
    }

    /// Resolves a login name to the user it belongs to.
    ///
    /// # Returns
    ///
    /// * `Ok(Some(user))` - The login exists
    /// * `Ok(None)` - No user has this login
    /// * `Err(_)` - Network error, non-success status, or an undecodable body
    ///
    /// # API Reference
    ///
    /// <https://dev.twitch.tv/docs/api/reference/#get-users>
    #[instrument(skip(self))]
    pub async fn get_user_by_login(&self, login: &str) -> Result<Option<User>, LookupError> {
        let user: Option<User> = self.get_first("users", &[("login", login)]).await?;
        match &user {
            Some(user) => tracing::debug!(user_id = user.id, "resolved login"),
            None => tracing::debug!("no user with this login"),
        }
        Ok(user)
    }

    /// Returns the live stream of the given user.
    ///
    /// # Returns
    ///
    /// * `Ok(Some(stream))` - The user is live; only the first stream Twitch reports is kept
    /// * `Ok(None)` - The user is offline
    /// * `Err(_)` - Network error, non-success status, or an undecodable body
    ///
    /// # API Reference
    ///
    /// <https://dev.twitch.tv/docs/api/reference/#get-streams>
    #[instrument(skip(self))]
    pub async fn get_stream_by_user_id(&self, user_id: &str) -> Result<Option<Stream>, LookupError> {
        let stream: Option<Stream> = self.get_first("streams", &[("user_id", user_id)]).await?;
        match &stream {
            Some(stream) => tracing::debug!(viewer_count = stream.viewer_count, "user is live"),
            None => tracing::debug!("user is offline"),
        }
        Ok(stream)
    }
}
