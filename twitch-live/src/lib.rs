//! Reports whether a Twitch user is live, and with how many viewers.
//!
//! A check is three requests chained by data dependency: an app access token from the OAuth
//! token endpoint, the user record for a login, and that user's live stream. Any failure ends
//! the check; nothing is retried. See [`check_live`].

use crate::config::Config;
use crate::oauth::OAuthManager;
use crate::twitch_api::{Stream, TwitchClient, User};
use std::fmt;
use tracing::instrument;

pub mod config;
pub mod error;
pub mod oauth;
pub mod twitch_api;

#[cfg(test)]
mod test_support;

pub use error::{AuthError, ConfigError, Error, LookupError};

/// The outcome of a live-status check.
///
/// An unknown login and an offline user are ordinary outcomes, not errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LiveStatus {
    Live { user: User, stream: Stream },
    Offline { user: User },
    UnknownUser { login: String },
}

impl LiveStatus {
    /// The current viewer count, if the user is live.
    pub fn viewer_count(&self) -> Option<u64> {
        match self {
            Self::Live { stream, .. } => Some(stream.viewer_count),
            Self::Offline { .. } | Self::UnknownUser { .. } => None,
        }
    }
}

impl fmt::Display for LiveStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Live { user, stream } => write!(
                f,
                "{} is live with {} viewers",
                user.display_name, stream.viewer_count
            ),
            Self::Offline { user } => write!(f, "{} is currently offline", user.display_name),
            Self::UnknownUser { login } => write!(f, "no Twitch user named {login}"),
        }
    }
}

/// Checks whether the user with the given login is currently broadcasting.
///
/// Obtains an app access token through the client-credentials grant, resolves `login` to a
/// user id, then looks up that user's live stream. The token is not refreshed: a single check
/// finishes long before it expires.
///
/// `client` is used for all three requests.
#[instrument(skip(config, client))]
pub async fn check_live(
    config: &Config,
    client: reqwest::Client,
    login: &str,
) -> Result<LiveStatus, Error> {
    let oauth = OAuthManager::new(config, client.clone());
    let token = oauth.request_app_token().await?;

    let twitch = TwitchClient::new(config, token, client);
    let Some(user) = twitch.get_user_by_login(login).await? else {
        return Ok(LiveStatus::UnknownUser {
            login: login.to_string(),
        });
    };

    let status = match twitch.get_stream_by_user_id(&user.id).await? {
        Some(stream) => LiveStatus::Live { user, stream },
        None => LiveStatus::Offline { user },
    };
    Ok(status)
}
