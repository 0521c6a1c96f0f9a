//! Credentials and endpoint settings.
//!
//! Nothing outside this module reads the process environment. Everything else
//! receives a [`Config`] explicitly, which lets tests point the whole pipeline
//! at a local mock server with fixture credentials.

use crate::error::ConfigError;
use oauth2::{ClientId, ClientSecret};
use std::time::Duration;

/// Twitch OAuth token endpoint, used for both the client-credentials and the refresh grant.
pub const TOKEN_URL: &str = "https://id.twitch.tv/oauth2/token";

/// Twitch OAuth token validation endpoint.
pub const VALIDATE_URL: &str = "https://id.twitch.tv/oauth2/validate";

/// Base URL of the Helix API.
pub const API_URL: &str = "https://api.twitch.tv/helix";

const CLIENT_ID_VAR: &str = "TWITCH_CLIENT_ID";
const CLIENT_SECRET_VAR: &str = "TWITCH_CLIENT_SECRET";
const TOKEN_URL_VAR: &str = "TWITCH_TOKEN_URL";
const VALIDATE_URL_VAR: &str = "TWITCH_VALIDATE_URL";
const API_URL_VAR: &str = "TWITCH_API_URL";
const TIMEOUT_VAR: &str = "TWITCH_HTTP_TIMEOUT_SECS";

/// The application's client id and secret.
///
/// Both are wrapped in [`oauth2`] secret types so they never show up in `Debug` output.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub client_id: ClientId,
    pub client_secret: ClientSecret,
}

impl Credentials {
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self {
            client_id: ClientId::new(client_id.into()),
            client_secret: ClientSecret::new(client_secret.into()),
        }
    }
}

/// Everything needed to run a live-status check.
#[derive(Debug, Clone)]
pub struct Config {
    pub credentials: Credentials,
    pub token_url: String,
    pub validate_url: String,
    /// Helix base URL, without a trailing slash.
    pub api_url: String,
    /// Per-request timeout. `None` leaves the HTTP client's default in place.
    pub http_timeout: Option<Duration>,
}

impl Config {
    /// Builds a config against the public Twitch endpoints.
    pub fn new(credentials: Credentials) -> Self {
        Self {
            credentials,
            token_url: TOKEN_URL.to_string(),
            validate_url: VALIDATE_URL.to_string(),
            api_url: API_URL.to_string(),
            http_timeout: None,
        }
    }

    /// Reads the config from the process environment, after loading `.env` if one exists.
    pub fn from_env() -> Result<Self, ConfigError> {
        match dotenvy::dotenv() {
            Ok(path) => tracing::debug!(path = %path.display(), "loaded .env file"),
            Err(e) if e.not_found() => tracing::trace!("no .env file found"),
            Err(e) => tracing::warn!("ignoring unreadable .env file: {e}"),
        }
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Reads the config through `lookup`, which maps a variable name to its value.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |name: &'static str| match lookup(name) {
            None => Err(ConfigError::Missing { name }),
            Some(v) if v.trim().is_empty() => Err(ConfigError::Empty { name }),
            Some(v) => Ok(v.trim().to_string()),
        };
        let optional = |name: &'static str| lookup(name).filter(|v| !v.trim().is_empty());

        let credentials = Credentials::new(required(CLIENT_ID_VAR)?, required(CLIENT_SECRET_VAR)?);
        let mut config = Self::new(credentials);

        if let Some(url) = optional(TOKEN_URL_VAR) {
            config.token_url = url;
        }
        if let Some(url) = optional(VALIDATE_URL_VAR) {
            config.validate_url = url;
        }
        if let Some(url) = optional(API_URL_VAR) {
            config.api_url = url.trim_end_matches('/').to_string();
        }
        if let Some(secs) = optional(TIMEOUT_VAR) {
            let secs: u64 = secs.trim().parse().map_err(|e: std::num::ParseIntError| {
                ConfigError::Invalid {
                    name: TIMEOUT_VAR,
                    value: secs.clone(),
                    reason: e.to_string(),
                }
            })?;
            config.http_timeout = Some(Duration::from_secs(secs));
        }

        Ok(config)
    }

    /// Builds the HTTP client shared by every stage of a run.
    pub fn http_client(&self) -> reqwest::Result<reqwest::Client> {
        let mut builder = reqwest::ClientBuilder::new()
            // SSRF no thank you.
            .redirect(reqwest::redirect::Policy::none());
        if let Some(timeout) = self.http_timeout {
            builder = builder.timeout(timeout);
        }
        builder.build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use insta::assert_snapshot;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn defaults_to_public_endpoints() {
        let config = Config::from_lookup(lookup(&[
            ("TWITCH_CLIENT_ID", "id"),
            ("TWITCH_CLIENT_SECRET", "secret"),
        ]))
        .unwrap();

        assert_eq!(config.credentials.client_id.as_str(), "id");
        assert_eq!(config.credentials.client_secret.secret(), "secret");
        assert_eq!(config.token_url, TOKEN_URL);
        assert_eq!(config.validate_url, VALIDATE_URL);
        assert_eq!(config.api_url, API_URL);
        assert_eq!(config.http_timeout, None);
    }

    #[test]
    fn overrides_endpoints_and_timeout() {
        let config = Config::from_lookup(lookup(&[
            ("TWITCH_CLIENT_ID", " id "),
            ("TWITCH_CLIENT_SECRET", "secret"),
            ("TWITCH_TOKEN_URL", "http://127.0.0.1:1/token"),
            ("TWITCH_API_URL", "http://127.0.0.1:1/helix/"),
            ("TWITCH_HTTP_TIMEOUT_SECS", "7"),
        ]))
        .unwrap();

        assert_eq!(config.credentials.client_id.as_str(), "id");
        assert_eq!(config.token_url, "http://127.0.0.1:1/token");
        assert_eq!(config.validate_url, VALIDATE_URL);
        assert_eq!(config.api_url, "http://127.0.0.1:1/helix");
        assert_eq!(config.http_timeout, Some(Duration::from_secs(7)));
    }

    #[test]
    fn missing_or_bad_variables_are_config_errors() {
        let err = Config::from_lookup(lookup(&[("TWITCH_CLIENT_SECRET", "secret")])).unwrap_err();
        assert_snapshot!(err, @"environment variable `TWITCH_CLIENT_ID` is not set");

        let err = Config::from_lookup(lookup(&[
            ("TWITCH_CLIENT_ID", "id"),
            ("TWITCH_CLIENT_SECRET", "  "),
        ]))
        .unwrap_err();
        assert_snapshot!(err, @"environment variable `TWITCH_CLIENT_SECRET` is empty");

        let err = Config::from_lookup(lookup(&[
            ("TWITCH_CLIENT_ID", "id"),
            ("TWITCH_CLIENT_SECRET", "secret"),
            ("TWITCH_HTTP_TIMEOUT_SECS", "soon"),
        ]))
        .unwrap_err();
        assert!(
            matches!(err, ConfigError::Invalid { name: "TWITCH_HTTP_TIMEOUT_SECS", .. }),
            "{err:?}"
        );
    }

    #[test]
    fn secrets_are_not_debug_printed() {
        let credentials = Credentials::new("id", "hunter2");
        assert!(!format!("{credentials:?}").contains("hunter2"));
    }
}
