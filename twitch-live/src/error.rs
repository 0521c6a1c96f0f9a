//! Error types for each stage of the live-status check.
//!
//! Every error here is terminal for a run: nothing is retried. An unknown login
//! or an offline channel are not errors; see [`crate::LiveStatus`].

use http::StatusCode;

/// Credentials or settings could not be loaded.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("environment variable `{name}` is not set")]
    Missing { name: &'static str },

    #[error("environment variable `{name}` is empty")]
    Empty { name: &'static str },

    #[error("environment variable `{name}` has invalid value `{value}`: {reason}")]
    Invalid {
        name: &'static str,
        value: String,
        reason: String,
    },
}

/// Talking to the OAuth token endpoint failed.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("send token request to {url}: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("token endpoint {url} answered with status {status}: {body}")]
    Status {
        url: String,
        status: StatusCode,
        body: String,
    },

    #[error("parse token response as JSON: {source}")]
    Decode {
        #[source]
        source: serde_json::Error,
    },

    #[error("token endpoint returned an empty access token")]
    EmptyToken,

    #[error("token endpoint returned invalid created_at {created_at}")]
    InvalidIssueTime { created_at: i64 },
}

/// A Helix lookup (users or streams) failed.
#[derive(Debug, thiserror::Error)]
pub enum LookupError {
    #[error("send {resource} request to {url}: {source}")]
    Request {
        resource: &'static str,
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{resource} endpoint {url} answered with status {status}: {body}")]
    Status {
        resource: &'static str,
        url: String,
        status: StatusCode,
        body: String,
    },

    #[error("parse {resource} response as JSON: {source}")]
    Decode {
        resource: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

/// Any failure of the token → user → stream pipeline.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Lookup(#[from] LookupError),
}
