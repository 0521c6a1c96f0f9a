//! Helix Users API types.

use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A Twitch user, as returned by `GET /helix/users`.
///
/// Only `id`, `login` and `display_name` are guaranteed; the rest is decoded when present.
///
/// See: <https://dev.twitch.tv/docs/api/reference/#get-users>
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// The ID Twitch assigns to uniquely identify the user.
    pub id: String,
    /// The user's login name.
    pub login: String,
    /// The user's display name, which may differ from `login` in case or script.
    pub display_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub broadcaster_type: Option<BroadcasterType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_image_url: Option<String>,
    /// When the account was created.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<Timestamp>,
}

/// The kind of broadcaster a user is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum BroadcasterType {
    Affiliate,
    Partner,
    /// Twitch reports ordinary broadcasters with an empty string.
    #[serde(rename = "")]
    Normal,
}

impl fmt::Display for BroadcasterType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Affiliate => write!(f, "affiliate"),
            Self::Partner => write!(f, "partner"),
            Self::Normal => write!(f, "normal"),
        }
    }
}
