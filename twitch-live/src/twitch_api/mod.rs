//! Twitch Helix API client library.
//!
//! Only the two lookups needed to tell whether a channel is live are covered:
//!
//! 1. [`TwitchClient::get_user_by_login`] resolves a login name to a [`User`], whose `id` is
//!    the stable identifier every other Helix endpoint works with.
//! 2. [`TwitchClient::get_stream_by_user_id`] returns the user's [`Stream`] while they are
//!    broadcasting. Helix has no "offline" stream object; an offline channel simply has no
//!    entry in the response.
//!
//! Both calls authenticate with an app access token from [`crate::oauth::OAuthManager`] and
//! the application's client id.

pub mod client;
pub mod streams;
pub mod types;
pub mod users;

// Re-export main types for convenience
pub use client::TwitchClient;
pub use streams::Stream;
pub use types::DataResponse;
pub use users::{BroadcasterType, User};
