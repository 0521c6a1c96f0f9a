//! Shared response envelopes for Helix endpoints.

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// The envelope every Helix list endpoint wraps its results in.
///
/// See: <https://dev.twitch.tv/docs/api/guide/#pagination>
#[derive(Debug, Serialize, Deserialize)]
pub struct DataResponse<T> {
    /// The resources that matched the request, possibly none.
    pub data: VecDeque<T>,
}

impl<T> DataResponse<T> {
    /// Takes the first resource, if any matched.
    pub fn into_first(mut self) -> Option<T> {
        self.data.pop_front()
    }
}
