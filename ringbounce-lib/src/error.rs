/*
 Copyright (c) 2025 Mark Hughes

 This program is free software: you can redistribute it and/or modify
 it under the terms of the GNU Affero General Public License as published by
 the Free Software Foundation, either version 3 of the License, or
 (at your option) any later version.

 This program is distributed in the hope that it will be useful,
 but WITHOUT ANY WARRANTY; without even the implied warranty of
 MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
 GNU Affero General Public License for more details.

 You should have received a copy of the GNU Affero General Public License
 along with this program. If not, see <https://www.gnu.org/licenses/>.
*/

use std::sync::Arc;

use thiserror::Error;

use crate::config::ConfigError;

/// Every way a bounce can fail. The boundary layer maps each kind to its own
/// response, so none of these is ever swallowed on the way up.
#[derive(Debug, Error)]
pub enum BounceError {
    #[error("the webring '{0}' is not whitelisted")]
    NotWhitelisted(String),
    #[error("failed to fetch the webring: {0}")]
    Fetch(#[from] FetchError),
    #[error("the webring has no members")]
    EmptyRing,
    #[error("the site you came from ('{0}') is not in the webring")]
    LocationNotFound(String),
    #[error("webring cache failure: {0}")]
    Storage(#[from] StorageError),
}

/// Failure retrieving a ring document.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FetchError {
    /// DNS, connection, timeout or an unusable ring URL
    #[error("unreachable: {reason}")]
    Unreachable { reason: String, timed_out: bool },
    #[error("bad status {0}")]
    BadStatus(u16),
    #[error("response larger than {limit} bytes")]
    TooLarge { limit: usize },
}

impl FetchError {
    pub(crate) fn unreachable(reason: impl Into<String>) -> Self {
        FetchError::Unreachable {
            reason: reason.into(),
            timed_out: false,
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, FetchError::Unreachable { timed_out: true, .. })
    }
}

/// Failure in the durable ring cache
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("cache database error: {0}")]
    Database(#[from] rusqlite::Error),
    #[error("cache record could not be encoded: {0}")]
    Encoding(#[from] serde_json::Error),
    /// The same failure, reported to every caller that was waiting on the write
    #[error(transparent)]
    Shared(Arc<StorageError>),
}

/// Failure building a resolver at startup
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
    #[error("failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
    #[error("failed to open webring cache: {0}")]
    Storage(#[from] StorageError),
}
