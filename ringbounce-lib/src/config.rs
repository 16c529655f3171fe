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

use std::fmt::{self, Display, Formatter};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;

use crate::navigate::LocationMatch;

pub const DEFAULT_CACHE_SPEC: &str = "sqlite://webring_cache.db";
pub const DEFAULT_CACHE_TTL_SECS: u64 = 300;
// When exceeded, the ring fetched longest ago is dropped from the cache
pub const DEFAULT_MAX_RINGS: u32 = 1000;
pub const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 5;
pub const DEFAULT_MAX_RESPONSE_BYTES: usize = 1024 * 1024;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("SQLite cache provider requires a path, e.g. sqlite:///tmp/webring_cache.db")]
    MissingCachePath,
    #[error("could not understand cache provider spec '{0}'")]
    UnknownCacheProvider(String),
    #[error("{0} must be greater than zero")]
    Zero(&'static str),
}

/// Where the ring cache is persisted.
///
/// Written as `sqlite://<path>`, so `sqlite:///tmp/rings.db` is an absolute
/// path and `sqlite://rings.db` is relative to the working directory.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CacheSpec {
    Sqlite(PathBuf),
}

impl FromStr for CacheSpec {
    type Err = ConfigError;

    fn from_str(spec: &str) -> Result<Self, Self::Err> {
        let spec = spec.trim();
        match spec.split_once("://") {
            Some(("sqlite", path)) if !path.is_empty() => Ok(CacheSpec::Sqlite(PathBuf::from(path))),
            Some(("sqlite", _)) => Err(ConfigError::MissingCachePath),
            None if spec == "sqlite" => Err(ConfigError::MissingCachePath),
            _ => Err(ConfigError::UnknownCacheProvider(spec.to_string())),
        }
    }
}

impl Display for CacheSpec {
    fn fmt(&self, formatter: &mut Formatter) -> fmt::Result {
        match self {
            CacheSpec::Sqlite(path) => write!(formatter, "sqlite://{}", path.display()),
        }
    }
}

/// Everything the engine needs, built once at startup.
#[derive(Clone, Debug)]
pub struct BounceConfig {
    /// Allowed ring identifiers. An entry ending in `*` allows any ring
    /// starting with the rest of the entry.
    pub whitelist: Vec<String>,
    pub cache_spec: CacheSpec,
    /// How long a resolved ring is served before it is fetched again
    pub cache_ttl: Duration,
    /// Maximum number of distinct rings held in the cache
    pub max_rings: u32,
    pub fetch_timeout: Duration,
    pub max_response_bytes: usize,
    pub location_match: LocationMatch,
}

impl Default for BounceConfig {
    fn default() -> Self {
        BounceConfig {
            whitelist: Vec::new(),
            cache_spec: CacheSpec::Sqlite(PathBuf::from("webring_cache.db")),
            cache_ttl: Duration::from_secs(DEFAULT_CACHE_TTL_SECS),
            max_rings: DEFAULT_MAX_RINGS,
            fetch_timeout: Duration::from_secs(DEFAULT_FETCH_TIMEOUT_SECS),
            max_response_bytes: DEFAULT_MAX_RESPONSE_BYTES,
            location_match: LocationMatch::default(),
        }
    }
}

impl BounceConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_rings == 0 {
            return Err(ConfigError::Zero("max_rings"));
        }
        if self.fetch_timeout.is_zero() {
            return Err(ConfigError::Zero("fetch_timeout"));
        }
        if self.max_response_bytes == 0 {
            return Err(ConfigError::Zero("max_response_bytes"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_sqlite_cache_specs() {
        assert_eq!(
            "sqlite:///tmp/rings.db".parse::<CacheSpec>(),
            Ok(CacheSpec::Sqlite(PathBuf::from("/tmp/rings.db")))
        );
        assert_eq!(
            DEFAULT_CACHE_SPEC.parse::<CacheSpec>(),
            Ok(CacheSpec::Sqlite(PathBuf::from("webring_cache.db")))
        );
        assert_eq!("sqlite".parse::<CacheSpec>(), Err(ConfigError::MissingCachePath));
        assert_eq!("sqlite://".parse::<CacheSpec>(), Err(ConfigError::MissingCachePath));
        assert!(matches!(
            "redis://localhost".parse::<CacheSpec>(),
            Err(ConfigError::UnknownCacheProvider(_))
        ));
    }

    #[test]
    fn rejects_zero_bounds() {
        let config = BounceConfig {
            max_rings: 0,
            ..BounceConfig::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::Zero("max_rings")));
        assert!(BounceConfig::default().validate().is_ok());
    }
}
