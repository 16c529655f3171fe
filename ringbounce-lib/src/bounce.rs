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

//! The three bounce operations: random, next and previous.
//!
//! Each runs whitelist -> cache -> navigator and returns the first error
//! met along the way, unchanged.

use std::sync::Arc;

use log::debug;
use url::Url;

use crate::cache::{RingCache, RingStore};
use crate::config::BounceConfig;
use crate::error::{BounceError, StartupError, StorageError};
use crate::navigate::{pick_adjacent, pick_random, Direction, LocationMatch};
use crate::types::{RingIdentifier, RingSnapshot};
use crate::web::fetch::{HttpRingFetcher, RingFetch};
use crate::whitelist::Whitelist;

/// Built once at startup and shared by every request
pub struct BounceResolver<F> {
    whitelist: Whitelist,
    cache: RingCache<F>,
    location_match: LocationMatch,
}

impl BounceResolver<HttpRingFetcher> {
    /// Validate the config, open the cache storage it names and load any
    /// rings cached by a previous run.
    pub fn open(config: &BounceConfig) -> Result<Self, StartupError> {
        config.validate()?;
        let fetcher = HttpRingFetcher::new(config.fetch_timeout, config.max_response_bytes)?;
        let store = RingStore::open(&config.cache_spec)?;
        BounceResolver::with_fetcher(config, fetcher, store).map_err(StartupError::from)
    }
}

impl<F: RingFetch> BounceResolver<F> {
    pub fn with_fetcher(
        config: &BounceConfig,
        fetcher: F,
        store: RingStore,
    ) -> Result<Self, StorageError> {
        let cache = RingCache::new(fetcher, store, config.cache_ttl, config.max_rings)?;
        Ok(BounceResolver {
            whitelist: Whitelist::new(&config.whitelist),
            cache,
            location_match: config.location_match,
        })
    }

    /// A random member of `ring`
    pub async fn random(&self, ring: &str) -> Result<Url, BounceError> {
        let snapshot = self.snapshot(ring).await?;
        let target = pick_random(&snapshot)?;
        Ok(target.url.clone())
    }

    /// The member after `from` in `ring`
    pub async fn next(&self, ring: &str, from: &str) -> Result<Url, BounceError> {
        self.adjacent(ring, from, Direction::Next).await
    }

    /// The member before `from` in `ring`
    pub async fn prev(&self, ring: &str, from: &str) -> Result<Url, BounceError> {
        self.adjacent(ring, from, Direction::Previous).await
    }

    pub async fn adjacent(
        &self,
        ring: &str,
        from: &str,
        direction: Direction,
    ) -> Result<Url, BounceError> {
        let snapshot = self.snapshot(ring).await?;
        let target = pick_adjacent(&snapshot, from, direction, &self.location_match)?;
        debug!("bounce {direction:?} from {from} to {}", target.url);
        Ok(target.url.clone())
    }

    /// Drop a ring from the cache so the next bounce refetches it
    pub fn invalidate(&self, ring: &str) -> Result<bool, StorageError> {
        self.cache.invalidate(&RingIdentifier::new(ring))
    }

    pub fn cache(&self) -> &RingCache<F> {
        &self.cache
    }

    pub fn whitelist(&self) -> &Whitelist {
        &self.whitelist
    }

    async fn snapshot(&self, ring: &str) -> Result<Arc<RingSnapshot>, BounceError> {
        let ring = RingIdentifier::new(ring);
        if !self.whitelist.is_allowed(&ring) {
            debug!("rejected webring {ring}, not whitelisted");
            return Err(BounceError::NotWhitelisted(ring.to_string()));
        }
        self.cache.resolve(&ring).await
    }
}
