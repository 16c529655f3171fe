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

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use log::{debug, info, warn};
use parking_lot::{Mutex, RwLock};
use schnellru::{ByLength, LruMap};

use crate::cache::storage::RingStore;
use crate::error::{BounceError, FetchError, StorageError};
use crate::types::{RingIdentifier, RingSnapshot};
use crate::web::extract::extract_member_urls;
use crate::web::fetch::RingFetch;

/// A cached ring and how long it stays fresh
#[derive(Clone, Debug)]
pub struct CacheEntry {
    pub snapshot: Arc<RingSnapshot>,
    pub ttl: Duration,
}

impl CacheEntry {
    pub fn is_fresh(&self, now: DateTime<Utc>) -> bool {
        match (now - self.snapshot.fetched_at()).to_std() {
            Ok(age) => age < self.ttl,
            // Fetched "in the future" after the clock was set back
            Err(_) => true,
        }
    }
}

#[derive(Clone, Debug)]
enum FlightFailure {
    Fetch(FetchError),
    Storage(Arc<StorageError>),
}

// The outcome of the one fetch in progress for a ring, shared with callers
// who joined while it was running
type Flight = Arc<tokio::sync::Mutex<Option<Result<Arc<RingSnapshot>, FlightFailure>>>>;

fn new_flight() -> Flight {
    Arc::new(tokio::sync::Mutex::new(None))
}

/// RingCache holds the most recent resolution of each ring.
///
/// Key:     RingIdentifier
///
/// Entry:   CacheEntry
///
/// - a fresh entry is returned without any network access
/// - only one fetch per ring is ever in progress, other callers wait for it
///   and share its outcome, success or failure
/// - a stale entry is served again if refreshing it fails
/// - at most `capacity` rings are held; making room drops the ring fetched
///   longest ago, fresh or not
/// - every stored entry is also written to the [`RingStore`] and reloaded
///   from it at startup
pub struct RingCache<F> {
    fetcher: F,
    store: RingStore,
    ttl: Duration,
    capacity: u32,
    entries: RwLock<LruMap<RingIdentifier, CacheEntry>>,
    // Serialises changes to `store` and `entries` so that the storage write
    // happens without blocking readers of `entries`
    writer: Mutex<()>,
    in_flight: Mutex<HashMap<RingIdentifier, Flight>>,
}

impl<F: RingFetch> RingCache<F> {
    /// Create a cache holding up to `capacity` rings (at least 1), loaded
    /// from `store`.
    pub fn new(
        fetcher: F,
        store: RingStore,
        ttl: Duration,
        capacity: u32,
    ) -> Result<RingCache<F>, StorageError> {
        let capacity = capacity.max(1);
        let mut entries = LruMap::new(ByLength::new(capacity));

        let mut snapshots = store.load_all()?;
        let excess = snapshots.len().saturating_sub(capacity as usize);
        for snapshot in snapshots.drain(..excess) {
            info!("evicting cached webring {} to fit {capacity} rings", snapshot.ring());
            store.remove(snapshot.ring())?;
        }
        for snapshot in snapshots {
            let ring = snapshot.ring().clone();
            entries.insert(
                ring,
                CacheEntry {
                    snapshot: Arc::new(snapshot),
                    ttl,
                },
            );
        }
        info!("loaded {} cached webrings", entries.len());

        Ok(RingCache {
            fetcher,
            store,
            ttl,
            capacity,
            entries: RwLock::new(entries),
            writer: Mutex::new(()),
            in_flight: Mutex::new(HashMap::new()),
        })
    }

    /// Return the ring's members, fetching the ring document if there is no
    /// fresh entry.
    pub async fn resolve(&self, ring: &RingIdentifier) -> Result<Arc<RingSnapshot>, BounceError> {
        if let Some(snapshot) = self.fresh(ring) {
            debug!("webring cache hit for {ring}");
            return Ok(snapshot);
        }

        let ticket = self.join_flight(ring);
        let mut outcome = ticket.flight.lock().await;

        // Someone else fetched while we waited
        if let Some(shared) = outcome.as_ref() {
            debug!("sharing fetch result for {ring}");
            return match shared {
                Ok(snapshot) => Ok(Arc::clone(snapshot)),
                Err(FlightFailure::Fetch(e)) => self.stale_or(ring, e.clone()),
                Err(FlightFailure::Storage(e)) => {
                    Err(BounceError::Storage(StorageError::Shared(Arc::clone(e))))
                }
            };
        }

        if let Some(snapshot) = self.fresh(ring) {
            return Ok(snapshot);
        }

        let result = match self.fetch_snapshot(ring).await {
            Ok(snapshot) => match self.insert_snapshot(snapshot) {
                Ok(snapshot) => {
                    *outcome = Some(Ok(Arc::clone(&snapshot)));
                    Ok(snapshot)
                }
                Err(e) => {
                    warn!("failed to cache webring {ring} - {e}");
                    let e = Arc::new(e);
                    *outcome = Some(Err(FlightFailure::Storage(Arc::clone(&e))));
                    Err(BounceError::Storage(StorageError::Shared(e)))
                }
            },
            Err(e) => {
                *outcome = Some(Err(FlightFailure::Fetch(e.clone())));
                self.stale_or(ring, e)
            }
        };

        // Callers arriving from now on start a new flight instead of
        // reusing this outcome
        self.retire_flight(ring, &ticket.flight);
        result
    }

    /// Forget a ring, in memory and in storage. Returns true if it was cached.
    pub fn invalidate(&self, ring: &RingIdentifier) -> Result<bool, StorageError> {
        let _writer = self.writer.lock();
        let stored = self.store.remove(ring)?;
        let cached = self.entries.write().remove(ring).is_some();
        if stored || cached {
            info!("invalidated cached webring {ring}");
        }
        Ok(stored || cached)
    }

    pub fn peek(&self, ring: &RingIdentifier) -> Option<CacheEntry> {
        self.entries.read().peek(ring).cloned()
    }

    pub fn contains(&self, ring: &RingIdentifier) -> bool {
        self.entries.read().peek(ring).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> u32 {
        self.capacity
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Cached rings, oldest fetch first
    pub fn cached_rings(&self) -> Vec<Arc<RingSnapshot>> {
        let mut snapshots: Vec<Arc<RingSnapshot>> = self
            .entries
            .read()
            .iter()
            .map(|(_, entry)| Arc::clone(&entry.snapshot))
            .collect();
        snapshots.sort_by_key(|snapshot| snapshot.fetched_at());
        snapshots
    }

    fn fresh(&self, ring: &RingIdentifier) -> Option<Arc<RingSnapshot>> {
        self.peek(ring)
            .filter(|entry| entry.is_fresh(Utc::now()))
            .map(|entry| entry.snapshot)
    }

    async fn fetch_snapshot(&self, ring: &RingIdentifier) -> Result<RingSnapshot, FetchError> {
        let document = self.fetcher.fetch(ring).await?;
        let urls = extract_member_urls(&document.body, &document.url);
        debug!("extracted {} members from {ring}", urls.len());
        Ok(RingSnapshot::new(ring.clone(), urls, Utc::now()))
    }

    fn stale_or(
        &self,
        ring: &RingIdentifier,
        e: FetchError,
    ) -> Result<Arc<RingSnapshot>, BounceError> {
        match self.peek(ring) {
            Some(entry) => {
                warn!("serving stale webring {ring}, refresh failed - {e}");
                Ok(entry.snapshot)
            }
            None => Err(BounceError::Fetch(e)),
        }
    }

    /// Add or replace a ring, evicting the oldest ring if a new one would
    /// exceed capacity. Storage is written first so memory never holds a
    /// ring that storage does not. Readers are only blocked while the
    /// in-memory entries are swapped.
    fn insert_snapshot(&self, snapshot: RingSnapshot) -> Result<Arc<RingSnapshot>, StorageError> {
        let snapshot = Arc::new(snapshot);
        let ring = snapshot.ring().clone();

        let _writer = self.writer.lock();
        let victim = {
            let entries = self.entries.read();
            if entries.peek(&ring).is_none() && entries.len() >= self.capacity as usize {
                entries
                    .iter()
                    .min_by_key(|(_, entry)| entry.snapshot.fetched_at())
                    .map(|(oldest, _)| oldest.clone())
            } else {
                None
            }
        };

        self.store.save(&snapshot, victim.as_ref())?;

        let mut entries = self.entries.write();
        if let Some(victim) = victim {
            entries.remove(&victim);
            info!("evicted cached webring {victim} to make room for {ring}");
        }
        entries.insert(
            ring,
            CacheEntry {
                snapshot: Arc::clone(&snapshot),
                ttl: self.ttl,
            },
        );
        drop(entries);

        info!(
            "cached webring {} with {} members",
            snapshot.ring(),
            snapshot.len()
        );
        Ok(snapshot)
    }

    fn join_flight(&self, ring: &RingIdentifier) -> FlightTicket<'_, F> {
        let flight = Arc::clone(
            self.in_flight
                .lock()
                .entry(ring.clone())
                .or_insert_with(new_flight),
        );
        FlightTicket {
            cache: self,
            ring: ring.clone(),
            flight,
        }
    }

    fn retire_flight(&self, ring: &RingIdentifier, flight: &Flight) {
        let mut in_flight = self.in_flight.lock();
        if in_flight
            .get(ring)
            .is_some_and(|current| Arc::ptr_eq(current, flight))
        {
            in_flight.remove(ring);
        }
    }
}

/// A caller's share of a [`Flight`]. A flight abandoned before it has an
/// outcome is forgotten when the last ticket is dropped, including when a
/// caller gives up part way.
struct FlightTicket<'a, F> {
    cache: &'a RingCache<F>,
    ring: RingIdentifier,
    flight: Flight,
}

impl<F> Drop for FlightTicket<'_, F> {
    fn drop(&mut self) {
        let mut in_flight = self.cache.in_flight.lock();
        // Release our share while holding the lock so that exactly one of
        // several departing callers sees itself as the last
        let flight = std::mem::replace(&mut self.flight, new_flight());
        let registered = in_flight
            .get(&self.ring)
            .is_some_and(|current| Arc::ptr_eq(current, &flight));
        if registered && Arc::strong_count(&flight) == 2 {
            in_flight.remove(&self.ring);
        }
        drop(flight);
    }
}
