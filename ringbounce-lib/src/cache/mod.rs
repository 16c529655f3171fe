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

//! Caching of resolved webrings.
//!
//! Ring documents change rarely, so each ring is fetched at most once per TTL
//! and the result kept both in memory and in a SQLite database. The number of
//! rings held is bounded, and only whitelisted rings ever get this far, so
//! requests for arbitrary rings cannot grow the cache without limit.

pub mod ring_cache;
pub mod storage;

pub use ring_cache::{CacheEntry, RingCache};
pub use storage::RingStore;
