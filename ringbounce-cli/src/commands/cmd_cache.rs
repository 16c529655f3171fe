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

use chrono::Utc;
use color_eyre::Result;

use ringbounce::cache::RingStore;
use ringbounce::{BounceConfig, RingIdentifier};

/// Print the rings held in the durable cache, oldest fetch first
pub fn handle_list(config: &BounceConfig, json: bool) -> Result<()> {
    let store = RingStore::open(&config.cache_spec)?;
    let snapshots = store.load_all()?;

    if json {
        println!("{}", serde_json::to_string_pretty(&snapshots)?);
        return Ok(());
    }

    if snapshots.is_empty() {
        println!("No webrings cached in {}", config.cache_spec);
        return Ok(());
    }

    let now = Utc::now();
    for snapshot in &snapshots {
        let age = (now - snapshot.fetched_at()).num_seconds();
        let state = if age < config.cache_ttl.as_secs() as i64 {
            "fresh"
        } else {
            "stale"
        };
        println!("{snapshot}\n         age: {age}s ({state})");
    }
    println!("{} of at most {} webrings cached", snapshots.len(), config.max_rings);
    Ok(())
}

pub fn handle_invalidate(config: &BounceConfig, ring: &str) -> Result<()> {
    let store = RingStore::open(&config.cache_spec)?;
    let ring = RingIdentifier::new(ring);
    if store.remove(&ring)? {
        println!("Removed {ring} from {}", config.cache_spec);
    } else {
        println!("{ring} is not cached in {}", config.cache_spec);
    }
    Ok(())
}
