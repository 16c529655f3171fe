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

//! Durable storage for resolved rings, so a restart doesn't refetch them all.
//!
//! One row per ring:
//!
//! | column       | content                                          |
//! |--------------|--------------------------------------------------|
//! | `ring`       | ring identifier (primary key)                    |
//! | `fetched_at` | Unix time in milliseconds                        |
//! | `members`    | JSON array of member URLs in document order      |
//! | `format`     | record layout version, currently 1               |

use std::path::Path;

use chrono::{DateTime, Utc};
use log::warn;
use parking_lot::Mutex;
use rusqlite::{params, Connection, OptionalExtension};
use url::Url;

use crate::config::CacheSpec;
use crate::error::StorageError;
use crate::types::{RingIdentifier, RingSnapshot};

const RECORD_FORMAT: i64 = 1;

pub struct RingStore {
    connection: Mutex<Connection>,
}

impl RingStore {
    pub fn open(spec: &CacheSpec) -> Result<RingStore, StorageError> {
        match spec {
            CacheSpec::Sqlite(path) => RingStore::open_path(path),
        }
    }

    pub fn open_path(path: impl AsRef<Path>) -> Result<RingStore, StorageError> {
        RingStore::init(Connection::open(path)?)
    }

    pub fn in_memory() -> Result<RingStore, StorageError> {
        RingStore::init(Connection::open_in_memory()?)
    }

    fn init(connection: Connection) -> Result<RingStore, StorageError> {
        connection.execute(
            "CREATE TABLE IF NOT EXISTS rings (
                ring TEXT PRIMARY KEY NOT NULL,
                fetched_at INTEGER NOT NULL,
                members TEXT NOT NULL,
                format INTEGER NOT NULL
            )",
            [],
        )?;
        Ok(RingStore {
            connection: Mutex::new(connection),
        })
    }

    /// Every decodable ring, oldest fetch first. Rows that cannot be decoded
    /// are logged and skipped.
    pub fn load_all(&self) -> Result<Vec<RingSnapshot>, StorageError> {
        let connection = self.connection.lock();
        let mut statement = connection
            .prepare("SELECT ring, fetched_at, members, format FROM rings ORDER BY fetched_at ASC")?;
        let rows = statement.query_map([], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, i64>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, i64>(3)?,
            ))
        })?;

        let mut snapshots = Vec::new();
        for row in rows {
            let (ring, fetched_at, members, format) = row?;
            match decode(&ring, fetched_at, &members, format) {
                Ok(snapshot) => snapshots.push(snapshot),
                Err(reason) => warn!("skipping cached webring '{ring}' - {reason}"),
            }
        }
        Ok(snapshots)
    }

    pub fn load(&self, ring: &RingIdentifier) -> Result<Option<RingSnapshot>, StorageError> {
        let connection = self.connection.lock();
        let row = connection
            .query_row(
                "SELECT fetched_at, members, format FROM rings WHERE ring = ?1",
                params![ring.as_str()],
                |row| {
                    Ok((
                        row.get::<_, i64>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, i64>(2)?,
                    ))
                },
            )
            .optional()?;

        Ok(row.and_then(|(fetched_at, members, format)| {
            match decode(ring.as_str(), fetched_at, &members, format) {
                Ok(snapshot) => Some(snapshot),
                Err(reason) => {
                    warn!("ignoring cached webring '{ring}' - {reason}");
                    None
                }
            }
        }))
    }

    /// Insert or replace a ring, removing `evict` in the same transaction
    pub fn save(
        &self,
        snapshot: &RingSnapshot,
        evict: Option<&RingIdentifier>,
    ) -> Result<(), StorageError> {
        let members: Vec<&str> = snapshot.members().iter().map(|m| m.url.as_str()).collect();
        let members = serde_json::to_string(&members)?;

        let mut connection = self.connection.lock();
        let transaction = connection.transaction()?;
        if let Some(evict) = evict {
            transaction.execute("DELETE FROM rings WHERE ring = ?1", params![evict.as_str()])?;
        }
        transaction.execute(
            "INSERT INTO rings (ring, fetched_at, members, format) VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(ring) DO UPDATE SET
                fetched_at = excluded.fetched_at,
                members = excluded.members,
                format = excluded.format",
            params![
                snapshot.ring().as_str(),
                snapshot.fetched_at().timestamp_millis(),
                members,
                RECORD_FORMAT
            ],
        )?;
        transaction.commit()?;
        Ok(())
    }

    /// Returns true if the ring was stored
    pub fn remove(&self, ring: &RingIdentifier) -> Result<bool, StorageError> {
        let removed = self
            .connection
            .lock()
            .execute("DELETE FROM rings WHERE ring = ?1", params![ring.as_str()])?;
        Ok(removed > 0)
    }

    pub fn len(&self) -> Result<usize, StorageError> {
        let count: i64 = self
            .connection
            .lock()
            .query_row("SELECT COUNT(*) FROM rings", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    pub fn is_empty(&self) -> Result<bool, StorageError> {
        Ok(self.len()? == 0)
    }
}

fn decode(ring: &str, fetched_at: i64, members: &str, format: i64) -> Result<RingSnapshot, String> {
    if format != RECORD_FORMAT {
        return Err(format!("unsupported record format {format}"));
    }
    let fetched_at = DateTime::<Utc>::from_timestamp_millis(fetched_at)
        .ok_or_else(|| format!("invalid fetch time {fetched_at}"))?;
    let members: Vec<String> =
        serde_json::from_str(members).map_err(|e| format!("invalid member list - {e}"))?;
    let urls = members
        .iter()
        .map(|member| Url::parse(member).map_err(|e| format!("invalid member URL '{member}' - {e}")))
        .collect::<Result<Vec<Url>, String>>()?;

    Ok(RingSnapshot::new(RingIdentifier::new(ring), urls, fetched_at))
}
