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

use chrono::{DateTime, Utc};
use serde::Serialize;
use url::Url;

/// The URL of the HTML document that declares a webring's membership.
///
/// Used verbatim as the cache key. The only normalisation is trimming
/// surrounding whitespace, so `https://a.example/ring` and
/// `https://a.example/ring/` are different rings.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct RingIdentifier(String);

impl RingIdentifier {
    pub fn new(ring: &str) -> RingIdentifier {
        RingIdentifier(ring.trim().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for RingIdentifier {
    fn fmt(&self, formatter: &mut Formatter) -> fmt::Result {
        formatter.write_str(&self.0)
    }
}

impl From<&str> for RingIdentifier {
    fn from(ring: &str) -> Self {
        RingIdentifier::new(ring)
    }
}

/// One member of a ring: an absolute URL and its zero-based position in
/// document order. Duplicate URLs keep their own positions.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct MemberLink {
    pub url: Url,
    pub position: usize,
}

/// A ring as resolved at `fetched_at`.
///
/// Member order is document order and never changes once created. A refresh
/// produces a new snapshot.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct RingSnapshot {
    ring: RingIdentifier,
    members: Vec<MemberLink>,
    fetched_at: DateTime<Utc>,
}

impl RingSnapshot {
    /// Build a snapshot from member URLs in document order
    pub fn new(ring: RingIdentifier, urls: Vec<Url>, fetched_at: DateTime<Utc>) -> RingSnapshot {
        let members = urls
            .into_iter()
            .enumerate()
            .map(|(position, url)| MemberLink { url, position })
            .collect();

        RingSnapshot {
            ring,
            members,
            fetched_at,
        }
    }

    pub fn ring(&self) -> &RingIdentifier {
        &self.ring
    }

    pub fn members(&self) -> &[MemberLink] {
        &self.members
    }

    pub fn fetched_at(&self) -> DateTime<Utc> {
        self.fetched_at
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

impl Display for RingSnapshot {
    fn fmt(&self, formatter: &mut Formatter) -> fmt::Result {
        write!(
            formatter,
            "RingSnapshot\n        ring: {}\n     members: {}\n  fetched_at: {}",
            self.ring,
            self.members.len(),
            self.fetched_at.format("%Y-%m-%d %H:%M:%S"),
        )
    }
}
