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

//! Picks a bounce target from a ring snapshot.
//!
//! The visitor's current location rarely matches a member URL byte for byte
//! (a missing trailing slash, an upper case host, an explicit `:443`), so both
//! sides are reduced to a canonical form before comparing. See
//! [`LocationMatch::canonical`] for the exact rule.

use rand::seq::SliceRandom;
use rand::Rng;
use url::{Position, Url};

use crate::error::BounceError;
use crate::types::{MemberLink, RingSnapshot};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    Next,
    Previous,
}

/// How a `from` location is compared with member URLs
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LocationMatch {
    /// Compare without the query string
    pub ignore_query: bool,
}

impl LocationMatch {
    /// Canonical form used for comparison:
    /// - scheme and host lower case, default port dropped, percent-encoding
    ///   and dot segments normalised (standard URL parsing)
    /// - fragment dropped
    /// - trailing '/' characters removed from the path
    /// - query kept unless `ignore_query`
    ///
    /// Text that is not an absolute URL is compared as trimmed text without
    /// trailing '/'.
    pub fn canonical(&self, location: &str) -> String {
        let location = location.trim();
        let url = match Url::parse(location) {
            Ok(url) => url,
            Err(_) => return location.trim_end_matches('/').to_string(),
        };
        self.canonical_url(&url)
    }

    pub fn canonical_url(&self, url: &Url) -> String {
        let mut canonical = url[..Position::BeforePath].to_string();
        canonical.push_str(url.path().trim_end_matches('/'));
        if !self.ignore_query {
            if let Some(query) = url.query() {
                canonical.push('?');
                canonical.push_str(query);
            }
        }
        canonical
    }
}

/// A uniformly random member
pub fn pick_random(snapshot: &RingSnapshot) -> Result<&MemberLink, BounceError> {
    pick_random_with(snapshot, &mut rand::thread_rng())
}

pub fn pick_random_with<'a, R: Rng + ?Sized>(
    snapshot: &'a RingSnapshot,
    rng: &mut R,
) -> Result<&'a MemberLink, BounceError> {
    snapshot.members().choose(rng).ok_or(BounceError::EmptyRing)
}

/// The member after (or before) `from`, wrapping around the ends of the ring.
///
/// `from` is located at the first member with the same canonical form. A
/// location that matches no member is an error rather than a bounce to an
/// arbitrary member.
pub fn pick_adjacent<'a>(
    snapshot: &'a RingSnapshot,
    from: &str,
    direction: Direction,
    location_match: &LocationMatch,
) -> Result<&'a MemberLink, BounceError> {
    let members = snapshot.members();
    let n = members.len();
    if n == 0 {
        return Err(BounceError::EmptyRing);
    }

    let from_canonical = location_match.canonical(from);
    let i = members
        .iter()
        .position(|member| location_match.canonical_url(&member.url) == from_canonical)
        .ok_or_else(|| BounceError::LocationNotFound(from.to_string()))?;

    let target = match direction {
        Direction::Next => (i + 1) % n,
        Direction::Previous => (i + n - 1) % n,
    };
    Ok(&members[target])
}
