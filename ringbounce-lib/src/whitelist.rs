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

//! Decides whether a ring may be resolved at all.
//!
//! Only whitelisted rings are ever fetched or cached, which stops anyone from
//! filling the cache with rings of their own choosing.

use crate::types::RingIdentifier;

const PREFIX_MARKER: char = '*';

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum WhitelistEntry {
    Exact(String),
    Prefix(String),
}

impl WhitelistEntry {
    /// `https://a.example/ring` matches only itself, `https://a.example/rings/*`
    /// matches anything starting with `https://a.example/rings/`
    pub fn parse(entry: &str) -> Option<WhitelistEntry> {
        let entry = entry.trim();
        if entry.is_empty() {
            return None;
        }
        match entry.strip_suffix(PREFIX_MARKER) {
            Some(prefix) if !prefix.is_empty() => Some(WhitelistEntry::Prefix(prefix.to_string())),
            // A lone '*' would allow every ring
            Some(_) => None,
            None => Some(WhitelistEntry::Exact(entry.to_string())),
        }
    }

    pub fn matches(&self, ring: &RingIdentifier) -> bool {
        match self {
            WhitelistEntry::Exact(exact) => ring.as_str() == exact,
            WhitelistEntry::Prefix(prefix) => ring.as_str().starts_with(prefix.as_str()),
        }
    }
}

/// The configured set of allowed rings. Read-only once built.
#[derive(Clone, Debug, Default)]
pub struct Whitelist {
    entries: Vec<WhitelistEntry>,
}

impl Whitelist {
    pub fn new<I, S>(entries: I) -> Whitelist
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let entries = entries
            .into_iter()
            .filter_map(|entry| WhitelistEntry::parse(entry.as_ref()))
            .collect();
        Whitelist { entries }
    }

    /// Build from a whitespace separated list, as held in WEBRING_WHITELIST
    pub fn from_list(list: &str) -> Whitelist {
        Whitelist::new(list.split_whitespace())
    }

    pub fn is_allowed(&self, ring: &RingIdentifier) -> bool {
        self.entries.iter().any(|entry| entry.matches(ring))
    }

    pub fn entries(&self) -> &[WhitelistEntry] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_entries_match_only_themselves() {
        let whitelist = Whitelist::from_list("https://a.example/ring  https://b.example/ring");
        assert!(whitelist.is_allowed(&RingIdentifier::new("https://a.example/ring")));
        assert!(whitelist.is_allowed(&RingIdentifier::new(" https://b.example/ring ")));
        assert!(!whitelist.is_allowed(&RingIdentifier::new("https://a.example/ring/")));
        assert!(!whitelist.is_allowed(&RingIdentifier::new("https://a.example/ring?x=1")));
    }

    #[test]
    fn prefix_entries_cover_sub_resources() {
        let whitelist = Whitelist::from_list("https://a.example/rings/*");
        assert!(whitelist.is_allowed(&RingIdentifier::new("https://a.example/rings/cats.html")));
        assert!(!whitelist.is_allowed(&RingIdentifier::new("https://a.example/other.html")));
    }

    #[test]
    fn empty_and_wildcard_entries_allow_nothing() {
        let whitelist = Whitelist::from_list("  * ");
        assert!(whitelist.is_empty());
        assert!(!whitelist.is_allowed(&RingIdentifier::new("https://a.example/")));
        assert!(!Whitelist::default().is_allowed(&RingIdentifier::new("")));
    }
}
