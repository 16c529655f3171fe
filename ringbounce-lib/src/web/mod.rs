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

//! Retrieval of ring documents and extraction of their members

pub mod extract;
pub mod fetch;

pub use extract::{extract, extract_member_urls, MEMBER_REL};
pub use fetch::{FetchedDocument, HttpRingFetcher, RingFetch};

/// Member links and ring documents must use one of these schemes
pub const WEB_SCHEMES: [&str; 2] = ["http", "https"];

pub fn is_web_scheme(scheme: &str) -> bool {
    WEB_SCHEMES.contains(&scheme)
}
