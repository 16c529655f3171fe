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

//! # ringbounce
//!
//! Resolves a webring, an ordered list of member pages declared with
//! `<a rel="webring-member">` inside an ordinary HTML document, and picks
//! the random, next or previous member relative to a visitor's current page.
//!
//! A [`bounce::BounceResolver`] is built once from a [`config::BounceConfig`]
//! and shared by every request. It checks the [`whitelist`], resolves the ring
//! through the [`cache`] (which fetches and extracts via [`web`] on a miss)
//! and hands the snapshot to the [`navigate`] functions.

pub mod bounce;
pub mod cache;
pub mod config;
pub mod error;
pub mod navigate;
pub mod types;
pub mod web;
pub mod whitelist;

pub use bounce::BounceResolver;
pub use config::BounceConfig;
pub use error::{BounceError, FetchError, StartupError, StorageError};
pub use types::{MemberLink, RingIdentifier, RingSnapshot};

/// Crate version, used in the fetcher's User-Agent and the startup banner
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
