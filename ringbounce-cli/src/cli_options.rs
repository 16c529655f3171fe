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

use std::time::Duration;

use clap::{Parser, Subcommand};

use ringbounce::config::{
    CacheSpec, DEFAULT_CACHE_SPEC, DEFAULT_CACHE_TTL_SECS, DEFAULT_FETCH_TIMEOUT_SECS,
    DEFAULT_MAX_RESPONSE_BYTES, DEFAULT_MAX_RINGS,
};
use ringbounce::navigate::LocationMatch;
use ringbounce::BounceConfig;

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 3000;

#[derive(Parser, Debug)]
#[command(name = "ringbounce", version, about)]
#[command(
    long_about = "Redirects visitors to a random, next or previous member of a webring.\n\nA webring is any HTML page listing its members as <a rel=\"webring-member\" href=\"...\"> links. Only rings named in the whitelist are ever fetched."
)]
pub struct Opt {
    /// Whitespace separated webring URLs that may be resolved. An entry
    /// ending in '*' allows any ring URL starting with the rest of the entry.
    #[arg(long, env = "WEBRING_WHITELIST", default_value = "", global = true)]
    pub whitelist: String,

    /// Where resolved webrings are cached, e.g. sqlite:///var/lib/ringbounce/cache.db
    #[arg(long, env = "CACHE_SPEC", default_value = DEFAULT_CACHE_SPEC, global = true)]
    pub cache_spec: CacheSpec,

    /// Host address for the server
    #[arg(long, env = "HOST", default_value = DEFAULT_HOST)]
    pub host: String,

    /// Port for the server
    #[arg(long, env = "PORT", default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// Seconds before a cached webring is fetched again
    #[arg(long, env = "CACHE_TTL_SECS", default_value_t = DEFAULT_CACHE_TTL_SECS, global = true)]
    pub cache_ttl_secs: u64,

    /// Maximum number of webrings held in the cache
    #[arg(long, env = "MAX_RINGS", default_value_t = DEFAULT_MAX_RINGS, global = true)]
    pub max_rings: u32,

    /// Seconds allowed for fetching a ring document
    #[arg(long, env = "FETCH_TIMEOUT_SECS", default_value_t = DEFAULT_FETCH_TIMEOUT_SECS)]
    pub fetch_timeout_secs: u64,

    /// Largest ring document accepted, in bytes
    #[arg(long, env = "MAX_RESPONSE_BYTES", default_value_t = DEFAULT_MAX_RESPONSE_BYTES)]
    pub max_response_bytes: usize,

    /// Ignore the query string when matching the 'from' page against members
    #[arg(long, env = "IGNORE_QUERY")]
    pub ignore_query: bool,

    #[command(subcommand)]
    pub cmd: Option<Subcommands>,
}

#[derive(Subcommand, Debug)]
pub enum Subcommands {
    /// Serve /random, /next and /prev. This is the default.
    Serve,

    /// List the webrings held in the cache
    List {
        /// Print the rings and their members as JSON
        #[arg(long)]
        json: bool,
    },

    /// Remove a webring from the cache so that it is fetched again when next used
    ///
    /// A server that is already running keeps its own copy until it goes stale.
    Invalidate {
        /// The webring URL, exactly as used in the 'ring' parameter
        ring: String,
    },
}

impl Opt {
    pub fn bounce_config(&self) -> BounceConfig {
        BounceConfig {
            whitelist: self
                .whitelist
                .split_whitespace()
                .map(str::to_string)
                .collect(),
            cache_spec: self.cache_spec.clone(),
            cache_ttl: Duration::from_secs(self.cache_ttl_secs),
            max_rings: self.max_rings,
            fetch_timeout: Duration::from_secs(self.fetch_timeout_secs),
            max_response_bytes: self.max_response_bytes,
            location_match: LocationMatch {
                ignore_query: self.ignore_query,
            },
        }
    }
}
