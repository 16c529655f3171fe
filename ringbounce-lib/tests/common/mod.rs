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

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use chrono::{TimeZone, Utc};
use parking_lot::Mutex;
use url::Url;

use ringbounce::web::{FetchedDocument, RingFetch};
use ringbounce::{FetchError, RingIdentifier, RingSnapshot};

/// Serves ring documents from memory and counts how often it is asked
#[derive(Clone, Default)]
pub struct FakeFetcher {
    inner: Arc<FakeFetcherInner>,
}

#[derive(Default)]
struct FakeFetcherInner {
    pages: Mutex<HashMap<String, Result<String, FetchError>>>,
    fetches: AtomicUsize,
    delay: Mutex<Duration>,
}

impl FakeFetcher {
    pub fn new() -> FakeFetcher {
        FakeFetcher::default()
    }

    pub fn with_page(self, ring: &str, html: &str) -> FakeFetcher {
        self.set_page(ring, html);
        self
    }

    pub fn set_page(&self, ring: &str, html: &str) {
        self.inner
            .pages
            .lock()
            .insert(ring.to_string(), Ok(html.to_string()));
    }

    pub fn set_failure(&self, ring: &str, error: FetchError) {
        self.inner.pages.lock().insert(ring.to_string(), Err(error));
    }

    /// Hold every fetch for `delay` before answering
    pub fn set_delay(&self, delay: Duration) {
        *self.inner.delay.lock() = delay;
    }

    pub fn fetches(&self) -> usize {
        self.inner.fetches.load(Ordering::SeqCst)
    }
}

impl RingFetch for FakeFetcher {
    async fn fetch(&self, ring: &RingIdentifier) -> Result<FetchedDocument, FetchError> {
        self.inner.fetches.fetch_add(1, Ordering::SeqCst);
        let delay = *self.inner.delay.lock();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        let page = self.inner.pages.lock().get(ring.as_str()).cloned();
        match page {
            Some(Ok(html)) => Ok(FetchedDocument {
                url: Url::parse(ring.as_str()).expect("test rings are absolute URLs"),
                body: Bytes::from(html),
            }),
            Some(Err(e)) => Err(e),
            None => Err(FetchError::BadStatus(404)),
        }
    }
}

/// A ring document listing `members` with `rel="webring-member"`
pub fn ring_html(members: &[&str]) -> String {
    let mut html = String::from("<!DOCTYPE html><html><body><h1>A webring</h1><ul>\n");
    for member in members {
        html.push_str(&format!(
            "<li><a rel=\"webring-member\" href=\"{member}\">{member}</a></li>\n"
        ));
    }
    html.push_str("</ul><a href=\"/about\">not a member</a></body></html>");
    html
}

/// A snapshot fetched at `secs` seconds after the Unix epoch
pub fn snapshot_at(ring: &str, secs: i64, members: &[&str]) -> RingSnapshot {
    let urls = members
        .iter()
        .map(|member| Url::parse(member).expect("test members are absolute URLs"))
        .collect();
    let fetched_at = Utc
        .timestamp_opt(secs, 0)
        .single()
        .expect("valid test timestamp");
    RingSnapshot::new(RingIdentifier::new(ring), urls, fetched_at)
}

pub fn member_strings(snapshot: &RingSnapshot) -> Vec<String> {
    snapshot
        .members()
        .iter()
        .map(|member| member.url.to_string())
        .collect()
}
