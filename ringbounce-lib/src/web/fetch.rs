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

use std::future::Future;
use std::time::Duration;

use bytes::{Bytes, BytesMut};
use log::debug;
use url::Url;

use crate::error::FetchError;
use crate::types::RingIdentifier;
use crate::web::is_web_scheme;

/// The body of a ring document and the URL it was finally served from
/// (after any redirects), which is the base for resolving member links.
#[derive(Clone, Debug)]
pub struct FetchedDocument {
    pub url: Url,
    pub body: Bytes,
}

/// Retrieves ring documents. One attempt per call; retrying is up to the caller.
pub trait RingFetch: Send + Sync {
    fn fetch(
        &self,
        ring: &RingIdentifier,
    ) -> impl Future<Output = Result<FetchedDocument, FetchError>> + Send;
}

/// Fetches ring documents with a single bounded GET
#[derive(Clone)]
pub struct HttpRingFetcher {
    client: reqwest::Client,
    max_response_bytes: usize,
}

impl HttpRingFetcher {
    /// `timeout` bounds the whole request, from connecting until the body
    /// has been read.
    pub fn new(timeout: Duration, max_response_bytes: usize) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(format!("ringbounce/{}", crate::VERSION))
            .build()?;

        Ok(HttpRingFetcher {
            client,
            max_response_bytes,
        })
    }

    pub fn max_response_bytes(&self) -> usize {
        self.max_response_bytes
    }
}

impl RingFetch for HttpRingFetcher {
    async fn fetch(&self, ring: &RingIdentifier) -> Result<FetchedDocument, FetchError> {
        let url = ring_url(ring)?;
        debug!("fetching webring document {url}");

        let mut response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(unreachable)?;

        let status = response.status();
        if !status.is_success() {
            debug!("webring document {ring} returned {status}");
            return Err(FetchError::BadStatus(status.as_u16()));
        }

        let limit = self.max_response_bytes;
        if let Some(length) = response.content_length() {
            if length > limit as u64 {
                return Err(FetchError::TooLarge { limit });
            }
        }

        // Content-Length may be absent or wrong, so count what actually arrives
        let final_url = response.url().clone();
        let mut body = BytesMut::new();
        while let Some(chunk) = response.chunk().await.map_err(unreachable)? {
            if body.len() + chunk.len() > limit {
                return Err(FetchError::TooLarge { limit });
            }
            body.extend_from_slice(&chunk);
        }

        debug!("fetched {} bytes from {final_url}", body.len());
        Ok(FetchedDocument {
            url: final_url,
            body: body.freeze(),
        })
    }
}

/// Parse a ring identifier as an absolute http(s) URL
pub fn ring_url(ring: &RingIdentifier) -> Result<Url, FetchError> {
    let url = Url::parse(ring.as_str())
        .map_err(|e| FetchError::unreachable(format!("'{ring}' is not a valid URL - {e}")))?;

    if !is_web_scheme(url.scheme()) {
        return Err(FetchError::unreachable(format!(
            "'{ring}' is not an http or https URL"
        )));
    }
    Ok(url)
}

fn unreachable(e: reqwest::Error) -> FetchError {
    FetchError::Unreachable {
        reason: e.to_string(),
        timed_out: e.is_timeout(),
    }
}

#[test]
fn check_ring_urls() {
    assert!(ring_url(&RingIdentifier::new("https://a.example/ring.html")).is_ok());
    assert!(ring_url(&RingIdentifier::new("  http://a.example ")).is_ok());
    assert!(ring_url(&RingIdentifier::new("/ring.html")).is_err());
    assert!(ring_url(&RingIdentifier::new("ftp://a.example/ring.html")).is_err());
    assert!(ring_url(&RingIdentifier::new("file:///etc/passwd")).is_err());
}
