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

use actix_web::{web, web::Data, HttpRequest, HttpResponse};
use log::debug;
use serde::Deserialize;

use ringbounce::web::RingFetch;
use ringbounce::BounceResolver;

use crate::services::helpers::{bad_request, bounce_error_response, response_redirect};

#[derive(Debug, Deserialize)]
pub struct BounceQuery {
    ring: Option<String>,
    from: Option<String>,
}

impl BounceQuery {
    fn ring(&self) -> Result<&str, HttpResponse> {
        required(self.ring.as_deref(), "ring")
    }

    fn from(&self) -> Result<&str, HttpResponse> {
        required(self.from.as_deref(), "from")
    }
}

// A blank parameter is treated as missing
fn required<'a>(value: Option<&'a str>, name: &str) -> Result<&'a str, HttpResponse> {
    match value {
        Some(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(bad_request(&format!("No \"{name}\" parameter was given."))),
    }
}

/// Redirect to a random member of a webring
///
/// Test url: [http://127.0.0.1:3000/random?ring=https://example.com/webring.html](http://127.0.0.1:3000/random?ring=https://example.com/webring.html)
pub async fn bounce_random<F: RingFetch + 'static>(
    request: HttpRequest,
    query: web::Query<BounceQuery>,
    resolver: Data<BounceResolver<F>>,
) -> HttpResponse {
    debug!("bounce_random({})...", request.query_string());
    let ring = match query.ring() {
        Ok(ring) => ring,
        Err(response) => return response,
    };

    match resolver.random(ring).await {
        Ok(target) => response_redirect(&target),
        Err(e) => {
            debug!("random member of {ring} failed - {e}");
            bounce_error_response(&e)
        }
    }
}

/// Redirect to the member after the 'from' page, wrapping from last to first
///
/// Test url: [http://127.0.0.1:3000/next?ring=https://example.com/webring.html&from=https://example.org/](http://127.0.0.1:3000/next?ring=https://example.com/webring.html&from=https://example.org/)
pub async fn bounce_next<F: RingFetch + 'static>(
    request: HttpRequest,
    query: web::Query<BounceQuery>,
    resolver: Data<BounceResolver<F>>,
) -> HttpResponse {
    debug!("bounce_next({})...", request.query_string());
    let (ring, from) = match query.ring().and_then(|ring| Ok((ring, query.from()?))) {
        Ok(params) => params,
        Err(response) => return response,
    };

    match resolver.next(ring, from).await {
        Ok(target) => response_redirect(&target),
        Err(e) => {
            debug!("next member of {ring} after {from} failed - {e}");
            bounce_error_response(&e)
        }
    }
}

/// Redirect to the member before the 'from' page, wrapping from first to last
///
/// Test url: [http://127.0.0.1:3000/prev?ring=https://example.com/webring.html&from=https://example.org/](http://127.0.0.1:3000/prev?ring=https://example.com/webring.html&from=https://example.org/)
pub async fn bounce_prev<F: RingFetch + 'static>(
    request: HttpRequest,
    query: web::Query<BounceQuery>,
    resolver: Data<BounceResolver<F>>,
) -> HttpResponse {
    debug!("bounce_prev({})...", request.query_string());
    let (ring, from) = match query.ring().and_then(|ring| Ok((ring, query.from()?))) {
        Ok(params) => params,
        Err(response) => return response,
    };

    match resolver.prev(ring, from).await {
        Ok(target) => response_redirect(&target),
        Err(e) => {
            debug!("previous member of {ring} before {from} failed - {e}");
            bounce_error_response(&e)
        }
    }
}
