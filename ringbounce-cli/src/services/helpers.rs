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

use actix_web::{
    http::{header, StatusCode},
    HttpResponse, HttpResponseBuilder,
};
use url::Url;

use ringbounce::{BounceError, FetchError};

/// Redirect to `target` with a fallback link for clients that do not follow it
pub(crate) fn response_redirect(target: &Url) -> HttpResponse {
    let href = escape_html(target.as_str());
    HttpResponse::Found()
        .insert_header((header::LOCATION, target.as_str()))
        .insert_header(header::ContentType(mime::TEXT_HTML_UTF_8))
        .body(format!(
            "<h1>302 Found</h1><p>If you aren't redirected in the next few seconds, <a href=\"{href}\">click here</a>.</p>"
        ))
}

pub(crate) fn status_for(error: &BounceError) -> StatusCode {
    match error {
        BounceError::NotWhitelisted(_) => StatusCode::FORBIDDEN,
        BounceError::EmptyRing | BounceError::LocationNotFound(_) => StatusCode::NOT_FOUND,
        BounceError::Fetch(FetchError::Unreachable {
            timed_out: true, ..
        }) => StatusCode::GATEWAY_TIMEOUT,
        BounceError::Fetch(_) => StatusCode::BAD_GATEWAY,
        BounceError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

pub(crate) fn bounce_error_response(error: &BounceError) -> HttpResponse {
    let status_code = status_for(error);
    make_error_response_page(&mut HttpResponse::build(status_code), status_code, &error.to_string())
}

pub(crate) fn bad_request(message: &str) -> HttpResponse {
    make_error_response_page(
        &mut HttpResponse::BadRequest(),
        StatusCode::BAD_REQUEST,
        message,
    )
}

pub(crate) async fn not_found() -> HttpResponse {
    make_error_response_page(&mut HttpResponse::NotFound(), StatusCode::NOT_FOUND, "")
}

pub(crate) fn make_error_response_page(
    response_builder: &mut HttpResponseBuilder,
    status_code: StatusCode,
    message: &str,
) -> HttpResponse {
    let body = if message.is_empty() {
        format!("<h1>{status_code}</h1>")
    } else {
        format!("<h1>{status_code}</h1><p>{}</p>", escape_html(message))
    };

    response_builder
        .insert_header(header::ContentType(mime::TEXT_HTML_UTF_8))
        .body(body)
}

pub(crate) fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#x27;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

#[test]
fn escapes_markup() {
    assert_eq!(
        escape_html(r#"<a href="x?a=1&b='2'">"#),
        "&lt;a href=&quot;x?a=1&amp;b=&#x27;2&#x27;&quot;&gt;"
    );
}

#[test]
fn maps_errors_to_status() {
    let timeout = BounceError::Fetch(FetchError::Unreachable {
        reason: "timed out".to_string(),
        timed_out: true,
    });
    assert_eq!(status_for(&timeout), StatusCode::GATEWAY_TIMEOUT);
    assert_eq!(
        status_for(&BounceError::Fetch(FetchError::BadStatus(500))),
        StatusCode::BAD_GATEWAY
    );
    assert_eq!(
        status_for(&BounceError::NotWhitelisted("r".to_string())),
        StatusCode::FORBIDDEN
    );
    assert_eq!(status_for(&BounceError::EmptyRing), StatusCode::NOT_FOUND);
}
