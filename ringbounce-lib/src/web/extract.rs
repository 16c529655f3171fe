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

//! Finds the members declared in a ring document.
//!
//! A member is any `<a>` whose `rel` attribute holds the `webring-member`
//! token, e.g. `<a rel="external webring-member" href="/~alice/">`. The
//! document is parsed the way a browser would parse it, so hand written pages
//! with unclosed or misnested tags still yield their members.

use scraper::{ElementRef, Html};
use url::Url;

use crate::types::MemberLink;
use crate::web::is_web_scheme;

pub const MEMBER_REL: &str = "webring-member";

/// Members of the ring document in document order, with positions
pub fn extract(raw: &[u8], base_url: &Url) -> Vec<MemberLink> {
    extract_member_urls(raw, base_url)
        .into_iter()
        .enumerate()
        .map(|(position, url)| MemberLink { url, position })
        .collect()
}

/// Absolute member URLs in document order.
///
/// Anchors without an href, or whose href does not resolve to an http(s)
/// URL, are skipped. No members is not an error here.
pub fn extract_member_urls(raw: &[u8], base_url: &Url) -> Vec<Url> {
    let document = Html::parse_document(&String::from_utf8_lossy(raw));
    let elements = || document.tree.root().descendants().filter_map(ElementRef::wrap);

    let base_url = elements()
        .find(|element| element.value().name() == "base" && element.value().attr("href").is_some())
        .and_then(|base| base.value().attr("href"))
        .and_then(|href| base_url.join(href).ok())
        .unwrap_or_else(|| base_url.clone());

    elements()
        .filter(|element| element.value().name() == "a" && is_member(element))
        .filter_map(|anchor| anchor.value().attr("href"))
        .filter_map(|href| base_url.join(href).ok())
        .filter(|url| is_web_scheme(url.scheme()))
        .collect()
}

fn is_member(anchor: &ElementRef) -> bool {
    anchor.value().attr("rel").is_some_and(|rel| {
        rel.split_ascii_whitespace()
            .any(|token| token.eq_ignore_ascii_case(MEMBER_REL))
    })
}
