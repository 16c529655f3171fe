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

mod common;

use std::time::Duration;

use ringbounce::cache::RingStore;
use ringbounce::{BounceConfig, BounceError, BounceResolver, FetchError};

use common::{ring_html, FakeFetcher};

const RING: &str = "https://ring.example/members.html";
const A: &str = "https://alice.example/";
const B: &str = "https://bob.example/";
const C: &str = "https://carol.example/";
const D: &str = "https://dave.example/";

fn config(whitelist: &[&str]) -> BounceConfig {
    BounceConfig {
        whitelist: whitelist.iter().map(|entry| entry.to_string()).collect(),
        cache_ttl: Duration::from_secs(3600),
        ..BounceConfig::default()
    }
}

fn resolver(fetcher: &FakeFetcher, whitelist: &[&str]) -> BounceResolver<FakeFetcher> {
    BounceResolver::with_fetcher(&config(whitelist), fetcher.clone(), RingStore::in_memory().unwrap())
        .unwrap()
}

#[tokio::test]
async fn three_member_ring_scenario() {
    let fetcher = FakeFetcher::new().with_page(RING, &ring_html(&[A, B, C]));
    let resolver = resolver(&fetcher, &[RING]);

    let random = resolver.random(RING).await.unwrap();
    assert!([A, B, C].contains(&random.as_str()));

    assert_eq!(resolver.next(RING, A).await.unwrap().as_str(), B);
    assert_eq!(resolver.prev(RING, A).await.unwrap().as_str(), C);
    assert_eq!(resolver.next(RING, C).await.unwrap().as_str(), A);
    assert!(matches!(
        resolver.next(RING, D).await,
        Err(BounceError::LocationNotFound(from)) if from == D
    ));

    assert_eq!(fetcher.fetches(), 1);
}

#[tokio::test]
async fn relative_members_resolve_against_the_ring() {
    let fetcher = FakeFetcher::new().with_page(RING, &ring_html(&["/~alice/", "bob.html", "//carol.example"]));
    let resolver = resolver(&fetcher, &[RING]);

    assert_eq!(
        resolver.next(RING, "https://ring.example/~alice").await.unwrap().as_str(),
        "https://ring.example/bob.html"
    );
    assert_eq!(
        resolver.prev(RING, "https://ring.example/~alice/").await.unwrap().as_str(),
        "https://carol.example/"
    );
}

#[tokio::test]
async fn empty_ring_fails_every_operation() {
    let fetcher = FakeFetcher::new().with_page(RING, &ring_html(&[]));
    let resolver = resolver(&fetcher, &[RING]);

    assert!(matches!(resolver.random(RING).await, Err(BounceError::EmptyRing)));
    assert!(matches!(resolver.next(RING, A).await, Err(BounceError::EmptyRing)));
    assert!(matches!(resolver.prev(RING, A).await, Err(BounceError::EmptyRing)));
}

#[tokio::test]
async fn rings_off_the_whitelist_are_never_fetched_or_cached() {
    let evil = "https://evil.example/ring.html";
    let fetcher = FakeFetcher::new()
        .with_page(RING, &ring_html(&[A, B]))
        .with_page(evil, &ring_html(&[A, B]));
    let resolver = resolver(&fetcher, &[RING, "https://ring.example/sub/*"]);

    for ring in [evil, "https://ring.example/members.html/", "https://ring.example/other.html"] {
        assert!(matches!(
            resolver.random(ring).await,
            Err(BounceError::NotWhitelisted(rejected)) if rejected == ring
        ));
        assert!(matches!(
            resolver.next(ring, A).await,
            Err(BounceError::NotWhitelisted(_))
        ));
    }

    assert_eq!(fetcher.fetches(), 0);
    assert!(resolver.cache().is_empty());
}

#[tokio::test]
async fn prefix_whitelist_entries_allow_sub_resources() {
    let ring = "https://ring.example/sub/cats.html";
    let fetcher = FakeFetcher::new().with_page(ring, &ring_html(&[A, B]));
    let resolver = resolver(&fetcher, &["https://ring.example/sub/*"]);

    assert_eq!(resolver.next(ring, B).await.unwrap().as_str(), A);
}

#[tokio::test]
async fn ring_identifier_whitespace_is_trimmed() {
    let fetcher = FakeFetcher::new().with_page(RING, &ring_html(&[A, B]));
    let resolver = resolver(&fetcher, &[RING]);

    assert_eq!(resolver.next(&format!("  {RING}\n"), A).await.unwrap().as_str(), B);
}

#[tokio::test]
async fn fetch_errors_reach_the_caller_unchanged() {
    let fetcher = FakeFetcher::new();
    fetcher.set_failure(RING, FetchError::TooLarge { limit: 10 });
    let resolver = resolver(&fetcher, &[RING]);

    assert!(matches!(
        resolver.random(RING).await,
        Err(BounceError::Fetch(FetchError::TooLarge { limit: 10 }))
    ));
}

#[tokio::test]
async fn invalidate_forces_a_refetch() {
    let fetcher = FakeFetcher::new().with_page(RING, &ring_html(&[A, B]));
    let resolver = resolver(&fetcher, &[RING]);

    resolver.random(RING).await.unwrap();
    fetcher.set_page(RING, &ring_html(&[A, B, C]));
    assert_eq!(resolver.prev(RING, A).await.unwrap().as_str(), B);

    assert!(resolver.invalidate(RING).unwrap());
    assert!(!resolver.invalidate(RING).unwrap());
    assert_eq!(resolver.prev(RING, A).await.unwrap().as_str(), C);
    assert_eq!(fetcher.fetches(), 2);
}
