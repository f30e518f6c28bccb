// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use super::helpers::{client_and_limiter, fast_config};
use listing_crawler::domain::models::crawl_config::CrawlConfig;
use listing_crawler::engines::contact_lookup::HttpContactLookup;
use listing_crawler::engines::http_fetcher::HttpFetcher;
use listing_crawler::engines::limiter::RequestLimiter;
use listing_crawler::engines::traits::{ContactLookup, FetchProfile, PageFetcher};
use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn lookup_for(server: &MockServer) -> (HttpContactLookup, CrawlConfig) {
    let config = CrawlConfig {
        lookup_endpoints: vec![
            format!("{}/users/phones/{{id}}", server.uri()),
            format!("{}/bu/final_page/users/phones/{{id}}", server.uri()),
        ],
        ..fast_config(&server.uri())
    };
    let (client, limiter) = client_and_limiter(&config);
    (HttpContactLookup::new(client, limiter, &config), config)
}

#[tokio::test]
async fn test_secondary_endpoint_used_when_primary_fails() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/users/phones/35123456"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/bu/final_page/users/phones/35123456"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "userInfo": { "phone": "+38 067 123 4567" } })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let (lookup, _) = lookup_for(&server);
    assert_eq!(
        lookup.lookup_contact("35123456").await.as_deref(),
        Some("380671234567")
    );
}

#[tokio::test]
async fn test_primary_list_shape_short_circuits() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/users/phones/777777"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([{ "phone": "(050) 111-22-33" }])),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/bu/final_page/users/phones/777777"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let (lookup, _) = lookup_for(&server);
    assert_eq!(
        lookup.lookup_contact("777777").await.as_deref(),
        Some("0501112233")
    );
}

#[tokio::test]
async fn test_non_json_and_missing_responses_yield_none() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/users/phones/888888"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>captcha</html>"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/bu/final_page/users/phones/888888"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let (lookup, config) = lookup_for(&server);
    assert_eq!(lookup.lookup_contact("888888").await, None);

    // Unreachable endpoints are swallowed too
    let (client, limiter) = client_and_limiter(&config);
    let offline = HttpContactLookup::new(
        client,
        limiter.clone(),
        &CrawlConfig {
            lookup_endpoints: vec![super::helpers::closed_port_url("/phones/{id}")],
            ..config
        },
    );
    assert_eq!(offline.lookup_contact("888888").await, None);
    assert_eq!(limiter.available(), limiter.capacity());
}

#[tokio::test]
async fn test_lookup_and_fetcher_share_one_limiter() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/users/phones/1234567"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{ "phone": "0671234567" }])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/uk/auto_bmw_x5_1234567.html"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html></html>"))
        .mount(&server)
        .await;

    let config = CrawlConfig {
        lookup_endpoints: vec![format!("{}/users/phones/{{id}}", server.uri())],
        ..fast_config(&server.uri())
    };
    let (client, _) = client_and_limiter(&config);
    let limiter = RequestLimiter::new(1);
    let lookup = HttpContactLookup::new(client.clone(), limiter.clone(), &config);
    let fetcher = HttpFetcher::new(client, limiter.clone(), &config);
    let page = format!("{}/uk/auto_bmw_x5_1234567.html", server.uri());

    let held = limiter.acquire("127.0.0.1").await.unwrap();
    let wait = Duration::from_millis(300);
    assert!(tokio::time::timeout(wait, lookup.lookup_contact("1234567")).await.is_err());
    assert!(tokio::time::timeout(wait, fetcher.fetch(&page, FetchProfile::Detail)).await.is_err());

    drop(held);
    assert_eq!(
        lookup.lookup_contact("1234567").await.as_deref(),
        Some("0671234567")
    );
    assert!(fetcher.fetch(&page, FetchProfile::Detail).await.is_ok());
    assert_eq!(limiter.available(), 1);
}
