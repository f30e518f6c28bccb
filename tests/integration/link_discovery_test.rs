// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use super::helpers::{client_and_limiter, fast_config};
use listing_crawler::domain::models::crawl_config::CrawlConfig;
use listing_crawler::domain::models::crawl_summary::StopReason;
use listing_crawler::domain::services::link_discovery_service::LinkDiscoverer;
use listing_crawler::engines::http_fetcher::HttpFetcher;
use std::sync::Arc;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn discoverer(config: &CrawlConfig) -> LinkDiscoverer<HttpFetcher> {
    let (client, limiter) = client_and_limiter(config);
    LinkDiscoverer::new(Arc::new(HttpFetcher::new(client, limiter, config)), config)
}

#[tokio::test]
async fn test_discovery_terminates_on_repeating_pages() {
    let server = MockServer::start().await;
    // Every page serves the same listing
    Mock::given(method("GET"))
        .and(path("/cars"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"<section class="ticket-item"><a class="address" href="/auto_a_3000001.html">a</a></section>"#,
        ))
        .expect(2)
        .mount(&server)
        .await;

    let start = format!("{}/cars", server.uri());
    let report = discoverer(&fast_config(&start))
        .discover_links(&start)
        .await
        .unwrap();

    assert_eq!(report.links.len(), 1);
    assert_eq!(report.pages_walked, 2);
    assert_eq!(report.stop_reason, StopReason::NoNewLinks);
}

#[tokio::test]
async fn test_discovery_respects_page_cap_with_growing_pages() {
    let server = MockServer::start().await;
    for page in 1..=4 {
        Mock::given(method("GET"))
            .and(path("/cars"))
            .and(query_param("page", page.to_string()))
            .respond_with(ResponseTemplate::new(200).set_body_string(format!(
                r#"<a class="address" href="/auto_car_300000{}.html">car</a>"#,
                page
            )))
            .mount(&server)
            .await;
    }

    let start = format!("{}/cars", server.uri());
    let config = CrawlConfig {
        max_pages: 3,
        ..fast_config(&start)
    };
    let report = discoverer(&config).discover_links(&start).await.unwrap();

    assert_eq!(report.links.len(), 3);
    assert_eq!(report.stop_reason, StopReason::PageCap);
    assert!(report
        .links
        .contains(&format!("{}/auto_car_3000003.html", server.uri())));
}

#[tokio::test]
async fn test_discovery_returns_partial_results_when_page_fails() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/cars"))
        .and(query_param("page", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"<a class="address" href="/auto_a_3000001.html">a</a>
               <a class="address" href="/auto_b_3000002.html">b</a>"#,
        ))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/cars"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(403))
        .expect(1)
        .mount(&server)
        .await;

    let start = format!("{}/cars", server.uri());
    let report = discoverer(&fast_config(&start))
        .discover_links(&start)
        .await
        .unwrap();

    assert_eq!(report.links.len(), 2);
    assert_eq!(report.stop_reason, StopReason::FetchFailed);
}
