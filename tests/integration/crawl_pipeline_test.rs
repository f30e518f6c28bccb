// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use super::helpers::{client_and_limiter, closed_port_url, fast_config, setup_db};
use listing_crawler::domain::models::crawl_config::CrawlConfig;
use listing_crawler::domain::models::crawl_summary::StopReason;
use listing_crawler::domain::repositories::listing_repository::ListingRepository;
use listing_crawler::domain::services::crawl_service::CrawlService;
use listing_crawler::engines::contact_lookup::HttpContactLookup;
use listing_crawler::engines::http_fetcher::HttpFetcher;
use listing_crawler::infrastructure::repositories::listing_repo_impl::ListingRepositoryImpl;
use serde_json::json;
use std::sync::Arc;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn detail_page(title: &str, price: &str) -> String {
    format!(
        r#"<html><body>
             <h1 class="head">{}</h1>
             <div class="price_value"><strong>{}</strong></div>
             <div>Пробег</div><span>95 тыс. км</span>
             <div class="seller_info_name">Олена</div>
             <img class="outline m-auto" src="https://cdn0.riastatic.com/photosnew/auto/photo/a__1f.jpg">
           </body></html>"#,
        title, price
    )
}

#[tokio::test]
async fn test_end_to_end_crawl_stores_reachable_listings() {
    let server = MockServer::start().await;
    let unreachable = closed_port_url("/auto_gone_3000003.html");

    let listing_page = format!(
        r#"<a class="address" href="/auto_bmw_3000001.html">BMW</a>
           <a class="address" href="/auto_audi_3000002.html">Audi</a>
           <a class="address" href="{}">Gone</a>"#,
        unreachable
    );
    Mock::given(method("GET"))
        .and(path("/cars"))
        .and(query_param("page", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_string(listing_page.clone()))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/cars"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_string(listing_page))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/auto_bmw_3000001.html"))
        .respond_with(ResponseTemplate::new(200).set_body_string(detail_page("BMW X5", "$ 12 345")))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/auto_audi_3000002.html"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string(detail_page("Audi A6", "Цена не указана")),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/users/phones/3000001"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{ "phone": "067 123 45 67" }])))
        .mount(&server)
        .await;

    let start = format!("{}/cars", server.uri());
    let config = CrawlConfig {
        lookup_endpoints: vec![format!("{}/users/phones/{{id}}", server.uri())],
        ..fast_config(&start)
    };
    let (client, limiter) = client_and_limiter(&config);
    let repository = Arc::new(ListingRepositoryImpl::new(setup_db().await));
    let service = CrawlService::new(
        Arc::new(HttpFetcher::new(client.clone(), limiter.clone(), &config)),
        Arc::new(HttpContactLookup::new(client, limiter.clone(), &config)),
        repository.clone(),
        &config,
    );

    let summary = service.run().await.unwrap();

    assert_eq!(summary.links_found, 3);
    assert_eq!(summary.processed, 3);
    assert_eq!(summary.stored, 2);
    assert_eq!(summary.fetch_failed, 1);
    assert_eq!(summary.stop_reason, Some(StopReason::NoNewLinks));
    assert_eq!(limiter.available(), limiter.capacity());

    assert_eq!(repository.count().await.unwrap(), 2);
    let bmw = repository
        .find_by_url(&format!("{}/auto_bmw_3000001.html", server.uri()))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(bmw.title.as_deref(), Some("BMW X5"));
    assert_eq!(bmw.price_usd, Some(12345));
    assert_eq!(bmw.odometer_km, Some(95000));
    assert_eq!(bmw.seller_name.as_deref(), Some("Олена"));
    assert_eq!(bmw.image_count, 1);
    assert_eq!(bmw.contact_number.as_deref(), Some("0671234567"));

    let audi = repository
        .find_by_url(&format!("{}/auto_audi_3000002.html", server.uri()))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(audi.price_usd, None);
    assert_eq!(audi.contact_number, None);
}

#[tokio::test]
async fn test_recrawl_does_not_duplicate_rows() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/cars"))
        .and(query_param("page", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"<a class="address" href="/auto_bmw_3000001.html">BMW</a>"#,
        ))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/cars"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<div>kінець</div>"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/auto_bmw_3000001.html"))
        .respond_with(ResponseTemplate::new(200).set_body_string(detail_page("BMW X5", "$ 9 000")))
        .mount(&server)
        .await;

    let start = format!("{}/cars", server.uri());
    let config = CrawlConfig {
        lookup_enabled: false,
        ..fast_config(&start)
    };
    let (client, limiter) = client_and_limiter(&config);
    let repository = Arc::new(ListingRepositoryImpl::new(setup_db().await));
    let service = CrawlService::new(
        Arc::new(HttpFetcher::new(client.clone(), limiter.clone(), &config)),
        Arc::new(HttpContactLookup::new(client, limiter, &config)),
        repository.clone(),
        &config,
    );

    let first = service.run().await.unwrap();
    let second = service.run().await.unwrap();

    assert_eq!(first.stored, 1);
    assert_eq!(first.already_present, 0);
    assert_eq!(second.stored, 1);
    assert_eq!(second.already_present, 1);
    assert_eq!(first.stop_reason, Some(StopReason::EmptyPage));
    assert_eq!(repository.count().await.unwrap(), 1);
}
