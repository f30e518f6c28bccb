// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use super::helpers::setup_db;
use listing_crawler::domain::models::listing::Listing;
use listing_crawler::domain::repositories::listing_repository::{ListingRepository, UpsertOutcome};
use listing_crawler::infrastructure::repositories::listing_repo_impl::ListingRepositoryImpl;
use listing_crawler::utils::errors::RepositoryError;

fn full_listing(url: &str) -> Listing {
    Listing {
        title: Some("BMW X5 2015".to_string()),
        price_usd: Some(25500),
        odometer_km: Some(95000),
        seller_name: Some("Іван".to_string()),
        contact_number: Some("380671234567".to_string()),
        image_url: Some("https://cdn0.riastatic.com/photosnew/auto/photo/1f.jpg".to_string()),
        image_count: 12,
        plate_number: Some("AA 1234 BB".to_string()),
        vin: Some("WBAKS410X00C12345".to_string()),
        ..Listing::bare(url)
    }
}

#[tokio::test]
async fn test_upsert_is_idempotent_and_first_write_wins() {
    let repo = ListingRepositoryImpl::new(setup_db().await);
    let url = "https://auto.ria.com/uk/auto_bmw_x5_35123456.html";

    let first = full_listing(url);
    assert_eq!(repo.upsert(&first).await.unwrap(), UpsertOutcome::Inserted);

    let changed = Listing {
        price_usd: Some(19999),
        odometer_km: Some(120000),
        ..full_listing(url)
    };
    assert_eq!(
        repo.upsert(&changed).await.unwrap(),
        UpsertOutcome::AlreadyPresent
    );

    assert_eq!(repo.count().await.unwrap(), 1);
    let stored = repo.find_by_url(url).await.unwrap().unwrap();
    assert_eq!(stored.price_usd, Some(25500));
    assert_eq!(stored.odometer_km, Some(95000));
    assert_eq!(stored.contact_number.as_deref(), Some("380671234567"));
    assert_eq!(stored.image_count, 12);
}

#[tokio::test]
async fn test_bare_listing_is_accepted() {
    let repo = ListingRepositoryImpl::new(setup_db().await);
    let url = "https://auto.ria.com/uk/auto_unknown_35000000.html";

    assert_eq!(
        repo.upsert(&Listing::bare(url)).await.unwrap(),
        UpsertOutcome::Inserted
    );

    let stored = repo.find_by_url(url).await.unwrap().unwrap();
    assert_eq!(stored.source_url, url);
    assert_eq!(stored.populated_fields(), 0);
    assert_eq!(stored.image_count, 0);
}

#[tokio::test]
async fn test_distinct_urls_are_separate_rows() {
    let repo = ListingRepositoryImpl::new(setup_db().await);

    for n in 1..=3 {
        let url = format!("https://auto.ria.com/uk/auto_car_3500000{}.html", n);
        repo.upsert(&Listing::bare(url)).await.unwrap();
    }

    assert_eq!(repo.count().await.unwrap(), 3);
    assert!(repo
        .find_by_url("https://auto.ria.com/uk/auto_missing_1.html")
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn test_empty_url_is_rejected() {
    let repo = ListingRepositoryImpl::new(setup_db().await);
    let result = repo.upsert(&Listing::bare("  ")).await;
    assert!(matches!(result, Err(RepositoryError::InvalidData(_))));
    assert_eq!(repo.count().await.unwrap(), 0);
}
