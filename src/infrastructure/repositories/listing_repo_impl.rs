// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::listing::Listing;
use crate::domain::repositories::listing_repository::{ListingRepository, UpsertOutcome};
use crate::infrastructure::database::entities::listing;
use crate::utils::errors::RepositoryError;
use async_trait::async_trait;
use sea_orm::sea_query::OnConflict;
use sea_orm::*;
use std::sync::Arc;
use tracing::debug;

/// 房源仓库实现
///
/// 写入使用 `INSERT ... ON CONFLICT (source_url) DO NOTHING`
#[derive(Clone)]
pub struct ListingRepositoryImpl {
    db: Arc<DatabaseConnection>,
}

impl ListingRepositoryImpl {
    /// 创建新的房源仓库实现
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ListingRepository for ListingRepositoryImpl {
    async fn upsert(&self, listing: &Listing) -> Result<UpsertOutcome, RepositoryError> {
        if listing.source_url.trim().is_empty() {
            return Err(RepositoryError::InvalidData(
                "source_url must not be empty".to_string(),
            ));
        }

        let image_count = i32::try_from(listing.image_count)
            .map_err(|_| RepositoryError::InvalidData("image_count out of range".to_string()))?;

        let model = listing::ActiveModel {
            id: NotSet,
            source_url: Set(listing.source_url.clone()),
            title: Set(listing.title.clone()),
            price_usd: Set(listing.price_usd),
            odometer_km: Set(listing.odometer_km),
            seller_name: Set(listing.seller_name.clone()),
            contact_number: Set(listing.contact_number.clone()),
            image_url: Set(listing.image_url.clone()),
            image_count: Set(image_count),
            plate_number: Set(listing.plate_number.clone()),
            vin: Set(listing.vin.clone()),
            discovered_at: Set(listing.discovered_at.into()),
        };

        let rows = listing::Entity::insert(model)
            .on_conflict(
                OnConflict::column(listing::Column::SourceUrl)
                    .do_nothing()
                    .to_owned(),
            )
            .exec_without_returning(self.db.as_ref())
            .await?;

        if rows == 0 {
            debug!(url = %listing.source_url, "listing already stored");
            Ok(UpsertOutcome::AlreadyPresent)
        } else {
            Ok(UpsertOutcome::Inserted)
        }
    }

    async fn find_by_url(&self, source_url: &str) -> Result<Option<Listing>, RepositoryError> {
        let model = listing::Entity::find()
            .filter(listing::Column::SourceUrl.eq(source_url))
            .one(self.db.as_ref())
            .await?;

        Ok(model.map(Into::into))
    }

    async fn count(&self) -> Result<u64, RepositoryError> {
        let total = listing::Entity::find().count(self.db.as_ref()).await?;
        Ok(total)
    }
}

impl From<listing::Model> for Listing {
    fn from(model: listing::Model) -> Self {
        Self {
            source_url: model.source_url,
            title: model.title,
            price_usd: model.price_usd,
            odometer_km: model.odometer_km,
            seller_name: model.seller_name,
            contact_number: model.contact_number,
            image_url: model.image_url,
            image_count: u32::try_from(model.image_count).unwrap_or_default(),
            plate_number: model.plate_number,
            vin: model.vin,
            discovered_at: model.discovered_at.into(),
        }
    }
}
