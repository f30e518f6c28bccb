// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use sea_orm_migration::prelude::*;

/// 创建房源（listings）表
#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Listings::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Listings::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Listings::SourceUrl)
                            .text()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Listings::Title).text())
                    .col(ColumnDef::new(Listings::PriceUsd).big_integer())
                    .col(ColumnDef::new(Listings::OdometerKm).big_integer())
                    .col(ColumnDef::new(Listings::SellerName).text())
                    .col(ColumnDef::new(Listings::ContactNumber).text())
                    .col(ColumnDef::new(Listings::ImageUrl).text())
                    .col(
                        ColumnDef::new(Listings::ImageCount)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(Listings::PlateNumber).text())
                    .col(ColumnDef::new(Listings::Vin).text())
                    .col(
                        ColumnDef::new(Listings::DiscoveredAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_listings_discovered_at")
                    .table(Listings::Table)
                    .col(Listings::DiscoveredAt)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Listings::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Listings {
    Table,
    Id,
    SourceUrl,
    Title,
    PriceUsd,
    OdometerKm,
    SellerName,
    ContactNumber,
    ImageUrl,
    ImageCount,
    PlateNumber,
    Vin,
    DiscoveredAt,
}
