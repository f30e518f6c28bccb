// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "listings")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub source_url: String,
    pub title: Option<String>,
    pub price_usd: Option<i64>,
    pub odometer_km: Option<i64>,
    pub seller_name: Option<String>,
    pub contact_number: Option<String>,
    pub image_url: Option<String>,
    pub image_count: i32,
    pub plate_number: Option<String>,
    pub vin: Option<String>,
    pub discovered_at: ChronoDateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
