// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use chrono::{DateTime, Utc};

/// 房源记录
///
/// 一个详情页提取出的完整状态。`source_url` 是唯一必填字段，也是去重键；
/// 其余字段相互独立、均可为空。记录构造后不再修改，只交给存储层一次。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Listing {
    /// 详情页URL（唯一键）
    pub source_url: String,
    /// 标题
    pub title: Option<String>,
    /// 美元价格
    pub price_usd: Option<i64>,
    /// 里程（公里）
    pub odometer_km: Option<i64>,
    /// 卖家名称
    pub seller_name: Option<String>,
    /// 联系电话，仅保留数字
    pub contact_number: Option<String>,
    /// 主图URL
    pub image_url: Option<String>,
    /// 图片数量
    pub image_count: u32,
    /// 车牌号
    pub plate_number: Option<String>,
    /// 车架号
    pub vin: Option<String>,
    /// 提取时间
    pub discovered_at: DateTime<Utc>,
}

impl Listing {
    /// 仅包含URL的记录，其余字段为空
    pub fn bare(source_url: impl Into<String>) -> Self {
        Self {
            source_url: source_url.into(),
            title: None,
            price_usd: None,
            odometer_km: None,
            seller_name: None,
            contact_number: None,
            image_url: None,
            image_count: 0,
            plate_number: None,
            vin: None,
            discovered_at: Utc::now(),
        }
    }

    /// 已解析出的可选字段数量
    pub fn populated_fields(&self) -> usize {
        [
            self.title.is_some(),
            self.price_usd.is_some(),
            self.odometer_km.is_some(),
            self.seller_name.is_some(),
            self.contact_number.is_some(),
            self.image_url.is_some(),
            self.plate_number.is_some(),
            self.vin.is_some(),
        ]
        .iter()
        .filter(|present| **present)
        .count()
    }
}

/// 页面提取结果
///
/// 字段提取器的输出。联系方式需要额外查询，查询完成后通过
/// [`ExtractedListing::into_listing`] 一次性生成不可变的 [`Listing`]。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedListing {
    pub source_url: String,
    pub title: Option<String>,
    pub price_usd: Option<i64>,
    pub odometer_km: Option<i64>,
    pub seller_name: Option<String>,
    pub image_url: Option<String>,
    pub image_count: u32,
    pub plate_number: Option<String>,
    pub vin: Option<String>,
    /// 用于联系方式查询的房源编号
    pub listing_id: Option<String>,
    pub discovered_at: DateTime<Utc>,
}

impl ExtractedListing {
    /// 合并联系方式，生成最终记录
    pub fn into_listing(self, contact_number: Option<String>) -> Listing {
        Listing {
            source_url: self.source_url,
            title: self.title,
            price_usd: self.price_usd,
            odometer_km: self.odometer_km,
            seller_name: self.seller_name,
            contact_number,
            image_url: self.image_url,
            image_count: self.image_count,
            plate_number: self.plate_number,
            vin: self.vin,
            discovered_at: self.discovered_at,
        }
    }
}
