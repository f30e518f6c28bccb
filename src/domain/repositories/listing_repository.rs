// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::listing::Listing;
use crate::utils::errors::RepositoryError;
use async_trait::async_trait;

/// 写入结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    /// 插入了新行
    Inserted,
    /// 相同URL已存在，未做任何修改
    AlreadyPresent,
}

/// 房源仓库特质
///
/// `upsert` 以 `source_url` 为键且幂等：重复写入同一URL既不报错，
/// 也不产生新行，更不会覆盖已有字段（先写者胜）。
#[async_trait]
pub trait ListingRepository: Send + Sync {
    /// 写入房源，冲突时不做任何操作
    async fn upsert(&self, listing: &Listing) -> Result<UpsertOutcome, RepositoryError>;
    /// 根据URL查找房源
    async fn find_by_url(&self, source_url: &str) -> Result<Option<Listing>, RepositoryError>;
    /// 房源总数
    async fn count(&self) -> Result<u64, RepositoryError>;
}
