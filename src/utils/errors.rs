// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use thiserror::Error;

/// 仓库层错误类型
#[derive(Error, Debug)]
pub enum RepositoryError {
    #[error("数据库错误: {0}")]
    DatabaseError(String),

    #[error("无效数据: {0}")]
    InvalidData(String),
}

impl From<sea_orm::DbErr> for RepositoryError {
    fn from(err: sea_orm::DbErr) -> Self {
        RepositoryError::DatabaseError(err.to_string())
    }
}

/// 链接发现错误类型
#[derive(Error, Debug)]
pub enum DiscoveryError {
    #[error("无效的起始URL {url}: {source}")]
    InvalidStartUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
}
