// Copyright 2025 Kirky.X
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use async_trait::async_trait;
use thiserror::Error;

/// 引擎错误类型
#[derive(Error, Debug)]
pub enum EngineError {
    /// HTTP客户端构建失败
    #[error("Failed to build HTTP client: {0}")]
    ClientBuild(#[from] reqwest::Error),
}

/// 抓取错误类型
#[derive(Error, Debug)]
pub enum FetchError {
    /// 传输层错误（超时、连接重置等）
    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),
    /// 非200且不可重试的状态码
    #[error("Unexpected status {0}")]
    Status(u16),
    /// 429/503，冷却后仍未成功
    #[error("Rate limited with status {0}")]
    RateLimited(u16),
    /// 重试次数耗尽
    #[error("Giving up after {attempts} attempts: {last}")]
    RetriesExhausted {
        attempts: u32,
        #[source]
        last: Box<FetchError>,
    },
    /// 并发限制器已关闭
    #[error("Request limiter closed")]
    LimiterClosed,
    /// URL无法解析
    #[error("Invalid URL {url}: {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
}

impl FetchError {
    /// 判断错误是否可重试
    ///
    /// # 返回值
    ///
    /// 传输层错误和 429/503 返回true，其他状态码返回false
    pub fn is_retryable(&self) -> bool {
        matches!(self, FetchError::Transport(_) | FetchError::RateLimited(_))
    }

    /// 用于日志和指标的简短分类
    pub fn kind(&self) -> &'static str {
        match self {
            FetchError::Transport(e) if e.is_timeout() => "timeout",
            FetchError::Transport(_) => "transport",
            FetchError::Status(_) => "status",
            FetchError::RateLimited(_) => "rate_limited",
            FetchError::RetriesExhausted { .. } => "retries_exhausted",
            FetchError::LimiterClosed => "limiter_closed",
            FetchError::InvalidUrl { .. } => "invalid_url",
        }
    }
}

/// 抓取配置档
///
/// 决定单次请求使用的超时
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchProfile {
    /// 列表页（通用超时）
    Listing,
    /// 详情页
    Detail,
}

/// 页面抓取特质
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// 抓取页面，成功时返回响应正文
    async fn fetch(&self, url: &str, profile: FetchProfile) -> Result<String, FetchError>;
}

/// 联系方式查询特质
///
/// 任何失败都视为“未找到”，不向调用方传播错误
#[async_trait]
pub trait ContactLookup: Send + Sync {
    /// 根据房源编号查询联系电话（仅数字）
    async fn lookup_contact(&self, listing_id: &str) -> Option<String>;
}

/// 不做任何查询的实现，用于关闭联系方式查询时
pub struct NoContactLookup;

#[async_trait]
impl ContactLookup for NoContactLookup {
    async fn lookup_contact(&self, _listing_id: &str) -> Option<String> {
        None
    }
}
