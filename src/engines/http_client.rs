// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::crawl_config::CrawlConfig;
use crate::engines::traits::EngineError;
use std::time::Duration;
use tracing::debug;

/// 构建共享的HTTP客户端
///
/// 抓取器和联系方式查询共用同一个客户端，从而共用同一个连接池。
/// 连接超时在客户端级别设置，总超时按请求设置。
pub fn build_client(config: &CrawlConfig) -> Result<reqwest::Client, EngineError> {
    let connect_timeout = client_connect_timeout(config);

    let client = reqwest::Client::builder()
        .user_agent(config.user_agent.as_str())
        .pool_max_idle_per_host(config.per_host_connections.max(1))
        .pool_idle_timeout(Duration::from_secs(90))
        .connect_timeout(connect_timeout)
        .gzip(true)
        .brotli(true)
        .build()?;

    Ok(client)
}

/// 客户端共用的连接超时
///
/// reqwest 只支持客户端级别的连接超时，两种超时配置取较大者。
pub fn client_connect_timeout(config: &CrawlConfig) -> Duration {
    let detail = config.detail_timeout.connect;
    let default = config.default_timeout.connect;
    if detail != default {
        debug!(?detail, ?default, "connect timeouts differ, using the larger for all requests");
    }
    detail.max(default)
}
