// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use std::time::Duration;

/// 单次请求的超时配置
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeoutProfile {
    /// 单次尝试的总超时
    pub total: Duration,
    /// 建立连接的超时
    pub connect: Duration,
}

impl TimeoutProfile {
    pub const fn new(total: Duration, connect: Duration) -> Self {
        Self { total, connect }
    }
}

/// 爬取配置
///
/// 进程级可调参数。`Default` 给出所有默认值，只有 `start_url` 必须由调用方提供。
#[derive(Debug, Clone)]
pub struct CrawlConfig {
    /// 列表页起始URL，分页时追加 `page` 查询参数
    pub start_url: String,
    /// 全局并发请求上限，也是批次内小组的大小
    pub max_concurrent_requests: usize,
    /// 每批链接数
    pub batch_size: usize,
    /// 每个URL处理完成后的固定延迟
    pub url_delay: Duration,
    /// 批次之间的延迟
    pub batch_delay: Duration,
    /// 链接发现时每页之间的停顿
    pub page_delay: Duration,
    /// 链接发现最多遍历的页数
    pub max_pages: u32,
    /// 每个请求的最大尝试次数
    pub max_retries: u32,
    /// 指数退避的基数
    pub backoff_base: Duration,
    /// 遇到 429/503 时的冷却时间
    pub rate_limit_cooldown: Duration,
    /// 每个主机的连接池上限
    pub per_host_connections: usize,
    /// 详情页超时
    pub detail_timeout: TimeoutProfile,
    /// 通用（列表页）超时
    pub default_timeout: TimeoutProfile,
    /// 是否启用联系方式查询
    pub lookup_enabled: bool,
    /// 联系方式查询端点模板，按顺序尝试，`{id}` 会被替换为房源编号
    pub lookup_endpoints: Vec<String>,
    /// 每次联系方式查询的超时
    pub lookup_timeout: Duration,
    /// User-Agent
    pub user_agent: String,
}

pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

pub const DEFAULT_PRIMARY_LOOKUP: &str = "https://auto.ria.com/users/phones/{id}?all";

pub const DEFAULT_SECONDARY_LOOKUP: &str = "https://auto.ria.com/bu/final_page/users/phones/{id}";

impl Default for CrawlConfig {
    fn default() -> Self {
        Self {
            start_url: String::new(),
            max_concurrent_requests: 10,
            batch_size: 50,
            url_delay: Duration::from_millis(200),
            batch_delay: Duration::from_secs(2),
            page_delay: Duration::from_secs(1),
            max_pages: 1000,
            max_retries: 3,
            backoff_base: Duration::from_secs(1),
            rate_limit_cooldown: Duration::from_secs(5),
            per_host_connections: 5,
            detail_timeout: TimeoutProfile::new(Duration::from_secs(60), Duration::from_secs(10)),
            default_timeout: TimeoutProfile::new(Duration::from_secs(30), Duration::from_secs(10)),
            lookup_enabled: true,
            lookup_endpoints: vec![
                DEFAULT_PRIMARY_LOOKUP.to_string(),
                DEFAULT_SECONDARY_LOOKUP.to_string(),
            ],
            lookup_timeout: Duration::from_secs(10),
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl CrawlConfig {
    /// 以默认参数创建指定起始URL的配置
    pub fn for_start_url(start_url: impl Into<String>) -> Self {
        Self {
            start_url: start_url.into(),
            ..Self::default()
        }
    }

    /// 小组大小，至少为1
    pub fn mini_group_size(&self) -> usize {
        self.max_concurrent_requests.max(1)
    }
}
