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

use crate::domain::models::crawl_config::{
    CrawlConfig, TimeoutProfile, DEFAULT_PRIMARY_LOOKUP, DEFAULT_SECONDARY_LOOKUP,
    DEFAULT_USER_AGENT,
};
use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError, Environment, File};
use serde::Deserialize;
use std::time::Duration;

/// 应用程序配置设置
///
/// 包含爬取、HTTP、联系方式查询和数据库配置
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// 爬取配置
    pub crawl: CrawlSettings,
    /// HTTP配置
    pub http: HttpSettings,
    /// 联系方式查询配置
    pub lookup: LookupSettings,
    /// 数据库配置
    pub database: DatabaseSettings,
}

/// 爬取配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlSettings {
    /// 列表页起始URL（必填）
    pub start_url: String,
    /// 最大并发请求数
    pub max_concurrent_requests: usize,
    /// 每批链接数
    pub batch_size: usize,
    /// 每个URL处理后的延迟（秒）
    pub url_delay_secs: f64,
    /// 批次之间的延迟（秒）
    pub batch_delay_secs: f64,
    /// 列表页之间的停顿（秒）
    pub page_delay_secs: f64,
    /// 最多遍历的列表页数
    pub max_pages: u32,
}

/// HTTP配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct HttpSettings {
    /// 每个请求的最大尝试次数
    pub max_retries: u32,
    /// 每个主机的连接上限
    pub per_host_connections: usize,
    /// 详情页总超时（秒）
    pub detail_timeout_secs: u64,
    /// 详情页连接超时（秒）
    ///
    /// 连接超时作用于整个客户端，实际使用两个连接超时中较大的一个。
    pub detail_connect_timeout_secs: u64,
    /// 通用总超时（秒）
    pub default_timeout_secs: u64,
    /// 通用连接超时（秒），见 `detail_connect_timeout_secs`
    pub default_connect_timeout_secs: u64,
    /// 429/503 冷却时间（秒）
    pub rate_limit_cooldown_secs: f64,
    /// 指数退避基数（秒）
    pub backoff_base_secs: f64,
    pub user_agent: String,
}

/// 联系方式查询配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct LookupSettings {
    /// 是否启用
    pub enabled: bool,
    /// 主端点模板，`{id}` 为房源编号
    pub primary_endpoint: String,
    /// 备用端点模板
    pub secondary_endpoint: String,
    /// 每次查询的超时（秒）
    pub timeout_secs: u64,
}

/// 数据库配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseSettings {
    /// 数据库连接URL
    pub url: String,
    /// 最大连接数
    pub max_connections: Option<u32>,
    /// 最小连接数
    pub min_connections: Option<u32>,
    /// 连接超时时间（秒）
    pub connect_timeout: Option<u64>,
    /// 空闲连接超时时间（秒）
    pub idle_timeout: Option<u64>,
}

impl Settings {
    /// 创建新的配置实例
    ///
    /// 依次叠加：内置默认值、`config/default`、`config/{APP_ENVIRONMENT}`、
    /// `CRAWLER__` 前缀的环境变量，最后是 `START_URL` 和 `DATABASE_URL`。
    ///
    /// # Returns
    ///
    /// * `Ok(Settings)` - 成功加载的配置
    /// * `Err(ConfigError)` - 配置加载失败
    pub fn new() -> Result<Self, ConfigError> {
        let env = std::env::var("APP_ENVIRONMENT").unwrap_or_else(|_| "default".to_string());
        let builder = Self::with_defaults()?
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", env)).required(false))
            .add_source(Environment::with_prefix("CRAWLER").separator("__"))
            .set_override_option("crawl.start_url", std::env::var("START_URL").ok())?
            .set_override_option("database.url", std::env::var("DATABASE_URL").ok())?;

        builder.build()?.try_deserialize()
    }

    /// 只包含内置默认值的配置构建器
    pub fn with_defaults() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
        Config::builder()
            .set_default("crawl.start_url", "")?
            .set_default("crawl.max_concurrent_requests", 10)?
            .set_default("crawl.batch_size", 50)?
            .set_default("crawl.url_delay_secs", 0.2)?
            .set_default("crawl.batch_delay_secs", 2.0)?
            .set_default("crawl.page_delay_secs", 1.0)?
            .set_default("crawl.max_pages", 1000)?
            .set_default("http.max_retries", 3)?
            .set_default("http.per_host_connections", 5)?
            .set_default("http.detail_timeout_secs", 60)?
            .set_default("http.detail_connect_timeout_secs", 10)?
            .set_default("http.default_timeout_secs", 30)?
            .set_default("http.default_connect_timeout_secs", 10)?
            .set_default("http.rate_limit_cooldown_secs", 5.0)?
            .set_default("http.backoff_base_secs", 1.0)?
            .set_default("http.user_agent", DEFAULT_USER_AGENT)?
            .set_default("lookup.enabled", true)?
            .set_default("lookup.primary_endpoint", DEFAULT_PRIMARY_LOOKUP)?
            .set_default("lookup.secondary_endpoint", DEFAULT_SECONDARY_LOOKUP)?
            .set_default("lookup.timeout_secs", 10)?
            .set_default("database.url", "sqlite://listings.db?mode=rwc")?
            .set_default("database.max_connections", 10)?
            .set_default("database.min_connections", 1)?
            .set_default("database.connect_timeout", 10)?
            .set_default("database.idle_timeout", 300)
    }

    /// 转换为领域层的爬取配置
    ///
    /// # Returns
    ///
    /// * `Ok(CrawlConfig)` - 爬取配置
    /// * `Err(ConfigError)` - 起始URL为空或时间参数无效
    pub fn crawl_config(&self) -> Result<CrawlConfig, ConfigError> {
        let start_url = self.crawl.start_url.trim();
        if start_url.is_empty() {
            return Err(ConfigError::Message(
                "crawl.start_url (or START_URL) must be set".to_string(),
            ));
        }

        let lookup_endpoints = [&self.lookup.primary_endpoint, &self.lookup.secondary_endpoint]
            .into_iter()
            .map(|endpoint| endpoint.trim())
            .filter(|endpoint| !endpoint.is_empty())
            .map(str::to_string)
            .collect();

        Ok(CrawlConfig {
            start_url: start_url.to_string(),
            max_concurrent_requests: self.crawl.max_concurrent_requests,
            batch_size: self.crawl.batch_size,
            url_delay: seconds("crawl.url_delay_secs", self.crawl.url_delay_secs)?,
            batch_delay: seconds("crawl.batch_delay_secs", self.crawl.batch_delay_secs)?,
            page_delay: seconds("crawl.page_delay_secs", self.crawl.page_delay_secs)?,
            max_pages: self.crawl.max_pages,
            max_retries: self.http.max_retries,
            backoff_base: seconds("http.backoff_base_secs", self.http.backoff_base_secs)?,
            rate_limit_cooldown: seconds(
                "http.rate_limit_cooldown_secs",
                self.http.rate_limit_cooldown_secs,
            )?,
            per_host_connections: self.http.per_host_connections,
            detail_timeout: TimeoutProfile::new(
                Duration::from_secs(self.http.detail_timeout_secs),
                Duration::from_secs(self.http.detail_connect_timeout_secs),
            ),
            default_timeout: TimeoutProfile::new(
                Duration::from_secs(self.http.default_timeout_secs),
                Duration::from_secs(self.http.default_connect_timeout_secs),
            ),
            lookup_enabled: self.lookup.enabled,
            lookup_endpoints,
            lookup_timeout: Duration::from_secs(self.lookup.timeout_secs),
            user_agent: self.http.user_agent.clone(),
        })
    }
}

fn seconds(key: &str, value: f64) -> Result<Duration, ConfigError> {
    Duration::try_from_secs_f64(value)
        .map_err(|e| ConfigError::Message(format!("{} is not a valid duration: {}", key, e)))
}

#[cfg(test)]
#[path = "settings_test.rs"]
mod tests;
