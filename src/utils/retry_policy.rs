// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::crawl_config::CrawlConfig;
use std::time::Duration;

/// 重试策略配置
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// 最大尝试次数（包括第一次）
    pub max_attempts: u32,
    /// 退避基数
    pub backoff_base: Duration,
    /// 遇到 429/503 后的冷却时间
    pub rate_limit_cooldown: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            backoff_base: Duration::from_secs(1),
            rate_limit_cooldown: Duration::from_secs(5),
        }
    }
}

impl RetryPolicy {
    /// 从爬取配置创建重试策略
    pub fn from_config(config: &CrawlConfig) -> Self {
        Self {
            max_attempts: config.max_retries.max(1),
            backoff_base: config.backoff_base,
            rate_limit_cooldown: config.rate_limit_cooldown,
        }
    }

    /// 计算第 `attempt` 次尝试失败后的退避时间
    ///
    /// `attempt` 从0开始计数，退避时间为 `backoff_base * 2^attempt`
    pub fn calculate_backoff(&self, attempt: u32) -> Duration {
        // Cap the exponent so the multiplication cannot overflow
        let factor = 2u32.saturating_pow(attempt.min(16));
        self.backoff_base.saturating_mul(factor)
    }

    /// 第 `attempt` 次尝试失败后是否还应重试
    pub fn should_retry(&self, attempt: u32) -> bool {
        attempt + 1 < self.max_attempts
    }
}
