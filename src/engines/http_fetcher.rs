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

use crate::domain::models::crawl_config::CrawlConfig;
use crate::engines::limiter::RequestLimiter;
use crate::engines::traits::{FetchError, FetchProfile, PageFetcher};
use crate::utils::retry_policy::RetryPolicy;
use async_trait::async_trait;
use metrics::counter;
use reqwest::StatusCode;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, instrument, warn};
use url::Url;

/// HTTP抓取器
///
/// 基于reqwest实现，每次尝试先从共享限制器获取主机许可和全局许可。
/// 200 返回正文；429/503 冷却后计为一次失败尝试；其他状态码立即失败；
/// 传输层错误按指数退避重试，直到达到重试上限。
pub struct HttpFetcher {
    client: reqwest::Client,
    limiter: RequestLimiter,
    policy: RetryPolicy,
    detail_timeout: Duration,
    listing_timeout: Duration,
}

impl HttpFetcher {
    /// 创建新的抓取器
    ///
    /// # 参数
    ///
    /// * `client` - 共享的HTTP客户端
    /// * `limiter` - 共享的全局限制器
    /// * `config` - 爬取配置
    pub fn new(client: reqwest::Client, limiter: RequestLimiter, config: &CrawlConfig) -> Self {
        Self {
            client,
            limiter,
            policy: RetryPolicy::from_config(config),
            detail_timeout: config.detail_timeout.total,
            listing_timeout: config.default_timeout.total,
        }
    }

    fn timeout_for(&self, profile: FetchProfile) -> Duration {
        match profile {
            FetchProfile::Detail => self.detail_timeout,
            FetchProfile::Listing => self.listing_timeout,
        }
    }

    /// 单次尝试。许可在返回时释放。
    async fn attempt(&self, url: &Url, timeout: Duration) -> Result<String, FetchError> {
        let _permit = self.limiter.acquire(url.host_str().unwrap_or_default()).await?;

        let response = self.client.get(url.clone()).timeout(timeout).send().await?;
        let status = response.status();

        match status {
            StatusCode::OK => Ok(response.text().await?),
            StatusCode::TOO_MANY_REQUESTS | StatusCode::SERVICE_UNAVAILABLE => {
                Err(FetchError::RateLimited(status.as_u16()))
            }
            other => Err(FetchError::Status(other.as_u16())),
        }
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    #[instrument(skip(self))]
    async fn fetch(&self, url: &str, profile: FetchProfile) -> Result<String, FetchError> {
        let timeout = self.timeout_for(profile);
        let target = Url::parse(url).map_err(|source| {
            counter!("crawler_fetch_total", "outcome" => "invalid_url").increment(1);
            warn!(url, error = %source, "refusing to fetch invalid URL");
            FetchError::InvalidUrl {
                url: url.to_string(),
                source,
            }
        })?;
        let mut attempt = 0;

        loop {
            let err = match self.attempt(&target, timeout).await {
                Ok(body) => {
                    counter!("crawler_fetch_total", "outcome" => "ok").increment(1);
                    return Ok(body);
                }
                Err(err) => err,
            };

            if !err.is_retryable() {
                counter!("crawler_fetch_total", "outcome" => err.kind()).increment(1);
                warn!(url, error = %err, "fetch failed");
                return Err(err);
            }

            let retry = self.policy.should_retry(attempt);
            match &err {
                FetchError::RateLimited(status) => {
                    warn!(url, status, attempt, "rate limited, cooling down");
                    sleep(self.policy.rate_limit_cooldown).await;
                }
                _ if retry => {
                    let backoff = self.policy.calculate_backoff(attempt);
                    warn!(url, attempt, error = %err, ?backoff, "transient fetch error, backing off");
                    sleep(backoff).await;
                }
                _ => {}
            }

            if !retry {
                counter!("crawler_fetch_total", "outcome" => "retries_exhausted").increment(1);
                warn!(url, attempts = attempt + 1, error = %err, "fetch failed permanently");
                return Err(FetchError::RetriesExhausted {
                    attempts: attempt + 1,
                    last: Box::new(err),
                });
            }

            attempt += 1;
            debug!(url, attempt, "retrying fetch");
        }
    }
}

#[cfg(test)]
#[path = "http_fetcher_test.rs"]
mod tests;
