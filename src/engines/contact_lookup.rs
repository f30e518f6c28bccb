// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::crawl_config::CrawlConfig;
use crate::engines::limiter::RequestLimiter;
use crate::engines::traits::{ContactLookup, FetchError};
use crate::utils::url_utils::digits_only;
use async_trait::async_trait;
use metrics::counter;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, instrument, warn};
use url::Url;

/// 端点模板中的编号占位符
pub const ID_PLACEHOLDER: &str = "{id}";

/// HTTP联系方式查询
///
/// 按顺序尝试各个端点，返回第一个解析出的号码。每个端点有独立超时，
/// 并且与抓取器共用同一个限制器。
pub struct HttpContactLookup {
    client: reqwest::Client,
    limiter: RequestLimiter,
    endpoints: Vec<String>,
    timeout: Duration,
}

impl HttpContactLookup {
    pub fn new(client: reqwest::Client, limiter: RequestLimiter, config: &CrawlConfig) -> Self {
        Self {
            client,
            limiter,
            endpoints: config.lookup_endpoints.clone(),
            timeout: config.lookup_timeout,
        }
    }

    async fn query(&self, url: &str) -> Result<Option<Value>, FetchError> {
        let target = Url::parse(url).map_err(|source| FetchError::InvalidUrl {
            url: url.to_string(),
            source,
        })?;
        let _permit = self.limiter.acquire(target.host_str().unwrap_or_default()).await?;

        let response = self.client.get(target).timeout(self.timeout).send().await?;
        if !response.status().is_success() {
            debug!(url, status = response.status().as_u16(), "lookup endpoint declined");
            return Ok(None);
        }

        match response.json::<Value>().await {
            Ok(value) => Ok(Some(value)),
            Err(e) => {
                debug!(url, error = %e, "lookup response is not JSON");
                Ok(None)
            }
        }
    }
}

#[async_trait]
impl ContactLookup for HttpContactLookup {
    #[instrument(skip(self))]
    async fn lookup_contact(&self, listing_id: &str) -> Option<String> {
        for template in &self.endpoints {
            let url = template.replace(ID_PLACEHOLDER, listing_id);

            match self.query(&url).await {
                Ok(Some(body)) => {
                    if let Some(phone) = find_phone(&body) {
                        counter!("crawler_lookup_total", "outcome" => "found").increment(1);
                        return Some(phone);
                    }
                    debug!(url = %url, "lookup response has no phone");
                }
                Ok(None) => {}
                Err(e) => warn!(url = %url, error = %e, "lookup request failed"),
            }
        }

        counter!("crawler_lookup_total", "outcome" => "not_found").increment(1);
        None
    }
}

/// 从查询响应中找出第一个电话号码并只保留数字
///
/// 支持对象列表（`[{"phone": "..."}]`）和嵌套对象
/// （`{"userInfo": {"phone": "..."}}`）两种形状。
pub fn find_phone(value: &Value) -> Option<String> {
    match value {
        Value::Array(items) => items.iter().find_map(find_phone),
        Value::Object(map) => {
            let direct = ["phone", "phoneFormatted", "phone_formatted"]
                .iter()
                .filter_map(|key| map.get(*key))
                .filter_map(Value::as_str)
                .find_map(digits_only);

            direct.or_else(|| map.values().find_map(find_phone))
        }
        _ => None,
    }
}
