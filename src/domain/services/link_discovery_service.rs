// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::crawl_config::CrawlConfig;
use crate::domain::models::crawl_summary::StopReason;
use crate::engines::traits::{FetchProfile, PageFetcher};
use crate::utils::errors::DiscoveryError;
use crate::utils::url_utils::{page_url, resolve_url};
use scraper::{Html, Selector};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, info, instrument, warn};
use url::Url;

/// 详情页链接的选择策略，按从具体到宽泛排列
pub const DEFAULT_LINK_STRATEGIES: &[&str] = &[
    "a.address",
    "section.ticket-item a.m-link-ticket",
    "div.content-bar a[href*='/auto_']",
    "a[href*='/auto_'][href$='.html']",
];

/// 链接发现结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveryReport {
    /// 去重后的详情页链接（绝对URL）
    pub links: HashSet<String>,
    /// 实际请求过的列表页数量
    pub pages_walked: u32,
    /// 停止原因
    pub stop_reason: StopReason,
}

/// 链接发现器
///
/// 按顺序逐页遍历列表页，第N+1页只会在第N页处理完后才请求。
pub struct LinkDiscoverer<F: ?Sized> {
    fetcher: Arc<F>,
    strategies: Vec<&'static str>,
    max_pages: u32,
    page_delay: Duration,
}

impl<F: PageFetcher + ?Sized> LinkDiscoverer<F> {
    /// 创建新的链接发现器
    ///
    /// # 参数
    ///
    /// * `fetcher` - 页面抓取器
    /// * `config` - 爬取配置，使用其中的页数上限和页间停顿
    pub fn new(fetcher: Arc<F>, config: &CrawlConfig) -> Self {
        Self {
            fetcher,
            strategies: DEFAULT_LINK_STRATEGIES.to_vec(),
            max_pages: config.max_pages,
            page_delay: config.page_delay,
        }
    }

    /// 从起始URL开始发现详情页链接
    ///
    /// 单页抓取失败会停止发现，返回已累积的部分结果。
    ///
    /// # 返回值
    ///
    /// * `Ok(DiscoveryReport)` - 发现结果
    /// * `Err(DiscoveryError)` - 起始URL无效
    #[instrument(skip(self))]
    pub async fn discover_links(&self, start_url: &str) -> Result<DiscoveryReport, DiscoveryError> {
        let start = Url::parse(start_url).map_err(|source| DiscoveryError::InvalidStartUrl {
            url: start_url.to_string(),
            source,
        })?;
        let origin = site_origin(&start);

        let mut links = HashSet::new();
        let mut pages_walked = 0;

        for page in 1..=self.max_pages {
            if page > 1 && !self.page_delay.is_zero() {
                sleep(self.page_delay).await;
            }

            let url = page_url(&start, page);
            pages_walked = page;

            let body = match self.fetcher.fetch(url.as_str(), FetchProfile::Listing).await {
                Ok(body) => body,
                Err(e) => {
                    warn!(url = %url, page, error = %e, "listing page fetch failed, stopping discovery");
                    return Ok(DiscoveryReport {
                        links,
                        pages_walked,
                        stop_reason: StopReason::FetchFailed,
                    });
                }
            };

            let found = extract_links(&body, &origin, &self.strategies);
            if found.is_empty() {
                info!(page, total = links.len(), "listing page has no links, listing exhausted");
                return Ok(DiscoveryReport {
                    links,
                    pages_walked,
                    stop_reason: StopReason::EmptyPage,
                });
            }

            let before = links.len();
            links.extend(found);
            let new_links = links.len() - before;

            if new_links == 0 {
                info!(page, total = links.len(), "listing page has no new links, stopping");
                return Ok(DiscoveryReport {
                    links,
                    pages_walked,
                    stop_reason: StopReason::NoNewLinks,
                });
            }

            debug!(page, new_links, total = links.len(), "listing page processed");
        }

        info!(pages_walked, total = links.len(), "page cap reached");
        Ok(DiscoveryReport {
            links,
            pages_walked,
            stop_reason: StopReason::PageCap,
        })
    }
}

/// 从列表页提取详情页链接
///
/// 使用第一个产生任何链接的策略；相对链接按站点根解析为绝对URL，
/// 去掉片段，只保留 http/https 链接。
pub fn extract_links(html: &str, origin: &Url, strategies: &[&str]) -> HashSet<String> {
    let document = Html::parse_document(html);

    for css in strategies {
        let Ok(selector) = Selector::parse(css) else {
            debug!(selector = css, "skipping invalid link selector");
            continue;
        };

        let links: HashSet<String> = document
            .select(&selector)
            .filter_map(|el| el.value().attr("href"))
            .filter_map(|href| normalize_link(origin, href))
            .collect();

        if !links.is_empty() {
            debug!(selector = css, count = links.len(), "link strategy matched");
            return links;
        }
    }

    HashSet::new()
}

fn normalize_link(origin: &Url, href: &str) -> Option<String> {
    let href = href.trim();
    if href.is_empty()
        || href.starts_with('#')
        || href.starts_with("mailto:")
        || href.starts_with("javascript:")
    {
        return None;
    }

    let mut url = resolve_url(origin, href).ok()?;
    if url.scheme() != "http" && url.scheme() != "https" {
        return None;
    }
    url.set_fragment(None);
    Some(url.to_string())
}

fn site_origin(start: &Url) -> Url {
    let mut origin = start.clone();
    origin.set_path("/");
    origin.set_query(None);
    origin.set_fragment(None);
    origin
}
