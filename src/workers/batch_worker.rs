// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::crawl_config::CrawlConfig;
use crate::domain::models::crawl_summary::{CrawlSummary, UrlOutcome};
use crate::domain::repositories::listing_repository::{ListingRepository, UpsertOutcome};
use crate::domain::services::extraction_service::ListingExtractor;
use crate::engines::traits::{ContactLookup, FetchProfile, PageFetcher};
use crate::utils::url_utils::listing_id_from_url;
use futures::future::join_all;
use metrics::counter;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, error, info, instrument, warn};

/// 单个URL的处理流水线：抓取 → 提取 → 联系方式查询 → 写入
///
/// 每个URL的处理互不共享可变状态，可以安全并行。
pub struct ListingPipeline<F: ?Sized, L: ?Sized, R: ?Sized> {
    fetcher: Arc<F>,
    lookup: Arc<L>,
    repository: Arc<R>,
    extractor: ListingExtractor,
    lookup_enabled: bool,
    url_delay: Duration,
}

impl<F, L, R> ListingPipeline<F, L, R>
where
    F: PageFetcher + ?Sized,
    L: ContactLookup + ?Sized,
    R: ListingRepository + ?Sized,
{
    pub fn new(fetcher: Arc<F>, lookup: Arc<L>, repository: Arc<R>, config: &CrawlConfig) -> Self {
        Self {
            fetcher,
            lookup,
            repository,
            extractor: ListingExtractor::default(),
            lookup_enabled: config.lookup_enabled,
            url_delay: config.url_delay,
        }
    }

    /// 处理一个详情页URL，完成后固定延迟
    #[instrument(skip(self))]
    pub async fn process(&self, url: &str) -> UrlOutcome {
        let outcome = self.run(url).await;
        counter!("crawler_listings_total", "outcome" => outcome.as_str()).increment(1);

        if !self.url_delay.is_zero() {
            sleep(self.url_delay).await;
        }
        outcome
    }

    async fn run(&self, url: &str) -> UrlOutcome {
        let id_in_url = if self.lookup_enabled {
            listing_id_from_url(url)
        } else {
            None
        };

        // With the id known up front the lookup runs alongside the page fetch
        let (fetched, early_contact) = match &id_in_url {
            Some(id) => {
                let (fetched, contact) = tokio::join!(
                    self.fetcher.fetch(url, FetchProfile::Detail),
                    self.lookup.lookup_contact(id)
                );
                (fetched, Some(contact))
            }
            None => (self.fetcher.fetch(url, FetchProfile::Detail).await, None),
        };

        let body = match fetched {
            Ok(body) => body,
            Err(e) => {
                warn!(url, error = %e, "detail page fetch failed");
                return UrlOutcome::FetchFailed;
            }
        };

        let extracted = match self.extractor.extract(&body, url) {
            Ok(extracted) => extracted,
            Err(e) => {
                warn!(url, error = %e, "detail page could not be parsed, dropping record");
                return UrlOutcome::ParseFailed;
            }
        };

        let contact = match early_contact {
            Some(contact) => contact,
            None => match extracted.listing_id.as_deref() {
                Some(id) if self.lookup_enabled => self.lookup.lookup_contact(id).await,
                _ => None,
            },
        };

        let listing = extracted.into_listing(contact);
        debug!(url, fields = listing.populated_fields(), "listing extracted");

        match self.repository.upsert(&listing).await {
            Ok(UpsertOutcome::Inserted) => UrlOutcome::Stored,
            Ok(UpsertOutcome::AlreadyPresent) => UrlOutcome::AlreadyPresent,
            Err(e) => {
                warn!(url, error = %e, "failed to store listing");
                UrlOutcome::StoreFailed
            }
        }
    }
}

/// 批处理编排器
///
/// 把链接切分为固定大小的批次，每批再切分为并发大小的小组。
/// 小组在独立任务中运行，意外中断（panic）只影响本小组。
/// 批次之间按配置停顿。
pub struct BatchOrchestrator<F: ?Sized, L: ?Sized, R: ?Sized> {
    pipeline: Arc<ListingPipeline<F, L, R>>,
    batch_size: usize,
    mini_group_size: usize,
    batch_delay: Duration,
}

impl<F, L, R> BatchOrchestrator<F, L, R>
where
    F: PageFetcher + ?Sized + 'static,
    L: ContactLookup + ?Sized + 'static,
    R: ListingRepository + ?Sized + 'static,
{
    /// 创建新的批处理编排器
    ///
    /// # 参数
    ///
    /// * `fetcher` - 详情页抓取器
    /// * `lookup` - 联系方式查询
    /// * `repository` - 房源仓库
    /// * `config` - 爬取配置
    pub fn new(fetcher: Arc<F>, lookup: Arc<L>, repository: Arc<R>, config: &CrawlConfig) -> Self {
        Self {
            pipeline: Arc::new(ListingPipeline::new(fetcher, lookup, repository, config)),
            batch_size: config.batch_size.max(1),
            mini_group_size: config.mini_group_size(),
            batch_delay: config.batch_delay,
        }
    }

    /// 处理全部链接
    ///
    /// # 返回值
    ///
    /// 各URL结果的汇总，`links_found` 为传入链接数
    pub async fn run(&self, links: Vec<String>) -> CrawlSummary {
        let mut summary = CrawlSummary {
            links_found: links.len(),
            ..Default::default()
        };

        let batches: Vec<&[String]> = links.chunks(self.batch_size).collect();
        let total_batches = batches.len();

        for (index, batch) in batches.into_iter().enumerate() {
            let number = index + 1;
            info!(batch = number, total_batches, size = batch.len(), "processing batch");

            let batch_summary = self.process_batch(batch).await;
            info!(
                batch = number,
                stored = batch_summary.stored,
                processed = batch_summary.processed,
                "batch finished"
            );
            summary.merge(&batch_summary);

            if number < total_batches && !self.batch_delay.is_zero() {
                sleep(self.batch_delay).await;
            }
        }

        summary
    }

    async fn process_batch(&self, batch: &[String]) -> CrawlSummary {
        let mut summary = CrawlSummary::default();

        for group in batch.chunks(self.mini_group_size) {
            let pipeline = self.pipeline.clone();
            let urls = group.to_vec();

            let handle = tokio::spawn(async move {
                join_all(urls.iter().map(|url| pipeline.process(url))).await
            });

            match handle.await {
                Ok(outcomes) => {
                    let stored = outcomes.iter().filter(|o| o.is_stored()).count();
                    debug!(size = group.len(), stored, "mini-group finished");
                    for outcome in outcomes {
                        summary.record(outcome);
                    }
                }
                Err(e) => {
                    error!(size = group.len(), error = %e, "mini-group aborted unexpectedly");
                    summary.record_panicked_group(group.len());
                }
            }
        }

        summary
    }
}

#[cfg(test)]
#[path = "batch_worker_test.rs"]
mod tests;
