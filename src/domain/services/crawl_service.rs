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
use crate::domain::models::crawl_summary::CrawlSummary;
use crate::domain::repositories::listing_repository::ListingRepository;
use crate::domain::services::link_discovery_service::LinkDiscoverer;
use crate::engines::traits::{ContactLookup, PageFetcher};
use crate::utils::errors::DiscoveryError;
use crate::workers::batch_worker::BatchOrchestrator;
use std::sync::Arc;
use tracing::{info, instrument};

/// 爬取服务
///
/// 一次完整的爬取：先发现链接，再按批次处理全部详情页。
pub struct CrawlService<F: ?Sized, L: ?Sized, R: ?Sized> {
    start_url: String,
    discoverer: LinkDiscoverer<F>,
    orchestrator: BatchOrchestrator<F, L, R>,
}

impl<F, L, R> CrawlService<F, L, R>
where
    F: PageFetcher + ?Sized + 'static,
    L: ContactLookup + ?Sized + 'static,
    R: ListingRepository + ?Sized + 'static,
{
    /// 创建新的爬取服务实例
    ///
    /// # 参数
    ///
    /// * `fetcher` - 页面抓取器，列表页和详情页共用
    /// * `lookup` - 联系方式查询
    /// * `repository` - 房源仓库
    /// * `config` - 爬取配置
    pub fn new(fetcher: Arc<F>, lookup: Arc<L>, repository: Arc<R>, config: &CrawlConfig) -> Self {
        Self {
            start_url: config.start_url.clone(),
            discoverer: LinkDiscoverer::new(fetcher.clone(), config),
            orchestrator: BatchOrchestrator::new(fetcher, lookup, repository, config),
        }
    }

    /// 执行一次爬取
    ///
    /// 单个页面、字段或记录的失败都不会中断爬取，只反映在汇总中。
    ///
    /// # 返回值
    ///
    /// * `Ok(CrawlSummary)` - 爬取汇总
    /// * `Err(DiscoveryError)` - 起始URL无效
    #[instrument(skip(self), fields(start_url = %self.start_url))]
    pub async fn run(&self) -> Result<CrawlSummary, DiscoveryError> {
        let report = self.discoverer.discover_links(&self.start_url).await?;
        info!(
            links = report.links.len(),
            pages = report.pages_walked,
            stop_reason = %report.stop_reason,
            "link discovery finished"
        );

        let links_found = report.links.len();
        let mut summary = self.orchestrator.run(report.links.into_iter().collect()).await;
        summary.links_found = links_found;
        summary.stop_reason = Some(report.stop_reason);

        Ok(summary)
    }
}

#[cfg(test)]
#[path = "crawl_service_test.rs"]
mod tests;
