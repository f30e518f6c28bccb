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

use listing_crawler::config::settings::Settings;
use listing_crawler::domain::services::crawl_service::CrawlService;
use listing_crawler::engines::contact_lookup::HttpContactLookup;
use listing_crawler::engines::http_client::build_client;
use listing_crawler::engines::http_fetcher::HttpFetcher;
use listing_crawler::engines::limiter::RequestLimiter;
use listing_crawler::engines::traits::{ContactLookup, NoContactLookup};
use listing_crawler::infrastructure::database::connection;
use listing_crawler::infrastructure::repositories::listing_repo_impl::ListingRepositoryImpl;
use listing_crawler::utils::telemetry;
use migration::{Migrator, MigratorTrait};
use std::sync::Arc;
use tracing::info;

/// 主函数
///
/// 加载配置、连接数据库并执行一次完整的爬取。
/// 单条记录的失败不会影响退出码，只有配置、数据库或客户端初始化失败才会中止。
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Environment and logging
    dotenvy::dotenv().ok();
    telemetry::init_telemetry();
    info!("Starting listing-crawler...");

    // 2. Load configuration
    let settings = Settings::new()?;
    let config = settings.crawl_config()?;
    info!(start_url = %config.start_url, "Configuration loaded");

    // 3. Connect to database
    let db = Arc::new(connection::create_pool(&settings.database).await?);
    info!("Database connection established");

    info!("Running database migrations...");
    Migrator::up(db.as_ref(), None).await?;
    info!("Database migrations applied");

    // 4. Shared HTTP client and request limiter
    let client = build_client(&config)?;
    let limiter =
        RequestLimiter::with_per_host(config.max_concurrent_requests, config.per_host_connections);

    let fetcher = Arc::new(HttpFetcher::new(client.clone(), limiter.clone(), &config));
    let lookup: Arc<dyn ContactLookup> = if config.lookup_enabled {
        Arc::new(HttpContactLookup::new(client, limiter, &config))
    } else {
        Arc::new(NoContactLookup)
    };
    let repository = Arc::new(ListingRepositoryImpl::new(db));

    // 5. Crawl
    let service = CrawlService::new(fetcher, lookup, repository, &config);
    let summary = service.run().await?;

    info!(
        links_found = summary.links_found,
        processed = summary.processed,
        stored = summary.stored,
        already_present = summary.already_present,
        fetch_failed = summary.fetch_failed,
        parse_failed = summary.parse_failed,
        store_failed = summary.store_failed,
        panicked = summary.panicked,
        stop_reason = ?summary.stop_reason,
        "Crawl finished"
    );

    // Machine-readable summary on stdout, logs go to stderr
    println!("{}", serde_json::to_string(&summary)?);

    Ok(())
}
