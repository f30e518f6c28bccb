// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use listing_crawler::config::settings::DatabaseSettings;
use listing_crawler::domain::models::crawl_config::CrawlConfig;
use listing_crawler::engines::http_client::build_client;
use listing_crawler::engines::limiter::RequestLimiter;
use listing_crawler::infrastructure::database::connection;
use migration::{Migrator, MigratorTrait};
use sea_orm::DatabaseConnection;
use std::sync::Arc;
use std::time::Duration;

/// 内存SQLite并执行迁移
pub async fn setup_db() -> Arc<DatabaseConnection> {
    let settings = DatabaseSettings {
        url: "sqlite::memory:".to_string(),
        max_connections: None,
        min_connections: None,
        connect_timeout: Some(5),
        idle_timeout: None,
    };
    let db = connection::create_pool(&settings).await.unwrap();
    Migrator::up(&db, None).await.unwrap();
    Arc::new(db)
}

/// 去掉所有延迟、缩短退避的配置
pub fn fast_config(start_url: &str) -> CrawlConfig {
    CrawlConfig {
        url_delay: Duration::ZERO,
        batch_delay: Duration::ZERO,
        page_delay: Duration::ZERO,
        backoff_base: Duration::from_millis(5),
        rate_limit_cooldown: Duration::from_millis(5),
        lookup_timeout: Duration::from_secs(2),
        ..CrawlConfig::for_start_url(start_url)
    }
}

pub fn client_and_limiter(config: &CrawlConfig) -> (reqwest::Client, RequestLimiter) {
    (
        build_client(config).unwrap(),
        RequestLimiter::with_per_host(
            config.max_concurrent_requests,
            config.per_host_connections,
        ),
    )
}

/// 一个已关闭端口上的URL，请求必然连接失败
pub fn closed_port_url(path: &str) -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    format!("http://127.0.0.1:{}{}", port, path)
}
