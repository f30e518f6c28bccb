// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 领域模型模块
///
/// 包含爬取配置、房源记录和爬取汇总
pub mod crawl_config;
pub mod crawl_summary;
pub mod listing;
