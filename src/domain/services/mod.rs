// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 领域服务模块
///
/// 包含的服务：
/// - 爬取服务（crawl_service）：串联链接发现和批处理
/// - 提取服务（extraction_service）：详情页字段提取和规范化
/// - 链接发现服务（link_discovery_service）：逐页遍历列表页收集详情页链接
pub mod crawl_service;
pub mod extraction_service;
pub mod link_discovery_service;
