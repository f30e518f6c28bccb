// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 领域层模块
///
/// 该模块包含系统的核心业务逻辑，包括：
/// - 领域模型（models）：房源记录、爬取配置与汇总
/// - 仓库接口（repositories）：存储写入契约
/// - 服务（services）：链接发现、字段提取与整体爬取流程
pub mod models;
pub mod repositories;
pub mod services;
