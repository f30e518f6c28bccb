// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 配置模块
///
/// 处理应用程序的配置设置和环境变量
pub mod config;

/// 领域模块
///
/// 包含房源模型、存储契约以及链接发现、字段提取和爬取服务
pub mod domain;

/// 引擎模块
///
/// 实现页面抓取、联系方式查询和全局请求限制
pub mod engines;

/// 基础设施模块
///
/// 提供数据库连接和仓库实现
pub mod infrastructure;

/// 工具模块
///
/// 提供通用的工具函数和辅助功能
pub mod utils;

/// 工作器模块
///
/// 实现批次编排和单URL处理流水线
pub mod workers;
