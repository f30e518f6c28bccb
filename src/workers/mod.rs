// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 工作器模块
///
/// 提供批次编排和单URL处理流水线
pub mod batch_worker;

pub use batch_worker::BatchOrchestrator;
