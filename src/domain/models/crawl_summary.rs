// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use serde::Serialize;
use std::fmt;

/// 链接发现停止的原因
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    /// 某页没有任何可解析的链接
    EmptyPage,
    /// 某页没有新链接（分页循环或重复）
    NoNewLinks,
    /// 达到页数上限
    PageCap,
    /// 某页抓取失败
    FetchFailed,
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reason = match self {
            StopReason::EmptyPage => "empty_page",
            StopReason::NoNewLinks => "no_new_links",
            StopReason::PageCap => "page_cap",
            StopReason::FetchFailed => "fetch_failed",
        };
        f.write_str(reason)
    }
}

/// 单个URL的处理结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UrlOutcome {
    /// 新记录已写入
    Stored,
    /// 记录已存在，写入为空操作
    AlreadyPresent,
    /// 详情页抓取失败
    FetchFailed,
    /// 详情页无法解析为文档
    ParseFailed,
    /// 写入失败
    StoreFailed,
}

impl UrlOutcome {
    pub fn is_stored(&self) -> bool {
        matches!(self, UrlOutcome::Stored | UrlOutcome::AlreadyPresent)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            UrlOutcome::Stored => "stored",
            UrlOutcome::AlreadyPresent => "already_present",
            UrlOutcome::FetchFailed => "fetch_failed",
            UrlOutcome::ParseFailed => "parse_failed",
            UrlOutcome::StoreFailed => "store_failed",
        }
    }
}

/// 爬取汇总
///
/// `stored` 统计所有成功的写入（包括已存在记录的空操作写入）。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CrawlSummary {
    pub links_found: usize,
    pub processed: usize,
    pub stored: usize,
    pub already_present: usize,
    pub fetch_failed: usize,
    pub parse_failed: usize,
    pub store_failed: usize,
    /// 因意外错误中断的小组内URL数量
    pub panicked: usize,
    pub stop_reason: Option<StopReason>,
}

impl CrawlSummary {
    /// 记录一个URL的结果
    pub fn record(&mut self, outcome: UrlOutcome) {
        self.processed += 1;
        match outcome {
            UrlOutcome::Stored => self.stored += 1,
            UrlOutcome::AlreadyPresent => {
                self.stored += 1;
                self.already_present += 1;
            }
            UrlOutcome::FetchFailed => self.fetch_failed += 1,
            UrlOutcome::ParseFailed => self.parse_failed += 1,
            UrlOutcome::StoreFailed => self.store_failed += 1,
        }
    }

    /// 记录一个中断的小组
    pub fn record_panicked_group(&mut self, group_len: usize) {
        self.processed += group_len;
        self.panicked += group_len;
    }

    /// 合并另一个汇总的计数
    pub fn merge(&mut self, other: &CrawlSummary) {
        self.processed += other.processed;
        self.stored += other.stored;
        self.already_present += other.already_present;
        self.fetch_failed += other.fetch_failed;
        self.parse_failed += other.parse_failed;
        self.store_failed += other.store_failed;
        self.panicked += other.panicked;
    }
}
