// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use once_cell::sync::Lazy;
use regex::Regex;
use url::{ParseError, Url};

static LISTING_ID_IN_PATH: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?:^|[/_-])(\d{6,})(?:[/._-]|$)").expect("valid listing id regex"));

/// 将可能为相对路径的URL转换为绝对路径URL
pub fn resolve_url(base_url: &Url, path: &str) -> Result<Url, ParseError> {
    base_url.join(path)
}

/// 构造列表页第 `page` 页的URL
///
/// 起始URL已有的 `page` 参数会被替换，其余查询参数保留
pub fn page_url(start_url: &Url, page: u32) -> Url {
    let retained: Vec<(String, String)> = start_url
        .query_pairs()
        .filter(|(key, _)| key != "page")
        .map(|(key, value)| (key.into_owned(), value.into_owned()))
        .collect();

    let mut url = start_url.clone();
    url.set_query(None);
    {
        let mut pairs = url.query_pairs_mut();
        for (key, value) in &retained {
            pairs.append_pair(key, value);
        }
        pairs.append_pair("page", &page.to_string());
    }
    url
}

/// 从URL路径中提取至少6位的数字编号（取最后一个）
pub fn listing_id_from_url(url: &str) -> Option<String> {
    let path = match Url::parse(url) {
        Ok(parsed) => parsed.path().to_string(),
        Err(_) => url.split(['?', '#']).next().unwrap_or_default().to_string(),
    };

    LISTING_ID_IN_PATH
        .captures_iter(&path)
        .filter_map(|caps| caps.get(1))
        .last()
        .map(|m| m.as_str().to_string())
}

/// 只保留数字字符，结果为空时返回 `None`
pub fn digits_only(raw: &str) -> Option<String> {
    let digits: String = raw.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        None
    } else {
        Some(digits)
    }
}
