// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::listing::ExtractedListing;
use crate::utils::url_utils::{digits_only, listing_id_from_url, resolve_url};
use chrono::Utc;
use scraper::{ElementRef, Html, Selector};
use thiserror::Error;
use tracing::{debug, trace};
use url::Url;

/// 提取错误
///
/// 只有整个正文无法构成文档时才会出现，单个字段失败只会得到 `None`
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExtractError {
    #[error("Empty document")]
    EmptyDocument,
    #[error("Body does not contain any HTML elements")]
    NotHtml,
}

/// 单个字段的提取策略
///
/// 每个策略都是 `文档 -> Option<值>` 的纯函数，可以单独测试
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldStrategy {
    /// 第一个匹配元素的全部文本
    Text(&'static str),
    /// 第一个匹配元素自身的直接文本节点（不含子元素）
    OwnText(&'static str),
    /// 匹配元素上第一个非空的属性，按给定顺序检查
    Attr {
        selector: &'static str,
        attrs: &'static [&'static str],
    },
    /// 直接文本包含 `needle` 的标签元素之后，文档顺序中第一个非空 span 的文本
    AfterLabel {
        label: &'static str,
        needle: &'static str,
    },
}

impl FieldStrategy {
    /// 对文档应用策略
    pub fn apply(&self, doc: &Html) -> Option<String> {
        match *self {
            FieldStrategy::Text(css) => {
                let selector = Selector::parse(css).ok()?;
                doc.select(&selector)
                    .map(|el| collapse_whitespace(&el.text().collect::<String>()))
                    .find(|text| !text.is_empty())
            }
            FieldStrategy::OwnText(css) => {
                let selector = Selector::parse(css).ok()?;
                doc.select(&selector)
                    .map(|el| collapse_whitespace(&own_text(&el)))
                    .find(|text| !text.is_empty())
            }
            FieldStrategy::Attr { selector, attrs } => {
                let selector = Selector::parse(selector).ok()?;
                doc.select(&selector).find_map(|el| first_attr(&el, attrs))
            }
            FieldStrategy::AfterLabel { label, needle } => value_after_label(doc, label, needle),
        }
    }
}

/// 单个字段的提取流水线
///
/// 按顺序尝试策略，取第一个非空结果；全部失败时字段为 `None`
#[derive(Debug, Clone)]
pub struct FieldPipeline {
    pub field: &'static str,
    pub strategies: Vec<FieldStrategy>,
}

impl FieldPipeline {
    pub fn new(field: &'static str, strategies: Vec<FieldStrategy>) -> Self {
        Self { field, strategies }
    }

    pub fn resolve(&self, doc: &Html) -> Option<String> {
        for (index, strategy) in self.strategies.iter().enumerate() {
            if let Some(value) = strategy.apply(doc) {
                trace!(field = self.field, strategy = index, "field resolved");
                return Some(value);
            }
        }
        debug!(field = self.field, "no extraction strategy matched");
        None
    }
}

/// 图片计数的启发式规则
#[derive(Debug, Clone)]
pub struct PhotoHeuristic {
    /// CDN路径标记，只统计来源包含它的图片
    pub cdn_marker: String,
    /// 照片标记
    pub photo_marker: String,
}

impl Default for PhotoHeuristic {
    fn default() -> Self {
        Self {
            cdn_marker: "riastatic.com".to_string(),
            photo_marker: "photo".to_string(),
        }
    }
}

const IMAGE_ATTRS: &[&str] = &["src", "data-src"];

/// 房源字段提取器
///
/// 每个输出字段都有独立的流水线，一个字段的标记变化不会影响其他字段
#[derive(Debug, Clone)]
pub struct ListingExtractor {
    pub title: FieldPipeline,
    pub price: FieldPipeline,
    pub odometer: FieldPipeline,
    pub seller: FieldPipeline,
    pub main_image: FieldPipeline,
    pub plate_number: FieldPipeline,
    pub vin: FieldPipeline,
    pub listing_id: FieldPipeline,
    pub photos: PhotoHeuristic,
}

impl Default for ListingExtractor {
    fn default() -> Self {
        use FieldStrategy::*;

        Self {
            title: FieldPipeline::new(
                "title",
                vec![
                    Text("h1.head"),
                    Text("h1"),
                    Attr {
                        selector: "meta[property='og:title']",
                        attrs: &["content"],
                    },
                    Text("title"),
                ],
            ),
            price: FieldPipeline::new(
                "price_usd",
                vec![
                    Text("div.price_value strong"),
                    Text("span.price_value"),
                    Text(".price_value"),
                    Attr {
                        selector: "[data-price-usd]",
                        attrs: &["data-price-usd"],
                    },
                ],
            ),
            odometer: FieldPipeline::new(
                "odometer_km",
                vec![
                    Attr {
                        selector: "[data-mileage]",
                        attrs: &["data-mileage"],
                    },
                    AfterLabel {
                        label: "div, dt, span",
                        needle: "Пробег",
                    },
                    AfterLabel {
                        label: "div, dt, span",
                        needle: "Пробіг",
                    },
                ],
            ),
            seller: FieldPipeline::new(
                "seller_name",
                vec![
                    Text("div.seller_info_name"),
                    Text(".seller_info_name a"),
                    Text("h4.seller_info_name"),
                ],
            ),
            main_image: FieldPipeline::new(
                "image_url",
                vec![
                    Attr {
                        selector: "img.outline.m-auto",
                        attrs: IMAGE_ATTRS,
                    },
                    Attr {
                        selector: "div.photo-620x465 picture img",
                        attrs: IMAGE_ATTRS,
                    },
                    Attr {
                        selector: ".gallery-order img",
                        attrs: IMAGE_ATTRS,
                    },
                    Attr {
                        selector: "meta[property='og:image']",
                        attrs: &["content"],
                    },
                ],
            ),
            plate_number: FieldPipeline::new(
                "plate_number",
                vec![
                    OwnText("span.state-num"),
                    AfterLabel {
                        label: "span.label",
                        needle: "Госномер",
                    },
                    AfterLabel {
                        label: "span.label",
                        needle: "Держномер",
                    },
                ],
            ),
            vin: FieldPipeline::new(
                "vin",
                vec![
                    Text("span.label-vin"),
                    Text(".vin-code"),
                    AfterLabel {
                        label: "span.label",
                        needle: "Номер кузова",
                    },
                    AfterLabel {
                        label: "span.label",
                        needle: "VIN",
                    },
                ],
            ),
            listing_id: FieldPipeline::new(
                "listing_id",
                vec![
                    Attr {
                        selector: "[data-auto-id]",
                        attrs: &["data-auto-id"],
                    },
                    Attr {
                        selector: "div[data-id]",
                        attrs: &["data-id"],
                    },
                ],
            ),
            photos: PhotoHeuristic::default(),
        }
    }
}

impl ListingExtractor {
    /// 从详情页正文提取房源
    ///
    /// # 参数
    ///
    /// * `body` - 详情页HTML
    /// * `url` - 详情页URL，用于解析相对路径和房源编号
    ///
    /// # 返回值
    ///
    /// * `Ok(ExtractedListing)` - 尽力提取的结果，缺失字段为 `None`
    /// * `Err(ExtractError)` - 正文无法构成文档
    pub fn extract(&self, body: &str, url: &str) -> Result<ExtractedListing, ExtractError> {
        if body.trim().is_empty() {
            return Err(ExtractError::EmptyDocument);
        }

        let document = Html::parse_document(body);
        if !has_content_elements(&document) {
            return Err(ExtractError::NotHtml);
        }

        let base = Url::parse(url).ok();
        let absolutize = |raw: String| match &base {
            Some(base) => resolve_url(base, &raw).map(String::from).unwrap_or(raw),
            None => raw,
        };

        let listing_id = listing_id_from_url(url).or_else(|| {
            self.listing_id
                .resolve(&document)
                .and_then(|raw| digits_only(&raw))
        });

        let extracted = ExtractedListing {
            source_url: url.to_string(),
            title: self.title.resolve(&document),
            price_usd: self
                .price
                .resolve(&document)
                .and_then(|raw| normalize_price(&raw)),
            odometer_km: self
                .odometer
                .resolve(&document)
                .and_then(|raw| normalize_odometer(&raw)),
            seller_name: self.seller.resolve(&document),
            image_url: self.main_image.resolve(&document).map(absolutize),
            image_count: count_photos(&document, &self.photos),
            plate_number: self.plate_number.resolve(&document),
            vin: self.vin.resolve(&document),
            listing_id,
            discovered_at: Utc::now(),
        };

        Ok(extracted)
    }
}

/// 规范化价格文本：去掉所有非数字字符，结果必须全部为数字
pub fn normalize_price(raw: &str) -> Option<i64> {
    digits_only(raw)?.parse::<i64>().ok()
}

/// 规范化里程文本
///
/// 把“千”单位替换为三个零，去掉单位后缀、点和空白后按整数解析；
/// 有任何非数字残留时返回 `None`
pub fn normalize_odometer(raw: &str) -> Option<i64> {
    let mut text = raw.to_lowercase();
    for marker in ["тыс.", "тис.", "тыс", "тис"] {
        text = text.replace(marker, "000");
    }
    for suffix in ["км", "km"] {
        text = text.replace(suffix, "");
    }

    let cleaned: String = text
        .chars()
        .filter(|c| *c != '.' && !c.is_whitespace())
        .collect();

    if cleaned.is_empty() || !cleaned.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    cleaned.parse::<i64>().ok()
}

/// 统计照片数量
///
/// 只统计来源匹配CDN标记且包含照片标记的图片
pub fn count_photos(doc: &Html, heuristic: &PhotoHeuristic) -> u32 {
    let Ok(selector) = Selector::parse("img") else {
        return 0;
    };

    let count = doc
        .select(&selector)
        .filter_map(|img| image_source(&img))
        .filter(|src| src.contains(&heuristic.cdn_marker) && src.contains(&heuristic.photo_marker))
        .count();

    u32::try_from(count).unwrap_or(u32::MAX)
}

fn image_source(img: &ElementRef) -> Option<String> {
    first_attr(img, IMAGE_ATTRS).filter(|src| !src.starts_with("data:"))
}

fn first_attr(el: &ElementRef, attrs: &[&str]) -> Option<String> {
    attrs
        .iter()
        .filter_map(|attr| el.value().attr(attr))
        .map(str::trim)
        .find(|value| !value.is_empty() && !value.starts_with("data:"))
        .map(str::to_string)
}

fn own_text(el: &ElementRef) -> String {
    el.children()
        .filter_map(|child| child.value().as_text())
        .map(|text| &**text)
        .collect()
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn value_after_label(doc: &Html, label_css: &str, needle: &str) -> Option<String> {
    let label_selector = Selector::parse(label_css).ok()?;
    let label = doc
        .select(&label_selector)
        .find(|el| own_text(el).contains(needle))?;

    let mut seen_label = false;
    for node in doc.root_element().descendants() {
        if node.id() == label.id() {
            seen_label = true;
            continue;
        }
        if !seen_label {
            continue;
        }
        let Some(el) = ElementRef::wrap(node) else {
            continue;
        };
        if el.value().name() != "span" {
            continue;
        }
        let text = collapse_whitespace(&el.text().collect::<String>());
        if !text.is_empty() {
            return Some(text);
        }
    }
    None
}

fn has_content_elements(doc: &Html) -> bool {
    doc.root_element()
        .descendants()
        .filter_map(ElementRef::wrap)
        .any(|el| !matches!(el.value().name(), "html" | "head" | "body"))
}

#[cfg(test)]
#[path = "extraction_service_test.rs"]
mod tests;
