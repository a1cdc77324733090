// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

//! 响应正文到配置文档的解析与子源发现

use serde_json::{Map, Value};
use tracing::debug;
use url::Url;

use crate::domain::models::document::{ConfigDocument, Entry, Section, SpiderRef};
use crate::domain::models::resolution::ResolveError;
use crate::utils::json_utils::parse_tolerant;
use crate::utils::url_utils::{is_absolute_http_url, normalize_url, resolve_url};

const KNOWN_FIELDS: [&str; 5] = ["sites", "lives", "parses", "spider", "wallpaper"];

/// 多仓索引中的一项
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexEntry {
    pub name: String,
    pub url: String,
}

/// 解析后的正文
#[derive(Debug, Clone, PartialEq)]
pub enum ParsedBody {
    /// 多仓索引：每项都是独立的子源
    Index(Vec<IndexEntry>),
    /// 普通配置文档
    Document {
        document: ConfigDocument,
        /// 是否通过结构检查
        healthy: bool,
    },
}

/// 解析正文
///
/// 先严格解析，失败后清理BOM、注释与尾随逗号再试。
/// 两次都失败，或顶层既不是对象也不是索引数组时返回 `Malformed`。
pub fn parse_body(url: &str, body: &str) -> Result<ParsedBody, ResolveError> {
    let value = parse_tolerant(body).map_err(|e| ResolveError::Malformed {
        url: url.to_string(),
        reason: e.to_string(),
    })?;

    match value {
        Value::Array(items) => {
            let entries = index_entries(url, &items);
            if entries.is_empty() {
                return Err(ResolveError::Malformed {
                    url: url.to_string(),
                    reason: "array body without {name, url} entries".to_string(),
                });
            }
            Ok(ParsedBody::Index(entries))
        }
        Value::Object(map) => {
            if let Some(Value::Array(items)) = map.get("urls") {
                if !KNOWN_FIELDS.iter().any(|f| map.contains_key(*f)) {
                    let entries = index_entries(url, items);
                    if !entries.is_empty() {
                        return Ok(ParsedBody::Index(entries));
                    }
                }
            }
            let spider_is_string = matches!(map.get("spider"), Some(Value::String(_)));
            let document = document_from_map(map);
            let healthy = is_healthy_shape(&document, spider_is_string);
            Ok(ParsedBody::Document { document, healthy })
        }
        other => Err(ResolveError::Malformed {
            url: url.to_string(),
            reason: format!("unexpected top-level {}", json_type(&other)),
        }),
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// 结构检查：过滤后至少有一个非空的 `sites`/`lives`/`parses`，
/// 或原始正文中为字符串的 `spider`，或非空 `wallpaper`
///
/// 只统计带去重键的条目，全是无键条目的集合不算内容
pub fn is_healthy_shape(document: &ConfigDocument, spider_is_string: bool) -> bool {
    let has_entries = Section::ALL
        .iter()
        .any(|section| !document.section(*section).is_empty());
    has_entries || (spider_is_string && document.spider.is_some()) || document.wallpaper.is_some()
}

/// 从JSON对象构造文档
///
/// 只保留五个已知字段；集合元素必须是带去重键的对象
pub fn document_from_map(mut map: Map<String, Value>) -> ConfigDocument {
    let mut document = ConfigDocument::default();

    for section in Section::ALL {
        let Some(Value::Array(items)) = map.remove(section.field_name()) else {
            continue;
        };
        let total = items.len();
        let entries: Vec<Entry> = items
            .into_iter()
            .filter_map(Entry::from_value)
            .filter(|entry| section.dedup_key(entry).is_some())
            .collect();
        if entries.len() < total {
            debug!(
                section = section.field_name(),
                dropped = total - entries.len(),
                "Dropped entries without a dedup key"
            );
        }
        *document.section_mut(section) = entries;
    }

    document.spider = match map.remove("spider") {
        Some(Value::String(s)) if !s.trim().is_empty() => Some(SpiderRef::Single(s)),
        Some(Value::Array(items)) => SpiderRef::from_list(
            items
                .into_iter()
                .filter_map(|v| match v {
                    Value::String(s) if !s.trim().is_empty() => Some(s),
                    _ => None,
                })
                .collect(),
        ),
        _ => None,
    };

    document.wallpaper = match map.remove("wallpaper") {
        Some(Value::String(s)) if !s.trim().is_empty() => Some(s),
        _ => None,
    };

    document
}

fn index_entries(base: &str, items: &[Value]) -> Vec<IndexEntry> {
    let base_url = Url::parse(base).ok();
    items
        .iter()
        .filter_map(|item| {
            let name = item.get("name")?.as_str()?.trim();
            let raw = item.get("url")?.as_str()?.trim();
            if name.is_empty() || raw.is_empty() {
                return None;
            }
            let url = if is_absolute_http_url(raw) {
                raw.to_string()
            } else {
                let joined = resolve_url(base_url.as_ref()?, raw).ok()?;
                joined.to_string()
            };
            Some(IndexEntry {
                name: name.to_string(),
                url,
            })
        })
        .collect()
}

/// 发现子源
///
/// 来源为 `spider` 引用与 `sites[].ext` 字符串；只接受绝对 http(s) URL，
/// 相对引用被忽略。结果按规范化形式去重并保持出现顺序。
pub fn discover_subsources(document: &ConfigDocument) -> Vec<String> {
    let spider_refs = document
        .spider
        .as_ref()
        .map(SpiderRef::values)
        .unwrap_or_default();
    let ext_refs = document
        .sites
        .iter()
        .filter_map(|site| site.get("ext").and_then(Value::as_str));

    let mut seen = std::collections::HashSet::new();
    spider_refs
        .into_iter()
        .chain(ext_refs)
        .map(str::trim)
        .filter(|candidate| is_absolute_http_url(candidate))
        .filter(|candidate| seen.insert(normalize_url(candidate)))
        .map(str::to_string)
        .collect()
}
