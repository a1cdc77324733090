// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use sha2::{Digest, Sha256};
use std::collections::BTreeSet;
use validator::Validate;

use crate::domain::services::resolver::RecursionOverrides;

/// 缓存键前缀
pub const CACHE_KEY_PREFIX: &str = "aggregated:";

fn default_true() -> bool {
    true
}

/// 聚合选项
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct AggregateOptions {
    /// 最多保留的源数量（按优先级）
    #[validate(range(min = 1))]
    pub max_sources: Option<usize>,
    #[validate(range(max = 100))]
    pub min_priority: Option<u32>,
    #[serde(default)]
    pub exclude_failed: bool,
    /// 为空时不过滤
    #[serde(default)]
    pub include_tags: BTreeSet<String>,
    #[serde(default)]
    pub exclude_tags: BTreeSet<String>,
    #[serde(default = "default_true")]
    pub include_content: bool,
    #[serde(default = "default_true")]
    pub enable_recursive: bool,
    #[validate(range(max = 10))]
    pub max_depth_override: Option<u32>,
}

impl Default for AggregateOptions {
    fn default() -> Self {
        Self {
            max_sources: None,
            min_priority: None,
            exclude_failed: false,
            include_tags: BTreeSet::new(),
            exclude_tags: BTreeSet::new(),
            include_content: true,
            enable_recursive: true,
            max_depth_override: None,
        }
    }
}

impl AggregateOptions {
    pub fn recursion_overrides(&self) -> RecursionOverrides {
        RecursionOverrides {
            enable_recursive: self.enable_recursive,
            max_depth: self.max_depth_override,
        }
    }

    /// 由完整选项集计算缓存键，与字段顺序无关
    pub fn cache_key(&self) -> String {
        let value = serde_json::to_value(self).unwrap_or(Value::Null);
        format!("{}{}", CACHE_KEY_PREFIX, fingerprint(&value))
    }
}

/// 递归排序对象键，得到规范化的JSON
pub fn canonicalize(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();
            let mut sorted = Map::new();
            for key in keys {
                sorted.insert(key.clone(), canonicalize(&map[key]));
            }
            Value::Object(sorted)
        }
        Value::Array(items) => Value::Array(items.iter().map(canonicalize).collect()),
        other => other.clone(),
    }
}

/// 规范化JSON的 SHA-256 前16位十六进制
pub fn fingerprint(value: &Value) -> String {
    let canonical = canonicalize(value).to_string();
    let digest = Sha256::digest(canonical.as_bytes());
    let mut encoded = hex::encode(digest);
    encoded.truncate(16);
    encoded
}
