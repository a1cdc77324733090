// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// 配置条目（站点、直播或解析）
///
/// 保留原始对象的全部字段，只对去重键做类型化访问
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Entry(Map<String, Value>);

impl Entry {
    /// 从JSON值构造条目，非对象返回 `None`
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Object(fields) => Some(Self(fields)),
            _ => None,
        }
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    /// 获取非空字符串字段
    pub fn str_field(&self, field: &str) -> Option<&str> {
        self.0
            .get(field)
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    pub fn name(&self) -> Option<&str> {
        self.str_field("name")
    }
}

/// 配置中的集合字段
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    Sites,
    Lives,
    Parses,
}

impl Section {
    pub const ALL: [Section; 3] = [Section::Sites, Section::Lives, Section::Parses];

    pub fn field_name(&self) -> &'static str {
        match self {
            Section::Sites => "sites",
            Section::Lives => "lives",
            Section::Parses => "parses",
        }
    }

    /// 去重键：站点使用 `key`（缺省时退回 `name`），直播与解析使用 `name`
    pub fn dedup_key<'a>(&self, entry: &'a Entry) -> Option<&'a str> {
        match self {
            Section::Sites => entry.str_field("key").or_else(|| entry.name()),
            Section::Lives | Section::Parses => entry.name(),
        }
    }
}

/// spider 引用：单个或列表
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SpiderRef {
    Single(String),
    Many(Vec<String>),
}

impl SpiderRef {
    pub fn values(&self) -> Vec<&str> {
        match self {
            SpiderRef::Single(value) => vec![value.as_str()],
            SpiderRef::Many(values) => values.iter().map(String::as_str).collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.values().iter().all(|v| v.trim().is_empty())
    }

    /// 由去重后的列表构造；单个值保持标量形式
    pub fn from_list(mut values: Vec<String>) -> Option<Self> {
        match values.len() {
            0 => None,
            1 => values.pop().map(SpiderRef::Single),
            _ => Some(SpiderRef::Many(values)),
        }
    }
}

/// TVBox 配置文档
///
/// 只保留五个已知的顶层字段，未知字段在解析时丢弃。
/// 文档是值类型，合并时总是生成新文档。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConfigDocument {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sites: Vec<Entry>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub lives: Vec<Entry>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parses: Vec<Entry>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spider: Option<SpiderRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wallpaper: Option<String>,
}

impl ConfigDocument {
    pub fn section(&self, section: Section) -> &[Entry] {
        match section {
            Section::Sites => &self.sites,
            Section::Lives => &self.lives,
            Section::Parses => &self.parses,
        }
    }

    pub fn section_mut(&mut self, section: Section) -> &mut Vec<Entry> {
        match section {
            Section::Sites => &mut self.sites,
            Section::Lives => &mut self.lives,
            Section::Parses => &mut self.parses,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.sites.is_empty()
            && self.lives.is_empty()
            && self.parses.is_empty()
            && self.spider.as_ref().is_none_or(SpiderRef::is_empty)
            && self.wallpaper.as_deref().is_none_or(|w| w.trim().is_empty())
    }

    pub fn entry_count(&self) -> usize {
        self.sites.len() + self.lives.len() + self.parses.len()
    }

    /// 按去重键查找条目
    pub fn find(&self, section: Section, key: &str) -> Option<&Entry> {
        self.section(section)
            .iter()
            .find(|entry| section.dedup_key(entry) == Some(key))
    }
}
