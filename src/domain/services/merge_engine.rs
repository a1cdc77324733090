// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

//! 配置文档合并
//!
//! 两种策略刻意不同，不能合并为一个：
//! - [`merge_children_into_parent`]：递归子源回填父文档，后写覆盖
//! - [`merge_sources`]：跨源聚合，按优先级降序先写保留

use std::collections::HashMap;

use crate::domain::models::document::{ConfigDocument, Entry, Section, SpiderRef};

/// 按去重键保持插入顺序的条目集合
struct KeyedEntries {
    section: Section,
    entries: Vec<Entry>,
    index: HashMap<String, usize>,
}

impl KeyedEntries {
    fn new(section: Section) -> Self {
        Self {
            section,
            entries: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// 写入条目；已存在的键原位覆盖。没有去重键的条目被丢弃
    fn overwrite(&mut self, entry: Entry) {
        let Some(key) = self.section.dedup_key(&entry).map(str::to_string) else {
            return;
        };
        match self.index.get(&key) {
            Some(&pos) => self.entries[pos] = entry,
            None => {
                self.index.insert(key, self.entries.len());
                self.entries.push(entry);
            }
        }
    }

    /// 仅在键未出现时写入
    fn insert_if_absent(&mut self, entry: Entry) {
        let Some(key) = self.section.dedup_key(&entry).map(str::to_string) else {
            return;
        };
        if !self.index.contains_key(&key) {
            self.index.insert(key, self.entries.len());
            self.entries.push(entry);
        }
    }

    fn into_entries(self) -> Vec<Entry> {
        self.entries
    }
}

fn push_unique(values: &mut Vec<String>, candidate: &str) {
    let candidate = candidate.trim();
    if !candidate.is_empty() && !values.iter().any(|v| v == candidate) {
        values.push(candidate.to_string());
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// 子源合并入父文档（后写覆盖）
///
/// 先写入父文档自己的条目，再按发现顺序依次写入每个子文档，
/// 同键条目被后者覆盖但保留首次出现的位置。
/// `spider` 合并为去重列表；`wallpaper` 取第一个提供者的值，没有则保留父值。
pub fn merge_children_into_parent(
    parent: ConfigDocument,
    children: Vec<ConfigDocument>,
) -> ConfigDocument {
    let mut sections: Vec<KeyedEntries> = Section::ALL.iter().map(|s| KeyedEntries::new(*s)).collect();
    let mut spiders: Vec<String> = Vec::new();

    let ConfigDocument {
        sites,
        lives,
        parses,
        spider,
        wallpaper,
    } = parent;
    for (slot, entries) in sections.iter_mut().zip([sites, lives, parses]) {
        entries.into_iter().for_each(|entry| slot.overwrite(entry));
    }
    if let Some(spider) = &spider {
        spider.values().into_iter().for_each(|v| push_unique(&mut spiders, v));
    }

    let mut child_wallpaper: Option<String> = None;
    for child in children {
        let ConfigDocument {
            sites,
            lives,
            parses,
            spider,
            wallpaper,
        } = child;
        for (slot, entries) in sections.iter_mut().zip([sites, lives, parses]) {
            entries.into_iter().for_each(|entry| slot.overwrite(entry));
        }
        if let Some(spider) = &spider {
            spider.values().into_iter().for_each(|v| push_unique(&mut spiders, v));
        }
        if child_wallpaper.is_none() {
            child_wallpaper = non_empty(wallpaper);
        }
    }

    let mut merged = sections.into_iter().map(KeyedEntries::into_entries);
    ConfigDocument {
        sites: merged.next().unwrap_or_default(),
        lives: merged.next().unwrap_or_default(),
        parses: merged.next().unwrap_or_default(),
        spider: SpiderRef::from_list(spiders),
        wallpaper: child_wallpaper.or_else(|| non_empty(wallpaper)),
    }
}

/// 跨源聚合（先写保留）
///
/// `documents` 必须按源优先级降序排列；同键条目保留优先级最高者。
/// `spider`/`wallpaper` 取遇到的第一个非空值。
pub fn merge_sources(documents: Vec<ConfigDocument>) -> ConfigDocument {
    let mut sections: Vec<KeyedEntries> = Section::ALL.iter().map(|s| KeyedEntries::new(*s)).collect();
    let mut spider: Option<SpiderRef> = None;
    let mut wallpaper: Option<String> = None;

    for document in documents {
        let ConfigDocument {
            sites,
            lives,
            parses,
            spider: doc_spider,
            wallpaper: doc_wallpaper,
        } = document;
        for (slot, entries) in sections.iter_mut().zip([sites, lives, parses]) {
            entries.into_iter().for_each(|entry| slot.insert_if_absent(entry));
        }
        if spider.is_none() {
            spider = doc_spider.filter(|s| !s.is_empty());
        }
        if wallpaper.is_none() {
            wallpaper = non_empty(doc_wallpaper);
        }
    }

    let mut merged = sections.into_iter().map(KeyedEntries::into_entries);
    ConfigDocument {
        sites: merged.next().unwrap_or_default(),
        lives: merged.next().unwrap_or_default(),
        parses: merged.next().unwrap_or_default(),
        spider,
        wallpaper,
    }
}
