// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use std::collections::HashSet;

use crate::domain::models::resolution::ResolveError;
use crate::utils::url_utils::normalize_url;

/// 单次根解析的有效递归设置
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TraversalSettings {
    pub recursive: bool,
    pub max_depth: u32,
}

impl TraversalSettings {
    /// 当前深度的节点是否允许继续展开子源
    pub fn allows_descent(&self, current_depth: u32) -> bool {
        self.recursive && current_depth < self.max_depth
    }
}

/// 遍历上下文
///
/// 采用分支拷贝：每个子分支拿到父节点已访问集合的快照，
/// 兄弟分支之间互不干扰。代价是不同分支可能重复抓取同一URL。
#[derive(Debug, Clone)]
pub struct TraversalContext {
    visited_urls: HashSet<String>,
    path: Vec<String>,
    current_depth: u32,
    settings: TraversalSettings,
}

impl TraversalContext {
    pub fn new(settings: TraversalSettings) -> Self {
        Self {
            visited_urls: HashSet::new(),
            path: Vec::new(),
            current_depth: 0,
            settings,
        }
    }

    /// 占用URL；同一路径上已出现过的URL返回循环引用错误
    pub fn claim(&mut self, url: &str) -> Result<(), ResolveError> {
        let normalized = normalize_url(url);
        if !self.visited_urls.insert(normalized) {
            return Err(ResolveError::CircularReference {
                url: url.to_string(),
                path: self.path.clone(),
            });
        }
        self.path.push(url.to_string());
        Ok(())
    }

    /// 为子节点生成上下文快照，深度加一
    pub fn descend(&self) -> Self {
        let mut child = self.clone();
        child.current_depth += 1;
        child
    }

    pub fn path(&self) -> &[String] {
        &self.path
    }

    pub fn current_depth(&self) -> u32 {
        self.current_depth
    }

    pub fn settings(&self) -> TraversalSettings {
        self.settings
    }
}
