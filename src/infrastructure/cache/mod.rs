// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 缓存模块
///
/// 两层缓存：进程内内存层与可插拔的持久层（Redis或进程内存储）
pub mod cache_manager;
pub mod cache_sweeper;
pub mod memory_store;
pub mod redis_client;
