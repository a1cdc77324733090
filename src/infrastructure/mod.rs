// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 基础设施层模块
///
/// 提供领域层接口的具体实现：
/// - 缓存（cache）：两层缓存管理器与存储适配器
/// - 注册表（registry）：源列表的文件与内存实现
/// - 指标（metrics）：Prometheus 导出
pub mod cache;
pub mod metrics;
pub mod registry;
