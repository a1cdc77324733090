// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 仓库接口模块
///
/// 该模块定义了领域层依赖的外部协作者接口，具体实现由基础设施层提供：
/// - 源注册表（source_registry）：提供源列表并写回解析状态
/// - 缓存存储（cache_store）：持久缓存层的键值存储适配器
pub mod cache_store;
pub mod source_registry;
