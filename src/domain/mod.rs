// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 领域层模块
///
/// 该模块包含系统的核心业务逻辑，包括：
/// - 领域模型（models）：源、配置文档、遍历上下文与解析结果
/// - 仓库接口（repositories）：源注册表与缓存存储的抽象接口
/// - 服务（services）：解析器、合并引擎与健康评分
///
/// 领域层不依赖于任何外部实现。
pub mod models;
pub mod repositories;
pub mod services;
