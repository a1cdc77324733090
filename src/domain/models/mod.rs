// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 领域模型模块
///
/// 该模块定义了系统的核心业务实体，包括：
/// - 配置源（source）：注册的配置源及其健康状态
/// - 配置文档（document）：站点、直播、解析等配置的值类型
/// - 遍历上下文（traversal）：单次根解析的循环与深度保护
/// - 解析结果（resolution）：解析结果与错误分类
pub mod document;
pub mod resolution;
pub mod source;
pub mod traversal;
