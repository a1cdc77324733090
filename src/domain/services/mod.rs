// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 领域服务模块
///
/// 包含的服务：
/// - 健康评分（health_scorer）：由状态、延迟与优先级计算源质量分
/// - 合并引擎（merge_engine）：父子合并与跨源合并两种策略
/// - 文档解析（document_parser）：容错解析、结构检查与子源发现
/// - 解析器（resolver）：带循环与深度保护的递归抓取
pub mod document_parser;
pub mod health_scorer;
pub mod merge_engine;
pub mod resolver;
