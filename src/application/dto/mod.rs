// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 数据传输对象模块
///
/// 定义聚合请求选项与聚合结果
pub mod aggregate_options;
pub mod aggregate_result;
