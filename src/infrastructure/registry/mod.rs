// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 源注册表实现
pub mod file_registry;
pub mod static_registry;
