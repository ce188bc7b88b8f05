// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 领域模型模块
///
/// 该模块定义了系统的核心业务实体，包括：
/// - 抓取目标（target）：一个URL及其在输入列表中的序号
/// - 页面记录（record）：从单个页面提取出的一行数据
/// - 运行报告（report）：一次运行的成功与失败统计
///
/// 这些模型构成了抓取管线的数据基础：目标进入队列，
/// 记录和失败汇聚到聚合器，报告在运行结束时持久化为日志。
pub mod record;
pub mod report;
pub mod target;
