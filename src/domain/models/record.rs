// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use serde::{Deserialize, Serialize};

/// 页面记录
///
/// 从单个页面提取出的一行输出数据。字段值与提取方案的
/// 固定字段顺序一一对应，因此所有记录共享同一套列。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRecord {
    /// 来源目标的序号
    pub ordinal: usize,
    /// 来源目标的URL
    pub url: String,
    /// 按方案字段顺序排列的提取值
    pub values: Vec<String>,
}

/// 结果集
///
/// 按目标序号排列、去重后的记录序列，以及与之对应的
/// 固定字段名表头。每个序号至多出现一次；失败的目标
/// 在此留空，由运行报告单独记录。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultSet {
    fields: Vec<String>,
    records: Vec<PageRecord>,
}

impl ResultSet {
    /// 创建结果集
    ///
    /// `records` 必须已按序号排列并完成去重，该不变量由
    /// 聚合器的finalize流程保证。
    pub fn new(fields: Vec<String>, records: Vec<PageRecord>) -> Self {
        Self { fields, records }
    }

    /// 表头字段名
    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    /// 记录序列（序号升序）
    pub fn records(&self) -> &[PageRecord] {
        &self.records
    }

    /// 记录数量
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// 结果集是否为空
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
