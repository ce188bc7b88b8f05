// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use serde::{Deserialize, Serialize};

/// 抓取目标
///
/// 表示一个待抓取的工作单元：目标URL及其在输入列表中的
/// 序号。目标在运行开始时创建，派发后不再变更，且恰好
/// 被一个工作器消费。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Target {
    /// 在输入列表中的序号，决定输出表的最终行序
    pub ordinal: usize,
    /// 目标URL
    pub url: String,
}

impl Target {
    /// 创建新的抓取目标
    pub fn new(ordinal: usize, url: impl Into<String>) -> Self {
        Self {
            ordinal,
            url: url.into(),
        }
    }

    /// 从有序的URL列表构建目标序列
    ///
    /// 序号即URL在列表中的位置
    pub fn from_urls<I, S>(urls: I) -> Vec<Target>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        urls.into_iter()
            .enumerate()
            .map(|(ordinal, url)| Target::new(ordinal, url))
            .collect()
    }
}
