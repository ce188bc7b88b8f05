// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 将多个文本片段合并为规范化的单行文本
///
/// 每个片段去除首尾空白，丢弃空片段，其余以单个空格连接。
/// 用于将DOM节点下分散的文本节点拼成一个字段值。
pub fn join_fragments<'a, I>(fragments: I) -> String
where
    I: IntoIterator<Item = &'a str>,
{
    let mut out = String::new();
    for fragment in fragments {
        let trimmed = fragment.trim();
        if trimmed.is_empty() {
            continue;
        }
        if !out.is_empty() {
            out.push(' ');
        }
        out.push_str(trimmed);
    }
    out
}

/// 压缩字符串内部的空白
///
/// 连续的空白字符（包括换行）折叠为单个空格
pub fn normalize_ws(input: &str) -> String {
    join_fragments(input.split_whitespace())
}
