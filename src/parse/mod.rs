// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use scraper::{ElementRef, Html, Selector};
use thiserror::Error;

use crate::utils::text;

/// 解析错误类型
#[derive(Error, Debug)]
pub enum ParseError {
    /// 响应体为空或仅含空白，无法构成文档
    #[error("document body is empty")]
    EmptyDocument,
}

/// 解析后的页面
///
/// `scraper::Html` 的只读封装，提供按CSS选择器的节点选择。
/// 底层DOM不是Send的，因此解析和提取必须在同一个同步作用
/// 域内完成，不能跨越await点持有。
pub struct ParsedPage {
    document: Html,
}

/// 容错解析HTML
///
/// 页面不保证是良构的，解析器会尽量恢复残缺标记；只有
/// 完全为空的响应体才返回 `ParseError`。
pub fn parse(body: &str) -> Result<ParsedPage, ParseError> {
    if body.trim().is_empty() {
        return Err(ParseError::EmptyDocument);
    }
    Ok(ParsedPage {
        document: Html::parse_document(body),
    })
}

impl ParsedPage {
    /// 选择第一个匹配的元素
    pub fn select_first(&self, selector: &Selector) -> Option<ElementRef<'_>> {
        self.document.select(selector).next()
    }

    /// 所有匹配元素的合并文本
    ///
    /// 每个元素下的文本节点去空白后以单个空格连接；
    /// 没有任何匹配时返回None。
    pub fn text_of(&self, selector: &Selector) -> Option<String> {
        let mut matched = false;
        let mut fragments: Vec<&str> = Vec::new();
        for element in self.document.select(selector) {
            matched = true;
            fragments.extend(element.text());
        }
        if !matched {
            return None;
        }
        Some(text::join_fragments(fragments))
    }

    /// 第一个匹配元素的属性值
    pub fn attr_of(&self, selector: &Selector, attr: &str) -> Option<String> {
        self.select_first(selector)
            .and_then(|element| element.value().attr(attr))
            .map(|value| value.trim().to_string())
    }
}
