use regex::Regex;
use scraper::Selector;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

use crate::parse::ParsedPage;

/// 提取规则
///
/// 宽松的、可从配置文件反序列化的规则描述。在运行开始前
/// 由 [`ExtractionPlan::compile`] 编译并校验为强类型规则表。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleConfig {
    /// 输出字段名，同时作为CSV表头
    pub field: String,
    /// CSS选择器；仅当 `from_url` 为true时可省略
    #[serde(default)]
    pub selector: Option<String>,
    /// 要读取的属性名；为None时提取元素文本
    #[serde(default)]
    pub attr: Option<String>,
    /// 后处理正则；有捕获组时取第一组，否则取整个匹配
    #[serde(default)]
    pub pattern: Option<String>,
    /// 值映射表；提取值经查表替换，未命中则置空
    #[serde(default)]
    pub lookup: Option<HashMap<String, String>>,
    /// 字段值取目标URL本身而非文档内容
    #[serde(default)]
    pub from_url: bool,
    /// 是否必需；必需字段为空时该页面提取失败
    #[serde(default)]
    pub required: bool,
}

/// 方案编译错误类型
#[derive(Error, Debug)]
pub enum PlanError {
    /// 规则表为空
    #[error("extraction plan has no rules")]
    Empty,
    /// 字段名重复
    #[error("duplicate field name: {0}")]
    DuplicateField(String),
    /// 规则既无选择器也不取URL
    #[error("field {0} has no selector and is not from_url")]
    MissingSelector(String),
    /// 选择器无法解析
    #[error("invalid selector for field {field}: {selector}")]
    InvalidSelector {
        /// 字段名
        field: String,
        /// 原始选择器文本
        selector: String,
    },
    /// 正则无法编译
    #[error("invalid pattern for field {field}: {source}")]
    InvalidPattern {
        /// 字段名
        field: String,
        /// 正则编译错误
        source: regex::Error,
    },
}

/// 提取错误类型
#[derive(Error, Debug)]
pub enum ExtractError {
    /// 必需字段未找到或为空
    #[error("required field not found: {0}")]
    MissingField(String),
}

/// 字段值来源
enum ValueSource {
    /// 匹配元素的合并文本
    Text(Selector),
    /// 第一个匹配元素的属性
    Attr(Selector, String),
    /// 目标URL本身
    TargetUrl,
}

/// 编译后的提取规则
struct CompiledRule {
    field: String,
    source: ValueSource,
    pattern: Option<Regex>,
    lookup: Option<HashMap<String, String>>,
    required: bool,
}

/// 提取方案
///
/// 固定有序的规则表，每条规则对应一个输出字段。选择器和
/// 正则在启动时编译校验，因此对同一文档的提取是纯函数，
/// 与并发调度顺序无关。
pub struct ExtractionPlan {
    rules: Vec<CompiledRule>,
    fields: Vec<String>,
}

impl ExtractionPlan {
    /// 编译并校验规则表
    ///
    /// # 参数
    ///
    /// * `rules` - 来自配置或内置站点方案的规则描述
    ///
    /// # 返回值
    ///
    /// * `Ok(ExtractionPlan)` - 编译后的方案
    /// * `Err(PlanError)` - 规则表非法，运行应以致命配置错误结束
    pub fn compile(rules: Vec<RuleConfig>) -> Result<Self, PlanError> {
        if rules.is_empty() {
            return Err(PlanError::Empty);
        }

        let mut compiled = Vec::with_capacity(rules.len());
        let mut fields = Vec::with_capacity(rules.len());

        for rule in rules {
            if fields.contains(&rule.field) {
                return Err(PlanError::DuplicateField(rule.field));
            }

            let source = if rule.from_url {
                ValueSource::TargetUrl
            } else {
                let selector_str = rule
                    .selector
                    .as_deref()
                    .ok_or_else(|| PlanError::MissingSelector(rule.field.clone()))?;
                let selector =
                    Selector::parse(selector_str).map_err(|_| PlanError::InvalidSelector {
                        field: rule.field.clone(),
                        selector: selector_str.to_string(),
                    })?;
                match rule.attr {
                    Some(attr) => ValueSource::Attr(selector, attr),
                    None => ValueSource::Text(selector),
                }
            };

            let pattern = match rule.pattern {
                Some(pattern) => {
                    Some(
                        Regex::new(&pattern).map_err(|source| PlanError::InvalidPattern {
                            field: rule.field.clone(),
                            source,
                        })?,
                    )
                }
                None => None,
            };

            fields.push(rule.field.clone());
            compiled.push(CompiledRule {
                field: rule.field,
                source,
                pattern,
                lookup: rule.lookup,
                required: rule.required,
            });
        }

        Ok(Self {
            rules: compiled,
            fields,
        })
    }

    /// 输出字段名，顺序即CSV列序
    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    /// 按字段名查找列下标
    pub fn field_index(&self, field: &str) -> Option<usize> {
        self.fields.iter().position(|f| f == field)
    }

    /// 从文档中提取一行记录
    ///
    /// 按规则顺序逐字段求值。可选字段缺失得到空串；必需
    /// 字段缺失返回 `ExtractError`，该失败不会被重试。
    ///
    /// # 参数
    ///
    /// * `page` - 解析后的页面
    /// * `target_url` - 来源目标URL，供 `from_url` 规则使用
    ///
    /// # 返回值
    ///
    /// * `Ok(Vec<String>)` - 与 [`fields`](Self::fields) 对齐的字段值
    /// * `Err(ExtractError)` - 必需字段缺失
    pub fn extract(
        &self,
        page: &ParsedPage,
        target_url: &str,
    ) -> Result<Vec<String>, ExtractError> {
        let mut values = Vec::with_capacity(self.rules.len());

        for rule in &self.rules {
            let raw = match &rule.source {
                ValueSource::TargetUrl => Some(target_url.to_string()),
                ValueSource::Text(selector) => page.text_of(selector),
                ValueSource::Attr(selector, attr) => page.attr_of(selector, attr),
            };
            let mut value = raw.unwrap_or_default();

            if let Some(pattern) = &rule.pattern {
                // A non-matching pattern leaves the raw value untouched
                if let Some(captures) = pattern.captures(&value) {
                    let matched = captures
                        .get(1)
                        .or_else(|| captures.get(0))
                        .map(|m| m.as_str().trim().to_string())
                        .unwrap_or_default();
                    value = matched;
                }
            }

            if let Some(lookup) = &rule.lookup {
                value = lookup.get(&value).cloned().unwrap_or_default();
            }

            if rule.required && value.is_empty() {
                return Err(ExtractError::MissingField(rule.field.clone()));
            }

            values.push(value);
        }

        Ok(values)
    }
}
