// Copyright 2025 Kirky.X
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::time::Duration;

use crate::extract::RuleConfig;

/// 应用程序配置设置
///
/// 包含抓取、并发、运行策略、输出和目标等所有配置项
#[derive(Debug, Deserialize)]
pub struct Settings {
    /// 抓取配置
    pub fetch: FetchSettings,
    /// 并发控制配置
    pub concurrency: ConcurrencySettings,
    /// 运行策略配置
    pub run: RunSettings,
    /// 输出配置
    pub output: OutputSettings,
    /// 目标列表配置
    pub targets: TargetSettings,
    /// 提取规则配置
    pub extraction: ExtractionSettings,
}

/// 抓取配置设置
#[derive(Debug, Deserialize)]
pub struct FetchSettings {
    /// 单次请求超时时间（秒）
    pub timeout_secs: u64,
    /// 瞬时失败的最大重试次数
    pub max_retries: u32,
    /// 初始退避时间（毫秒）
    pub initial_backoff_ms: u64,
    /// 最大退避时间（毫秒）
    pub max_backoff_ms: u64,
    /// 退避乘数
    pub backoff_multiplier: f64,
    /// User-Agent请求头
    pub user_agent: String,
}

impl FetchSettings {
    /// 请求超时时间
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// 并发控制配置设置
#[derive(Debug, Deserialize)]
pub struct ConcurrencySettings {
    /// 并发工作器数量，同时限制了对远端站点的在途请求数
    pub workers: usize,
}

/// 运行策略配置设置
#[derive(Debug, Deserialize)]
pub struct RunSettings {
    /// 失败率阈值 (0.0-1.0)，超过则中止整个运行
    pub failure_threshold: f64,
    /// 中止时是否仍写出已成功的记录
    pub keep_partial_on_abort: bool,
}

/// 输出配置设置
#[derive(Debug, Deserialize)]
pub struct OutputSettings {
    /// 输出CSV文件路径
    pub path: String,
    /// 去重所用的自然键字段名，None表示不去重
    pub dedup_field: Option<String>,
}

/// 目标列表配置设置
#[derive(Debug, Deserialize)]
pub struct TargetSettings {
    /// 有序的目标URL列表
    pub urls: Vec<String>,
}

/// 提取规则配置设置
#[derive(Debug, Deserialize)]
pub struct ExtractionSettings {
    /// 提取规则表，为空时使用内置的PBA球队方案
    pub rules: Vec<RuleConfig>,
}

impl Settings {
    /// 创建新的配置实例
    ///
    /// 从环境变量加载配置，支持默认值
    ///
    /// # Returns
    ///
    /// * `Ok(Settings)` - 成功加载的配置
    /// * `Err(ConfigError)` - 配置加载失败
    pub fn new() -> Result<Self, ConfigError> {
        let env = std::env::var("APP_ENVIRONMENT").unwrap_or_else(|_| "default".to_string());
        let builder = Config::builder()
            // Default fetch settings
            .set_default("fetch.timeout_secs", 10)?
            .set_default("fetch.max_retries", 3)?
            .set_default("fetch.initial_backoff_ms", 500)?
            .set_default("fetch.max_backoff_ms", 10_000)?
            .set_default("fetch.backoff_multiplier", 2.0)?
            .set_default(
                "fetch.user_agent",
                "Mozilla/5.0 (compatible; hooprs/0.1; +http://crawlrs.dev)",
            )?
            // Default concurrency settings
            .set_default("concurrency.workers", 4)?
            // Default run policy settings
            .set_default("run.failure_threshold", 0.2)?
            .set_default("run.keep_partial_on_abort", true)?
            // Default output settings
            .set_default("output.path", "teams.csv")?
            .set_default("output.dedup_field", "Team Name")?
            // Default target list (empty; supplied by file or env)
            .set_default("targets.urls", Vec::<String>::new())?
            .set_default("extraction.rules", Vec::<String>::new())?
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", env)).required(false))
            .add_source(Environment::with_prefix("HOOPRS").separator("__"));

        builder.build()?.try_deserialize()
    }
}
