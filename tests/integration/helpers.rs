// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use hooprs::domain::models::target::Target;
use hooprs::engines::traits::{FetchError, FetchedPage, PageFetcher};
use hooprs::extract::{ExtractionPlan, RuleConfig};
use hooprs::utils::retry_policy::RetryPolicy;

/// 单次抓取的脚本化响应
#[derive(Clone)]
pub enum Scripted {
    /// 成功返回给定页面
    Page(String),
    /// 瞬时失败 (HTTP 503)
    Transient,
    /// 永久失败 (HTTP 404)
    Permanent,
}

/// 确定性的桩抓取器
///
/// 每个URL配置一串响应，逐次消费；只剩最后一个时重复
/// 返回它。没有网络，没有时序依赖，运行结果完全由脚本
/// 决定。
pub struct ScriptedFetcher {
    scripts: Mutex<HashMap<String, VecDeque<Scripted>>>,
    pub calls: AtomicU32,
}

impl ScriptedFetcher {
    pub fn new() -> Self {
        Self {
            scripts: Mutex::new(HashMap::new()),
            calls: AtomicU32::new(0),
        }
    }

    pub fn script(self, url: &str, responses: Vec<Scripted>) -> Self {
        self.scripts
            .lock()
            .unwrap()
            .insert(url.to_string(), responses.into());
        self
    }

    pub fn total_calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PageFetcher for ScriptedFetcher {
    async fn fetch(&self, target: &Target) -> Result<FetchedPage, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let mut scripts = self.scripts.lock().unwrap();
        let queue = scripts
            .get_mut(&target.url)
            .unwrap_or_else(|| panic!("no script for {}", target.url));
        let next = if queue.len() > 1 {
            queue.pop_front().unwrap()
        } else {
            queue.front().cloned().expect("script exhausted")
        };
        match next {
            Scripted::Page(body) => Ok(FetchedPage { status: 200, body }),
            Scripted::Transient => Err(FetchError::ServerStatus(503)),
            Scripted::Permanent => Err(FetchError::ClientStatus(404)),
        }
    }
}

/// 最小的两字段提取方案：必需的名称和可选的备注
pub fn name_plan() -> Arc<ExtractionPlan> {
    let name = RuleConfig {
        field: "Name".to_string(),
        selector: Some("h3".to_string()),
        attr: None,
        pattern: None,
        lookup: None,
        from_url: false,
        required: true,
    };
    let note = RuleConfig {
        field: "Note".to_string(),
        selector: Some("p".to_string()),
        attr: None,
        pattern: None,
        lookup: None,
        from_url: false,
        required: false,
    };
    Arc::new(ExtractionPlan::compile(vec![name, note]).unwrap())
}

/// 构造符合 name_plan 的页面
pub fn team_page(name: &str, note: &str) -> String {
    format!(
        "<html><body><div class=\"row\"><h3>{}</h3><p>{}</p></div></body></html>",
        name, note
    )
}

/// 零退避的重试策略，保证测试即时完成
pub fn instant_policy(max_retries: u32) -> RetryPolicy {
    RetryPolicy {
        max_retries,
        initial_backoff: Duration::ZERO,
        max_backoff: Duration::ZERO,
        backoff_multiplier: 1.0,
        jitter_factor: 0.0,
        exponential_backoff: false,
        enable_jitter: false,
    }
}

/// 生成 n 个确定性的测试URL
pub fn test_urls(n: usize) -> Vec<String> {
    (0..n)
        .map(|i| format!("https://stats.test/teams/{}", i))
        .collect()
}
