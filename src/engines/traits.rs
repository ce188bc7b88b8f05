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

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

use crate::domain::models::report::FailureKind;
use crate::domain::models::target::Target;

/// 抓取错误类型
#[derive(Error, Debug)]
pub enum FetchError {
    /// 请求失败
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    /// 超时
    #[error("request timed out after {0:?}")]
    Timeout(Duration),
    /// 服务端错误状态 (5xx)
    #[error("server returned HTTP {0}")]
    ServerStatus(u16),
    /// 客户端错误状态 (4xx)
    #[error("request rejected with HTTP {0}")]
    ClientStatus(u16),
    /// 非法URL
    #[error("invalid target url: {0}")]
    InvalidUrl(String),
}

impl FetchError {
    /// 判断错误是否可重试
    ///
    /// # 返回值
    ///
    /// 如果错误是可重试的则返回true，否则返回false
    pub fn is_retryable(&self) -> bool {
        match self {
            FetchError::Request(e) => {
                e.is_timeout() || e.is_connect() || e.status().is_some_and(|s| s.is_server_error())
            }
            FetchError::Timeout(_) => true,
            FetchError::ServerStatus(_) => true,
            FetchError::ClientStatus(_) => false,
            FetchError::InvalidUrl(_) => false,
        }
    }

    /// 映射到运行报告中的失败类别
    ///
    /// 可重试错误在重试耗尽后降级为已记录的瞬时网络失败
    pub fn failure_kind(&self) -> FailureKind {
        if self.is_retryable() {
            FailureKind::TransientNetwork
        } else {
            FailureKind::PermanentRequest
        }
    }
}

/// 抓取到的页面
#[derive(Debug)]
pub struct FetchedPage {
    /// HTTP状态码
    pub status: u16,
    /// 响应体文本
    pub body: String,
}

/// 页面抓取器特质
///
/// 核心管线通过该接口消费HTTP能力，生产实现基于reqwest，
/// 测试中以确定性桩实现替换。
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// 对单个目标执行一次HTTP GET
    async fn fetch(&self, target: &Target) -> Result<FetchedPage, FetchError>;
}
