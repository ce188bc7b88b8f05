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
use url::Url;

use crate::domain::models::target::Target;
use crate::engines::traits::{FetchError, FetchedPage, PageFetcher};

/// 抓取引擎
///
/// 基于reqwest实现的页面抓取器。客户端实例在运行开始时
/// 构建并注入，整个运行共享同一个连接池，不持有跨运行的
/// 全局会话状态。
pub struct ReqwestFetcher {
    client: reqwest::Client,
    timeout: Duration,
}

impl ReqwestFetcher {
    /// 创建新的抓取器实例
    ///
    /// # 参数
    ///
    /// * `client` - 运行范围内共享的HTTP客户端
    /// * `timeout` - 单次请求的超时时间
    pub fn new(client: reqwest::Client, timeout: Duration) -> Self {
        Self { client, timeout }
    }
}

#[async_trait]
impl PageFetcher for ReqwestFetcher {
    /// 执行HTTP抓取
    ///
    /// # 参数
    ///
    /// * `target` - 抓取目标
    ///
    /// # 返回值
    ///
    /// * `Ok(FetchedPage)` - 响应状态与正文
    /// * `Err(FetchError)` - 超时、连接失败或非2xx状态
    async fn fetch(&self, target: &Target) -> Result<FetchedPage, FetchError> {
        // Reject malformed URLs before issuing a request; retrying cannot help
        let url = Url::parse(&target.url)
            .map_err(|e| FetchError::InvalidUrl(format!("{}: {}", target.url, e)))?;

        let response = match self
            .client
            .get(url)
            .timeout(self.timeout)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) if e.is_timeout() => return Err(FetchError::Timeout(self.timeout)),
            Err(e) => return Err(e.into()),
        };

        let status = response.status();
        if status.is_client_error() {
            return Err(FetchError::ClientStatus(status.as_u16()));
        }
        if status.is_server_error() {
            return Err(FetchError::ServerStatus(status.as_u16()));
        }

        let body = response.text().await?;

        Ok(FetchedPage {
            status: status.as_u16(),
            body,
        })
    }
}
