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

use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use tracing::{debug, info, instrument};

use crate::aggregate::aggregator::Submission;
use crate::domain::models::record::PageRecord;
use crate::domain::models::report::{FailureKind, TargetFailure};
use crate::domain::models::target::Target;
use crate::engines::retry::fetch_with_retry;
use crate::engines::traits::PageFetcher;
use crate::extract::ExtractionPlan;
use crate::parse;
use crate::queue::work_queue::WorkQueue;
use crate::utils::retry_policy::RetryPolicy;

/// 抓取工作器
///
/// 在独立任务中循环执行：出队目标，抓取（含重试），解析，
/// 提取，把结果或失败提交给聚合器。工作器之间只共享输入
/// 队列和提交通道，互不持有可变状态。
pub struct ScrapeWorker<F>
where
    F: PageFetcher + ?Sized,
{
    fetcher: Arc<F>,
    plan: Arc<ExtractionPlan>,
    policy: RetryPolicy,
    worker_id: usize,
}

impl<F> ScrapeWorker<F>
where
    F: PageFetcher + ?Sized,
{
    /// 创建新的抓取工作器实例
    pub fn new(
        fetcher: Arc<F>,
        plan: Arc<ExtractionPlan>,
        policy: RetryPolicy,
        worker_id: usize,
    ) -> Self {
        Self {
            fetcher,
            plan,
            policy,
            worker_id,
        }
    }

    /// 运行工作器循环
    ///
    /// 队列取空或收到中止信号后退出。提交通道关闭意味着
    /// 聚合器已不在，同样退出。
    pub async fn run(
        self,
        queue: Arc<WorkQueue>,
        tx: mpsc::Sender<Submission>,
        abort: watch::Receiver<bool>,
    ) {
        info!(worker_id = self.worker_id, "Scrape worker started");

        loop {
            // Abort stops further dequeuing; the target currently being
            // processed has already run to completion at this point
            if *abort.borrow() {
                debug!(worker_id = self.worker_id, "Abort signal observed");
                break;
            }

            let Some(target) = queue.dequeue() else {
                break;
            };

            let submission = self.process(&target).await;
            if tx.send(submission).await.is_err() {
                break;
            }
        }

        debug!(worker_id = self.worker_id, "Scrape worker finished");
    }

    /// 处理单个目标
    #[instrument(skip(self, target), fields(ordinal = target.ordinal, url = %target.url))]
    async fn process(&self, target: &Target) -> Submission {
        debug!("Processing target");

        let page = match fetch_with_retry(self.fetcher.as_ref(), &self.policy, target).await {
            Ok(page) => page,
            Err(error) => {
                return Submission::Failure(TargetFailure {
                    ordinal: target.ordinal,
                    url: target.url.clone(),
                    kind: error.failure_kind(),
                    message: error.to_string(),
                });
            }
        };

        self.parse_and_extract(target, &page.body)
    }

    /// 解析并提取一个页面
    ///
    /// 同步执行：DOM不是Send的，必须在进入下一个await点
    /// 之前用完并丢弃。解析和提取失败不重试，它们反映的
    /// 是页面结构不匹配而非网络抖动。
    fn parse_and_extract(&self, target: &Target, body: &str) -> Submission {
        let page = match parse::parse(body) {
            Ok(page) => page,
            Err(error) => {
                return Submission::Failure(TargetFailure {
                    ordinal: target.ordinal,
                    url: target.url.clone(),
                    kind: FailureKind::Parse,
                    message: error.to_string(),
                });
            }
        };

        match self.plan.extract(&page, &target.url) {
            Ok(values) => Submission::Record(PageRecord {
                ordinal: target.ordinal,
                url: target.url.clone(),
                values,
            }),
            Err(error) => Submission::Failure(TargetFailure {
                ordinal: target.ordinal,
                url: target.url.clone(),
                kind: FailureKind::Extraction,
                message: error.to_string(),
            }),
        }
    }
}
