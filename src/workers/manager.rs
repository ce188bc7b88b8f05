// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use anyhow::{Context, Result};
use futures::future::join_all;
use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use tracing::{error, info};

use crate::aggregate::aggregator::Aggregator;
use crate::domain::models::record::ResultSet;
use crate::domain::models::report::RunReport;
use crate::domain::models::target::Target;
use crate::engines::traits::PageFetcher;
use crate::extract::ExtractionPlan;
use crate::queue::work_queue::WorkQueue;
use crate::utils::retry_policy::RetryPolicy;
use crate::workers::scrape_worker::ScrapeWorker;

/// 工作管理器
///
/// 一次运行的调度入口：持有目标队列，启动固定数量的抓取
/// 工作器和唯一的聚合器任务，等待全部完成后返回结果集与
/// 运行报告。固定的工作器数量同时是对远端站点的并发请求
/// 上限。
pub struct WorkerManager<F>
where
    F: PageFetcher + ?Sized + 'static,
{
    fetcher: Arc<F>,
    plan: Arc<ExtractionPlan>,
    policy: RetryPolicy,
    concurrency: usize,
    failure_threshold: f64,
    dedup_index: Option<usize>,
}

impl<F> WorkerManager<F>
where
    F: PageFetcher + ?Sized + 'static,
{
    /// 创建新的工作管理器实例
    ///
    /// # 参数
    ///
    /// * `fetcher` - 页面抓取器
    /// * `plan` - 编译后的提取方案
    /// * `policy` - 瞬时失败的重试策略
    /// * `concurrency` - 并发工作器数量
    /// * `failure_threshold` - 中止运行的失败率阈值
    /// * `dedup_index` - 去重自然键所在的列下标
    pub fn new(
        fetcher: Arc<F>,
        plan: Arc<ExtractionPlan>,
        policy: RetryPolicy,
        concurrency: usize,
        failure_threshold: f64,
        dedup_index: Option<usize>,
    ) -> Self {
        Self {
            fetcher,
            plan,
            policy,
            concurrency,
            failure_threshold,
            dedup_index,
        }
    }

    /// 对一组目标执行完整的抓取运行
    ///
    /// # 参数
    ///
    /// * `targets` - 有序的目标列表
    ///
    /// # 返回值
    ///
    /// * `Ok((ResultSet, RunReport))` - 结果集与运行报告
    /// * `Err` - 聚合器任务异常退出
    pub async fn run(&self, targets: Vec<Target>) -> Result<(ResultSet, RunReport)> {
        let total = targets.len();
        let workers = self.concurrency.max(1);
        info!(total, workers, "Starting scrape run");

        let queue = Arc::new(WorkQueue::new(targets));
        let (tx, rx) = mpsc::channel(workers * 2);
        let (abort_tx, abort_rx) = watch::channel(false);

        let aggregator = Aggregator::new(
            self.plan.fields().to_vec(),
            self.dedup_index,
            self.failure_threshold,
            total,
        );
        let aggregator_handle = tokio::spawn(aggregator.run(rx, abort_tx));

        let mut handles = Vec::with_capacity(workers);
        for worker_id in 0..workers {
            let worker = ScrapeWorker::new(
                self.fetcher.clone(),
                self.plan.clone(),
                self.policy.clone(),
                worker_id,
            );
            let queue = queue.clone();
            let tx = tx.clone();
            let abort_rx = abort_rx.clone();
            handles.push(tokio::spawn(async move {
                worker.run(queue, tx, abort_rx).await;
            }));
        }
        // The aggregator's channel closes once the last worker drops its sender
        drop(tx);

        for result in join_all(handles).await {
            if let Err(e) = result {
                error!("Worker task failed: {}", e);
            }
        }

        let (results, report) = aggregator_handle
            .await
            .context("aggregator task failed")?;

        info!(
            succeeded = report.succeeded,
            failed = report.failed,
            aborted = report.aborted,
            "Scrape run finished"
        );
        Ok((results, report))
    }
}
