// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use std::collections::{BTreeMap, HashSet};
use tokio::sync::{mpsc, watch};
use tracing::{debug, warn};

use crate::domain::models::record::{PageRecord, ResultSet};
use crate::domain::models::report::{RunReport, TargetFailure};

/// 工作器提交
///
/// 每个目标经过抓取-解析-提取后产出一份提交：成功的记录
/// 或带归因的失败。
#[derive(Debug)]
pub enum Submission {
    /// 成功提取的记录
    Record(PageRecord),
    /// 目标失败明细
    Failure(TargetFailure),
}

/// 结果聚合器
///
/// 所有工作器的提交经由单条mpsc通道汇入此处，聚合器是
/// 结果集合唯一的写入者，工作器从不直接接触它。记录按
/// 目标序号放置，恢复与完成顺序无关的确定性输出。当失败
/// 率超过阈值时，通过watch通道通知工作器停止取队，自己
/// 则继续收完在途的提交。
pub struct Aggregator {
    /// 输出表头字段
    schema: Vec<String>,
    /// 去重自然键所在的列下标
    dedup_index: Option<usize>,
    /// 失败率阈值 (0.0-1.0)
    failure_threshold: f64,
    /// 输入目标总数
    total_targets: usize,
}

impl Aggregator {
    /// 创建新的聚合器实例
    pub fn new(
        schema: Vec<String>,
        dedup_index: Option<usize>,
        failure_threshold: f64,
        total_targets: usize,
    ) -> Self {
        Self {
            schema,
            dedup_index,
            failure_threshold,
            total_targets,
        }
    }

    /// 运行聚合循环直至所有工作器完成
    ///
    /// # 参数
    ///
    /// * `rx` - 工作器提交通道的接收端
    /// * `abort_tx` - 中止信号的发送端
    ///
    /// # 返回值
    ///
    /// 排序去重后的结果集与运行报告
    pub async fn run(
        self,
        mut rx: mpsc::Receiver<Submission>,
        abort_tx: watch::Sender<bool>,
    ) -> (ResultSet, RunReport) {
        let mut report = RunReport::new(self.total_targets);
        let mut by_ordinal: BTreeMap<usize, PageRecord> = BTreeMap::new();

        while let Some(submission) = rx.recv().await {
            match submission {
                Submission::Record(record) => {
                    debug!(ordinal = record.ordinal, url = %record.url, "Record collected");
                    report.record_success();
                    // At most one record per ordinal; the queue hands each
                    // target to exactly one worker, so this never clashes
                    by_ordinal.entry(record.ordinal).or_insert(record);
                }
                Submission::Failure(failure) => {
                    warn!(
                        ordinal = failure.ordinal,
                        url = %failure.url,
                        kind = %failure.kind,
                        "Target failed: {}",
                        failure.message
                    );
                    report.record_failure(failure);

                    if !report.aborted && report.failure_rate() > self.failure_threshold {
                        warn!(
                            failed = report.failed,
                            total = report.total_targets,
                            threshold = self.failure_threshold,
                            "Failure threshold exceeded, aborting run"
                        );
                        report.aborted = true;
                        // Workers stop dequeuing; in-flight fetches finish
                        // normally and their submissions are still drained
                        let _ = abort_tx.send(true);
                    }
                }
            }
        }

        report.finish();
        let result_set = self.finalize(by_ordinal);
        (result_set, report)
    }

    /// 定序与去重
    ///
    /// 按序号升序遍历，自然键重复的记录仅保留序号最小的
    /// 一条。空的自然键不参与去重。
    fn finalize(&self, by_ordinal: BTreeMap<usize, PageRecord>) -> ResultSet {
        let mut seen_keys: HashSet<String> = HashSet::new();
        let mut records = Vec::with_capacity(by_ordinal.len());

        for (_, record) in by_ordinal {
            if let Some(index) = self.dedup_index {
                let key = record.values.get(index).cloned().unwrap_or_default();
                if !key.is_empty() && !seen_keys.insert(key) {
                    debug!(ordinal = record.ordinal, "Duplicate natural key dropped");
                    continue;
                }
            }
            records.push(record);
        }

        ResultSet::new(self.schema.clone(), records)
    }
}
