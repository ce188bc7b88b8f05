// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// 失败类别枚举
///
/// 区分可重试与不可重试的失败来源，决定重试与上报行为。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// 瞬时网络错误（超时、连接重置、5xx），重试耗尽后记录
    TransientNetwork,
    /// 永久请求错误（4xx、非法URL），不重试
    PermanentRequest,
    /// 标记完全无法解析
    Parse,
    /// 必需字段无法定位
    Extraction,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            FailureKind::TransientNetwork => write!(f, "transient_network"),
            FailureKind::PermanentRequest => write!(f, "permanent_request"),
            FailureKind::Parse => write!(f, "parse"),
            FailureKind::Extraction => write!(f, "extraction"),
        }
    }
}

/// 目标失败记录
///
/// 每个失败都可归因到具体的目标序号和URL，绝不静默丢弃。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TargetFailure {
    /// 失败目标的序号
    pub ordinal: usize,
    /// 失败目标的URL
    pub url: String,
    /// 失败类别
    pub kind: FailureKind,
    /// 失败详情
    pub message: String,
}

/// 运行结果枚举
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunOutcome {
    /// 所有目标成功
    Complete,
    /// 部分目标失败，但未超过失败率阈值
    Partial,
    /// 失败率超过阈值，运行中止
    Aborted,
}

/// 运行报告
///
/// 一次运行的尝试、成功与失败统计。由聚合器独占持有，
/// 运行结束时作为日志持久化。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    /// 输入目标总数
    pub total_targets: usize,
    /// 已尝试的目标数
    pub attempted: usize,
    /// 成功的目标数
    pub succeeded: usize,
    /// 失败的目标数
    pub failed: usize,
    /// 是否因超过失败率阈值而中止
    pub aborted: bool,
    /// 每个失败目标的明细
    pub failures: Vec<TargetFailure>,
    /// 运行开始时间
    pub started_at: DateTime<Utc>,
    /// 运行结束时间
    pub finished_at: Option<DateTime<Utc>>,
}

impl RunReport {
    /// 创建新的运行报告
    pub fn new(total_targets: usize) -> Self {
        Self {
            total_targets,
            attempted: 0,
            succeeded: 0,
            failed: 0,
            aborted: false,
            failures: Vec::new(),
            started_at: Utc::now(),
            finished_at: None,
        }
    }

    /// 记录一次成功
    pub fn record_success(&mut self) {
        self.attempted += 1;
        self.succeeded += 1;
    }

    /// 记录一次失败
    pub fn record_failure(&mut self, failure: TargetFailure) {
        self.attempted += 1;
        self.failed += 1;
        self.failures.push(failure);
    }

    /// 相对输入总数的失败率
    pub fn failure_rate(&self) -> f64 {
        if self.total_targets == 0 {
            return 0.0;
        }
        self.failed as f64 / self.total_targets as f64
    }

    /// 标记运行结束
    pub fn finish(&mut self) {
        self.finished_at = Some(Utc::now());
    }

    /// 运行结果
    pub fn outcome(&self) -> RunOutcome {
        if self.aborted {
            RunOutcome::Aborted
        } else if self.failed > 0 {
            RunOutcome::Partial
        } else {
            RunOutcome::Complete
        }
    }
}
