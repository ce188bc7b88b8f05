// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use std::collections::VecDeque;
use std::sync::Mutex;

use crate::domain::models::target::Target;

/// 工作队列
///
/// 运行范围内的目标FIFO队列。每个目标至多被出队一次，
/// 出队后归属单个工作器；队列本身不做重派发，瞬时失败
/// 的重试在抓取层原地完成。
pub struct WorkQueue {
    inner: Mutex<VecDeque<Target>>,
}

impl WorkQueue {
    /// 以输入顺序创建队列
    pub fn new(targets: Vec<Target>) -> Self {
        Self {
            inner: Mutex::new(targets.into()),
        }
    }

    /// 出队下一个目标
    ///
    /// # 返回值
    ///
    /// * `Some(Target)` - 成功出队的目标
    /// * `None` - 队列已空
    pub fn dequeue(&self) -> Option<Target> {
        // The lock is held only for the pop itself, never across I/O
        self.inner
            .lock()
            .expect("work queue lock poisoned")
            .pop_front()
    }

    /// 剩余目标数
    pub fn remaining(&self) -> usize {
        self.inner.lock().expect("work queue lock poisoned").len()
    }
}
