// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use tokio::time::sleep;
use tracing::warn;

use crate::domain::models::target::Target;
use crate::engines::traits::{FetchError, FetchedPage, PageFetcher};
use crate::utils::retry_policy::RetryPolicy;

/// 带重试的抓取
///
/// 瞬时失败按策略退避后原地重试；永久失败立即返回。一次
/// 重试完整结束后才继续下一次，目标始终只被一个工作器
/// 持有。重试耗尽后返回最后一次的错误，由调用方降级记录。
///
/// # 参数
///
/// * `fetcher` - 页面抓取器
/// * `policy` - 重试策略
/// * `target` - 抓取目标
///
/// # 返回值
///
/// * `Ok(FetchedPage)` - 某次尝试成功的页面
/// * `Err(FetchError)` - 不可重试的错误或重试耗尽后的最后错误
pub async fn fetch_with_retry<F>(
    fetcher: &F,
    policy: &RetryPolicy,
    target: &Target,
) -> Result<FetchedPage, FetchError>
where
    F: PageFetcher + ?Sized,
{
    let mut attempt: u32 = 0;
    loop {
        match fetcher.fetch(target).await {
            Ok(page) => return Ok(page),
            Err(error) => {
                attempt += 1;
                if !error.is_retryable() || !policy.should_retry(attempt) {
                    return Err(error);
                }
                let backoff = policy.calculate_backoff(attempt);
                warn!(
                    ordinal = target.ordinal,
                    url = %target.url,
                    attempt,
                    backoff_ms = backoff.as_millis() as u64,
                    "Transient fetch failure, retrying: {}",
                    error
                );
                sleep(backoff).await;
            }
        }
    }
}
