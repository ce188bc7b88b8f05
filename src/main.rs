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

use anyhow::{bail, Context};
use std::path::Path;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};

use hooprs::aggregate::csv_writer;
use hooprs::config::settings::Settings;
use hooprs::domain::models::report::RunOutcome;
use hooprs::domain::models::target::Target;
use hooprs::engines::reqwest_fetcher::ReqwestFetcher;
use hooprs::extract::ExtractionPlan;
use hooprs::sites::pba;
use hooprs::utils::retry_policy::RetryPolicy;
use hooprs::utils::telemetry;
use hooprs::workers::manager::WorkerManager;

/// 主函数
///
/// 应用程序入口点。初始化各组件并执行一次完整运行；
/// 退出码：0 全部成功，1 失败率超阈值中止，2 致命配置
/// 错误，3 带失败的部分成功。
#[tokio::main]
async fn main() -> ExitCode {
    // 1. Initialize logging
    telemetry::init_telemetry();

    match run().await {
        Ok(code) => code,
        Err(e) => {
            error!("Fatal setup error: {:#}", e);
            ExitCode::from(2)
        }
    }
}

async fn run() -> anyhow::Result<ExitCode> {
    info!("Starting hooprs...");

    // 2. Load configuration
    let settings = Settings::new().context("failed to load configuration")?;
    info!("Configuration loaded");

    // 3. Compile and validate the extraction plan
    let rules = if settings.extraction.rules.is_empty() {
        pba::team_profile_rules()
    } else {
        settings.extraction.rules.clone()
    };
    let plan = Arc::new(ExtractionPlan::compile(rules).context("invalid extraction rules")?);
    let dedup_index = match &settings.output.dedup_field {
        Some(field) => Some(plan.field_index(field).with_context(|| {
            format!("dedup field '{}' is not part of the extraction plan", field)
        })?),
        None => None,
    };
    info!(fields = plan.fields().len(), "Extraction plan compiled");

    // 4. Build the run-scoped HTTP client and fetcher
    let timeout = settings.fetch.timeout();
    let client = reqwest::Client::builder()
        .user_agent(settings.fetch.user_agent.as_str())
        .timeout(timeout)
        .build()
        .context("failed to build http client")?;
    let fetcher = Arc::new(ReqwestFetcher::new(client, timeout));

    let policy = RetryPolicy {
        max_retries: settings.fetch.max_retries,
        initial_backoff: Duration::from_millis(settings.fetch.initial_backoff_ms),
        max_backoff: Duration::from_millis(settings.fetch.max_backoff_ms),
        backoff_multiplier: settings.fetch.backoff_multiplier,
        ..RetryPolicy::default()
    };

    // 5. Assemble the ordered target list
    let targets = Target::from_urls(settings.targets.urls.clone());
    if targets.is_empty() {
        bail!("no targets configured (set targets.urls)");
    }

    // 6. Run the pipeline
    let manager = WorkerManager::new(
        fetcher,
        plan,
        policy,
        settings.concurrency.workers,
        settings.run.failure_threshold,
        dedup_index,
    );
    let (results, report) = manager.run(targets).await?;

    // 7. Write the output per the abort policy
    if !report.aborted || settings.run.keep_partial_on_abort {
        csv_writer::write_csv(&results, Path::new(&settings.output.path))
            .context("failed to write csv output")?;
    } else {
        warn!("Run aborted, skipping CSV output");
    }

    // 8. Persist the report as a log and map the exit code
    for failure in &report.failures {
        warn!(
            ordinal = failure.ordinal,
            url = %failure.url,
            kind = %failure.kind,
            "Failed target: {}",
            failure.message
        );
    }
    if let Ok(json) = serde_json::to_string(&report) {
        info!("Run report: {}", json);
    }

    Ok(match report.outcome() {
        RunOutcome::Complete => ExitCode::SUCCESS,
        RunOutcome::Aborted => ExitCode::from(1),
        RunOutcome::Partial => ExitCode::from(3),
    })
}
