// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use std::sync::Arc;

use hooprs::domain::models::report::{FailureKind, RunOutcome};
use hooprs::domain::models::target::Target;
use hooprs::workers::manager::WorkerManager;

use super::helpers::{instant_policy, name_plan, team_page, test_urls, Scripted, ScriptedFetcher};

/// 为给定URL列表构造每页成功一次的桩抓取器
fn fetcher_for(urls: &[String]) -> ScriptedFetcher {
    let mut fetcher = ScriptedFetcher::new();
    for (i, url) in urls.iter().enumerate() {
        fetcher = fetcher.script(
            url,
            vec![Scripted::Page(team_page(
                &format!("Team {}", i),
                &format!("note {}", i),
            ))],
        );
    }
    fetcher
}

fn manager(
    fetcher: Arc<ScriptedFetcher>,
    concurrency: usize,
    threshold: f64,
    dedup_index: Option<usize>,
) -> WorkerManager<ScriptedFetcher> {
    WorkerManager::new(
        fetcher,
        name_plan(),
        instant_policy(3),
        concurrency,
        threshold,
        dedup_index,
    )
}

#[tokio::test]
async fn test_output_order_is_independent_of_concurrency() {
    let urls = test_urls(10);
    let mut outputs = Vec::new();

    for concurrency in [1, 4, 16] {
        let fetcher = Arc::new(fetcher_for(&urls));
        let (results, report) = manager(fetcher, concurrency, 1.0, None)
            .run(Target::from_urls(urls.clone()))
            .await
            .unwrap();

        assert_eq!(report.outcome(), RunOutcome::Complete);
        let rows: Vec<(usize, Vec<String>)> = results
            .records()
            .iter()
            .map(|r| (r.ordinal, r.values.clone()))
            .collect();
        outputs.push(rows);
    }

    // Same table regardless of completion timing
    assert_eq!(outputs[0], outputs[1]);
    assert_eq!(outputs[1], outputs[2]);
    let ordinals: Vec<usize> = outputs[0].iter().map(|(o, _)| *o).collect();
    assert_eq!(ordinals, (0..10).collect::<Vec<_>>());
    assert_eq!(outputs[0][7].1[0], "Team 7");
}

#[tokio::test]
async fn test_duplicate_natural_key_keeps_lower_ordinal() {
    let urls = test_urls(3);
    let fetcher = ScriptedFetcher::new()
        .script(&urls[0], vec![Scripted::Page(team_page("Ginebra", "first"))])
        .script(&urls[1], vec![Scripted::Page(team_page("Ginebra", "second"))])
        .script(&urls[2], vec![Scripted::Page(team_page("Meralco", "third"))]);

    // Dedup on the "Name" column
    let (results, _) = manager(Arc::new(fetcher), 4, 1.0, Some(0))
        .run(Target::from_urls(urls.clone()))
        .await
        .unwrap();

    assert_eq!(results.len(), 2);
    assert_eq!(results.records()[0].ordinal, 0);
    assert_eq!(results.records()[0].values[1], "first");
    assert_eq!(results.records()[1].values[0], "Meralco");
}

#[tokio::test]
async fn test_two_runs_produce_byte_identical_csv() {
    let urls = test_urls(6);
    let dir = tempfile::tempdir().unwrap();
    let mut files = Vec::new();

    for name in ["first.csv", "second.csv"] {
        let fetcher = Arc::new(fetcher_for(&urls));
        let (results, _) = manager(fetcher, 8, 1.0, None)
            .run(Target::from_urls(urls.clone()))
            .await
            .unwrap();

        let path = dir.path().join(name);
        hooprs::aggregate::csv_writer::write_csv(&results, &path).unwrap();
        files.push(std::fs::read(&path).unwrap());
    }

    assert_eq!(files[0], files[1]);
}

#[tokio::test]
async fn test_partial_failure_below_threshold() {
    let urls = test_urls(10);
    let mut fetcher = ScriptedFetcher::new();
    for (i, url) in urls.iter().enumerate() {
        let script = if i == 3 {
            vec![Scripted::Permanent]
        } else {
            vec![Scripted::Page(team_page(&format!("Team {}", i), ""))]
        };
        fetcher = fetcher.script(url, script);
    }

    let (results, report) = manager(Arc::new(fetcher), 4, 0.15, None)
        .run(Target::from_urls(urls.clone()))
        .await
        .unwrap();

    // Nine rows; the failed ordinal leaves a gap instead of a row
    assert_eq!(results.len(), 9);
    assert!(results.records().iter().all(|r| r.ordinal != 3));

    assert_eq!(report.outcome(), RunOutcome::Partial);
    assert!(!report.aborted);
    assert_eq!(report.failed, 1);
    assert_eq!(report.failures[0].ordinal, 3);
    assert_eq!(report.failures[0].url, urls[3]);
    assert_eq!(report.failures[0].kind, FailureKind::PermanentRequest);
}

#[tokio::test]
async fn test_threshold_breach_aborts_run() {
    let urls = test_urls(10);
    let mut fetcher = ScriptedFetcher::new();
    for (i, url) in urls.iter().enumerate() {
        let script = if i < 5 {
            vec![Scripted::Permanent]
        } else {
            vec![Scripted::Page(team_page(&format!("Team {}", i), ""))]
        };
        fetcher = fetcher.script(url, script);
    }

    let (results, report) = manager(Arc::new(fetcher), 1, 0.3, None)
        .run(Target::from_urls(urls.clone()))
        .await
        .unwrap();

    assert!(report.aborted);
    assert_eq!(report.outcome(), RunOutcome::Aborted);
    assert!(report.failed >= 4);

    // Emulate the binary's discard policy: an aborted run with
    // keep_partial_on_abort=false writes nothing at the final path
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("teams.csv");
    let keep_partial_on_abort = false;
    if !report.aborted || keep_partial_on_abort {
        hooprs::aggregate::csv_writer::write_csv(&results, &path).unwrap();
    }
    assert!(!path.exists());
}

#[tokio::test]
async fn test_transient_failures_retried_to_success() {
    let url = "https://stats.test/teams/flaky".to_string();
    let fetcher = ScriptedFetcher::new().script(
        &url,
        vec![
            Scripted::Transient,
            Scripted::Transient,
            Scripted::Page(team_page("Phoenix", "third try")),
        ],
    );
    let fetcher = Arc::new(fetcher);

    let (results, report) = manager(fetcher.clone(), 2, 1.0, None)
        .run(Target::from_urls(vec![url]))
        .await
        .unwrap();

    // Exactly one row, carrying the data of the successful third attempt
    assert_eq!(results.len(), 1);
    assert_eq!(results.records()[0].values[0], "Phoenix");
    assert_eq!(results.records()[0].values[1], "third try");
    assert_eq!(report.outcome(), RunOutcome::Complete);
    assert_eq!(fetcher.total_calls(), 3);
}

#[tokio::test]
async fn test_parse_and_extraction_failures_are_attributed() {
    let urls = test_urls(3);
    let fetcher = ScriptedFetcher::new()
        // Blank body: unparseable
        .script(&urls[0], vec![Scripted::Page("   ".to_string())])
        // Parseable page missing the required Name field
        .script(&urls[1], vec![Scripted::Page("<div><p>x</p></div>".to_string())])
        .script(&urls[2], vec![Scripted::Page(team_page("NLEX", ""))]);

    let (results, report) = manager(Arc::new(fetcher), 2, 1.0, None)
        .run(Target::from_urls(urls.clone()))
        .await
        .unwrap();

    assert_eq!(results.len(), 1);
    assert_eq!(results.records()[0].values[0], "NLEX");
    assert_eq!(report.failed, 2);

    let kind_of = |ordinal: usize| {
        report
            .failures
            .iter()
            .find(|f| f.ordinal == ordinal)
            .map(|f| f.kind)
            .unwrap()
    };
    assert_eq!(kind_of(0), FailureKind::Parse);
    assert_eq!(kind_of(1), FailureKind::Extraction);
}
