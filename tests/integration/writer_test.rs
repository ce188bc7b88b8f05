// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use std::sync::Arc;

use hooprs::aggregate::csv_writer;
use hooprs::domain::models::target::Target;
use hooprs::workers::manager::WorkerManager;

use super::helpers::{instant_policy, name_plan, team_page, test_urls, Scripted, ScriptedFetcher};

#[tokio::test]
async fn test_end_to_end_csv_output() {
    let urls = test_urls(3);
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

    let manager = WorkerManager::new(
        Arc::new(fetcher),
        name_plan(),
        instant_policy(3),
        4,
        1.0,
        None,
    );
    let (results, report) = manager.run(Target::from_urls(urls)).await.unwrap();
    assert_eq!(report.failed, 0);

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("out").join("teams.csv");
    csv_writer::write_csv(&results, &path).unwrap();

    let contents = std::fs::read_to_string(&path).unwrap();
    let lines: Vec<&str> = contents.lines().collect();
    assert_eq!(
        lines,
        vec![
            "Name,Note",
            "Team 0,note 0",
            "Team 1,note 1",
            "Team 2,note 2",
        ]
    );
}
