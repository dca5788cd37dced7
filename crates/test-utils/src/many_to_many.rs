// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! Skip-navigation scenarios over [`Datasets::many_to_many`]
//!
//! [`Datasets::many_to_many`]: crate::Datasets::many_to_many

use query_baseline_runner::{Dialect, ScenarioCatalog};

use crate::scripted::{ScriptedScenario, translate};

const SKIP_NAVIGATION_COUNT: &str = r#"SELECT [e].[Id], (
    SELECT COUNT(*)
    FROM [JoinOneToTwo] AS [j]
    INNER JOIN [EntityTwos] AS [e0] ON [j].[TwoId] = [e0].[Id]
    WHERE [e].[Id] = [j].[OneId]) AS [Count]
FROM [EntityOnes] AS [e]
ORDER BY [e].[Id]"#;

const SPLIT_ONES: &str = r#"SELECT [e].[Id], [e].[Name]
FROM [EntityOnes] AS [e]
ORDER BY [e].[Id]"#;

const SPLIT_TWOS: &str = r#"SELECT [t].[OneId], [t].[TwoId], [t].[Id], [t].[Name], [e].[Id]
FROM [EntityOnes] AS [e]
INNER JOIN (
    SELECT [j].[OneId], [j].[TwoId], [e0].[Id], [e0].[Name]
    FROM [JoinOneToTwo] AS [j]
    INNER JOIN [EntityTwos] AS [e0] ON [j].[TwoId] = [e0].[Id]
) AS [t] ON [e].[Id] = [t].[OneId]
ORDER BY [e].[Id]"#;

const FILTERED_INCLUDE: &str = r#"SELECT [e].[Id], [e].[Name], [t].[OneId], [t].[TwoId], [t].[Id], [t].[Name]
FROM [EntityOnes] AS [e]
LEFT JOIN (
    SELECT [j].[OneId], [j].[TwoId], [e0].[Id], [e0].[Name]
    FROM [JoinOneToTwo] AS [j]
    INNER JOIN [EntityTwos] AS [e0] ON [j].[TwoId] = [e0].[Id]
    WHERE [e0].[Id] < 10
) AS [t] ON [e].[Id] = [t].[OneId]
ORDER BY [e].[Id], [t].[OneId], [t].[TwoId]"#;

pub fn many_to_many_catalog(dialect: Dialect) -> ScenarioCatalog {
    let sql = |template: &str| translate(template, dialect);

    ScenarioCatalog::new()
        .with(ScriptedScenario::new("skip_navigation_count").query(sql(SKIP_NAVIGATION_COUNT)))
        .with(
            ScriptedScenario::new("include_skip_navigation_split")
                .query(sql(SPLIT_ONES))
                .query(sql(SPLIT_TWOS)),
        )
        .with(ScriptedScenario::new("filtered_include_skip_navigation").query(sql(FILTERED_INCLUDE)))
}
