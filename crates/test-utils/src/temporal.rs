// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! SQL Server temporal-table scenarios over [`Datasets::temporal`]
//!
//! `FOR SYSTEM_TIME` has no counterpart in the other dialects, so this
//! catalog only has a SQL Server suite.
//!
//! [`Datasets::temporal`]: crate::Datasets::temporal

use query_baseline_runner::ScenarioCatalog;

use crate::scripted::ScriptedScenario;

/// Point in time every `AS OF` scenario reads at
pub const AS_OF: &str = "2010-01-01T00:00:00.0000000";

const SKIP_NAVIGATION_COUNT_AS_OF: &str = r#"SELECT [e].[Id], [e].[Name]
FROM [EntityOnes] FOR SYSTEM_TIME AS OF '2010-01-01T00:00:00.0000000' AS [e]
WHERE (
    SELECT COUNT(*)
    FROM [JoinOneToTwo] FOR SYSTEM_TIME AS OF '2010-01-01T00:00:00.0000000' AS [j]
    INNER JOIN [EntityTwos] FOR SYSTEM_TIME AS OF '2010-01-01T00:00:00.0000000' AS [e0] ON [j].[TwoId] = [e0].[Id]
    WHERE [e].[Id] = [j].[OneId]) > 0"#;

const OWNED_AS_OF: &str = r#"SELECT [o].[Id], [o].[Discriminator], [o].[Name], [s].[ClientId], [s].[Id], [s].[OrderDate], [s].[OrderClientId], [s].[OrderId], [s].[Id0], [s].[Detail], [o].[PersonAddress_AddressLine], [o].[PersonAddress_PlaceType], [o].[PersonAddress_ZipCode], [o].[PersonAddress_Country_Name], [o].[PersonAddress_Country_PlanetId]
FROM [OwnedPerson] FOR SYSTEM_TIME AS OF '2010-01-01T00:00:00.0000000' AS [o]
LEFT JOIN (
    SELECT [o0].[ClientId], [o0].[Id], [o0].[OrderDate], [o1].[OrderClientId], [o1].[OrderId], [o1].[Id] AS [Id0], [o1].[Detail]
    FROM [Order] FOR SYSTEM_TIME AS OF '2010-01-01T00:00:00.0000000' AS [o0]
    LEFT JOIN [OrderDetail] FOR SYSTEM_TIME AS OF '2010-01-01T00:00:00.0000000' AS [o1] ON [o0].[ClientId] = [o1].[OrderClientId] AND [o0].[Id] = [o1].[OrderId]
) AS [s] ON [o].[Id] = [s].[ClientId]
ORDER BY [o].[Id], [s].[ClientId], [s].[Id], [s].[OrderClientId], [s].[OrderId]"#;

const OWNED_ALL: &str = r#"SELECT [o].[Id], [o].[PersonAddress_AddressLine], [o].[PersonAddress_PlaceType], [o].[PersonAddress_ZipCode], [o].[PersonAddress_Country_Name], [o].[PersonAddress_Country_PlanetId]
FROM [OwnedPerson] FOR SYSTEM_TIME ALL AS [o]"#;

const OWNED_BETWEEN: &str = r#"SELECT [o].[Id], [o].[PersonAddress_AddressLine], [o].[PersonAddress_PlaceType], [o].[PersonAddress_ZipCode], [o].[PersonAddress_Country_Name], [o].[PersonAddress_Country_PlanetId]
FROM [OwnedPerson] FOR SYSTEM_TIME BETWEEN '1990-01-01T00:00:00.0000000' AND '2200-01-01T00:00:00.0000000' AS [o]"#;

pub fn temporal_catalog() -> ScenarioCatalog {
    ScenarioCatalog::new()
        .with(
            ScriptedScenario::new("temporal_skip_navigation_count_as_of")
                .query(SKIP_NAVIGATION_COUNT_AS_OF),
        )
        .with(
            ScriptedScenario::new("temporal_owned_all_temporal_methods")
                .query(OWNED_AS_OF)
                .query(OWNED_ALL)
                .query(OWNED_BETWEEN),
        )
        .with(
            ScriptedScenario::new("temporal_owned_navigation_non_as_of").fail_invalid_operation(
                "Temporal query is trying to use navigation to an entity 'Order' which itself \
                 doesn't map to temporal table. Navigation expansion is only supported for \
                 'AsOf' operation.",
            ),
        )
}
