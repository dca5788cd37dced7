// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! Owned-entity scenarios over [`Datasets::owned`]
//!
//! Owned addresses are flattened into `[OwnedPerson]` columns named
//! `<Navigation>_<Property>`; orders and their details hang off the owner.
//!
//! [`Datasets::owned`]: crate::Datasets::owned

use query_baseline_runner::{Dialect, ScenarioCatalog};

use crate::scripted::{ScriptedScenario, translate};

const BASE_TYPE_LOADS_ALL_OWNED_NAVS: &str = r#"SELECT [o].[Id], [o].[Discriminator], [o].[Name], [s].[ClientId], [s].[Id], [s].[OrderDate], [s].[OrderClientId], [s].[OrderId], [s].[Id0], [s].[Detail], [o].[PersonAddress_AddressLine], [o].[PersonAddress_PlaceType], [o].[PersonAddress_ZipCode], [o].[PersonAddress_Country_Name], [o].[PersonAddress_Country_PlanetId], [o].[BranchAddress_BranchName], [o].[BranchAddress_PlaceType], [o].[BranchAddress_Country_Name], [o].[BranchAddress_Country_PlanetId], [o].[LeafBAddress_LeafBType], [o].[LeafBAddress_PlaceType], [o].[LeafBAddress_Country_Name], [o].[LeafBAddress_Country_PlanetId], [o].[LeafAAddress_LeafType], [o].[LeafAAddress_PlaceType], [o].[LeafAAddress_Country_Name], [o].[LeafAAddress_Country_PlanetId]
FROM [OwnedPerson] AS [o]
LEFT JOIN (
    SELECT [o0].[ClientId], [o0].[Id], [o0].[OrderDate], [o1].[OrderClientId], [o1].[OrderId], [o1].[Id] AS [Id0], [o1].[Detail]
    FROM [Order] AS [o0]
    LEFT JOIN [OrderDetail] AS [o1] ON [o0].[ClientId] = [o1].[OrderClientId] AND [o0].[Id] = [o1].[OrderId]
) AS [s] ON [o].[Id] = [s].[ClientId]
ORDER BY [o].[Id], [s].[ClientId], [s].[Id], [s].[OrderClientId], [s].[OrderId]"#;

const IMPLICIT_LOAD_COUNT: &str = r#"SELECT COUNT(*)
FROM [OwnedPerson] AS [o]"#;

const OWNED_REFERENCE_SCALAR: &str = r#"SELECT [o].[PersonAddress_Country_Name]
FROM [OwnedPerson] AS [o]
WHERE [o].[PersonAddress_Country_Name] = N'USA'"#;

// Owned instances never compare equal, so the predicate folds to a constant.
const OWNED_EQUALITY_OPERATOR: &str = r#"SELECT [o].[Id], [o].[Discriminator], [o].[Name], [s].[Id]
FROM [OwnedPerson] AS [o]
CROSS JOIN (
    SELECT [o0].[Id]
    FROM [OwnedPerson] AS [o0]
    WHERE [o0].[Discriminator] = N'LeafB'
) AS [s]
WHERE 0 = 1
ORDER BY [o].[Id], [s].[Id]"#;

pub fn owned_catalog(dialect: Dialect) -> ScenarioCatalog {
    let sql = |template: &str| translate(template, dialect);

    ScenarioCatalog::new()
        .with(
            ScriptedScenario::new("query_for_base_type_loads_all_owned_navs")
                .query(sql(BASE_TYPE_LOADS_ALL_OWNED_NAVS)),
        )
        .with(
            ScriptedScenario::new("no_ignored_include_warning_when_implicit_load")
                .query(sql(IMPLICIT_LOAD_COUNT)),
        )
        .with(
            ScriptedScenario::new("navigation_rewrite_on_owned_reference_projecting_scalar")
                .query(sql(OWNED_REFERENCE_SCALAR)),
        )
        .with(
            ScriptedScenario::new("query_with_owned_entity_equality_operator")
                .query(sql(OWNED_EQUALITY_OPERATOR)),
        )
}
