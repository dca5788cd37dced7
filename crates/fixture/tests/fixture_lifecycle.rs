// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! Fixture provisioning, session capture and disposal

use anyhow::Result;
use query_baseline_comparator::{assert_baseline, assert_sql};
use query_baseline_fixture::{
    Command, Dataset, Fixture, FixtureError, ProvisionStep, SharedFixture, StoreConfig,
};

fn shop_dataset() -> Dataset {
    Dataset::new("shop")
        .with_schema(
            "CREATE TABLE [Customers] ([CustomerID] TEXT PRIMARY KEY, [City] TEXT);\n\
             CREATE TABLE [Orders] ([OrderID] INTEGER PRIMARY KEY, [CustomerID] TEXT REFERENCES [Customers]([CustomerID]));",
        )
        .with_seed(
            "INSERT INTO [Customers] VALUES ('ALFKI', 'Berlin');\n\
             INSERT INTO [Customers] VALUES ('ANATR', 'México D.F.');\n\
             INSERT INTO [Orders] VALUES (10643, 'ALFKI');",
        )
        .with_functions("CREATE VIEW [CustomerOrderCounts] AS SELECT [CustomerID], COUNT(*) AS [Count] FROM [Orders] GROUP BY [CustomerID];")
        .with_teardown("DROP VIEW [CustomerOrderCounts];")
}

#[tokio::test]
async fn test_provisioning_does_not_pollute_sink() -> Result<()> {
    let fixture = Fixture::provision(&shop_dataset(), &StoreConfig::in_memory()).await?;
    assert!(fixture.sink().is_empty());
    assert_sql!(fixture.sink());
    fixture.dispose().await;
    Ok(())
}

#[tokio::test]
async fn test_session_records_before_dispatch() -> Result<()> {
    let fixture = Fixture::provision(&shop_dataset(), &StoreConfig::in_memory()).await?;
    let session = fixture.create_context();

    let rows = session
        .query(
            Command::new("SELECT [c].[CustomerID] FROM [Customers] AS [c] WHERE [c].[City] = @__city_0")
                .param("__city_0", "Berlin"),
        )
        .await?;
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].get("CustomerID"), Some(&serde_json::json!("ALFKI")));

    // A failing statement is still captured
    let failed = session.query("SELECT * FROM [Missing]").await;
    assert!(matches!(failed, Err(FixtureError::Query { .. })));

    assert_sql!(
        fixture.sink(),
        "@__city_0='Berlin'\n\nSELECT [c].[CustomerID] FROM [Customers] AS [c] WHERE [c].[City] = @__city_0",
        "SELECT * FROM [Missing]"
    );
    fixture.dispose().await;
    Ok(())
}

#[tokio::test]
async fn test_sessions_share_the_fixture_sink() -> Result<()> {
    let fixture = Fixture::provision(&shop_dataset(), &StoreConfig::in_memory()).await?;
    let first = fixture.create_context();
    let second = fixture.create_context();

    first.query("SELECT 1").await?;
    second.execute("UPDATE [Customers] SET [City] = [City]").await?;

    assert!(assert_baseline(fixture.sink(), &["SELECT 1", "UPDATE [Customers] SET [City] = [City]"]).is_ok());
    fixture.dispose().await;
    Ok(())
}

#[tokio::test]
async fn test_raw_ddl_is_not_recorded() -> Result<()> {
    let fixture = Fixture::provision(&shop_dataset(), &StoreConfig::in_memory()).await?;
    fixture
        .execute_raw_ddl("CREATE VIEW [BerlinCustomers] AS SELECT * FROM [Customers] WHERE [City] = 'Berlin'")
        .await?;
    assert!(fixture.sink().is_empty());

    let rows = fixture
        .create_context()
        .query("SELECT [CustomerID] FROM [BerlinCustomers]")
        .await?;
    assert_eq!(rows.len(), 1);
    fixture.dispose().await;
    Ok(())
}

#[tokio::test]
async fn test_provisioning_failure_is_fatal() {
    let dataset = Dataset::new("broken")
        .with_schema("CREATE TABLE [Good] ([Id] INTEGER);")
        .with_seed("INSERT INTO [Nope] VALUES (1);");

    let err = Fixture::provision(&dataset, &StoreConfig::in_memory())
        .await
        .unwrap_err();
    match err {
        FixtureError::Provisioning {
            dataset,
            step,
            statement,
            ..
        } => {
            assert_eq!(dataset, "broken");
            assert_eq!(step, ProvisionStep::Seed);
            assert_eq!(statement, "INSERT INTO [Nope] VALUES (1)");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_provisioning_is_deterministic() -> Result<()> {
    let mut snapshots = Vec::new();
    for _ in 0..2 {
        let fixture = Fixture::provision(&shop_dataset(), &StoreConfig::in_memory()).await?;
        let rows = fixture
            .create_context()
            .query("SELECT [CustomerID], [City] FROM [Customers] ORDER BY [CustomerID]")
            .await?;
        snapshots.push(rows);
        fixture.dispose().await;
    }
    assert_eq!(snapshots[0], snapshots[1]);
    Ok(())
}

#[tokio::test]
async fn test_dispose_rejects_later_statements() -> Result<()> {
    let fixture = Fixture::provision(&shop_dataset(), &StoreConfig::temp_file()).await?;
    let session = fixture.create_context();
    fixture.dispose().await;
    fixture.dispose().await;

    assert!(fixture.is_disposed());
    assert!(matches!(
        session.query("SELECT 1").await,
        Err(FixtureError::Disposed { .. })
    ));
    assert!(matches!(
        session.execute("DELETE FROM [Orders]").await,
        Err(FixtureError::Disposed { .. })
    ));

    // Rejected commands never reach the sink
    assert!(fixture.sink().is_empty());
    Ok(())
}

#[tokio::test]
async fn test_record_only_fixture_captures_without_store() -> Result<()> {
    let fixture = Fixture::provision(&shop_dataset(), &StoreConfig::record_only()).await?;
    let rows = fixture
        .create_context()
        .query("SELECT TOP(1) [c].[CustomerID] FROM [Customers] AS [c]")
        .await?;
    assert!(rows.is_empty());
    assert_sql!(fixture.sink(), "SELECT TOP(1) [c].[CustomerID] FROM [Customers] AS [c]");
    Ok(())
}

#[tokio::test]
async fn test_shared_fixture_provisions_once() -> Result<()> {
    let shared = SharedFixture::new(shop_dataset(), StoreConfig::in_memory());
    assert!(!shared.is_provisioned());

    let (a, b) = tokio::join!(shared.get(), shared.get());
    let (a, b) = (a?, b?);
    assert!(std::ptr::eq(a, b));

    a.create_context()
        .execute("INSERT INTO [Customers] VALUES ('BLAUS', 'Mannheim')")
        .await?;
    let rows = b
        .create_context()
        .query("SELECT [CustomerID] FROM [Customers]")
        .await?;
    assert_eq!(rows.len(), 3);

    shared.dispose().await;
    Ok(())
}

#[tokio::test]
async fn test_shared_fixture_caches_provisioning_failure() -> Result<()> {
    // Each attempt logs a row into a file database before the broken DDL runs
    let dir = tempfile::tempdir()?;
    let url = format!("sqlite://{}?mode=rwc", dir.path().join("attempts.db").display());
    let dataset = Dataset::new("broken")
        .with_schema(
            "CREATE TABLE IF NOT EXISTS [Attempts] ([Id] INTEGER PRIMARY KEY AUTOINCREMENT);\n\
             INSERT INTO [Attempts] DEFAULT VALUES;\n\
             CREATE TABLE [Broken] (;",
        );
    let shared = SharedFixture::new(dataset, StoreConfig::url(url.clone()));

    for _ in 0..2 {
        match shared.get().await {
            Err(FixtureError::SharedProvisioning { dataset, source }) => {
                assert_eq!(dataset, "broken");
                assert!(matches!(
                    source.as_ref(),
                    FixtureError::Provisioning {
                        step: ProvisionStep::Schema,
                        ..
                    }
                ));
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
    }
    assert!(shared.has_failed());
    assert!(!shared.is_provisioned());

    let check = Fixture::provision(&Dataset::new("check"), &StoreConfig::url(url)).await?;
    let rows = check
        .create_context()
        .query("SELECT COUNT(*) AS [Count] FROM [Attempts]")
        .await?;
    assert_eq!(rows[0].get("Count"), Some(&serde_json::json!(1)));
    check.dispose().await;

    shared.dispose().await;
    Ok(())
}

#[tokio::test]
async fn test_dataset_from_manifest() -> Result<()> {
    let dir = tempfile::tempdir()?;
    std::fs::write(
        dir.path().join("schema.sql"),
        "CREATE TABLE [Tags] ([Id] INTEGER PRIMARY KEY, [Name] TEXT);\nGO\n",
    )?;
    std::fs::write(
        dir.path().join("seed.sql"),
        "-- tags\nINSERT INTO [Tags] VALUES (1, 'a;b');\nINSERT INTO [Tags] VALUES (2, 'c');\n",
    )?;
    let manifest = dir.path().join("dataset.yaml");
    std::fs::write(&manifest, "name: tags\nschema: [schema.sql]\nseed: [seed.sql]\n")?;

    let dataset = Dataset::from_manifest(&manifest)?;
    assert_eq!(dataset.name(), "tags");
    assert_eq!(dataset.provisioning_len(), 3);

    let fixture = Fixture::provision(&dataset, &StoreConfig::in_memory()).await?;
    let rows = fixture
        .create_context()
        .query("SELECT [Name] FROM [Tags] WHERE [Id] = 1")
        .await?;
    assert_eq!(rows[0].values, vec![serde_json::json!("a;b")]);
    fixture.dispose().await;
    Ok(())
}

#[test]
fn test_manifest_errors() {
    let dir = tempfile::tempdir().unwrap();
    let manifest = dir.path().join("dataset.yaml");

    std::fs::write(&manifest, "name: missing\nschema: [nowhere.sql]\n").unwrap();
    assert!(matches!(
        Dataset::from_manifest(&manifest),
        Err(FixtureError::Io { .. })
    ));

    std::fs::write(&manifest, "name: [not, a, string]\n").unwrap();
    assert!(matches!(
        Dataset::from_manifest(&manifest),
        Err(FixtureError::Manifest { .. })
    ));
}
