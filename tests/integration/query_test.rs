//! Query execution integration tests.
//!
//! Tests ad-hoc statement execution and cell decoding against PostgreSQL.

use super::common::{get_test_client, unique_table};
use pg_gateway::db::{DatabaseClient, PostgresClient, Value};
use pg_gateway::error::GatewayError;

/// Creates a scratch table, runs the test body, and drops the table.
async fn with_table<F, Fut>(client: &PostgresClient, ddl: &str, body: F)
where
    F: FnOnce(String) -> Fut,
    Fut: std::future::Future<Output = ()>,
{
    let table = unique_table("gw_query");
    client
        .execute_query(&ddl.replace("{table}", &table))
        .await
        .unwrap();

    body(table.clone()).await;

    client
        .execute_query(&format!("DROP TABLE {table}"))
        .await
        .unwrap();
}

#[tokio::test]
async fn test_execute_simple_select() {
    let Some(client) = get_test_client().await else {
        eprintln!("Skipping test: DATABASE_URL not set");
        return;
    };

    let result = client
        .execute_query("SELECT 1 AS num, 'hello' AS greeting")
        .await
        .unwrap();

    assert_eq!(result.columns, vec!["num", "greeting"]);
    assert_eq!(
        result.rows,
        vec![vec![Value::Int(1), Value::String("hello".to_string())]]
    );

    client.close().await.unwrap();
}

#[tokio::test]
async fn test_execute_scalar_types() {
    let Some(client) = get_test_client().await else {
        eprintln!("Skipping test: DATABASE_URL not set");
        return;
    };

    let result = client
        .execute_query(
            "SELECT true AS flag, 2.5::float8 AS ratio, 12.50::numeric AS price, \
             NULL::text AS missing, 'ab'::bytea AS payload, \
             '2024-01-02'::date AS day, 9000000000::int8 AS big",
        )
        .await
        .unwrap();

    let row = &result.rows[0];
    assert_eq!(row[0], Value::Bool(true));
    assert_eq!(row[1], Value::Float(2.5));
    assert_eq!(row[2], Value::String("12.50".to_string()));
    assert_eq!(row[3], Value::Null);
    assert_eq!(row[4], Value::String("ab".to_string()));
    assert_eq!(row[5], Value::String("2024-01-02".to_string()));
    assert_eq!(row[6], Value::Int(9_000_000_000));

    client.close().await.unwrap();
}

#[tokio::test]
async fn test_execute_syntax_error_is_validation() {
    let Some(client) = get_test_client().await else {
        eprintln!("Skipping test: DATABASE_URL not set");
        return;
    };

    let error = client.execute_query("SELEKT * FROM x").await.unwrap_err();
    assert!(matches!(error, GatewayError::Validation(_)));
    assert!(error.to_string().contains("syntax error"));

    client.close().await.unwrap();
}

#[tokio::test]
async fn test_execute_unknown_table_is_validation() {
    let Some(client) = get_test_client().await else {
        eprintln!("Skipping test: DATABASE_URL not set");
        return;
    };

    let error = client
        .execute_query("SELECT * FROM nonexistent_table_xyz")
        .await
        .unwrap_err();
    assert!(matches!(error, GatewayError::Validation(_)));
    assert!(error.to_string().contains("nonexistent_table_xyz"));

    client.close().await.unwrap();
}

#[tokio::test]
async fn test_execute_multiple_statements_is_validation() {
    let Some(client) = get_test_client().await else {
        eprintln!("Skipping test: DATABASE_URL not set");
        return;
    };

    let error = client
        .execute_query("SELECT 1; SELECT 2")
        .await
        .unwrap_err();
    assert!(matches!(error, GatewayError::Validation(_)));

    client.close().await.unwrap();
}

#[tokio::test]
async fn test_execute_empty_table() {
    let Some(client) = get_test_client().await else {
        eprintln!("Skipping test: DATABASE_URL not set");
        return;
    };

    with_table(
        &client,
        "CREATE TABLE {table} (id integer, label text)",
        |table| {
            let client = client.clone();
            async move {
                let result = client
                    .execute_query(&format!("SELECT id, label FROM {table}"))
                    .await
                    .unwrap();
                assert_eq!(result.columns, vec!["id", "label"]);
                assert!(result.rows.is_empty());
            }
        },
    )
    .await;

    client.close().await.unwrap();
}

#[tokio::test]
async fn test_execute_mutations_are_committed() {
    let Some(client) = get_test_client().await else {
        eprintln!("Skipping test: DATABASE_URL not set");
        return;
    };

    with_table(
        &client,
        "CREATE TABLE {table} (id integer, name text)",
        |table| {
            let client = client.clone();
            async move {
                let inserted = client
                    .execute_query(&format!(
                        "INSERT INTO {table} VALUES (1, 'alice'), (2, 'bob')"
                    ))
                    .await
                    .unwrap();
                assert!(inserted.columns.is_empty());
                assert!(inserted.rows.is_empty());

                let result = client
                    .execute_query(&format!("SELECT id, name FROM {table} ORDER BY id"))
                    .await
                    .unwrap();
                assert_eq!(
                    result.rows,
                    vec![
                        vec![Value::Int(1), Value::String("alice".to_string())],
                        vec![Value::Int(2), Value::String("bob".to_string())],
                    ]
                );
            }
        },
    )
    .await;

    client.close().await.unwrap();
}

#[tokio::test]
async fn test_execute_runtime_error_is_execution() {
    let Some(client) = get_test_client().await else {
        eprintln!("Skipping test: DATABASE_URL not set");
        return;
    };

    with_table(&client, "CREATE TABLE {table} (n integer)", |table| {
        let client = client.clone();
        async move {
            client
                .execute_query(&format!("INSERT INTO {table} VALUES (0)"))
                .await
                .unwrap();

            let error = client
                .execute_query(&format!("SELECT 1 / n FROM {table}"))
                .await
                .unwrap_err();
            assert!(matches!(error, GatewayError::Execution(_)));
            assert!(error.to_string().contains("division by zero"));
        }
    })
    .await;

    client.close().await.unwrap();
}

#[tokio::test]
async fn test_execute_text_rendered_types() {
    let Some(client) = get_test_client().await else {
        eprintln!("Skipping test: DATABASE_URL not set");
        return;
    };

    let result = client
        .execute_query(
            "SELECT '1 day 02:00'::interval AS span, ARRAY[1,2,3] AS ids, \
             '12:00+02'::timetz AS noon, 5::money AS cost, \
             '10.0.0.1'::inet AS host, '10.0.0.0/8'::cidr AS net",
        )
        .await
        .unwrap();

    let row = &result.rows[0];
    assert_eq!(row[0], Value::String("1 day 02:00:00".to_string()));
    assert_eq!(row[1], Value::String("{1,2,3}".to_string()));
    assert_eq!(row[2], Value::String("12:00:00+02".to_string()));
    assert!(row[3].to_display_string().contains("5.00"));
    assert_eq!(row[4], Value::String("10.0.0.1".to_string()));
    assert_eq!(row[5], Value::String("10.0.0.0/8".to_string()));

    client.close().await.unwrap();
}

#[tokio::test]
async fn test_execute_infinite_dates() {
    let Some(client) = get_test_client().await else {
        eprintln!("Skipping test: DATABASE_URL not set");
        return;
    };

    let result = client
        .execute_query(
            "SELECT 'infinity'::timestamp AS ts, '-infinity'::timestamptz AS tstz, \
             'infinity'::date AS day",
        )
        .await
        .unwrap();

    assert_eq!(
        result.rows,
        vec![vec![
            Value::String("infinity".to_string()),
            Value::String("-infinity".to_string()),
            Value::String("infinity".to_string()),
        ]]
    );

    client.close().await.unwrap();
}

#[tokio::test]
async fn test_execute_numeric_beyond_decimal_range() {
    let Some(client) = get_test_client().await else {
        eprintln!("Skipping test: DATABASE_URL not set");
        return;
    };

    let result = client
        .execute_query("SELECT 'NaN'::numeric AS nan, 1e40::numeric AS huge")
        .await
        .unwrap();

    assert_eq!(
        result.rows,
        vec![vec![
            Value::String("NaN".to_string()),
            Value::String(format!("1{}", "0".repeat(40))),
        ]]
    );

    client.close().await.unwrap();
}

#[tokio::test]
async fn test_execute_float4_keeps_printed_value() {
    let Some(client) = get_test_client().await else {
        eprintln!("Skipping test: DATABASE_URL not set");
        return;
    };

    let result = client
        .execute_query("SELECT 0.1::float4 AS f, 'NaN'::float8 AS nan")
        .await
        .unwrap();

    assert_eq!(
        result.rows,
        vec![vec![Value::Float(0.1), Value::String("NaN".to_string())]]
    );

    client.close().await.unwrap();
}

#[tokio::test]
async fn test_execute_same_query_after_schema_change() {
    let Some(client) = get_test_client().await else {
        eprintln!("Skipping test: DATABASE_URL not set");
        return;
    };

    with_table(&client, "CREATE TABLE {table} (a integer)", |table| {
        let client = client.clone();
        async move {
            client
                .execute_query(&format!("INSERT INTO {table} VALUES (1)"))
                .await
                .unwrap();

            let select = format!("SELECT * FROM {table}");
            let before = client.execute_query(&select).await.unwrap();
            assert_eq!(before.columns, vec!["a"]);

            client
                .execute_query(&format!("ALTER TABLE {table} ADD COLUMN b integer"))
                .await
                .unwrap();

            let after = client.execute_query(&select).await.unwrap();
            assert_eq!(after.columns, vec!["a", "b"]);
            assert_eq!(after.rows, vec![vec![Value::Int(1), Value::Null]]);
        }
    })
    .await;

    client.close().await.unwrap();
}
