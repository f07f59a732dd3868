// End-to-end tests for the action layer
//
// Drives the service through `request` with JSON arguments, the same way the
// stdio transport does.

use futures::future::join_all;
use serde_json::{json, Value as JsonValue};
use sqlite_dynamic::service::{Service, SqliteDynamicService};
use sqlite_dynamic::StoreConfig;
use tempfile::TempDir;

fn create_service() -> (SqliteDynamicService, TempDir) {
    let dir = TempDir::new().unwrap();
    let config = StoreConfig::builder().root_dir(dir.path()).build();
    (SqliteDynamicService::new(&config).unwrap(), dir)
}

async fn call(service: &SqliteDynamicService, action: &str, params: JsonValue) -> JsonValue {
    service.request(action, params).await.unwrap()
}

#[tokio::test]
async fn test_inventory_workflow() {
    let (service, _dir) = create_service();
    service.start().await.unwrap();

    let response = call(&service, "create_database", json!({"db_name": "inventory"})).await;
    assert_eq!(
        response,
        json!({"message": "Database 'inventory' created successfully!"})
    );

    let response = call(
        &service,
        "create_table",
        json!({
            "db_name": "inventory",
            "table_name": "products",
            "columns": [
                {"name": "sku", "type": "TEXT PRIMARY KEY"},
                {"name": "qty", "type": "INTEGER"},
                {"name": "price", "type": "REAL"}
            ]
        }),
    )
    .await;
    assert_eq!(response, json!({"message": "Table 'products' created."}));

    let response = call(
        &service,
        "insert_records",
        json!({
            "db_name": "inventory",
            "table_name": "products",
            "records": [
                {"sku": "A-1", "qty": 4, "price": 9.5},
                {"sku": "B-2", "qty": 0, "price": 12.0}
            ]
        }),
    )
    .await;
    assert_eq!(response, json!({"message": "2 records inserted."}));

    let response = call(
        &service,
        "prompt_query",
        json!({"db_name": "inventory", "table_name": "products", "prompt": "list every product"}),
    )
    .await;
    assert_eq!(
        response,
        json!({
            "columns": ["sku", "qty", "price"],
            "rows": [["A-1", 4, 9.5], ["B-2", 0, 12.0]]
        })
    );

    let response = call(
        &service,
        "prompt_query",
        json!({"db_name": "inventory", "table_name": "products", "prompt": "How many? Count them"}),
    )
    .await;
    assert_eq!(response, json!({"columns": ["count"], "rows": [[2]]}));

    // Duplicate primary key fails the whole batch
    let response = call(
        &service,
        "insert_records",
        json!({
            "db_name": "inventory",
            "table_name": "products",
            "records": [{"sku": "C-3", "qty": 1, "price": 1.0}, {"sku": "A-1", "qty": 1, "price": 1.0}]
        }),
    )
    .await;
    let error = response["error"].as_str().unwrap();
    assert!(error.contains("UNIQUE constraint failed"), "{error}");

    let response = call(
        &service,
        "prompt_query",
        json!({"db_name": "inventory", "table_name": "products", "prompt": "count"}),
    )
    .await;
    assert_eq!(response["rows"], json!([[2]]));

    service.stop().await.unwrap();
}

#[tokio::test]
async fn test_query_on_missing_table_reports_error() {
    let (service, _dir) = create_service();
    call(&service, "create_database", json!({"name": "empty"})).await;

    let response = call(
        &service,
        "prompt_query",
        json!({"db_name": "empty", "table_name": "missing", "prompt": "show"}),
    )
    .await;
    let error = response["error"].as_str().unwrap();
    assert!(error.contains("no such table: missing"), "{error}");
}

#[tokio::test]
async fn test_keyword_table_name_is_rejected() {
    let (service, _dir) = create_service();
    call(&service, "create_database", json!({"db_name": "shop"})).await;

    let response = call(
        &service,
        "create_table",
        json!({"db_name": "shop", "table_name": "order", "columns": [{"name": "id", "type": "INTEGER"}]}),
    )
    .await;
    assert_eq!(
        response,
        json!({"error": "Invalid table name 'order': reserved SQL keyword"})
    );

    let response = call(
        &service,
        "prompt_query",
        json!({"db_name": "shop", "table_name": "nothing", "prompt": "show"}),
    )
    .await;
    assert_eq!(
        response,
        json!({"error": "Invalid table name 'nothing': reserved SQL keyword"})
    );
}

#[tokio::test]
async fn test_oversized_integer_is_rejected() {
    let (service, _dir) = create_service();
    call(&service, "create_database", json!({"db_name": "big"})).await;

    let err = service
        .request(
            "insert_records",
            json!({"db_name": "big", "table_name": "t", "records": [{"n": 18446744073709551615u64}]}),
        )
        .await
        .unwrap_err();
    assert!(format!("{err:#}").contains("out of range for i64"), "{err:#}");
}

#[tokio::test]
async fn test_concurrent_database_creation() {
    let (service, dir) = create_service();

    let names: Vec<String> = (0..8).map(|i| format!("tenant_{i}")).collect();
    let responses = join_all(
        names
            .iter()
            .map(|name| service.request("create_database", json!({"db_name": name}))),
    )
    .await;

    for (name, response) in names.iter().zip(responses) {
        assert_eq!(
            response.unwrap(),
            json!({"message": format!("Database '{}' created successfully!", name)})
        );
        assert!(dir.path().join(format!("{name}.db")).exists());
    }
}
