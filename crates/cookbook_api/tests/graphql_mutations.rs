use cookbook_api::relay::to_global_id;
use cookbook_api::{build_schema, Database, Schema};
use serde_json::{json, Value};

fn schema() -> Schema {
    build_schema(Database::open_in_memory().unwrap(), Vec::new()).unwrap()
}

async fn run(schema: &Schema, query: &str) -> Value {
    let response = schema.execute(query).await;
    serde_json::to_value(&response).unwrap()
}

async fn data(schema: &Schema, query: &str) -> Value {
    let response = run(schema, query).await;
    assert!(response.get("errors").is_none(), "{response}");
    response["data"].clone()
}

fn error_code(response: &Value) -> &str {
    response["errors"][0]["extensions"]["code"]
        .as_str()
        .unwrap_or_default()
}

#[tokio::test]
async fn create_rename_delete_scenario() {
    let schema = schema();

    let created = data(
        &schema,
        r#"mutation { createCategory(input: {name: "Dairy"}) { ok category { id name } } }"#,
    )
    .await;
    assert_eq!(
        created["createCategory"],
        json!({"ok": true, "category": {"id": "1", "name": "Dairy"}})
    );

    let milk = data(
        &schema,
        r#"mutation {
            createIngredient(input: {name: "Milk", notes: "fresh", category: [1]}) {
                ok
                ingredient { name category { name } }
            }
        }"#,
    )
    .await;
    assert_eq!(
        milk["createIngredient"],
        json!({"ok": true, "ingredient": {"name": "Milk", "category": {"name": "Dairy"}}})
    );

    let renamed = data(
        &schema,
        r#"mutation { updateCategory(id: 1, input: {name: "Dairy2"}) { ok category { name } } }"#,
    )
    .await;
    assert_eq!(renamed["updateCategory"]["category"]["name"], "Dairy2");

    let deleted = data(
        &schema,
        r#"mutation { deleteCategory(id: 1) { ok category { id name } } }"#,
    )
    .await;
    assert_eq!(
        deleted["deleteCategory"],
        json!({"ok": true, "category": {"id": "1", "name": "Dairy2"}})
    );

    let lookup = data(&schema, r#"{ categoryByName(name: "Dairy2") { id } }"#).await;
    assert_eq!(lookup["categoryByName"], Value::Null);
}

#[tokio::test]
async fn created_category_is_found_by_name() {
    let schema = schema();
    data(
        &schema,
        r#"mutation { createCategory(input: {name: "Spices"}) { ok } }"#,
    )
    .await;

    let found = data(&schema, r#"{ categoryByName(name: "Spices") { id name } }"#).await;
    assert_eq!(found["categoryByName"], json!({"id": "1", "name": "Spices"}));

    let case_differs = data(&schema, r#"{ categoryByName(name: "spices") { id } }"#).await;
    assert_eq!(case_differs["categoryByName"], Value::Null);
}

#[tokio::test]
async fn update_without_name_keeps_the_old_one() {
    let schema = schema();
    data(
        &schema,
        r#"mutation { createCategory(input: {name: "Grains"}) { ok } }"#,
    )
    .await;

    let without_input = data(
        &schema,
        r#"mutation { updateCategory(id: 1) { ok category { name } } }"#,
    )
    .await;
    assert_eq!(
        without_input["updateCategory"],
        json!({"ok": true, "category": {"name": "Grains"}})
    );

    let empty_input = data(
        &schema,
        r#"mutation { updateCategory(id: 1, input: {}) { category { name } } }"#,
    )
    .await;
    assert_eq!(empty_input["updateCategory"]["category"]["name"], "Grains");
}

#[tokio::test]
async fn update_of_missing_category_is_not_found() {
    let schema = schema();
    let response = run(
        &schema,
        r#"mutation { updateCategory(id: 42, input: {name: "X"}) { ok } }"#,
    )
    .await;
    assert_eq!(response["data"]["updateCategory"], Value::Null);
    assert_eq!(error_code(&response), "NOT_FOUND");
}

#[tokio::test]
async fn delete_accepts_string_id_and_cascades_to_ingredients() {
    let schema = schema();
    data(
        &schema,
        r#"mutation {
            a: createCategory(input: {name: "Dairy"}) { ok }
            b: createCategory(input: {name: "Meat"}) { ok }
        }"#,
    )
    .await;
    data(
        &schema,
        r#"mutation {
            a: createIngredient(input: {name: "Milk", notes: "", category: [1]}) { ok }
            b: createIngredient(input: {name: "Beef", notes: "", category: [2]}) { ok }
        }"#,
    )
    .await;

    let deleted = data(
        &schema,
        r#"mutation { deleteCategory(id: "1") { ok category { name } } }"#,
    )
    .await;
    assert_eq!(deleted["deleteCategory"]["ok"], true);

    let remaining = data(&schema, "{ ingredients { name } }").await;
    assert_eq!(remaining["ingredients"], json!([{"name": "Beef"}]));

    let query = format!(
        r#"{{ category(id: "{}") {{ name }} }}"#,
        to_global_id("CategoryNode", 1)
    );
    let lookup = run(&schema, &query).await;
    assert_eq!(lookup["data"]["category"], Value::Null);
    assert_eq!(error_code(&lookup), "NOT_FOUND");

    let again = run(&schema, r#"mutation { deleteCategory(id: 1) { ok } }"#).await;
    assert_eq!(error_code(&again), "NOT_FOUND");
}

#[tokio::test]
async fn create_ingredient_links_first_category_only() {
    let schema = schema();
    data(
        &schema,
        r#"mutation {
            a: createCategory(input: {name: "Dairy"}) { ok }
            b: createCategory(input: {name: "Meat"}) { ok }
        }"#,
    )
    .await;

    let created = data(
        &schema,
        r#"mutation {
            createIngredient(input: {name: "Cheese", notes: "aged", category: [2, 1]}) {
                ingredient { id category { id name } }
            }
        }"#,
    )
    .await;
    assert_eq!(
        created["createIngredient"]["ingredient"]["category"],
        json!({"id": "2", "name": "Meat"})
    );
}

#[tokio::test]
async fn create_ingredient_in_missing_category_writes_nothing() {
    let schema = schema();
    let response = run(
        &schema,
        r#"mutation { createIngredient(input: {name: "Milk", notes: "", category: [9]}) { ok } }"#,
    )
    .await;
    assert_eq!(error_code(&response), "NOT_FOUND");

    let remaining = data(&schema, "{ ingredients { id } }").await;
    assert_eq!(remaining["ingredients"], json!([]));
}

#[tokio::test]
async fn missing_input_fields_are_validation_errors() {
    let schema = schema();

    let no_name = run(&schema, "mutation { createCategory(input: {}) { ok } }").await;
    assert_eq!(no_name["data"]["createCategory"], Value::Null);
    assert_eq!(error_code(&no_name), "VALIDATION");

    data(
        &schema,
        r#"mutation { createCategory(input: {name: "Dairy"}) { ok } }"#,
    )
    .await;

    let no_category = run(
        &schema,
        r#"mutation { createIngredient(input: {name: "Milk", notes: "", category: []}) { ok } }"#,
    )
    .await;
    assert_eq!(error_code(&no_category), "VALIDATION");

    let no_notes = run(
        &schema,
        r#"mutation { createIngredient(input: {name: "Milk", category: [1]}) { ok } }"#,
    )
    .await;
    assert_eq!(error_code(&no_notes), "VALIDATION");

    let too_long = format!(
        r#"mutation {{ createCategory(input: {{name: "{}"}}) {{ ok }} }}"#,
        "x".repeat(101)
    );
    let too_long = run(&schema, &too_long).await;
    assert_eq!(error_code(&too_long), "VALIDATION");

    let remaining = data(&schema, "{ ingredients { id } }").await;
    assert_eq!(remaining["ingredients"], json!([]));
}

#[tokio::test]
async fn writes_are_committed_to_the_database_file() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("cookbook.sqlite3");

    let schema = build_schema(Database::open(&db_path).unwrap(), Vec::new()).unwrap();
    data(
        &schema,
        r#"mutation { createCategory(input: {name: "Pantry"}) { ok } }"#,
    )
    .await;
    drop(schema);

    let reopened = build_schema(Database::open(&db_path).unwrap(), Vec::new()).unwrap();
    let found = data(&reopened, r#"{ categoryByName(name: "Pantry") { id } }"#).await;
    assert_eq!(found["categoryByName"], json!({"id": "1"}));
}
