use async_graphql::dynamic::{FieldValue, InputValue, Object, TypeRef};
use async_graphql::Value;
use cookbook_api::resolver::{resolved, scalar_field};
use cookbook_api::{
    build_schema, export_schema_sdl, ApiModule, Database, ModuleType, RegistryError, RootField,
    RootKind,
};

#[derive(Debug, Clone)]
struct Account {
    username: String,
}

/// Stand-in for a separately developed module.
struct AccountsModule;

impl ApiModule for AccountsModule {
    fn name(&self) -> &str {
        "accounts"
    }

    fn types(&self) -> Vec<ModuleType> {
        vec![Object::new("Account")
            .field(scalar_field::<Account, _>(
                "username",
                TypeRef::named_nn(TypeRef::STRING),
                |account| Value::String(account.username.clone()),
            ))
            .into()]
    }

    fn query_fields(&self) -> Vec<RootField> {
        vec![RootField::new("me", TypeRef::named("Account"), |_| {
            resolved(Ok(Some(FieldValue::owned_any(Account {
                username: "alice".to_string(),
            }))))
        })]
    }

    fn mutation_fields(&self) -> Vec<RootField> {
        vec![RootField::new(
            "login",
            TypeRef::named_nn(TypeRef::BOOLEAN),
            |ctx| {
                let outcome = ctx
                    .args
                    .try_get("username")
                    .and_then(|username| Ok(!username.string()?.is_empty()))
                    .map(|ok| Some(FieldValue::value(Value::Boolean(ok))));
                resolved(outcome)
            },
        )
        .argument(InputValue::new(
            "username",
            TypeRef::named_nn(TypeRef::STRING),
        ))]
    }
}

/// Claims a query field the cookbook module already owns.
struct ClashingModule;

impl ApiModule for ClashingModule {
    fn name(&self) -> &str {
        "clashing"
    }

    fn types(&self) -> Vec<ModuleType> {
        Vec::new()
    }

    fn query_fields(&self) -> Vec<RootField> {
        vec![RootField::new(
            "ingredients",
            TypeRef::named_nn(TypeRef::INT),
            |_| resolved(Ok(Some(FieldValue::value(Value::Number(0.into()))))),
        )]
    }
}

/// Brings its own `PageInfo`, which the cookbook module already defines.
struct SessionsModule;

impl ApiModule for SessionsModule {
    fn name(&self) -> &str {
        "sessions"
    }

    fn types(&self) -> Vec<ModuleType> {
        vec![Object::new("PageInfo")
            .field(scalar_field::<String, _>(
                "token",
                TypeRef::named_nn(TypeRef::STRING),
                |token| Value::String(token.clone()),
            ))
            .into()]
    }

    fn query_fields(&self) -> Vec<RootField> {
        vec![RootField::new("session", TypeRef::named("PageInfo"), |_| {
            resolved(Ok(Some(FieldValue::owned_any("abc".to_string()))))
        })]
    }
}

#[tokio::test]
async fn composed_schema_serves_fields_of_every_module() {
    let schema = build_schema(
        Database::open_in_memory().unwrap(),
        vec![Box::new(AccountsModule)],
    )
    .unwrap();

    let response = schema
        .execute(
            r#"mutation {
                login(username: "alice")
                createCategory(input: {name: "Dairy"}) { ok }
            }"#,
        )
        .await;
    assert!(response.errors.is_empty(), "{:?}", response.errors);

    let response = schema
        .execute(r#"{ me { username } categoryByName(name: "Dairy") { name } }"#)
        .await;
    assert!(response.errors.is_empty(), "{:?}", response.errors);
    assert_eq!(
        response.data.into_json().unwrap(),
        serde_json::json!({
            "me": {"username": "alice"},
            "categoryByName": {"name": "Dairy"}
        })
    );
}

#[test]
fn colliding_field_fails_at_startup_naming_both_modules() {
    let Err(err) = build_schema(
        Database::open_in_memory().unwrap(),
        vec![Box::new(AccountsModule), Box::new(ClashingModule)],
    ) else {
        panic!("colliding field must be rejected");
    };

    assert_eq!(
        err,
        RegistryError::FieldCollision {
            root: RootKind::Query,
            field: "ingredients".to_string(),
            existing_module: "cookbook".to_string(),
            module: "clashing".to_string(),
        }
    );
    assert!(err.to_string().contains("Query.ingredients"));
}

#[test]
fn registering_the_same_module_twice_fails() {
    let Err(err) = build_schema(
        Database::open_in_memory().unwrap(),
        vec![Box::new(AccountsModule), Box::new(AccountsModule)],
    ) else {
        panic!("duplicate module must be rejected");
    };
    assert_eq!(err, RegistryError::DuplicateModule("accounts".to_string()));
}

#[test]
fn exported_sdl_describes_the_cookbook_surface() {
    let schema = build_schema(Database::open_in_memory().unwrap(), Vec::new()).unwrap();
    let sdl = export_schema_sdl(&schema);

    for expected in [
        "interface Node",
        "type CategoryNode implements Node",
        "type IngredientNodeConnection",
        "type PageInfo",
        "input IngredientInput",
        "categoryByName(name: String!): CategoryType",
        "createIngredient(input: IngredientInput!): CreateIngredient",
        "deleteCategory(id: ID!): DeleteCategory",
    ] {
        assert!(sdl.contains(expected), "missing `{expected}` in:\n{sdl}");
    }
}

#[tokio::test]
async fn type_redefined_by_another_module_fails_at_startup() {
    let Err(err) = build_schema(
        Database::open_in_memory().unwrap(),
        vec![Box::new(AccountsModule), Box::new(SessionsModule)],
    ) else {
        panic!("redefined type must be rejected");
    };

    assert_eq!(
        err,
        RegistryError::TypeCollision {
            type_name: "PageInfo".to_string(),
            existing_module: "cookbook".to_string(),
            module: "sessions".to_string(),
        }
    );
    assert!(err.to_string().contains("`PageInfo`"));

    let schema = build_schema(
        Database::open_in_memory().unwrap(),
        vec![Box::new(AccountsModule)],
    )
    .unwrap();
    let response = schema
        .execute("{ allCategories { pageInfo { hasNextPage } } }")
        .await;
    assert!(response.errors.is_empty(), "{:?}", response.errors);
}
