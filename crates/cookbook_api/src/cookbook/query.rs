//! Root query fields of the cookbook module.

use crate::cookbook::types::{
    category_connection, ingredient_connection, CATEGORY_NODE, CATEGORY_TYPE, INGREDIENT_NODE,
    INGREDIENT_TYPE, NODE_INTERFACE,
};
use crate::database::Database;
use crate::error::{ApiError, ApiResult};
use crate::registry::RootField;
use crate::relay::{connection_type_name, expect_global_id, from_global_id};
use crate::resolver::{id_text, id_value_text, optional_string, resolved, Resolved};
use async_graphql::dynamic::{FieldValue, InputValue, ObjectAccessor, ResolverContext, TypeRef};
use async_graphql::{ErrorExtensions, Value};
use cookbook_core::{CategoryFilter, IngredientFilter};

pub fn query_fields() -> Vec<RootField> {
    vec![
        RootField::new(
            "ingredients",
            TypeRef::named_nn_list_nn(INGREDIENT_TYPE),
            |ctx| resolved(all_ingredients(&ctx)),
        )
        .description("Every ingredient, ordered by id."),
        RootField::new("categoryByName", TypeRef::named(CATEGORY_TYPE), |ctx| {
            resolved(category_by_name(&ctx))
        })
        .argument(InputValue::new("name", TypeRef::named_nn(TypeRef::STRING))),
        RootField::new("category", TypeRef::named(CATEGORY_NODE), |ctx| {
            resolved(category_node(&ctx))
        })
        .argument(id_argument()),
        RootField::new("ingredient", TypeRef::named(INGREDIENT_NODE), |ctx| {
            resolved(ingredient_node(&ctx))
        })
        .argument(id_argument()),
        RootField::new("node", TypeRef::named(NODE_INTERFACE), |ctx| {
            resolved(node(&ctx))
        })
        .argument(id_argument())
        .description("Fetches an object given its global id."),
        RootField::new(
            "allCategories",
            TypeRef::named_nn(connection_type_name(CATEGORY_NODE)),
            |ctx| resolved(all_categories(&ctx)),
        )
        .argument(string_argument("name"))
        .argument(InputValue::new(
            "ingredients",
            TypeRef::named_list(TypeRef::ID),
        ))
        .with_connection_arguments(),
        RootField::new(
            "allIngredients",
            TypeRef::named_nn(connection_type_name(INGREDIENT_NODE)),
            |ctx| resolved(all_ingredients_connection(&ctx)),
        )
        .argument(string_argument("name"))
        .argument(string_argument("name_Icontains"))
        .argument(string_argument("name_Istartswith"))
        .argument(string_argument("notes"))
        .argument(string_argument("notes_Icontains"))
        .argument(InputValue::new("category", TypeRef::named(TypeRef::ID)))
        .argument(string_argument("category_Name"))
        .with_connection_arguments(),
    ]
}

fn id_argument() -> InputValue {
    InputValue::new("id", TypeRef::named_nn(TypeRef::ID))
}

fn string_argument(name: &str) -> InputValue {
    InputValue::new(name, TypeRef::named(TypeRef::STRING))
}

fn required_id(args: &ObjectAccessor<'_>) -> async_graphql::Result<String> {
    id_text(&args.try_get("id")?).map_err(|err| err.extend())
}

/// Decodes an optional global id filter of `type_name`.
fn optional_global_id(
    args: &ObjectAccessor<'_>,
    name: &str,
    type_name: &str,
) -> ApiResult<Option<i64>> {
    match args.get(name) {
        Some(value) if !value.is_null() => {
            let id = id_text(&value)?;
            Ok(Some(expect_global_id(&id, type_name)?))
        }
        _ => Ok(None),
    }
}

/// Decodes an optional list of global ids of `type_name`; null entries are skipped.
///
/// A single id is accepted as a one-element list.
fn global_id_list(
    args: &ObjectAccessor<'_>,
    name: &str,
    type_name: &str,
) -> ApiResult<Vec<i64>> {
    let Some(values) = args.get(name) else {
        return Ok(Vec::new());
    };
    let items: Vec<&Value> = match values.as_value() {
        Value::List(items) => items.iter().collect(),
        single => vec![single],
    };
    items
        .into_iter()
        .filter(|item| !matches!(item, Value::Null))
        .map(|item| expect_global_id(&id_value_text(item)?, type_name))
        .collect()
}

fn all_ingredients<'a>(ctx: &ResolverContext<'a>) -> Resolved<'a> {
    let ingredients = Database::from_context(ctx)?
        .run(|service| service.all_ingredients())
        .map_err(|err| err.extend())?;
    Ok(Some(FieldValue::list(
        ingredients.into_iter().map(FieldValue::owned_any),
    )))
}

fn category_by_name<'a>(ctx: &ResolverContext<'a>) -> Resolved<'a> {
    let name = ctx.args.try_get("name")?;
    let name = name.string()?;
    let category = Database::from_context(ctx)?
        .run(|service| service.category_by_name(name))
        .map_err(|err| err.extend())?;
    Ok(category.map(FieldValue::owned_any))
}

fn category_node<'a>(ctx: &ResolverContext<'a>) -> Resolved<'a> {
    let id = required_id(&ctx.args)?;
    let database = Database::from_context(ctx)?;
    let category = expect_global_id(&id, CATEGORY_NODE)
        .and_then(|pk| database.run(|service| service.require_category(pk)))
        .map_err(|err| err.extend())?;
    Ok(Some(FieldValue::owned_any(category)))
}

fn ingredient_node<'a>(ctx: &ResolverContext<'a>) -> Resolved<'a> {
    let id = required_id(&ctx.args)?;
    let database = Database::from_context(ctx)?;
    let ingredient = expect_global_id(&id, INGREDIENT_NODE)
        .and_then(|pk| database.run(|service| service.require_ingredient(pk)))
        .map_err(|err| err.extend())?;
    Ok(Some(FieldValue::owned_any(ingredient)))
}

fn node<'a>(ctx: &ResolverContext<'a>) -> Resolved<'a> {
    let id = required_id(&ctx.args)?;
    let database = Database::from_context(ctx)?;
    let resolve = || -> ApiResult<FieldValue<'a>> {
        let (type_name, pk) = from_global_id(&id)?;
        match type_name.as_str() {
            CATEGORY_NODE => {
                let category = database.run(|service| service.require_category(pk))?;
                Ok(FieldValue::owned_any(category).with_type(CATEGORY_NODE))
            }
            INGREDIENT_NODE => {
                let ingredient = database.run(|service| service.require_ingredient(pk))?;
                Ok(FieldValue::owned_any(ingredient).with_type(INGREDIENT_NODE))
            }
            other => Err(ApiError::InvalidId(format!("unknown node type `{other}`"))),
        }
    };
    Ok(Some(resolve().map_err(|err| err.extend())?))
}

fn all_categories<'a>(ctx: &ResolverContext<'a>) -> Resolved<'a> {
    let filter = CategoryFilter {
        name: optional_string(&ctx.args, "name")?,
        ingredient_ids: global_id_list(&ctx.args, "ingredients", INGREDIENT_NODE)
            .map_err(|err| err.extend())?,
    };
    let connection = category_connection(
        Database::from_context(ctx)?,
        &ctx.args,
        "allCategories",
        filter,
    )?;
    Ok(Some(FieldValue::owned_any(connection)))
}

fn all_ingredients_connection<'a>(ctx: &ResolverContext<'a>) -> Resolved<'a> {
    let args = &ctx.args;
    let filter = IngredientFilter {
        name: optional_string(args, "name")?,
        name_icontains: optional_string(args, "name_Icontains")?,
        name_istartswith: optional_string(args, "name_Istartswith")?,
        notes: optional_string(args, "notes")?,
        notes_icontains: optional_string(args, "notes_Icontains")?,
        category_id: optional_global_id(args, "category", CATEGORY_NODE)
            .map_err(|err| err.extend())?,
        category_name: optional_string(args, "category_Name")?,
    };
    let connection = ingredient_connection(
        Database::from_context(ctx)?,
        args,
        "allIngredients",
        filter,
    )?;
    Ok(Some(FieldValue::owned_any(connection)))
}
