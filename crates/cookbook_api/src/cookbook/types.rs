//! Object types of the cookbook module and their field resolvers.
//!
//! `CategoryType`/`IngredientType` expose raw primary keys; the `*Node`
//! variants expose global ids and take part in relay lookups and paging.

use crate::database::Database;
use crate::error::ApiResult;
use crate::relay::{
    connection_type_name, connection_types, resolve_connection, to_global_id, Connection,
};
use crate::resolver::{id_value, resolved, scalar_field, Resolved};
use async_graphql::dynamic::{
    Field, FieldValue, Interface, InterfaceField, Object, ObjectAccessor, ResolverContext,
    TypeRef,
};
use async_graphql::{ErrorExtensions, Value};
use cookbook_core::{
    Category, CategoryFilter, CategoryListQuery, Ingredient, IngredientFilter,
    IngredientListQuery,
};

pub const NODE_INTERFACE: &str = "Node";
pub const CATEGORY_TYPE: &str = "CategoryType";
pub const INGREDIENT_TYPE: &str = "IngredientType";
pub const CATEGORY_NODE: &str = "CategoryNode";
pub const INGREDIENT_NODE: &str = "IngredientNode";
pub const CREATE_CATEGORY_PAYLOAD: &str = "CreateCategory";
pub const UPDATE_CATEGORY_PAYLOAD: &str = "UpdateCategory";
pub const DELETE_CATEGORY_PAYLOAD: &str = "DeleteCategory";
pub const CREATE_INGREDIENT_PAYLOAD: &str = "CreateIngredient";

/// Result of a category mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryPayload {
    pub category: Option<Category>,
    pub ok: Option<bool>,
}

impl CategoryPayload {
    pub fn ok(category: Category) -> Self {
        Self {
            category: Some(category),
            ok: Some(true),
        }
    }
}

/// Result of an ingredient mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngredientPayload {
    pub ingredient: Option<Ingredient>,
    pub ok: Option<bool>,
}

impl IngredientPayload {
    pub fn ok(ingredient: Ingredient) -> Self {
        Self {
            ingredient: Some(ingredient),
            ok: Some(true),
        }
    }
}

pub fn node_interface() -> Interface {
    Interface::new(NODE_INTERFACE)
        .description("An object with a globally unique id.")
        .field(InterfaceField::new("id", TypeRef::named_nn(TypeRef::ID)))
}

pub fn category_type() -> Object {
    Object::new(CATEGORY_TYPE)
        .field(scalar_field::<Category, _>(
            "id",
            TypeRef::named_nn(TypeRef::ID),
            |category| id_value(category.id),
        ))
        .field(category_name_field())
        .field(Field::new(
            "ingredients",
            TypeRef::named_nn_list_nn(INGREDIENT_TYPE),
            |ctx| resolved(category_ingredients(&ctx)),
        ))
}

pub fn ingredient_type() -> Object {
    Object::new(INGREDIENT_TYPE)
        .field(scalar_field::<Ingredient, _>(
            "id",
            TypeRef::named_nn(TypeRef::ID),
            |ingredient| id_value(ingredient.id),
        ))
        .field(ingredient_name_field())
        .field(ingredient_notes_field())
        .field(Field::new(
            "category",
            TypeRef::named_nn(CATEGORY_TYPE),
            |ctx| resolved(ingredient_category(&ctx)),
        ))
}

pub fn category_node() -> Object {
    let ingredients = Field::new(
        "ingredients",
        TypeRef::named_nn(connection_type_name(INGREDIENT_NODE)),
        |ctx| resolved(category_node_ingredients(&ctx)),
    );

    Object::new(CATEGORY_NODE)
        .implement(NODE_INTERFACE)
        .field(scalar_field::<Category, _>(
            "id",
            TypeRef::named_nn(TypeRef::ID),
            |category| Value::from(to_global_id(CATEGORY_NODE, category.id)),
        ))
        .field(category_name_field())
        .field(crate::relay::with_connection_arguments(ingredients))
}

pub fn ingredient_node() -> Object {
    Object::new(INGREDIENT_NODE)
        .implement(NODE_INTERFACE)
        .field(scalar_field::<Ingredient, _>(
            "id",
            TypeRef::named_nn(TypeRef::ID),
            |ingredient| Value::from(to_global_id(INGREDIENT_NODE, ingredient.id)),
        ))
        .field(ingredient_name_field())
        .field(ingredient_notes_field())
        .field(Field::new(
            "category",
            TypeRef::named_nn(CATEGORY_NODE),
            |ctx| resolved(ingredient_category(&ctx)),
        ))
}

/// Connection and edge objects for both node types.
pub fn node_connection_types() -> Vec<Object> {
    let mut objects = Vec::with_capacity(4);
    objects.extend(connection_types::<Category>(CATEGORY_NODE));
    objects.extend(connection_types::<Ingredient>(INGREDIENT_NODE));
    objects
}

pub fn payload_types() -> Vec<Object> {
    let category_payload = |name: &str| {
        Object::new(name)
            .field(Field::new("category", TypeRef::named(CATEGORY_TYPE), |ctx| {
                resolved(payload_category(&ctx))
            }))
            .field(scalar_field::<CategoryPayload, _>(
                "ok",
                TypeRef::named(TypeRef::BOOLEAN),
                |payload| payload.ok.map_or(Value::Null, Value::Boolean),
            ))
    };

    vec![
        category_payload(CREATE_CATEGORY_PAYLOAD),
        category_payload(UPDATE_CATEGORY_PAYLOAD),
        category_payload(DELETE_CATEGORY_PAYLOAD),
        Object::new(CREATE_INGREDIENT_PAYLOAD)
            .field(Field::new(
                "ingredient",
                TypeRef::named(INGREDIENT_TYPE),
                |ctx| resolved(payload_ingredient(&ctx)),
            ))
            .field(scalar_field::<IngredientPayload, _>(
                "ok",
                TypeRef::named(TypeRef::BOOLEAN),
                |payload| payload.ok.map_or(Value::Null, Value::Boolean),
            )),
    ]
}

fn category_name_field() -> Field {
    scalar_field::<Category, _>("name", TypeRef::named_nn(TypeRef::STRING), |category| {
        Value::from(category.name.clone())
    })
}

fn ingredient_name_field() -> Field {
    scalar_field::<Ingredient, _>("name", TypeRef::named_nn(TypeRef::STRING), |ingredient| {
        Value::from(ingredient.name.clone())
    })
}

fn ingredient_notes_field() -> Field {
    scalar_field::<Ingredient, _>("notes", TypeRef::named_nn(TypeRef::STRING), |ingredient| {
        Value::from(ingredient.notes.clone())
    })
}

fn category_ingredients<'a>(ctx: &ResolverContext<'a>) -> Resolved<'a> {
    let category = ctx.parent_value.try_downcast_ref::<Category>()?;
    let query = IngredientListQuery {
        filter: IngredientFilter::for_category(category.id),
        ..IngredientListQuery::default()
    };
    let ingredients = Database::from_context(ctx)?
        .run(|service| service.list_ingredients(&query))
        .map_err(|err| err.extend())?;
    Ok(Some(FieldValue::list(
        ingredients.into_iter().map(FieldValue::owned_any),
    )))
}

fn ingredient_category<'a>(ctx: &ResolverContext<'a>) -> Resolved<'a> {
    let ingredient = ctx.parent_value.try_downcast_ref::<Ingredient>()?;
    let category = Database::from_context(ctx)?
        .run(|service| service.require_category(ingredient.category_id))
        .map_err(|err| err.extend())?;
    Ok(Some(FieldValue::owned_any(category)))
}

fn category_node_ingredients<'a>(ctx: &ResolverContext<'a>) -> Resolved<'a> {
    let category = ctx.parent_value.try_downcast_ref::<Category>()?;
    let connection = ingredient_connection(
        Database::from_context(ctx)?,
        &ctx.args,
        "ingredients",
        IngredientFilter::for_category(category.id),
    )?;
    Ok(Some(FieldValue::owned_any(connection)))
}

fn payload_category<'a>(ctx: &ResolverContext<'a>) -> Resolved<'a> {
    let payload = ctx.parent_value.try_downcast_ref::<CategoryPayload>()?;
    Ok(payload.category.clone().map(FieldValue::owned_any))
}

fn payload_ingredient<'a>(ctx: &ResolverContext<'a>) -> Resolved<'a> {
    let payload = ctx.parent_value.try_downcast_ref::<IngredientPayload>()?;
    Ok(payload.ingredient.clone().map(FieldValue::owned_any))
}

/// Pages through ingredients matching `filter`, ordered by id.
pub fn ingredient_connection(
    database: &Database,
    args: &ObjectAccessor<'_>,
    field: &str,
    filter: IngredientFilter,
) -> async_graphql::Result<Connection<Ingredient>> {
    resolve_connection(
        args,
        field,
        || database.run(|service| service.count_ingredients(&filter)),
        |offset, limit| -> ApiResult<Vec<Ingredient>> {
            let query = IngredientListQuery {
                filter: filter.clone(),
                limit: Some(limit),
                offset,
            };
            database.run(|service| service.list_ingredients(&query))
        },
    )
}

/// Pages through categories matching `filter`, ordered by id.
pub fn category_connection(
    database: &Database,
    args: &ObjectAccessor<'_>,
    field: &str,
    filter: CategoryFilter,
) -> async_graphql::Result<Connection<Category>> {
    resolve_connection(
        args,
        field,
        || database.run(|service| service.count_categories(&filter)),
        |offset, limit| -> ApiResult<Vec<Category>> {
            let query = CategoryListQuery {
                filter: filter.clone(),
                limit: Some(limit),
                offset,
            };
            database.run(|service| service.list_categories(&query))
        },
    )
}
