//! Root mutation fields and input types of the cookbook module.
//!
//! # Invariants
//! - Input fields are all optional in the schema; each resolver checks the
//!   ones it needs and reports `VALIDATION` before touching the store.
//! - A failed mutation writes nothing.

use crate::cookbook::types::{
    CategoryPayload, IngredientPayload, CREATE_CATEGORY_PAYLOAD, CREATE_INGREDIENT_PAYLOAD,
    DELETE_CATEGORY_PAYLOAD, UPDATE_CATEGORY_PAYLOAD,
};
use crate::database::Database;
use crate::error::ApiError;
use crate::registry::RootField;
use crate::resolver::{optional_string, raw_pk, required_string, resolved, Resolved};
use async_graphql::dynamic::{
    FieldValue, InputObject, InputValue, ObjectAccessor, ResolverContext, TypeRef,
};
use async_graphql::ErrorExtensions;
use cookbook_core::CategoryId;
use log::warn;

pub const CATEGORY_INPUT: &str = "CategoryInput";
pub const INGREDIENT_INPUT: &str = "IngredientInput";

/// Parsed `CategoryInput`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategoryInput {
    pub name: Option<String>,
}

impl CategoryInput {
    pub fn from_accessor(input: &ObjectAccessor<'_>) -> async_graphql::Result<Self> {
        Ok(Self {
            name: optional_string(input, "name")?,
        })
    }
}

/// Parsed `IngredientInput`; `category` holds raw category ids.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IngredientInput {
    pub category: Vec<CategoryId>,
    pub name: String,
    pub notes: String,
}

impl IngredientInput {
    /// Parses and checks that every field is present and `category` is non-empty.
    pub fn from_accessor(input: &ObjectAccessor<'_>) -> async_graphql::Result<Self> {
        let mut category = Vec::new();
        if let Some(ids) = input.get("category").filter(|value| !value.is_null()) {
            for id in ids.list()?.iter() {
                category.push(raw_pk(&id).map_err(|err| err.extend())?);
            }
        }
        if category.is_empty() {
            return Err(
                ApiError::Validation("`category` must name at least one category".to_string())
                    .extend(),
            );
        }

        Ok(Self {
            category,
            name: required_string(input, "name")?,
            notes: required_string(input, "notes")?,
        })
    }

    /// The category the ingredient is linked to; extra ids are ignored.
    pub fn category_id(&self) -> Option<CategoryId> {
        self.category.first().copied()
    }
}

pub fn input_types() -> [InputObject; 2] {
    [
        InputObject::new(CATEGORY_INPUT)
            .field(InputValue::new("name", TypeRef::named(TypeRef::STRING))),
        InputObject::new(INGREDIENT_INPUT)
            .field(InputValue::new("category", TypeRef::named_list(TypeRef::ID)))
            .field(InputValue::new("name", TypeRef::named(TypeRef::STRING)))
            .field(InputValue::new("notes", TypeRef::named(TypeRef::STRING))),
    ]
}

pub fn mutation_fields() -> Vec<RootField> {
    vec![
        RootField::new(
            "createCategory",
            TypeRef::named(CREATE_CATEGORY_PAYLOAD),
            |ctx| resolved(create_category(&ctx)),
        )
        .argument(InputValue::new("input", TypeRef::named_nn(CATEGORY_INPUT))),
        RootField::new(
            "updateCategory",
            TypeRef::named(UPDATE_CATEGORY_PAYLOAD),
            |ctx| resolved(update_category(&ctx)),
        )
        .argument(InputValue::new("id", TypeRef::named_nn(TypeRef::INT)))
        .argument(InputValue::new("input", TypeRef::named(CATEGORY_INPUT))),
        RootField::new(
            "deleteCategory",
            TypeRef::named(DELETE_CATEGORY_PAYLOAD),
            |ctx| resolved(delete_category(&ctx)),
        )
        .argument(InputValue::new("id", TypeRef::named_nn(TypeRef::ID))),
        RootField::new(
            "createIngredient",
            TypeRef::named(CREATE_INGREDIENT_PAYLOAD),
            |ctx| resolved(create_ingredient(&ctx)),
        )
        .argument(InputValue::new("input", TypeRef::named_nn(INGREDIENT_INPUT))),
    ]
}

fn create_category<'a>(ctx: &ResolverContext<'a>) -> Resolved<'a> {
    let input = ctx.args.try_get("input")?;
    let input = CategoryInput::from_accessor(&input.object()?)?;
    let name = input
        .name
        .ok_or_else(|| ApiError::Validation("`name` is required".to_string()).extend())?;
    let category = Database::from_context(ctx)?
        .run(|service| service.create_category(&name))
        .map_err(|err| err.extend())?;
    Ok(Some(FieldValue::owned_any(CategoryPayload::ok(category))))
}

fn update_category<'a>(ctx: &ResolverContext<'a>) -> Resolved<'a> {
    let id = ctx.args.try_get("id")?.i64()?;
    let input = match ctx.args.get("input").filter(|value| !value.is_null()) {
        Some(input) => CategoryInput::from_accessor(&input.object()?)?,
        None => CategoryInput::default(),
    };
    let category = Database::from_context(ctx)?
        .run(|service| service.update_category(id, input.name))
        .map_err(|err| err.extend())?;
    Ok(Some(FieldValue::owned_any(CategoryPayload::ok(category))))
}

fn delete_category<'a>(ctx: &ResolverContext<'a>) -> Resolved<'a> {
    let id = raw_pk(&ctx.args.try_get("id")?).map_err(|err| err.extend())?;
    let category = Database::from_context(ctx)?
        .run(|service| service.delete_category(id))
        .map_err(|err| err.extend())?;
    Ok(Some(FieldValue::owned_any(CategoryPayload::ok(category))))
}

fn create_ingredient<'a>(ctx: &ResolverContext<'a>) -> Resolved<'a> {
    let input = ctx.args.try_get("input")?;
    let input = IngredientInput::from_accessor(&input.object()?)?;
    let Some(category_id) = input.category_id() else {
        return Err(ApiError::Validation("`category` is required".to_string()).extend());
    };
    if input.category.len() > 1 {
        warn!(
            "event=ingredient_create module=api status=warn reason=extra_category_ids used={category_id} ignored={}",
            input.category.len() - 1
        );
    }

    let ingredient = Database::from_context(ctx)?
        .run(|service| service.create_ingredient(category_id, &input.name, &input.notes))
        .map_err(|err| err.extend())?;
    Ok(Some(FieldValue::owned_any(IngredientPayload::ok(ingredient))))
}
