//! Small helpers shared by dynamic-schema resolvers.

use crate::error::{ApiError, ApiResult};
use async_graphql::dynamic::{
    Field, FieldFuture, FieldValue, ObjectAccessor, TypeRef, ValueAccessor,
};
use async_graphql::{ErrorExtensions, Value};
use std::any::Any;

pub type Resolved<'a> = async_graphql::Result<Option<FieldValue<'a>>>;

/// Wraps an already computed outcome.
///
/// Store calls are synchronous, so resolvers finish their work before the
/// future is built and never hold the store lock across an await point.
pub fn resolved(outcome: Resolved<'_>) -> FieldFuture<'_> {
    FieldFuture::new(async move { outcome })
}

/// Field that reads a plain value out of its owned parent `T`.
pub fn scalar_field<T, F>(name: &str, ty: TypeRef, read: F) -> Field
where
    T: Any + Send + Sync,
    F: Fn(&T) -> Value + Send + Sync + 'static,
{
    Field::new(name, ty, move |ctx| {
        let outcome = ctx
            .parent_value
            .try_downcast_ref::<T>()
            .map(|parent| Some(FieldValue::value(read(parent))));
        resolved(outcome)
    })
}

pub fn id_value(id: i64) -> Value {
    Value::from(id.to_string())
}

/// Reads an optional string argument or input field; explicit null counts as absent.
pub fn optional_string(
    args: &ObjectAccessor<'_>,
    name: &str,
) -> async_graphql::Result<Option<String>> {
    match args.get(name) {
        Some(value) if !value.is_null() => Ok(Some(value.string()?.to_string())),
        _ => Ok(None),
    }
}

/// Like `optional_string`, but absence is a validation error.
pub fn required_string(args: &ObjectAccessor<'_>, name: &str) -> async_graphql::Result<String> {
    optional_string(args, name)?
        .ok_or_else(|| ApiError::Validation(format!("`{name}` is required")).extend())
}

/// Reads a raw primary key given as an Int or a numeric string.
pub fn raw_pk(value: &ValueAccessor<'_>) -> ApiResult<i64> {
    let parsed = match value.as_value() {
        Value::Number(number) => number.as_i64(),
        Value::String(text) => text.trim().parse::<i64>().ok(),
        _ => None,
    };
    parsed.ok_or_else(|| ApiError::InvalidId(format!("invalid id `{}`", value.as_value())))
}

/// Reads an `ID` value as text; `ID` accepts both string and int literals.
pub fn id_text(value: &ValueAccessor<'_>) -> ApiResult<String> {
    id_value_text(value.as_value())
}

pub fn id_value_text(value: &Value) -> ApiResult<String> {
    match value {
        Value::String(text) => Ok(text.clone()),
        Value::Number(number) => Ok(number.to_string()),
        other => Err(ApiError::InvalidId(format!("invalid id `{other}`"))),
    }
}
