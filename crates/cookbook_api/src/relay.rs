//! Relay plumbing: opaque global ids, array-slice cursors and connections.
//!
//! # Invariants
//! - Global ids are base64 of `"<TypeName>:<pk>"`.
//! - Cursors are base64 of `"arrayconnection:<offset>"` over the filtered,
//!   id-ordered result set; an unreadable cursor is treated as absent.
//! - A page never holds more than `MAX_PAGE_SIZE` edges.

use crate::error::{ApiError, ApiResult};
use crate::resolver::{optional_string, resolved, scalar_field};
use async_graphql::dynamic::{
    Field, FieldValue, InputValue, Object, ObjectAccessor, ResolverContext, TypeRef,
};
use async_graphql::{ErrorExtensions, Value};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use std::any::Any;

const CURSOR_PREFIX: &str = "arrayconnection:";
pub const MAX_PAGE_SIZE: u64 = 100;
pub const PAGE_INFO_TYPE: &str = "PageInfo";

pub fn to_global_id(type_name: &str, id: i64) -> String {
    STANDARD.encode(format!("{type_name}:{id}"))
}

/// Decodes a global id into `(type_name, pk)`.
pub fn from_global_id(global_id: &str) -> ApiResult<(String, i64)> {
    let invalid = || ApiError::InvalidId(format!("invalid global id `{global_id}`"));
    let decoded = STANDARD
        .decode(global_id)
        .ok()
        .and_then(|bytes| String::from_utf8(bytes).ok())
        .ok_or_else(invalid)?;
    let (type_name, pk) = decoded.split_once(':').ok_or_else(invalid)?;
    let pk = pk.parse::<i64>().map_err(|_| invalid())?;
    Ok((type_name.to_string(), pk))
}

/// Decodes a global id that must belong to `type_name`.
pub fn expect_global_id(global_id: &str, type_name: &str) -> ApiResult<i64> {
    let (actual_type, pk) = from_global_id(global_id)?;
    if actual_type != type_name {
        return Err(ApiError::InvalidId(format!(
            "Must receive a {type_name} id."
        )));
    }
    Ok(pk)
}

pub fn offset_to_cursor(offset: u64) -> String {
    STANDARD.encode(format!("{CURSOR_PREFIX}{offset}"))
}

pub fn cursor_to_offset(cursor: &str) -> Option<u64> {
    let decoded = String::from_utf8(STANDARD.decode(cursor).ok()?).ok()?;
    decoded.strip_prefix(CURSOR_PREFIX)?.parse().ok()
}

/// Standard connection arguments.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConnectionArgs {
    pub first: Option<i64>,
    pub last: Option<i64>,
    pub before: Option<String>,
    pub after: Option<String>,
    pub offset: Option<i64>,
}

impl ConnectionArgs {
    pub fn from_args(args: &ObjectAccessor<'_>) -> async_graphql::Result<Self> {
        let int = |name: &str| -> async_graphql::Result<Option<i64>> {
            match args.get(name) {
                Some(value) if !value.is_null() => Ok(Some(value.i64()?)),
                _ => Ok(None),
            }
        };

        Ok(Self {
            first: int("first")?,
            last: int("last")?,
            before: optional_string(args, "before")?,
            after: optional_string(args, "after")?,
            offset: int("offset")?,
        })
    }
}

/// Adds `first/last/before/after/offset` to a connection field.
pub fn with_connection_arguments(field: Field) -> Field {
    field
        .argument(InputValue::new("offset", TypeRef::named(TypeRef::INT)))
        .argument(InputValue::new("before", TypeRef::named(TypeRef::STRING)))
        .argument(InputValue::new("after", TypeRef::named(TypeRef::STRING)))
        .argument(InputValue::new("first", TypeRef::named(TypeRef::INT)))
        .argument(InputValue::new("last", TypeRef::named(TypeRef::INT)))
}

/// Half-open `[start, end)` slice of the result set plus page flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    pub start: u64,
    pub end: u64,
    pub has_previous_page: bool,
    pub has_next_page: bool,
}

impl Window {
    pub fn len(&self) -> u64 {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// `(offset, limit)` for a repository list query.
    pub fn as_page(&self) -> ApiResult<(u32, u32)> {
        let too_far = || ApiError::InvalidPagination("page is out of range".to_string());
        let offset = u32::try_from(self.start).map_err(|_| too_far())?;
        let limit = u32::try_from(self.len()).map_err(|_| too_far())?;
        Ok((offset, limit))
    }
}

/// Plans which slice of `total` items a connection request selects.
///
/// `field` names the connection in error messages.
pub fn plan_window(args: &ConnectionArgs, total: u64, field: &str) -> ApiResult<Window> {
    let mut first = page_size("first", args.first, field)?;
    let last = page_size("last", args.last, field)?;
    if first.is_none() && last.is_none() {
        first = Some(MAX_PAGE_SIZE);
    }

    let mut after = args.after.as_deref().and_then(cursor_to_offset);
    match args.offset {
        Some(offset) if offset < 0 => {
            return Err(ApiError::InvalidPagination(
                "Argument 'offset' must be a non-negative integer.".to_string(),
            ));
        }
        Some(offset) if offset > 0 => {
            let start = offset
                .unsigned_abs()
                .saturating_add(after.map_or(0, |after| after.saturating_add(1)));
            after = Some(start - 1);
        }
        _ => {}
    }
    let before = args.before.as_deref().and_then(cursor_to_offset);

    // Saturates past every row, so an extreme cursor selects an empty page.
    let lower_bound = after.map_or(0, |after| after.saturating_add(1));
    let upper_bound = before.unwrap_or(total);

    let mut start = lower_bound;
    let mut end = upper_bound.min(total);
    if let Some(first) = first {
        end = end.min(start.saturating_add(first));
    }
    if let Some(last) = last {
        start = start.max(end.saturating_sub(last));
    }

    Ok(Window {
        start,
        end: end.max(start),
        has_previous_page: last.is_some() && start > lower_bound,
        has_next_page: first.is_some() && end < upper_bound,
    })
}

fn page_size(name: &str, value: Option<i64>, field: &str) -> ApiResult<Option<u64>> {
    let Some(value) = value else {
        return Ok(None);
    };
    if value < 0 {
        return Err(ApiError::InvalidPagination(format!(
            "Argument '{name}' must be a non-negative integer."
        )));
    }
    let value = value.unsigned_abs();
    if value > MAX_PAGE_SIZE {
        return Err(ApiError::InvalidPagination(format!(
            "Requesting {value} records on the `{field}` connection exceeds the `{name}` limit of {MAX_PAGE_SIZE} records."
        )));
    }
    Ok(Some(value))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageInfo {
    pub has_next_page: bool,
    pub has_previous_page: bool,
    pub start_cursor: Option<String>,
    pub end_cursor: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edge<T> {
    pub cursor: String,
    pub node: T,
}

/// One resolved page: the parent value of `<Node>Connection` objects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Connection<T> {
    pub edges: Vec<Edge<T>>,
    pub page_info: PageInfo,
}

impl<T> Connection<T> {
    /// Pairs `nodes`, loaded for `window`, with their cursors.
    pub fn from_window(window: Window, nodes: Vec<T>) -> Self {
        let edges: Vec<Edge<T>> = nodes
            .into_iter()
            .enumerate()
            .map(|(index, node)| Edge {
                cursor: offset_to_cursor(window.start + index as u64),
                node,
            })
            .collect();

        let page_info = PageInfo {
            has_next_page: window.has_next_page,
            has_previous_page: window.has_previous_page,
            start_cursor: edges.first().map(|edge| edge.cursor.clone()),
            end_cursor: edges.last().map(|edge| edge.cursor.clone()),
        };

        Self { edges, page_info }
    }
}

pub fn connection_type_name(node_type: &str) -> String {
    format!("{node_type}Connection")
}

fn edge_type_name(node_type: &str) -> String {
    format!("{node_type}Edge")
}

pub fn page_info_type() -> Object {
    let optional_cursor = |cursor: &Option<String>| match cursor {
        Some(cursor) => Value::from(cursor.clone()),
        None => Value::Null,
    };

    Object::new(PAGE_INFO_TYPE)
        .field(scalar_field::<PageInfo, _>(
            "hasNextPage",
            TypeRef::named_nn(TypeRef::BOOLEAN),
            |info| Value::Boolean(info.has_next_page),
        ))
        .field(scalar_field::<PageInfo, _>(
            "hasPreviousPage",
            TypeRef::named_nn(TypeRef::BOOLEAN),
            |info| Value::Boolean(info.has_previous_page),
        ))
        .field(scalar_field::<PageInfo, _>(
            "startCursor",
            TypeRef::named(TypeRef::STRING),
            move |info| optional_cursor(&info.start_cursor),
        ))
        .field(scalar_field::<PageInfo, _>(
            "endCursor",
            TypeRef::named(TypeRef::STRING),
            move |info| optional_cursor(&info.end_cursor),
        ))
}

/// Builds the `<Node>Connection` and `<Node>Edge` objects for nodes of `T`.
pub fn connection_types<T>(node_type: &str) -> [Object; 2]
where
    T: Any + Clone + Send + Sync,
{
    let edge_type = edge_type_name(node_type);

    let connection = Object::new(connection_type_name(node_type))
        .field(Field::new(
            "pageInfo",
            TypeRef::named_nn(PAGE_INFO_TYPE),
            |ctx| resolved(connection_page_info::<T>(&ctx)),
        ))
        .field(Field::new(
            "edges",
            TypeRef::named_list_nn(edge_type.clone()),
            |ctx| resolved(connection_edges::<T>(&ctx)),
        ));

    let edge = Object::new(edge_type)
        .field(Field::new("node", TypeRef::named(node_type), |ctx| {
            resolved(edge_node::<T>(&ctx))
        }))
        .field(scalar_field::<Edge<T>, _>(
            "cursor",
            TypeRef::named_nn(TypeRef::STRING),
            |edge| Value::from(edge.cursor.clone()),
        ));

    [connection, edge]
}

fn connection_page_info<'a, T: Any + Clone + Send + Sync>(
    ctx: &ResolverContext<'a>,
) -> async_graphql::Result<Option<FieldValue<'a>>> {
    let connection = ctx.parent_value.try_downcast_ref::<Connection<T>>()?;
    Ok(Some(FieldValue::owned_any(connection.page_info.clone())))
}

fn connection_edges<'a, T: Any + Clone + Send + Sync>(
    ctx: &ResolverContext<'a>,
) -> async_graphql::Result<Option<FieldValue<'a>>> {
    let connection = ctx.parent_value.try_downcast_ref::<Connection<T>>()?;
    Ok(Some(FieldValue::list(
        connection.edges.iter().cloned().map(FieldValue::owned_any),
    )))
}

fn edge_node<'a, T: Any + Clone + Send + Sync>(
    ctx: &ResolverContext<'a>,
) -> async_graphql::Result<Option<FieldValue<'a>>> {
    let edge = ctx.parent_value.try_downcast_ref::<Edge<T>>()?;
    Ok(Some(FieldValue::owned_any(edge.node.clone())))
}

/// Resolves a connection field: count, plan the window, then load it.
pub fn resolve_connection<T>(
    args: &ObjectAccessor<'_>,
    field: &str,
    count: impl FnOnce() -> ApiResult<u64>,
    load: impl FnOnce(u32, u32) -> ApiResult<Vec<T>>,
) -> async_graphql::Result<Connection<T>> {
    let args = ConnectionArgs::from_args(args)?;
    let total = count().map_err(|err| err.extend())?;
    let window = plan_window(&args, total, field).map_err(|err| err.extend())?;
    if window.is_empty() {
        return Ok(Connection::from_window(window, Vec::new()));
    }
    let (offset, limit) = window.as_page().map_err(|err| err.extend())?;
    let nodes = load(offset, limit).map_err(|err| err.extend())?;
    Ok(Connection::from_window(window, nodes))
}
