//! GraphQL layer of the cookbook service.
//!
//! The root schema is composed by [`SchemaRegistry`] from independent
//! [`ApiModule`]s; [`CookbookModule`] is the built-in one.

pub mod cookbook;
pub mod database;
pub mod error;
pub mod registry;
pub mod relay;
pub mod resolver;

pub use async_graphql::dynamic::Schema;
pub use cookbook::CookbookModule;
pub use database::Database;
pub use error::{ApiError, ApiResult};
pub use registry::{
    ApiModule, ModuleType, RegistryError, RootField, RootKind, SchemaRegistry,
};

/// Builds the schema from the cookbook module plus `extra_modules`, in order.
///
/// # Errors
/// - `RegistryError` when modules collide or the merged schema is invalid.
pub fn build_schema(
    database: Database,
    extra_modules: Vec<Box<dyn ApiModule>>,
) -> Result<Schema, RegistryError> {
    let mut registry = SchemaRegistry::new();
    registry.register_module(Box::new(CookbookModule))?;
    for module in extra_modules {
        registry.register_module(module)?;
    }
    registry.finish(database)
}

/// Renders the schema in GraphQL SDL.
pub fn export_schema_sdl(schema: &Schema) -> String {
    schema.sdl()
}

/// Returns the API crate version.
pub fn api_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
