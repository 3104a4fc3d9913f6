//! Root schema composition from independently declared modules.
//!
//! # Responsibility
//! - Collect the root `Query` and `Mutation` fields every module contributes.
//! - Reject a duplicate module name, or a field or type name claimed twice,
//!   naming both owners.
//!
//! # Invariants
//! - Registration is all-or-nothing: a rejected module leaves the registry
//!   unchanged.
//! - `Mutation` exists only when at least one module contributes to it.

use async_graphql::dynamic::{
    Field, FieldFuture, InputObject, InputValue, Interface, Object, ResolverContext, Schema,
    SchemaBuilder, TypeRef,
};
use log::info;
use std::any::Any;
use std::collections::{BTreeMap, BTreeSet};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub const QUERY_TYPE: &str = "Query";
pub const MUTATION_TYPE: &str = "Mutation";
/// Owner reported for the root type names the registry itself defines.
pub const REGISTRY_OWNER: &str = "registry";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum RootKind {
    Query,
    Mutation,
}

impl Display for RootKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Query => write!(f, "{QUERY_TYPE}"),
            Self::Mutation => write!(f, "{MUTATION_TYPE}"),
        }
    }
}

/// One field a module adds to a root type.
pub struct RootField {
    name: String,
    field: Field,
}

impl RootField {
    pub fn new<F>(name: &str, ty: impl Into<TypeRef>, resolver: F) -> Self
    where
        F: for<'a> Fn(ResolverContext<'a>) -> FieldFuture<'a> + Send + Sync + 'static,
    {
        Self {
            name: name.to_string(),
            field: Field::new(name, ty, resolver),
        }
    }

    pub fn argument(mut self, input: InputValue) -> Self {
        self.field = self.field.argument(input);
        self
    }

    pub fn description(mut self, description: &str) -> Self {
        self.field = self.field.description(description);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Adds `first/last/before/after/offset` to this field.
    pub fn with_connection_arguments(mut self) -> Self {
        self.field = crate::relay::with_connection_arguments(self.field);
        self
    }
}

/// A named type a module adds to the schema.
pub enum ModuleType {
    Object(Object),
    Interface(Interface),
    InputObject(InputObject),
}

impl ModuleType {
    pub fn name(&self) -> &str {
        match self {
            Self::Object(object) => object.type_name(),
            Self::Interface(interface) => interface.type_name(),
            Self::InputObject(input) => input.type_name(),
        }
    }

    fn register(self, builder: SchemaBuilder) -> SchemaBuilder {
        match self {
            Self::Object(object) => builder.register(object),
            Self::Interface(interface) => builder.register(interface),
            Self::InputObject(input) => builder.register(input),
        }
    }
}

impl From<Object> for ModuleType {
    fn from(value: Object) -> Self {
        Self::Object(value)
    }
}

impl From<Interface> for ModuleType {
    fn from(value: Interface) -> Self {
        Self::Interface(value)
    }
}

impl From<InputObject> for ModuleType {
    fn from(value: InputObject) -> Self {
        Self::InputObject(value)
    }
}

/// A self-contained slice of the API surface.
///
/// Modules are declaration-only: they name their root fields and hand over
/// the object, interface and input types those fields reference.
pub trait ApiModule: Send + Sync {
    fn name(&self) -> &str;

    fn types(&self) -> Vec<ModuleType>;

    fn query_fields(&self) -> Vec<RootField>;

    fn mutation_fields(&self) -> Vec<RootField> {
        Vec::new()
    }
}

struct RegisteredModule {
    module: Box<dyn ApiModule>,
    types: Vec<ModuleType>,
    query: Vec<RootField>,
    mutation: Vec<RootField>,
}

/// Ordered module registry; registration order is schema field order.
#[derive(Default)]
pub struct SchemaRegistry {
    modules: Vec<RegisteredModule>,
    owners: BTreeMap<(RootKind, String), String>,
    type_owners: BTreeMap<String, String>,
}

impl SchemaRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_module(&mut self, module: Box<dyn ApiModule>) -> Result<(), RegistryError> {
        let module_name = module.name().to_string();
        if self.modules.iter().any(|entry| entry.module.name() == module_name) {
            return Err(RegistryError::DuplicateModule(module_name));
        }

        let query = module.query_fields();
        let mutation = module.mutation_fields();

        let mut claimed = BTreeSet::new();
        let declared = query
            .iter()
            .map(|field| (RootKind::Query, field))
            .chain(mutation.iter().map(|field| (RootKind::Mutation, field)));
        for (root, field) in declared {
            let key = (root, field.name().to_string());
            let existing_module = match self.owners.get(&key) {
                Some(owner) => Some(owner.clone()),
                None if claimed.contains(&key) => Some(module_name.clone()),
                None => None,
            };
            if let Some(existing_module) = existing_module {
                return Err(RegistryError::FieldCollision {
                    root,
                    field: key.1,
                    existing_module,
                    module: module_name,
                });
            }
            claimed.insert(key);
        }

        let types = module.types();
        let mut claimed_types = BTreeSet::new();
        for ty in &types {
            let type_name = ty.name().to_string();
            let existing_module = if type_name == QUERY_TYPE || type_name == MUTATION_TYPE {
                Some(REGISTRY_OWNER.to_string())
            } else if let Some(owner) = self.type_owners.get(&type_name) {
                Some(owner.clone())
            } else if claimed_types.contains(&type_name) {
                Some(module_name.clone())
            } else {
                None
            };
            if let Some(existing_module) = existing_module {
                return Err(RegistryError::TypeCollision {
                    type_name,
                    existing_module,
                    module: module_name,
                });
            }
            claimed_types.insert(type_name);
        }

        for key in claimed {
            self.owners.insert(key, module_name.clone());
        }
        for type_name in claimed_types {
            self.type_owners.insert(type_name, module_name.clone());
        }
        info!(
            "event=module_register module=registry status=ok name={module_name} types={} query_fields={} mutation_fields={}",
            types.len(),
            query.len(),
            mutation.len()
        );
        self.modules.push(RegisteredModule {
            module,
            types,
            query,
            mutation,
        });
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    /// Module that owns `field` on `root`, if any.
    pub fn owner_of(&self, root: RootKind, field: &str) -> Option<&str> {
        self.owners
            .get(&(root, field.to_string()))
            .map(String::as_str)
    }

    /// Module that owns the type `type_name`, if any.
    pub fn type_owner_of(&self, type_name: &str) -> Option<&str> {
        self.type_owners.get(type_name).map(String::as_str)
    }

    /// Merges every module into one schema builder.
    pub fn into_builder(self) -> Result<SchemaBuilder, RegistryError> {
        let has_query = self.modules.iter().any(|entry| !entry.query.is_empty());
        if !has_query {
            return Err(RegistryError::EmptyQuery);
        }
        let has_mutation = self.modules.iter().any(|entry| !entry.mutation.is_empty());

        let mut builder = Schema::build(
            QUERY_TYPE,
            has_mutation.then_some(MUTATION_TYPE),
            None,
        );
        let mut query = Object::new(QUERY_TYPE);
        let mut mutation = Object::new(MUTATION_TYPE);
        for entry in self.modules {
            for ty in entry.types {
                builder = ty.register(builder);
            }
            for root_field in entry.query {
                query = query.field(root_field.field);
            }
            for root_field in entry.mutation {
                mutation = mutation.field(root_field.field);
            }
        }

        builder = builder.register(query);
        if has_mutation {
            builder = builder.register(mutation);
        }
        Ok(builder)
    }

    /// Builds the executable schema with `data` available to every resolver.
    pub fn finish<D: Any + Send + Sync>(self, data: D) -> Result<Schema, RegistryError> {
        self.into_builder()?
            .data(data)
            .finish()
            .map_err(|err| RegistryError::Schema(err.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    DuplicateModule(String),
    FieldCollision {
        root: RootKind,
        field: String,
        existing_module: String,
        module: String,
    },
    TypeCollision {
        type_name: String,
        existing_module: String,
        module: String,
    },
    /// No module contributed a query field.
    EmptyQuery,
    /// The merged schema failed validation.
    Schema(String),
}

impl Display for RegistryError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DuplicateModule(name) => write!(f, "api module already registered: {name}"),
            Self::FieldCollision {
                root,
                field,
                existing_module,
                module,
            } => write!(
                f,
                "field `{root}.{field}` from module `{module}` collides with module `{existing_module}`"
            ),
            Self::TypeCollision {
                type_name,
                existing_module,
                module,
            } => write!(
                f,
                "type `{type_name}` from module `{module}` collides with module `{existing_module}`"
            ),
            Self::EmptyQuery => write!(f, "no module contributed a query field"),
            Self::Schema(message) => write!(f, "invalid schema: {message}"),
        }
    }
}

impl Error for RegistryError {}

#[cfg(test)]
mod tests {
    use super::{ApiModule, ModuleType, RegistryError, RootField, RootKind, SchemaRegistry};
    use crate::resolver::resolved;
    use async_graphql::dynamic::{FieldValue, Object, TypeRef};
    use async_graphql::Value;

    struct StaticModule {
        name: &'static str,
        query: &'static [&'static str],
        mutation: &'static [&'static str],
        types: &'static [&'static str],
    }

    fn constant_field(name: &str) -> RootField {
        RootField::new(name, TypeRef::named_nn(TypeRef::STRING), |_| {
            resolved(Ok(Some(FieldValue::value(Value::String("pong".to_string())))))
        })
    }

    impl ApiModule for StaticModule {
        fn name(&self) -> &str {
            self.name
        }

        fn types(&self) -> Vec<ModuleType> {
            self.types
                .iter()
                .map(|name| Object::new(*name).field(constant_field("label").field).into())
                .collect()
        }

        fn query_fields(&self) -> Vec<RootField> {
            self.query.iter().map(|name| constant_field(name)).collect()
        }

        fn mutation_fields(&self) -> Vec<RootField> {
            self.mutation.iter().map(|name| constant_field(name)).collect()
        }
    }

    fn module(
        name: &'static str,
        query: &'static [&'static str],
        mutation: &'static [&'static str],
    ) -> Box<dyn ApiModule> {
        typed_module(name, query, mutation, &[])
    }

    fn typed_module(
        name: &'static str,
        query: &'static [&'static str],
        mutation: &'static [&'static str],
        types: &'static [&'static str],
    ) -> Box<dyn ApiModule> {
        Box::new(StaticModule {
            name,
            query,
            mutation,
            types,
        })
    }

    #[test]
    fn merges_fields_from_every_module() {
        let mut registry = SchemaRegistry::new();
        registry.register_module(module("a", &["ping"], &[])).unwrap();
        registry
            .register_module(module("b", &["pong"], &["reset"]))
            .unwrap();

        assert_eq!(registry.len(), 2);
        assert_eq!(registry.owner_of(RootKind::Query, "pong"), Some("b"));
        assert_eq!(registry.owner_of(RootKind::Mutation, "reset"), Some("b"));

        let sdl = registry.finish(()).unwrap().sdl();
        assert!(sdl.contains("ping: String!"));
        assert!(sdl.contains("pong: String!"));
        assert!(sdl.contains("reset: String!"));
    }

    #[test]
    fn rejects_duplicate_module_name() {
        let mut registry = SchemaRegistry::new();
        registry.register_module(module("a", &["ping"], &[])).unwrap();
        let err = registry
            .register_module(module("a", &["pong"], &[]))
            .unwrap_err();
        assert_eq!(err, RegistryError::DuplicateModule("a".to_string()));
    }

    #[test]
    fn collision_names_both_modules_and_leaves_registry_unchanged() {
        let mut registry = SchemaRegistry::new();
        registry.register_module(module("a", &["ping"], &[])).unwrap();
        let err = registry
            .register_module(module("b", &["extra", "ping"], &[]))
            .unwrap_err();

        assert_eq!(
            err,
            RegistryError::FieldCollision {
                root: RootKind::Query,
                field: "ping".to_string(),
                existing_module: "a".to_string(),
                module: "b".to_string(),
            }
        );
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.owner_of(RootKind::Query, "extra"), None);
    }

    #[test]
    fn same_name_on_different_roots_is_allowed() {
        let mut registry = SchemaRegistry::new();
        registry
            .register_module(module("a", &["status"], &["status"]))
            .unwrap();
        assert_eq!(registry.owner_of(RootKind::Mutation, "status"), Some("a"));
    }

    #[test]
    fn rejects_field_repeated_within_one_module() {
        let mut registry = SchemaRegistry::new();
        let err = registry
            .register_module(module("a", &["ping", "ping"], &[]))
            .unwrap_err();
        assert!(matches!(err, RegistryError::FieldCollision { .. }));
        assert!(registry.is_empty());
    }

    #[test]
    fn schema_without_query_fields_is_rejected() {
        let mut registry = SchemaRegistry::new();
        registry.register_module(module("a", &[], &["reset"])).unwrap();
        assert!(matches!(
            registry.into_builder(),
            Err(RegistryError::EmptyQuery)
        ));
    }

    #[test]
    fn type_claimed_by_two_modules_is_rejected() {
        let mut registry = SchemaRegistry::new();
        registry
            .register_module(typed_module("a", &["ping"], &[], &["Shared"]))
            .unwrap();
        let err = registry
            .register_module(typed_module("b", &["pong"], &[], &["Own", "Shared"]))
            .unwrap_err();

        assert_eq!(
            err,
            RegistryError::TypeCollision {
                type_name: "Shared".to_string(),
                existing_module: "a".to_string(),
                module: "b".to_string(),
            }
        );
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.type_owner_of("Shared"), Some("a"));
        assert_eq!(registry.type_owner_of("Own"), None);
        assert_eq!(registry.owner_of(RootKind::Query, "pong"), None);
    }

    #[test]
    fn root_type_names_are_reserved() {
        let mut registry = SchemaRegistry::new();
        let err = registry
            .register_module(typed_module("a", &["ping"], &[], &["Query"]))
            .unwrap_err();
        assert!(matches!(
            err,
            RegistryError::TypeCollision { existing_module, .. } if existing_module == "registry"
        ));
    }
}
