//! The cookbook API module: categories and ingredients.

pub mod mutation;
pub mod query;
pub mod types;

use crate::registry::{ApiModule, ModuleType, RootField};
use crate::relay::page_info_type;

pub const MODULE_NAME: &str = "cookbook";

/// Contributes the cookbook query and mutation fields.
#[derive(Debug, Default, Clone, Copy)]
pub struct CookbookModule;

impl ApiModule for CookbookModule {
    fn name(&self) -> &str {
        MODULE_NAME
    }

    fn types(&self) -> Vec<ModuleType> {
        let mut declared: Vec<ModuleType> = vec![
            types::node_interface().into(),
            types::category_type().into(),
            types::ingredient_type().into(),
            types::category_node().into(),
            types::ingredient_node().into(),
            page_info_type().into(),
        ];
        declared.extend(
            types::node_connection_types()
                .into_iter()
                .chain(types::payload_types())
                .map(ModuleType::from),
        );
        declared.extend(mutation::input_types().into_iter().map(ModuleType::from));
        declared
    }

    fn query_fields(&self) -> Vec<RootField> {
        query::query_fields()
    }

    fn mutation_fields(&self) -> Vec<RootField> {
        mutation::mutation_fields()
    }
}
