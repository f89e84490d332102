//! Documentation tools: execution and schema conversion.

pub mod registry;
pub mod schema;

pub use registry::DocToolRegistry;
pub use schema::JsonSchemaToolConverter;
