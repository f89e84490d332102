//! Configuration value objects shared across layers

mod output_format;
mod relevance_method;

pub use output_format::OutputFormat;
pub use relevance_method::RelevanceMethod;
