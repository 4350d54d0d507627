pub mod catalog;
pub mod config;
pub mod error;
pub mod fetch;
pub mod filters;
pub mod merge;
pub mod output;
pub mod parser;
pub mod pipeline;
pub mod purpose;
pub mod ranking;
pub mod site;
pub mod source;
pub mod utility;

pub use catalog::{Attribute, Catalog, DroneRecord};
pub use filters::CostLimits;
pub use pipeline::{EmptyReason, Selection, SelectionOutcome, SelectionRequest, select};
pub use purpose::PurposeCatalog;
pub use source::DataSource;
