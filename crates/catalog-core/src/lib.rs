#![deny(warnings)]
#![deny(dead_code)]
#![deny(unused_variables)]
#![deny(unused_imports)]

pub mod config;
pub mod error;
pub mod loader;
pub mod traits;
pub mod types;

pub use error::{Error, Result};
pub use types::{Catalog, CatalogItem, CatalogSchema, FacetName, FacetValue, ItemId, Level, UserHistory, ALL_LABEL};
