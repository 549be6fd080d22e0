//! catalog-query
//!
//! Facet index, filtering, sorting and pagination over catalog snapshots.
//! Every operation is a pure function of its inputs.
#![deny(warnings)]
#![deny(dead_code)]
#![deny(unused_variables)]
#![deny(unused_imports)]

pub mod collate;
pub mod facets;
pub mod filter;
pub mod paginate;
pub mod pipeline;
pub mod sort;

pub use facets::{build_facet_index, FacetEntry, FacetIndex};
pub use filter::{filter, matches, CompiledFilter, FilterSpec, SignalRange};
pub use paginate::{page_window, paginate, Page, PageLink, Paginator};
pub use pipeline::{run, run_with_limits, CatalogQuery};
pub use sort::{compare, sort, SortDirection, SortKey, SortPreset, SortSpec};
