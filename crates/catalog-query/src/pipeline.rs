use serde::{Deserialize, Serialize};

use catalog_core::config::QuerySettings;
use catalog_core::{Catalog, CatalogItem, Error, Result};

use crate::filter::{filter, FilterSpec};
use crate::paginate::{paginate, Page};
use crate::sort::{sort, SortSpec};

/// What a catalog listing asks for: filters, order, and which page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogQuery {
    pub filter: FilterSpec,
    pub sort: SortSpec,
    pub page: i64,
    pub page_size: i64,
}

impl CatalogQuery {
    pub fn new(page_size: i64) -> Self {
        Self { filter: FilterSpec::default(), sort: SortSpec::default(), page: 1, page_size }
    }

    pub fn from_settings(settings: &QuerySettings) -> Self {
        Self::new(i64::try_from(settings.default_page_size).unwrap_or(i64::MAX))
    }

    #[must_use]
    pub fn with_filter(mut self, filter: FilterSpec) -> Self {
        self.filter = filter;
        self
    }

    #[must_use]
    pub fn with_sort(mut self, sort: SortSpec) -> Self {
        self.sort = sort;
        self
    }

    #[must_use]
    pub fn with_page(mut self, page: i64) -> Self {
        self.page = page;
        self
    }
}

impl Default for CatalogQuery {
    fn default() -> Self {
        Self::from_settings(&QuerySettings::default())
    }
}

/// Filter, sort, then paginate a catalog snapshot.
pub fn run<'c>(catalog: &'c Catalog, query: &CatalogQuery) -> Result<Page<&'c CatalogItem>> {
    let all: Vec<&CatalogItem> = catalog.items().iter().collect();
    let filtered = filter(&all, &query.filter);
    let sorted = sort(&filtered, &query.sort, catalog.schema())?;
    paginate(&sorted, query.page, query.page_size)
}

/// [`run`] with the page size capped by `settings.max_page_size`.
pub fn run_with_limits<'c>(catalog: &'c Catalog, query: &CatalogQuery, settings: &QuerySettings) -> Result<Page<&'c CatalogItem>> {
    let max = i64::try_from(settings.max_page_size).unwrap_or(i64::MAX);
    if query.page_size > max {
        return Err(Error::InvalidArgument(format!(
            "page size {} exceeds the maximum of {max}",
            query.page_size
        )));
    }
    run(catalog, query)
}
