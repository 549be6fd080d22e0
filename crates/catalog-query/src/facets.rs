use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

use catalog_core::{CatalogItem, FacetName, FacetValue};

/// A selectable facet value and how many items carry it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FacetEntry {
    pub value: FacetValue,
    pub count: usize,
}

/// Distinct facet values of a catalog snapshot, in first-seen order, each
/// list headed by the `All` sentinel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FacetIndex {
    facets: BTreeMap<FacetName, Vec<FacetEntry>>,
}

impl FacetIndex {
    pub fn entries(&self, facet: FacetName) -> &[FacetEntry] {
        self.facets.get(&facet).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn values(&self, facet: FacetName) -> impl Iterator<Item = &FacetValue> {
        self.entries(facet).iter().map(|e| &e.value)
    }

    pub fn contains(&self, facet: FacetName, value: &FacetValue) -> bool {
        self.entries(facet).iter().any(|e| &e.value == value)
    }

    pub fn iter(&self) -> impl Iterator<Item = (FacetName, &[FacetEntry])> {
        self.facets.iter().map(|(name, entries)| (*name, entries.as_slice()))
    }
}

pub fn build_facet_index<T: AsRef<CatalogItem>>(items: &[T]) -> FacetIndex {
    let mut facets = BTreeMap::new();
    for facet in FacetName::ALL {
        let mut entries = vec![FacetEntry { value: FacetValue::All, count: items.len() }];
        let mut seen: HashMap<&str, usize> = HashMap::new();
        for item in items {
            for value in item.as_ref().facet_values(facet) {
                match seen.get(value) {
                    Some(&pos) => entries[pos].count += 1,
                    None => {
                        seen.insert(value, entries.len());
                        entries.push(FacetEntry { value: FacetValue::value(value), count: 1 });
                    }
                }
            }
        }
        tracing::trace!(%facet, values = entries.len() - 1, "facet indexed");
        facets.insert(facet, entries);
    }
    FacetIndex { facets }
}
