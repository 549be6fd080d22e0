//! Free-text, facet and signal-range filtering.
//!
//! Dimensions combine with AND; the values selected within one facet combine
//! with OR. Values unknown to the catalog simply match nothing.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use catalog_core::{CatalogItem, Error, FacetName, FacetValue, Level, Result};

/// Inclusive bounds over a numeric signal. An item without the signal is
/// outside every range.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SignalRange {
    pub min: Option<f64>,
    pub max: Option<f64>,
}

impl SignalRange {
    pub fn new(min: Option<f64>, max: Option<f64>) -> Result<Self> {
        if min.into_iter().chain(max).any(|b| !b.is_finite()) {
            return Err(Error::InvalidArgument("range bounds must be finite".to_string()));
        }
        if let (Some(lo), Some(hi)) = (min, max) {
            if lo > hi {
                return Err(Error::InvalidArgument(format!("range minimum {lo} exceeds maximum {hi}")));
            }
        }
        Ok(Self { min, max })
    }

    pub fn contains(&self, value: f64) -> bool {
        self.min.map_or(true, |lo| value >= lo) && self.max.map_or(true, |hi| value <= hi)
    }
}

/// Immutable filter state. Every builder method returns an updated copy and
/// leaves the receiver untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterSpec {
    search_text: String,
    facets: BTreeMap<FacetName, BTreeSet<FacetValue>>,
    signal_ranges: BTreeMap<String, SignalRange>,
}

impl FilterSpec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn search_text(&self) -> &str {
        &self.search_text
    }

    /// Values selected for `facet`; empty when unconstrained.
    pub fn selected(&self, facet: FacetName) -> impl Iterator<Item = &FacetValue> {
        self.facets.get(&facet).into_iter().flatten()
    }

    pub fn signal_range(&self, signal: &str) -> Option<&SignalRange> {
        self.signal_ranges.get(signal)
    }

    /// True when no dimension constrains anything.
    pub fn is_unconstrained(&self) -> bool {
        self.search_text.trim().is_empty()
            && FacetName::ALL.iter().all(|f| !self.facet_is_active(*f))
            && self.signal_ranges.is_empty()
    }

    pub fn facet_is_active(&self, facet: FacetName) -> bool {
        self.facets.get(&facet).is_some_and(|s| !s.is_empty() && !s.contains(&FacetValue::All))
    }

    #[must_use]
    pub fn with_search(&self, text: impl Into<String>) -> Self {
        Self { search_text: text.into(), ..self.clone() }
    }

    /// Adds `value` to the facet's selection. Selecting `All` clears the
    /// facet instead. Level labels (`مبتدئ`, `سهل`, ...) are stored under
    /// their canonical key.
    #[must_use]
    pub fn with_value(&self, facet: FacetName, value: impl Into<FacetValue>) -> Self {
        let mut next = self.clone();
        match canonical(facet, value.into()) {
            FacetValue::All => {
                next.facets.remove(&facet);
            }
            value => {
                next.facets.entry(facet).or_default().insert(value);
            }
        }
        next
    }

    /// Replaces the facet's selection with `values`.
    #[must_use]
    pub fn with_values<I, V>(&self, facet: FacetName, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<FacetValue>,
    {
        values.into_iter().fold(self.cleared_facet(facet), |spec, v| spec.with_value(facet, v))
    }

    #[must_use]
    pub fn without_value(&self, facet: FacetName, value: &FacetValue) -> Self {
        let mut next = self.clone();
        let value = canonical(facet, value.clone());
        if let Some(selected) = next.facets.get_mut(&facet) {
            selected.remove(&value);
            if selected.is_empty() {
                next.facets.remove(&facet);
            }
        }
        next
    }

    /// Checkbox semantics: selects the value if absent, deselects it otherwise.
    #[must_use]
    pub fn toggled(&self, facet: FacetName, value: impl Into<FacetValue>) -> Self {
        let value = canonical(facet, value.into());
        if self.facets.get(&facet).is_some_and(|s| s.contains(&value)) {
            self.without_value(facet, &value)
        } else {
            self.with_value(facet, value)
        }
    }

    #[must_use]
    pub fn cleared_facet(&self, facet: FacetName) -> Self {
        let mut next = self.clone();
        next.facets.remove(&facet);
        next
    }

    #[must_use]
    pub fn with_signal_range(&self, signal: impl Into<String>, range: SignalRange) -> Self {
        let mut next = self.clone();
        next.signal_ranges.insert(signal.into(), range);
        next
    }

    #[must_use]
    pub fn without_signal_range(&self, signal: &str) -> Self {
        let mut next = self.clone();
        next.signal_ranges.remove(signal);
        next
    }
}

/// A [`FilterSpec`] prepared for evaluation against many items.
#[derive(Debug)]
pub struct CompiledFilter<'s> {
    needle: Option<String>,
    spec: &'s FilterSpec,
}

impl<'s> CompiledFilter<'s> {
    pub fn new(spec: &'s FilterSpec) -> Self {
        let trimmed = spec.search_text.trim();
        let needle = (!trimmed.is_empty()).then(|| trimmed.to_lowercase());
        Self { needle, spec }
    }

    pub fn matches(&self, item: &CatalogItem) -> bool {
        self.text_matches(item)
            && self.spec.facets.iter().all(|(facet, selected)| facet_matches(item, *facet, selected))
            && self
                .spec
                .signal_ranges
                .iter()
                .all(|(signal, range)| item.signal(signal).is_some_and(|v| range.contains(v)))
    }

    fn text_matches(&self, item: &CatalogItem) -> bool {
        let Some(needle) = &self.needle else { return true };
        let hit = |field: &str| field.to_lowercase().contains(needle.as_str());
        hit(item.title.as_str()) || hit(item.description.as_str()) || item.tags.iter().any(|t| hit(t.as_str()))
    }
}

fn canonical(facet: FacetName, value: FacetValue) -> FacetValue {
    match (facet, value) {
        (FacetName::Level, FacetValue::Value(v)) => match v.parse::<Level>() {
            Ok(level) => FacetValue::value(level.as_str()),
            Err(_) => FacetValue::Value(v),
        },
        (_, value) => value,
    }
}

fn facet_matches(item: &CatalogItem, facet: FacetName, selected: &BTreeSet<FacetValue>) -> bool {
    if selected.is_empty() || selected.contains(&FacetValue::All) {
        return true;
    }
    // Specs decoded from JSON bypass the builders, so levels are parsed here too.
    let hit = |wanted: &FacetValue, own: &str| match wanted {
        FacetValue::All => false,
        FacetValue::Value(v) if facet == FacetName::Level => v.parse::<Level>().is_ok_and(|l| l.as_str() == own),
        FacetValue::Value(v) => v == own,
    };
    item.facet_values(facet).any(|own| selected.iter().any(|s| hit(s, own)))
}

/// Whether a single item passes `spec`.
pub fn matches(item: &CatalogItem, spec: &FilterSpec) -> bool {
    CompiledFilter::new(spec).matches(item)
}

/// The subsequence of `items` passing `spec`, in input order.
pub fn filter<T>(items: &[T], spec: &FilterSpec) -> Vec<T>
where
    T: AsRef<CatalogItem> + Clone,
{
    let compiled = CompiledFilter::new(spec);
    let kept: Vec<T> = items.iter().filter(|i| compiled.matches(i.as_ref())).cloned().collect();
    tracing::debug!(input = items.len(), kept = kept.len(), "filter applied");
    kept
}
