use std::collections::{HashMap, HashSet};

use catalog_core::{Catalog, CatalogItem, Level, UserHistory};

pub const RATING_SIGNAL: &str = "rating";
pub const STUDENTS_SIGNAL: &str = "students";

/// A user history resolved against one catalog snapshot. Ids the catalog
/// does not know are skipped.
#[derive(Debug, Clone)]
pub struct HistoryProfile<'c> {
    history: &'c UserHistory,
    seen: HashSet<&'c str>,
    categories: HashMap<&'c str, usize>,
    tags: HashMap<&'c str, usize>,
    highest_level: Option<Level>,
    resolved: usize,
    max_rating: f64,
    max_students: f64,
}

impl<'c> HistoryProfile<'c> {
    pub fn build(catalog: &'c Catalog, history: &'c UserHistory) -> Self {
        let mut profile = Self {
            history,
            seen: HashSet::new(),
            categories: HashMap::new(),
            tags: HashMap::new(),
            highest_level: None,
            resolved: 0,
            max_rating: max_signal(catalog, RATING_SIGNAL),
            max_students: max_signal(catalog, STUDENTS_SIGNAL),
        };
        for id in history.ids() {
            let Some(item) = catalog.get(id) else {
                tracing::trace!(%id, "history id not in catalog");
                continue;
            };
            if !profile.seen.insert(item.id.as_str()) {
                continue;
            }
            profile.resolved += 1;
            *profile.categories.entry(item.category.as_str()).or_default() += 1;
            for tag in &item.tags {
                *profile.tags.entry(tag.as_str()).or_default() += 1;
            }
            profile.highest_level = profile.highest_level.max(Some(item.level));
        }
        tracing::debug!(history = history.len(), resolved = profile.resolved, "history profile built");
        profile
    }

    pub fn history(&self) -> &UserHistory {
        self.history
    }

    /// True when no history id resolved to a catalog item.
    pub fn is_empty(&self) -> bool {
        self.resolved == 0
    }

    pub fn has_seen(&self, id: &str) -> bool {
        self.seen.contains(id)
    }

    /// Share of the resolved history in `category`, in `[0, 1]`.
    pub fn category_affinity(&self, category: &str) -> f64 {
        if self.resolved == 0 {
            return 0.0;
        }
        ratio(self.categories.get(category).copied().unwrap_or(0), self.resolved)
    }

    /// Share of the item's tags that also appear in the history, in `[0, 1]`.
    pub fn tag_overlap(&self, item: &CatalogItem) -> f64 {
        let shared = item.tags.iter().filter(|t| self.tags.contains_key(t.as_str())).count();
        ratio(shared, item.tags.len())
    }

    /// How well the item's level continues the history: the same level or
    /// one step up fits, one step down half fits.
    pub fn level_fit(&self, level: Level) -> f64 {
        let Some(highest) = self.highest_level else { return 0.0 };
        match i16::from(level.rank()) - i16::from(highest.rank()) {
            0 | 1 => 1.0,
            -1 => 0.5,
            _ => 0.0,
        }
    }

    /// Rating and enrolment relative to the catalog maxima, in `[0, 1]`.
    /// Enrolment is log-scaled so very large courses do not dominate.
    pub fn popularity(&self, item: &CatalogItem) -> f64 {
        let rating = match item.signal(RATING_SIGNAL) {
            Some(r) if self.max_rating > 0.0 => r / self.max_rating,
            _ => 0.0,
        };
        let students = match item.signal(STUDENTS_SIGNAL) {
            Some(s) if self.max_students > 0.0 => (1.0 + s).ln() / (1.0 + self.max_students).ln(),
            _ => 0.0,
        };
        (0.5 * rating + 0.5 * students).clamp(0.0, 1.0)
    }
}

fn max_signal(catalog: &Catalog, name: &str) -> f64 {
    catalog.items().iter().filter_map(|i| i.signal(name)).fold(0.0, f64::max)
}

#[allow(clippy::cast_precision_loss)]
fn ratio(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64
    }
}
