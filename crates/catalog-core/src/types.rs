//! Domain types shared by the query and recommendation crates.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};

pub type ItemId = String;
pub type Signals = BTreeMap<String, f64>;

/// Label rendered for the "all" sentinel in filter controls.
pub const ALL_LABEL: &str = "الكل";

/// Facets an item can be filtered and indexed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FacetName {
    Category,
    Level,
    Tags,
}

impl FacetName {
    pub const ALL: [FacetName; 3] = [FacetName::Category, FacetName::Level, FacetName::Tags];

    pub fn as_str(self) -> &'static str {
        match self {
            FacetName::Category => "category",
            FacetName::Level => "level",
            FacetName::Tags => "tags",
        }
    }

    /// Tags hold several values per item; the other facets hold exactly one.
    pub fn is_multi_valued(self) -> bool {
        matches!(self, FacetName::Tags)
    }
}

impl fmt::Display for FacetName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FacetName {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "category" => Ok(FacetName::Category),
            "level" | "difficulty" => Ok(FacetName::Level),
            "tags" | "tag" => Ok(FacetName::Tags),
            other => Err(Error::InvalidArgument(format!("unknown facet '{other}'"))),
        }
    }
}

/// Difficulty level. Ordered by rank, never by label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum Level {
    Beginner,
    Intermediate,
    Advanced,
}

impl Level {
    pub fn rank(self) -> u8 {
        match self {
            Level::Beginner => 0,
            Level::Intermediate => 1,
            Level::Advanced => 2,
        }
    }

    /// Canonical facet key.
    pub fn as_str(self) -> &'static str {
        match self {
            Level::Beginner => "beginner",
            Level::Intermediate => "intermediate",
            Level::Advanced => "advanced",
        }
    }

    pub fn label_ar(self) -> &'static str {
        match self {
            Level::Beginner => "مبتدئ",
            Level::Intermediate => "متوسط",
            Level::Advanced => "متقدم",
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// Course labels (مبتدئ/متوسط/متقدم) and question-bank difficulty labels
// (سهل/متوسط/صعب) both map onto the same three ranks.
impl FromStr for Level {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "beginner" | "easy" | "مبتدئ" | "سهل" => Ok(Level::Beginner),
            "intermediate" | "medium" | "متوسط" => Ok(Level::Intermediate),
            "advanced" | "hard" | "متقدم" | "صعب" => Ok(Level::Advanced),
            other => Err(Error::InvalidArgument(format!("unknown level '{other}'"))),
        }
    }
}

impl TryFrom<String> for Level {
    type Error = Error;

    fn try_from(s: String) -> Result<Self> {
        s.parse()
    }
}

/// A value selectable in a facet control. `All` is the typed form of the
/// "all" sentinel and never matches a stored item value.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FacetValue {
    All,
    Value(String),
}

impl FacetValue {
    pub fn value(s: impl Into<String>) -> Self {
        FacetValue::Value(s.into())
    }

    pub fn is_all(&self) -> bool {
        matches!(self, FacetValue::All)
    }

    /// Display label; the sentinel renders as [`ALL_LABEL`].
    pub fn label(&self) -> &str {
        match self {
            FacetValue::All => ALL_LABEL,
            FacetValue::Value(v) => v,
        }
    }
}

impl From<&str> for FacetValue {
    fn from(s: &str) -> Self {
        if s == ALL_LABEL || s.eq_ignore_ascii_case("all") {
            FacetValue::All
        } else {
            FacetValue::Value(s.to_string())
        }
    }
}

impl fmt::Display for FacetValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One course or question in a catalog snapshot.
///
/// - `id`: unique within its [`Catalog`]
/// - `title`/`description`/`tags`: searched by free-text filters
/// - `category`/`level`/`tags`: facets
/// - `signals`: named non-negative numbers used for sorting and scoring
///   (e.g. `rating`, `students`, `created_at`, `success_rate`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogItem {
    pub id: ItemId,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub category: String,
    #[serde(alias = "difficulty")]
    pub level: Level,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub signals: Signals,
}

impl CatalogItem {
    pub fn new(id: impl Into<String>, title: impl Into<String>, category: impl Into<String>, level: Level) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            description: String::new(),
            category: category.into(),
            level,
            tags: Vec::new(),
            signals: Signals::new(),
        }
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Replaces the tag set. Repeated labels keep their first position.
    #[must_use]
    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags.clear();
        for tag in tags {
            let tag = tag.into();
            if !self.tags.contains(&tag) {
                self.tags.push(tag);
            }
        }
        self
    }

    #[must_use]
    pub fn with_signal(mut self, name: impl Into<String>, value: f64) -> Self {
        self.signals.insert(name.into(), value);
        self
    }

    pub fn signal(&self, name: &str) -> Option<f64> {
        self.signals.get(name).copied()
    }

    /// The item's own values for `facet`: one for single-valued facets, the
    /// tag list for tags.
    pub fn facet_values(&self, facet: FacetName) -> impl Iterator<Item = &str> + '_ {
        let none: &[String] = &[];
        let (single, many) = match facet {
            FacetName::Category => (Some(self.category.as_str()), none),
            FacetName::Level => (Some(self.level.as_str()), none),
            FacetName::Tags => (None, self.tags.as_slice()),
        };
        single.into_iter().chain(many.iter().map(String::as_str))
    }
}

impl AsRef<CatalogItem> for CatalogItem {
    fn as_ref(&self) -> &CatalogItem {
        self
    }
}

/// Signal names carried by a catalog snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogSchema {
    signals: BTreeSet<String>,
    item_count: usize,
}

impl CatalogSchema {
    pub fn from_items(items: &[CatalogItem]) -> Self {
        let signals = items.iter().flat_map(|i| i.signals.keys().cloned()).collect();
        Self { signals, item_count: items.len() }
    }

    pub fn has_signal(&self, name: &str) -> bool {
        self.signals.contains(name)
    }

    /// Whether `name` can order this catalog. An empty catalog has nothing
    /// to order, so every key is accepted there.
    pub fn accepts_signal(&self, name: &str) -> bool {
        self.item_count == 0 || self.has_signal(name)
    }

    pub fn signals(&self) -> impl Iterator<Item = &str> {
        self.signals.iter().map(String::as_str)
    }
}

/// A validated, immutable catalog snapshot.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(try_from = "Vec<CatalogItem>")]
pub struct Catalog {
    items: Vec<CatalogItem>,
    by_id: HashMap<ItemId, usize>,
    schema: CatalogSchema,
}

impl Catalog {
    /// Validates id uniqueness and signal ranges. Tags are deduplicated.
    pub fn new(mut items: Vec<CatalogItem>) -> Result<Self> {
        let mut by_id = HashMap::with_capacity(items.len());
        for (pos, item) in items.iter_mut().enumerate() {
            let tags = std::mem::take(&mut item.tags);
            item.tags = tags.into_iter().fold(Vec::new(), |mut acc, tag| {
                if !acc.contains(&tag) {
                    acc.push(tag);
                }
                acc
            });
            if by_id.insert(item.id.clone(), pos).is_some() {
                return Err(Error::InvalidCatalog(format!("duplicate item id '{}'", item.id)));
            }
            if let Some((name, value)) = item.signals.iter().find(|(_, v)| !v.is_finite() || **v < 0.0) {
                return Err(Error::InvalidCatalog(format!(
                    "item '{}' has invalid signal {name}={value}; signals must be finite and non-negative",
                    item.id
                )));
            }
        }
        let schema = CatalogSchema::from_items(&items);
        tracing::debug!(items = items.len(), signals = schema.signals.len(), "catalog snapshot built");
        Ok(Self { items, by_id, schema })
    }

    pub fn items(&self) -> &[CatalogItem] {
        &self.items
    }

    pub fn schema(&self) -> &CatalogSchema {
        &self.schema
    }

    pub fn get(&self, id: &str) -> Option<&CatalogItem> {
        self.by_id.get(id).map(|&pos| &self.items[pos])
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn into_items(self) -> Vec<CatalogItem> {
        self.items
    }
}

impl TryFrom<Vec<CatalogItem>> for Catalog {
    type Error = Error;

    fn try_from(items: Vec<CatalogItem>) -> Result<Self> {
        Self::new(items)
    }
}

impl<'a> IntoIterator for &'a Catalog {
    type Item = &'a CatalogItem;
    type IntoIter = std::slice::Iter<'a, CatalogItem>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

/// Ordered ids of items a user viewed or completed, oldest first.
/// Supplied by the session layer and only ever read here.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserHistory(Vec<ItemId>);

impl UserHistory {
    pub fn new<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(ids.into_iter().map(Into::into).collect())
    }

    pub fn ids(&self) -> &[ItemId] {
        &self.0
    }

    pub fn contains(&self, id: &str) -> bool {
        self.0.iter().any(|h| h == id)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<S: Into<String>> FromIterator<S> for UserHistory {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self::new(iter)
    }
}
