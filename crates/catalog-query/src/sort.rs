use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use catalog_core::{CatalogItem, CatalogSchema, Error, Result};

use crate::collate::CollationKey;

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    /// Input order.
    #[default]
    Relevance,
    Id,
    Title,
    Category,
    Level,
    Signal(String),
}

impl FromStr for SortKey {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let key = match s.trim() {
            "" => return Err(Error::InvalidArgument("empty sort key".to_string())),
            "relevance" => SortKey::Relevance,
            "id" => SortKey::Id,
            "title" => SortKey::Title,
            "category" => SortKey::Category,
            "level" | "difficulty" => SortKey::Level,
            signal => SortKey::Signal(signal.to_string()),
        };
        Ok(key)
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortKey::Relevance => f.write_str("relevance"),
            SortKey::Id => f.write_str("id"),
            SortKey::Title => f.write_str("title"),
            SortKey::Category => f.write_str("category"),
            SortKey::Level => f.write_str("level"),
            SortKey::Signal(name) => f.write_str(name),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl FromStr for SortDirection {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "asc" | "ascending" => Ok(SortDirection::Asc),
            "desc" | "descending" => Ok(SortDirection::Desc),
            other => Err(Error::InvalidArgument(format!("unknown sort direction '{other}'"))),
        }
    }
}

/// Sort key and direction. The default keeps input order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SortSpec {
    pub key: SortKey,
    pub direction: SortDirection,
}

impl SortSpec {
    pub fn new(key: SortKey, direction: SortDirection) -> Self {
        Self { key, direction }
    }

    pub fn asc(key: SortKey) -> Self {
        Self::new(key, SortDirection::Asc)
    }

    pub fn desc(key: SortKey) -> Self {
        Self::new(key, SortDirection::Desc)
    }

    pub fn validate(&self, schema: &CatalogSchema) -> Result<()> {
        match &self.key {
            SortKey::Signal(name) if !schema.accepts_signal(name) => {
                Err(Error::InvalidArgument(format!("unknown sort key '{name}'")))
            }
            _ => Ok(()),
        }
    }
}

/// The sort menu of the course catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SortPreset {
    Popular,
    Rating,
    Newest,
    PriceLow,
    PriceHigh,
}

impl SortPreset {
    pub fn spec(self) -> SortSpec {
        let signal = |name: &str| SortKey::Signal(name.to_string());
        match self {
            SortPreset::Popular => SortSpec::desc(signal("students")),
            SortPreset::Rating => SortSpec::desc(signal("rating")),
            SortPreset::Newest => SortSpec::desc(signal("created_at")),
            SortPreset::PriceLow => SortSpec::asc(signal("price")),
            SortPreset::PriceHigh => SortSpec::desc(signal("price")),
        }
    }
}

impl FromStr for SortPreset {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "popular" => Ok(SortPreset::Popular),
            "rating" => Ok(SortPreset::Rating),
            "newest" => Ok(SortPreset::Newest),
            "price-low" => Ok(SortPreset::PriceLow),
            "price-high" => Ok(SortPreset::PriceHigh),
            other => Err(Error::InvalidArgument(format!("unknown sort preset '{other}'"))),
        }
    }
}

enum Primary {
    Position(usize),
    Number(f64),
    Rank(u8),
    Text(CollationKey),
    Raw(String),
}

impl Primary {
    fn of(item: &CatalogItem, key: &SortKey, position: usize) -> Self {
        match key {
            SortKey::Relevance => Primary::Position(position),
            SortKey::Id => Primary::Raw(item.id.clone()),
            SortKey::Title => Primary::Text(CollationKey::new(&item.title)),
            SortKey::Category => Primary::Text(CollationKey::new(&item.category)),
            SortKey::Level => Primary::Rank(item.level.rank()),
            SortKey::Signal(name) => Primary::Number(item.signal(name).unwrap_or(0.0)),
        }
    }

    fn order(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Primary::Position(a), Primary::Position(b)) => a.cmp(b),
            (Primary::Number(a), Primary::Number(b)) => a.total_cmp(b),
            (Primary::Rank(a), Primary::Rank(b)) => a.cmp(b),
            (Primary::Text(a), Primary::Text(b)) => a.cmp(b),
            (Primary::Raw(a), Primary::Raw(b)) => a.cmp(b),
            _ => Ordering::Equal,
        }
    }
}

fn directed(ord: Ordering, direction: SortDirection) -> Ordering {
    match direction {
        SortDirection::Asc => ord,
        SortDirection::Desc => ord.reverse(),
    }
}

/// Orders two items by `spec`, falling back to `id` ascending. Relevance has
/// no per-item key and no tie-break: any two items compare equal, which keeps
/// a stable sort in input order.
pub fn compare(a: &CatalogItem, b: &CatalogItem, spec: &SortSpec) -> Ordering {
    let (ka, kb) = match spec.key {
        SortKey::Relevance => return Ordering::Equal,
        _ => (Primary::of(a, &spec.key, 0), Primary::of(b, &spec.key, 0)),
    };
    directed(ka.order(&kb), spec.direction).then_with(|| a.id.cmp(&b.id))
}

/// Returns a newly ordered copy of `items`.
///
/// Relevance keeps input order whatever the direction. Every other key is
/// directed, then tie-broken by `id` ascending. A signal key must exist in
/// `schema`.
pub fn sort<T>(items: &[T], spec: &SortSpec, schema: &CatalogSchema) -> Result<Vec<T>>
where
    T: AsRef<CatalogItem> + Clone,
{
    spec.validate(schema)?;
    if spec.key == SortKey::Relevance {
        return Ok(items.to_vec());
    }
    let mut keyed: Vec<(Primary, &str, &T)> = items
        .iter()
        .enumerate()
        .map(|(pos, t)| {
            let item: &CatalogItem = t.as_ref();
            (Primary::of(item, &spec.key, pos), item.id.as_str(), t)
        })
        .collect();
    keyed.sort_by(|(ka, ida, _), (kb, idb, _)| directed(ka.order(kb), spec.direction).then_with(|| ida.cmp(idb)));
    tracing::debug!(key = %spec.key, direction = ?spec.direction, items = items.len(), "sorted");
    Ok(keyed.into_iter().map(|(_, _, t)| t.clone()).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use catalog_core::Level;

    fn item(id: &str, title: &str, level: Level, rating: f64) -> CatalogItem {
        CatalogItem::new(id, title, "x", level).with_signal("rating", rating)
    }

    fn ids(items: &[CatalogItem]) -> Vec<&str> {
        items.iter().map(|i| i.id.as_str()).collect()
    }

    #[test]
    fn level_sorts_by_rank_not_label() {
        let items = vec![
            item("a", "a", Level::Advanced, 0.0),
            item("b", "b", Level::Beginner, 0.0),
            item("c", "c", Level::Intermediate, 0.0),
        ];
        let schema = CatalogSchema::from_items(&items);
        let sorted = sort(&items, &SortSpec::asc(SortKey::Level), &schema).unwrap();
        let levels: Vec<Level> = sorted.iter().map(|i| i.level).collect();
        assert_eq!(levels, [Level::Beginner, Level::Intermediate, Level::Advanced]);
    }

    #[test]
    fn equal_keys_break_by_id_regardless_of_direction() {
        let items = vec![item("z", "t", Level::Beginner, 4.0), item("m", "t", Level::Beginner, 5.0), item("a", "t", Level::Beginner, 4.0)];
        let schema = CatalogSchema::from_items(&items);
        let desc = sort(&items, &SortSpec::desc(SortKey::Signal("rating".into())), &schema).unwrap();
        assert_eq!(ids(&desc), ["m", "a", "z"]);
        let asc = sort(&items, &SortSpec::asc(SortKey::Signal("rating".into())), &schema).unwrap();
        assert_eq!(ids(&asc), ["a", "z", "m"]);
    }

    #[test]
    fn relevance_keeps_input_order() {
        let items = vec![item("b", "t", Level::Beginner, 1.0), item("a", "t", Level::Beginner, 2.0)];
        let schema = CatalogSchema::from_items(&items);
        let sorted = sort(&items, &SortSpec::desc(SortKey::Relevance), &schema).unwrap();
        assert_eq!(ids(&sorted), ["b", "a"]);
    }

    #[test]
    fn titles_use_arabic_collation() {
        let items = vec![
            item("1", "أحمد", Level::Beginner, 0.0),
            item("2", "إبراهيم", Level::Beginner, 0.0),
            item("3", "بَاسم", Level::Beginner, 0.0),
        ];
        let schema = CatalogSchema::from_items(&items);
        let sorted = sort(&items, &SortSpec::asc(SortKey::Title), &schema).unwrap();
        assert_eq!(ids(&sorted), ["2", "1", "3"]);
    }

    #[test]
    fn unknown_signal_is_invalid() {
        let items = vec![item("a", "t", Level::Beginner, 1.0)];
        let schema = CatalogSchema::from_items(&items);
        let err = sort(&items, &SortPreset::PriceLow.spec(), &schema).unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));
    }

    #[test]
    fn compare_agrees_with_sort() {
        let a = item("a", "t", Level::Advanced, 3.0);
        let b = item("b", "t", Level::Beginner, 3.0);
        assert_eq!(compare(&a, &b, &SortSpec::asc(SortKey::Level)), Ordering::Greater);
        assert_eq!(compare(&a, &b, &SortPreset::Rating.spec()), Ordering::Less);
    }

    #[test]
    fn relevance_compare_is_equal_for_any_pair() {
        let a = item("a", "t", Level::Advanced, 3.0);
        let b = item("b", "u", Level::Beginner, 1.0);
        for direction in [SortDirection::Asc, SortDirection::Desc] {
            let spec = SortSpec::new(SortKey::Relevance, direction);
            assert_eq!(compare(&a, &b, &spec), Ordering::Equal);
            assert_eq!(compare(&b, &a, &spec), Ordering::Equal);
        }
        let mut items = vec![b, a];
        items.sort_by(|x, y| compare(x, y, &SortSpec::default()));
        assert_eq!(ids(&items), ["b", "a"]);
    }

    #[test]
    fn parses_keys_and_presets() {
        assert_eq!("difficulty".parse::<SortKey>().unwrap(), SortKey::Level);
        assert_eq!("students".parse::<SortKey>().unwrap(), SortKey::Signal("students".into()));
        assert_eq!("price-high".parse::<SortPreset>().unwrap().spec(), SortSpec::desc(SortKey::Signal("price".into())));
        assert!("sideways".parse::<SortDirection>().is_err());
    }
}
