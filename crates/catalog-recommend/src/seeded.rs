use std::hash::{Hash, Hasher};

use catalog_core::CatalogItem;
use twox_hash::XxHash64;

use crate::profile::HistoryProfile;
use crate::score::{Basis, Explanation, MatchScore, Reason, Scorer};

const FLOOR: u64 = 60;
const SPAN: u64 = 41;

/// Stand-in scorer for demos and UI work: a stable pseudo-random score in
/// `[60, 100]` derived from the seed, the item id and the history.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeededScorer {
    seed: u64,
}

impl SeededScorer {
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }

    fn digest(&self, item: &CatalogItem, profile: &HistoryProfile<'_>) -> u64 {
        let mut hasher = XxHash64::with_seed(self.seed);
        item.id.hash(&mut hasher);
        profile.history().ids().hash(&mut hasher);
        hasher.finish()
    }
}

impl Scorer for SeededScorer {
    fn score(&self, item: &CatalogItem, profile: &HistoryProfile<'_>) -> MatchScore {
        let value = FLOOR + self.digest(item, profile) % SPAN;
        MatchScore::new(u8::try_from(value).unwrap_or(u8::MAX))
    }

    fn explain(&self, item: &CatalogItem, profile: &HistoryProfile<'_>) -> Explanation {
        let hash = self.digest(item, profile);
        let reasons = 1 + usize::try_from((hash >> 8) % 3).unwrap_or(0);
        let bases = 1 + usize::try_from((hash >> 16) % 3).unwrap_or(0);
        Explanation::new(Reason::ALL[..reasons].to_vec(), Basis::ALL[..bases].to_vec())
    }

    fn name(&self) -> &'static str {
        "seeded"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use catalog_core::{Catalog, Level, UserHistory};

    #[test]
    fn scores_stay_in_band_and_repeat() {
        let items = (0..50).map(|n| CatalogItem::new(format!("c{n}"), "t", "x", Level::Beginner)).collect();
        let catalog = Catalog::new(items).unwrap();
        let history = UserHistory::new(["c1", "c2"]);
        let profile = HistoryProfile::build(&catalog, &history);
        let scorer = SeededScorer::new(7);
        for item in catalog.items() {
            let s = scorer.score(item, &profile);
            assert!((60..=100).contains(&s.value()));
            assert_eq!(s, scorer.score(item, &profile));
            let why = scorer.explain(item, &profile);
            assert!((1..=3).contains(&why.reasons.len()));
            assert!((1..=3).contains(&why.based_on.len()));
        }
    }

    #[test]
    fn seed_changes_scores() {
        let items = (0..20).map(|n| CatalogItem::new(format!("c{n}"), "t", "x", Level::Beginner)).collect();
        let catalog = Catalog::new(items).unwrap();
        let history = UserHistory::default();
        let profile = HistoryProfile::build(&catalog, &history);
        let a: Vec<_> = catalog.items().iter().map(|i| SeededScorer::new(1).score(i, &profile)).collect();
        let b: Vec<_> = catalog.items().iter().map(|i| SeededScorer::new(2).score(i, &profile)).collect();
        assert_ne!(a, b);
    }
}
