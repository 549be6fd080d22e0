use catalog_core::config::ScoreWeights;
use catalog_core::CatalogItem;

use crate::profile::HistoryProfile;
use crate::score::{Basis, Explanation, MatchScore, Reason, Scorer};

/// Popularity above this share counts as a reason on its own.
const POPULAR_THRESHOLD: f64 = 0.6;

/// Weighted blend of category share, tag overlap, level fit and popularity.
///
/// An item sharing neither a category nor a tag with the history scores 0.
/// With an empty history the score is popularity alone.
#[derive(Debug, Clone, PartialEq)]
pub struct AffinityScorer {
    weights: ScoreWeights,
}

impl Default for AffinityScorer {
    fn default() -> Self {
        Self::new(&ScoreWeights::default())
    }
}

impl AffinityScorer {
    pub fn new(weights: &ScoreWeights) -> Self {
        Self { weights: normalize_weights(weights) }
    }

    pub fn weights(&self) -> &ScoreWeights {
        &self.weights
    }

    fn components(item: &CatalogItem, profile: &HistoryProfile<'_>) -> Components {
        Components {
            category: profile.category_affinity(&item.category),
            tags: profile.tag_overlap(item),
            level: profile.level_fit(item.level),
            popularity: profile.popularity(item),
        }
    }
}

struct Components {
    category: f64,
    tags: f64,
    level: f64,
    popularity: f64,
}

impl Components {
    fn related(&self) -> bool {
        self.category > 0.0 || self.tags > 0.0
    }
}

/// Scales weights to sum to one. Non-finite or negative entries count as zero;
/// an all-zero profile falls back to the defaults.
pub fn normalize_weights(raw: &ScoreWeights) -> ScoreWeights {
    let clean = |w: f64| if w.is_finite() && w > 0.0 { w } else { 0.0 };
    let (c, t, l, p) = (clean(raw.category), clean(raw.tags), clean(raw.level), clean(raw.popularity));
    let total = c + t + l + p;
    if total == 0.0 {
        return normalize_weights(&ScoreWeights::default());
    }
    ScoreWeights { category: c / total, tags: t / total, level: l / total, popularity: p / total }
}

impl Scorer for AffinityScorer {
    fn score(&self, item: &CatalogItem, profile: &HistoryProfile<'_>) -> MatchScore {
        let parts = Self::components(item, profile);
        if profile.is_empty() {
            return MatchScore::from_fraction(parts.popularity);
        }
        if !parts.related() {
            return MatchScore::ZERO;
        }
        let w = &self.weights;
        MatchScore::from_fraction(
            w.category * parts.category + w.tags * parts.tags + w.level * parts.level + w.popularity * parts.popularity,
        )
    }

    fn explain(&self, item: &CatalogItem, profile: &HistoryProfile<'_>) -> Explanation {
        let parts = Self::components(item, profile);
        let mut reasons = Vec::new();
        let mut based_on = Vec::new();
        if parts.category > 0.0 {
            reasons.push(Reason::CompletedSimilar);
            based_on.push(Basis::CompletedCourses);
        }
        if parts.tags > 0.0 {
            reasons.push(Reason::MatchesInterests);
            based_on.push(Basis::Interests);
        }
        if parts.level > 0.0 && parts.related() {
            reasons.push(Reason::SuitableLevel);
            based_on.push(Basis::BrowsingHistory);
        }
        if parts.popularity >= POPULAR_THRESHOLD || (profile.is_empty() && parts.popularity > 0.0) {
            reasons.push(Reason::PopularWithPeers);
            based_on.push(Basis::Ratings);
        }
        Explanation::new(reasons, based_on)
    }

    fn name(&self) -> &'static str {
        "affinity"
    }
}
