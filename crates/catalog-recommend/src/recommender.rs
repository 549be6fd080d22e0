use std::cmp::Ordering;
use std::fmt;

use catalog_core::config::{RecommendSettings, ScorerKind};
use catalog_core::{Catalog, CatalogItem, UserHistory};
use catalog_query::{filter, FilterSpec};
use serde::Serialize;

use crate::affinity::AffinityScorer;
use crate::profile::HistoryProfile;
use crate::score::{Basis, MatchScore, Reason, Scorer};
use crate::seeded::SeededScorer;

/// One ranked item. `reasons` and `based_on` serialize as stable snake_case
/// keys (`completed_similar`, `browsing_history`, ...); display text comes
/// from [`Recommendation::reason_labels`] and [`Recommendation::basis_labels`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recommendation {
    pub item: CatalogItem,
    pub match_score: MatchScore,
    pub reasons: Vec<Reason>,
    pub based_on: Vec<Basis>,
}

impl Recommendation {
    pub fn reason_labels(&self) -> Vec<&'static str> {
        self.reasons.iter().map(|r| r.label_ar()).collect()
    }

    pub fn basis_labels(&self) -> Vec<&'static str> {
        self.based_on.iter().map(|b| b.label_ar()).collect()
    }
}

impl AsRef<CatalogItem> for Recommendation {
    fn as_ref(&self) -> &CatalogItem {
        &self.item
    }
}

/// Score descending, then id ascending.
pub fn by_rank(a: &Recommendation, b: &Recommendation) -> Ordering {
    b.match_score.cmp(&a.match_score).then_with(|| a.item.id.cmp(&b.item.id))
}

pub struct Recommender {
    scorer: Box<dyn Scorer>,
    min_score: MatchScore,
    limit: Option<usize>,
    exclude_seen: bool,
}

impl fmt::Debug for Recommender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Recommender")
            .field("scorer", &self.scorer.name())
            .field("min_score", &self.min_score)
            .field("limit", &self.limit)
            .field("exclude_seen", &self.exclude_seen)
            .finish()
    }
}

impl Default for Recommender {
    fn default() -> Self {
        Self::from_settings(&RecommendSettings::default())
    }
}

impl Recommender {
    pub fn new(scorer: impl Scorer + 'static) -> Self {
        Self { scorer: Box::new(scorer), min_score: MatchScore::new(1), limit: None, exclude_seen: true }
    }

    pub fn from_settings(settings: &RecommendSettings) -> Self {
        let recommender = match settings.scorer {
            ScorerKind::Affinity => Self::new(AffinityScorer::new(&settings.weights)),
            ScorerKind::Seeded => Self::new(SeededScorer::new(settings.seed)),
        };
        Self { limit: settings.limit, exclude_seen: settings.exclude_seen, ..recommender }.with_min_score(settings.min_score)
    }

    /// Items scoring below `min` are dropped. A threshold of 0 is raised to 1.
    #[must_use]
    pub fn with_min_score(mut self, min: u8) -> Self {
        self.min_score = MatchScore::new(min.max(1));
        self
    }

    #[must_use]
    pub fn with_limit(mut self, limit: Option<usize>) -> Self {
        self.limit = limit;
        self
    }

    #[must_use]
    pub fn including_seen(mut self) -> Self {
        self.exclude_seen = false;
        self
    }

    pub fn scorer_name(&self) -> &'static str {
        self.scorer.name()
    }

    /// Ranked recommendations for one user, best match first, cut to the
    /// configured limit.
    pub fn recommend(&self, catalog: &Catalog, history: &UserHistory) -> Vec<Recommendation> {
        let ranked = self.rank(catalog, history);
        self.limited(ranked)
    }

    /// Like [`Recommender::recommend`], but narrowed by `spec` before the
    /// limit applies, so a filtered list is filled from every match.
    pub fn recommend_matching(&self, catalog: &Catalog, history: &UserHistory, spec: &FilterSpec) -> Vec<Recommendation> {
        let ranked = self.rank(catalog, history);
        self.limited(refine(&ranked, spec))
    }

    fn limited(&self, mut ranked: Vec<Recommendation>) -> Vec<Recommendation> {
        if let Some(limit) = self.limit {
            ranked.truncate(limit);
        }
        ranked
    }

    fn rank(&self, catalog: &Catalog, history: &UserHistory) -> Vec<Recommendation> {
        let profile = HistoryProfile::build(catalog, history);
        let mut ranked: Vec<Recommendation> = catalog
            .items()
            .iter()
            .filter(|item| !(self.exclude_seen && profile.has_seen(&item.id)))
            .filter_map(|item| {
                let match_score = self.scorer.score(item, &profile);
                if match_score.is_zero() || match_score < self.min_score {
                    return None;
                }
                let why = self.scorer.explain(item, &profile).or_fallback();
                Some(Recommendation { item: item.clone(), match_score, reasons: why.reasons, based_on: why.based_on })
            })
            .collect();
        ranked.sort_by(by_rank);
        tracing::debug!(
            scorer = self.scorer.name(),
            catalog = catalog.len(),
            history = history.len(),
            kept = ranked.len(),
            "recommendations ranked"
        );
        ranked
    }
}

/// Narrows an existing recommendation list with a filter and restores rank
/// order. A list already cut to a limit only yields matches from that cut;
/// use [`Recommender::recommend_matching`] to filter before limiting.
pub fn refine(recommendations: &[Recommendation], spec: &FilterSpec) -> Vec<Recommendation> {
    let mut kept = filter(recommendations, spec);
    kept.sort_by(by_rank);
    kept
}
