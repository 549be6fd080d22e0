use catalog_core::config::{RecommendSettings, ScorerKind};
use catalog_core::{Catalog, CatalogItem, FacetName, Level, UserHistory};
use catalog_query::FilterSpec;
use catalog_recommend::{
    refine, Explanation, HistoryProfile, MatchScore, Reason, Recommendation, Recommender, Scorer, SeededScorer,
};
use proptest::prelude::*;

/// Scores items by the number embedded in their id; `z*` ids score zero.
struct TableScorer;

impl Scorer for TableScorer {
    fn score(&self, item: &CatalogItem, _profile: &HistoryProfile<'_>) -> MatchScore {
        MatchScore::new(item.id.trim_start_matches(char::is_alphabetic).parse().unwrap_or(0))
    }

    fn explain(&self, _item: &CatalogItem, _profile: &HistoryProfile<'_>) -> Explanation {
        Explanation { reasons: vec![], based_on: vec![] }
    }

    fn name(&self) -> &'static str {
        "table"
    }
}

fn ids(recs: &[Recommendation]) -> Vec<&str> {
    recs.iter().map(|r| r.item.id.as_str()).collect()
}

fn courses() -> Catalog {
    let course = |id: &str, category: &str| CatalogItem::new(id, format!("دورة {id}"), category, Level::Beginner);
    Catalog::new(vec![
        course("a40", "برمجة"),
        course("b90", "تصميم"),
        course("c40", "برمجة"),
        course("d75", "أعمال"),
        course("z", "برمجة"),
    ])
    .unwrap()
}

#[test]
fn ranked_by_score_then_id_and_zero_excluded() {
    let recs = Recommender::new(TableScorer).recommend(&courses(), &UserHistory::default());
    assert_eq!(ids(&recs), ["b90", "d75", "a40", "c40"]);
    assert!(recs.iter().all(|r| !r.match_score.is_zero()));
    assert!(recs.iter().all(|r| !r.reasons.is_empty() && !r.based_on.is_empty()));
}

#[test]
fn min_score_limit_and_seen_items() {
    let catalog = courses();
    let history = UserHistory::new(["b90"]);
    let recs = Recommender::new(TableScorer).with_min_score(50).recommend(&catalog, &history);
    assert_eq!(ids(&recs), ["d75"]);
    let recs = Recommender::new(TableScorer).including_seen().with_limit(Some(2)).recommend(&catalog, &history);
    assert_eq!(ids(&recs), ["b90", "d75"]);
}

#[test]
fn refine_filters_then_restores_rank_order() {
    let catalog = courses();
    let recs = Recommender::new(TableScorer).recommend(&catalog, &UserHistory::default());
    let mut shuffled = recs.clone();
    shuffled.reverse();
    let spec = FilterSpec::new().with_values(FacetName::Category, ["برمجة", "أعمال"]);
    assert_eq!(ids(&refine(&shuffled, &spec)), ["d75", "a40", "c40"]);
    assert_eq!(refine(&recs, &FilterSpec::new()), recs);
}

#[test]
fn limit_applies_after_filtering() {
    let items = (0..10)
        .map(|n| CatalogItem::new(format!("c{n}"), format!("دورة {n}"), if n % 2 == 0 { "A" } else { "B" }, Level::Beginner))
        .collect();
    let catalog = Catalog::new(items).unwrap();
    let history = UserHistory::default();
    let only = |category: &str| FilterSpec::new().with_value(FacetName::Category, category);

    let unlimited = Recommender::new(SeededScorer::new(3));
    let all_b = unlimited.recommend_matching(&catalog, &history, &only("B"));
    assert_eq!(all_b.len(), 5);

    let top_two = Recommender::new(SeededScorer::new(3)).with_limit(Some(2));
    for category in ["A", "B"] {
        let everything = unlimited.recommend_matching(&catalog, &history, &only(category));
        let limited = top_two.recommend_matching(&catalog, &history, &only(category));
        assert_eq!(limited.len(), 2);
        assert_eq!(limited, everything[..2]);
        assert!(limited.iter().all(|r| r.item.category == category));
    }
}

#[test]
fn reasons_serialize_as_keys_with_arabic_labels_alongside() {
    let recs = Recommender::new(TableScorer).recommend(&courses(), &UserHistory::default());
    let top = &recs[0];
    assert_eq!(top.reasons, [Reason::MatchesInterests]);
    assert_eq!(top.reason_labels(), ["مطابق لاهتماماتك"]);
    assert_eq!(top.basis_labels(), ["تاريخ التصفح"]);
}

#[test]
fn empty_catalog_yields_nothing() {
    let catalog = Catalog::new(vec![]).unwrap();
    for kind in [ScorerKind::Affinity, ScorerKind::Seeded] {
        let settings = RecommendSettings { scorer: kind, ..RecommendSettings::default() };
        assert!(Recommender::from_settings(&settings).recommend(&catalog, &UserHistory::new(["x"])).is_empty());
    }
}

#[test]
fn affinity_prefers_the_users_track() {
    let catalog = Catalog::new(vec![
        CatalogItem::new("js1", "JavaScript", "برمجة", Level::Beginner).with_tags(["javascript"]),
        CatalogItem::new("js2", "React", "برمجة", Level::Intermediate).with_tags(["javascript", "react"]),
        CatalogItem::new("py1", "Python", "برمجة", Level::Beginner).with_tags(["python"]),
        CatalogItem::new("ux1", "Figma", "تصميم", Level::Beginner).with_tags(["ui"]),
    ])
    .unwrap();
    let recs = Recommender::default().recommend(&catalog, &UserHistory::new(["js1"]));
    assert_eq!(ids(&recs), ["js2", "py1"]);
    assert!(recs[0].reasons.contains(&Reason::MatchesInterests));
    assert!(recs[0].match_score > recs[1].match_score);
}

fn arb_catalog() -> impl Strategy<Value = Catalog> {
    prop::collection::vec((0usize..3, 0usize..3, 0u8..6), 0..30).prop_map(|rows| {
        let items = rows
            .into_iter()
            .enumerate()
            .map(|(n, (cat, tag, rating))| {
                CatalogItem::new(format!("c{n:02}"), "t", ["a", "b", "c"][cat], Level::Beginner)
                    .with_tags([["x", "y", "z"][tag]])
                    .with_signal("rating", f64::from(rating))
            })
            .collect();
        Catalog::new(items).expect("unique ids")
    })
}

proptest! {
    #[test]
    fn recommendations_are_ordered_positive_and_deterministic(
        catalog in arb_catalog(),
        picks in prop::collection::vec(0usize..30, 0..5),
        seeded in any::<bool>(),
    ) {
        let history: UserHistory = picks.iter().map(|n| format!("c{n:02}")).collect();
        let settings = RecommendSettings {
            scorer: if seeded { ScorerKind::Seeded } else { ScorerKind::Affinity },
            ..RecommendSettings::default()
        };
        let recommender = Recommender::from_settings(&settings);
        let first = recommender.recommend(&catalog, &history);
        for pair in first.windows(2) {
            prop_assert!(pair[0].match_score >= pair[1].match_score);
            if pair[0].match_score == pair[1].match_score {
                prop_assert!(pair[0].item.id < pair[1].item.id);
            }
        }
        for rec in &first {
            prop_assert!(!rec.match_score.is_zero() && rec.match_score <= MatchScore::MAX);
            prop_assert!(!history.contains(&rec.item.id));
            prop_assert!(!rec.reasons.is_empty());
        }
        prop_assert_eq!(first, recommender.recommend(&catalog, &history));
    }
}
