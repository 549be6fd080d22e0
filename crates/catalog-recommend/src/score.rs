use std::fmt;

use catalog_core::{CatalogItem, Error};
use serde::{Deserialize, Serialize};

use crate::profile::HistoryProfile;

/// Integer match score in `[0, 100]`. Zero means the item is not recommended.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct MatchScore(u8);

impl MatchScore {
    pub const ZERO: Self = Self(0);
    pub const MAX: Self = Self(100);

    pub fn new(value: u8) -> Self {
        Self(value.min(100))
    }

    /// Maps a unit-interval fraction to a score, rounding to the nearest
    /// integer. NaN maps to zero.
    pub fn from_fraction(fraction: f64) -> Self {
        if fraction.is_nan() {
            return Self::ZERO;
        }
        // Clamped to [0, 100] first, so the cast cannot truncate.
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let value = (fraction.clamp(0.0, 1.0) * 100.0).round() as u8;
        Self(value)
    }

    pub fn value(self) -> u8 {
        self.0
    }

    pub fn is_zero(self) -> bool {
        self.0 == 0
    }
}

impl TryFrom<u8> for MatchScore {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self, Error> {
        if value > 100 {
            return Err(Error::InvalidArgument(format!("match score {value} is outside 0..=100")));
        }
        Ok(Self(value))
    }
}

impl From<MatchScore> for u8 {
    fn from(score: MatchScore) -> Self {
        score.0
    }
}

impl fmt::Display for MatchScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.0)
    }
}

/// Why an item was recommended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Reason {
    CompletedSimilar,
    MatchesInterests,
    PopularWithPeers,
    SuitableLevel,
}

impl Reason {
    pub const ALL: [Self; 4] = [Self::CompletedSimilar, Self::MatchesInterests, Self::PopularWithPeers, Self::SuitableLevel];

    pub fn label_ar(self) -> &'static str {
        match self {
            Self::CompletedSimilar => "بناءً على دوراتك المكتملة",
            Self::MatchesInterests => "مطابق لاهتماماتك",
            Self::PopularWithPeers => "شائع بين الطلاب المماثلين",
            Self::SuitableLevel => "مستوى مناسب لتقدمك",
        }
    }
}

impl fmt::Display for Reason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::CompletedSimilar => "based on your completed courses",
            Self::MatchesInterests => "matches your interests",
            Self::PopularWithPeers => "popular with similar learners",
            Self::SuitableLevel => "suits your current level",
        })
    }
}

/// Which user signal a recommendation drew on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Basis {
    BrowsingHistory,
    CompletedCourses,
    Ratings,
    Interests,
}

impl Basis {
    pub const ALL: [Self; 4] = [Self::BrowsingHistory, Self::CompletedCourses, Self::Ratings, Self::Interests];

    pub fn label_ar(self) -> &'static str {
        match self {
            Self::BrowsingHistory => "تاريخ التصفح",
            Self::CompletedCourses => "الدورات المكتملة",
            Self::Ratings => "التقييمات",
            Self::Interests => "الاهتمامات",
        }
    }
}

impl fmt::Display for Basis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::BrowsingHistory => "browsing history",
            Self::CompletedCourses => "completed courses",
            Self::Ratings => "ratings",
            Self::Interests => "interests",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Explanation {
    pub reasons: Vec<Reason>,
    pub based_on: Vec<Basis>,
}

impl Explanation {
    pub fn new(reasons: Vec<Reason>, based_on: Vec<Basis>) -> Self {
        Self { reasons, based_on }.or_fallback()
    }

    /// Fills empty lists so every recommendation carries at least one of each.
    #[must_use]
    pub fn or_fallback(mut self) -> Self {
        if self.reasons.is_empty() {
            self.reasons.push(Reason::MatchesInterests);
        }
        if self.based_on.is_empty() {
            self.based_on.push(Basis::BrowsingHistory);
        }
        self
    }
}

/// Scores one catalog item against a resolved user history.
///
/// Implementations must be deterministic: the same item and profile always
/// yield the same score and explanation.
pub trait Scorer: Send + Sync {
    fn score(&self, item: &CatalogItem, profile: &HistoryProfile<'_>) -> MatchScore;

    fn explain(&self, item: &CatalogItem, profile: &HistoryProfile<'_>) -> Explanation;

    fn name(&self) -> &'static str;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fraction_rounds_and_clamps() {
        assert_eq!(MatchScore::from_fraction(0.874).value(), 87);
        assert_eq!(MatchScore::from_fraction(0.875).value(), 88);
        assert_eq!(MatchScore::from_fraction(1.7), MatchScore::MAX);
        assert_eq!(MatchScore::from_fraction(-0.2), MatchScore::ZERO);
        assert_eq!(MatchScore::from_fraction(f64::NAN), MatchScore::ZERO);
        assert_eq!(MatchScore::new(250).value(), 100);
    }

    #[test]
    fn decoding_rejects_scores_above_100() {
        let score: MatchScore = serde_json::from_str("87").unwrap();
        assert_eq!(score.value(), 87);
        assert_eq!(serde_json::to_string(&score).unwrap(), "87");
        assert!(serde_json::from_str::<MatchScore>("150").is_err());
        assert!(matches!(MatchScore::try_from(101), Err(Error::InvalidArgument(_))));
    }

    #[test]
    fn explanation_never_empty() {
        let e = Explanation::new(vec![], vec![]);
        assert_eq!(e.reasons, [Reason::MatchesInterests]);
        assert_eq!(e.based_on, [Basis::BrowsingHistory]);
        assert_eq!(Reason::SuitableLevel.label_ar(), "مستوى مناسب لتقدمك");
    }
}
