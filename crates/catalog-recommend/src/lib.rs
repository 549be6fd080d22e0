//! catalog-recommend
//!
//! Per-user ranking of catalog items. A `Scorer` rates each item against a
//! `HistoryProfile`; the `Recommender` drops non-matches and orders the rest.
#![deny(warnings)]
#![deny(dead_code)]
#![deny(unused_variables)]
#![deny(unused_imports)]

pub mod affinity;
pub mod profile;
pub mod recommender;
pub mod score;
pub mod seeded;

pub use affinity::{normalize_weights, AffinityScorer};
pub use profile::HistoryProfile;
pub use recommender::{by_rank, refine, Recommendation, Recommender};
pub use score::{Basis, Explanation, MatchScore, Reason, Scorer};
pub use seeded::SeededScorer;
