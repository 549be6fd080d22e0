//! Lightweight configuration loader and path helpers.
//!
//! Uses Figment to merge built-in defaults + `config.toml` + `config.<env>.toml`
//! + `APP_*` env vars (nested keys separated by `__`, e.g.
//! `APP_RECOMMEND__MIN_SCORE`). Provides helpers to expand `~` and `${VAR}`
//! and to resolve relative paths against a known base directory.
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Paging defaults for catalog queries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuerySettings {
    pub default_page_size: usize,
    pub max_page_size: usize,
}

impl Default for QuerySettings {
    fn default() -> Self {
        Self { default_page_size: 9, max_page_size: 100 }
    }
}

/// Relative weight of each affinity component. Normalized by the scorer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoreWeights {
    pub category: f64,
    pub tags: f64,
    pub level: f64,
    pub popularity: f64,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self { category: 0.4, tags: 0.3, level: 0.15, popularity: 0.15 }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScorerKind {
    Affinity,
    Seeded,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecommendSettings {
    pub scorer: ScorerKind,
    /// Recommendations scoring below this are dropped. Never below 1, so a
    /// zero score always means "excluded".
    pub min_score: u8,
    pub limit: Option<usize>,
    pub exclude_seen: bool,
    pub seed: u64,
    pub weights: ScoreWeights,
}

impl Default for RecommendSettings {
    fn default() -> Self {
        Self {
            scorer: ScorerKind::Affinity,
            min_score: 1,
            limit: None,
            exclude_seen: true,
            seed: 0,
            weights: ScoreWeights::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DataSettings {
    pub catalog_path: String,
    pub history_path: Option<String>,
}

impl Default for DataSettings {
    fn default() -> Self {
        Self { catalog_path: "data/catalog.json".to_string(), history_path: None }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub data: DataSettings,
    pub query: QuerySettings,
    pub recommend: RecommendSettings,
}

pub struct Config {
    figment: Figment,
}

impl Config {
    pub fn load() -> Result<Self> {
        let env_name = env::var("RUST_ENV").unwrap_or_else(|_| "dev".to_string());

        let mut figment = Figment::from(Serialized::defaults(Settings::default())).merge(Toml::file("config.toml"));
        match env_name.as_str() {
            "dev" | "development" => figment = figment.merge(Toml::file("config.dev.toml")),
            "prod" | "production" => figment = figment.merge(Toml::file("config.prod.toml")),
            "test" | "testing" => figment = figment.merge(Toml::file("config.test.toml")),
            _ => {}
        }
        figment = figment.merge(Env::prefixed("APP_").split("__"));

        let config = Self { figment };
        config.settings()?;
        tracing::debug!(env = %env_name, "configuration loaded");
        Ok(config)
    }

    pub fn from_figment(figment: Figment) -> Self {
        Self { figment: Figment::from(Serialized::defaults(Settings::default())).merge(figment) }
    }

    pub fn get<T>(&self, key: &str) -> Result<T>
    where
        T: serde::de::DeserializeOwned,
    {
        self.figment
            .extract_inner(key)
            .map_err(|e| Error::InvalidConfig(format!("Failed to get '{key}': {e}")))
    }

    /// Extracts and validates the full typed settings tree.
    pub fn settings(&self) -> Result<Settings> {
        let settings: Settings = self
            .figment
            .extract()
            .map_err(|e| Error::InvalidConfig(e.to_string()))?;
        validate(&settings)?;
        Ok(settings)
    }
}

fn validate(settings: &Settings) -> Result<()> {
    let q = &settings.query;
    if q.default_page_size == 0 || q.max_page_size == 0 {
        return Err(Error::InvalidConfig("page sizes must be positive".to_string()));
    }
    if q.default_page_size > q.max_page_size {
        return Err(Error::InvalidConfig(format!(
            "query.default_page_size ({}) exceeds query.max_page_size ({})",
            q.default_page_size, q.max_page_size
        )));
    }
    let r = &settings.recommend;
    if r.min_score == 0 || r.min_score > 100 {
        return Err(Error::InvalidConfig(format!("recommend.min_score must be in 1..=100, got {}", r.min_score)));
    }
    let w = &r.weights;
    let weights = [w.category, w.tags, w.level, w.popularity];
    if weights.iter().any(|x| !x.is_finite() || *x < 0.0) || weights.iter().sum::<f64>() <= 0.0 {
        return Err(Error::InvalidConfig("recommend.weights must be non-negative with a positive sum".to_string()));
    }
    Ok(())
}

/// Expand a user-provided path string:
/// - Expands leading '~' to the user's home directory
/// - Expands ${VAR} and $VAR environment variables
/// - Returns a PathBuf without attempting to canonicalize
pub fn expand_path<S: AsRef<str>>(input: S) -> PathBuf {
    let s = input.as_ref();
    let expanded_env = shellexpand::env(s).unwrap_or(std::borrow::Cow::Borrowed(s));
    let expanded = shellexpand::tilde(&expanded_env);
    PathBuf::from(expanded.as_ref())
}

/// Resolve a possibly relative path against a given base directory after expansion.
/// If `p` is absolute, it's returned as-is; otherwise `base.join(p)` is returned.
pub fn resolve_with_base<S: AsRef<str>>(base: &Path, p: S) -> PathBuf {
    let p = expand_path(p);
    if p.is_absolute() { p } else { base.join(p) }
}
