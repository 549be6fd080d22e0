use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};

use catalog_core::config::{expand_path, Config, Settings};
use catalog_core::loader::{load_histories, JsonFileCatalog};
use catalog_core::traits::{CatalogSource, HistorySource};
use catalog_core::{Catalog, FacetName, UserHistory};
use catalog_query::{
    build_facet_index, page_window, run_with_limits, CatalogQuery, FilterSpec, SignalRange, SortDirection, SortKey,
    SortPreset, SortSpec,
};
use catalog_recommend::Recommender;

#[derive(Parser, Debug)]
#[command(name = "catalog", about = "Query and rank a course or question catalog")]
struct Cli {
    /// Catalog JSON file (overrides `data.catalog_path`)
    #[arg(long, global = true)]
    catalog: Option<String>,

    /// Log filter used when RUST_LOG is unset
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Facet values with item counts
    Facets,
    /// Filter, sort and page the catalog
    Query(QueryArgs),
    /// Ranked recommendations for a user history
    Recommend(RecommendArgs),
}

#[derive(Args, Debug, Default)]
struct FilterArgs {
    /// Free-text search over title, description and tags
    #[arg(long, short = 'q', default_value = "")]
    search: String,

    #[arg(long)]
    category: Vec<String>,

    /// Level key or label (beginner, سهل, ...)
    #[arg(long)]
    level: Vec<String>,

    #[arg(long)]
    tag: Vec<String>,

    /// Numeric range as NAME:MIN:MAX, either bound may be empty
    #[arg(long, value_name = "NAME:MIN:MAX")]
    range: Vec<String>,
}

#[derive(Args, Debug)]
struct QueryArgs {
    #[command(flatten)]
    filter: FilterArgs,

    /// Sort key: relevance, id, title, category, level or a signal name
    #[arg(long)]
    sort: Option<String>,

    #[arg(long, default_value = "asc")]
    direction: String,

    /// Named ordering: popular, rating, newest, price-low, price-high
    #[arg(long, conflicts_with = "sort")]
    preset: Option<String>,

    #[arg(long, default_value_t = 1)]
    page: i64,

    #[arg(long)]
    page_size: Option<i64>,
}

#[derive(Args, Debug)]
struct RecommendArgs {
    #[command(flatten)]
    filter: FilterArgs,

    /// User id looked up in `data.history_path`
    #[arg(long, conflicts_with = "history")]
    user: Option<String>,

    /// Comma-separated item ids the user has already taken
    #[arg(long, value_delimiter = ',')]
    history: Vec<String>,

    #[arg(long)]
    limit: Option<usize>,
}

impl FilterArgs {
    fn to_spec(&self) -> Result<FilterSpec> {
        let mut spec = FilterSpec::new()
            .with_search(self.search.as_str())
            .with_values(FacetName::Category, self.category.iter().map(String::as_str))
            .with_values(FacetName::Tags, self.tag.iter().map(String::as_str));
        for level in &self.level {
            let level: catalog_core::Level = level.parse()?;
            spec = spec.with_value(FacetName::Level, level.as_str());
        }
        for raw in &self.range {
            let (name, range) = parse_range(raw).with_context(|| format!("bad --range {raw:?}"))?;
            spec = spec.with_signal_range(name, range);
        }
        Ok(spec)
    }
}

fn parse_range(raw: &str) -> Result<(&str, SignalRange)> {
    let mut parts = raw.splitn(3, ':');
    let name = parts.next().filter(|n| !n.is_empty()).context("missing signal name")?;
    let bound = |s: Option<&str>| -> Result<Option<f64>> {
        match s.map(str::trim).filter(|s| !s.is_empty()) {
            Some(s) => Ok(Some(s.parse()?)),
            None => Ok(None),
        }
    };
    let min = bound(parts.next())?;
    let max = bound(parts.next())?;
    Ok((name, SignalRange::new(min, max)?))
}

fn load_catalog(cli: &Cli, settings: &Settings) -> Result<Catalog> {
    let path: PathBuf = expand_path(cli.catalog.as_deref().unwrap_or(&settings.data.catalog_path));
    let source = JsonFileCatalog::new(path);
    source.load().with_context(|| format!("loading catalog from {}", source.path().display()))
}

fn user_history(args: &RecommendArgs, settings: &Settings) -> Result<UserHistory> {
    let Some(user) = &args.user else {
        return Ok(args.history.iter().map(String::as_str).collect());
    };
    let path = settings.data.history_path.as_deref().context("--user needs data.history_path to be configured")?;
    let histories = load_histories(&expand_path(path))?;
    Ok(histories.history(user)?)
}

fn facets(catalog: &Catalog) -> Result<()> {
    let index = build_facet_index(catalog.items());
    println!("{}", serde_json::to_string_pretty(&index)?);
    Ok(())
}

fn query(catalog: &Catalog, settings: &Settings, args: &QueryArgs) -> Result<()> {
    let sort = match (&args.preset, &args.sort) {
        (Some(preset), _) => preset.parse::<SortPreset>()?.spec(),
        (None, Some(key)) => SortSpec::new(key.parse::<SortKey>()?, args.direction.parse::<SortDirection>()?),
        (None, None) => SortSpec::default(),
    };
    let mut query = CatalogQuery::from_settings(&settings.query)
        .with_filter(args.filter.to_spec()?)
        .with_sort(sort)
        .with_page(args.page);
    if let Some(size) = args.page_size {
        query.page_size = size;
    }
    let page = run_with_limits(catalog, &query, &settings.query)?;
    let pager = page_window(page.page_number, page.total_pages, 2);
    tracing::info!(page = page.page_number, total_pages = page.total_pages, total_items = page.total_items, "query page");
    println!("{}", serde_json::to_string_pretty(&serde_json::json!({ "page": page, "pager": pager }))?);
    Ok(())
}

fn recommend(catalog: &Catalog, settings: &Settings, args: &RecommendArgs) -> Result<()> {
    let history = user_history(args, settings)?;
    let mut recommender = Recommender::from_settings(&settings.recommend);
    if args.limit.is_some() {
        recommender = recommender.with_limit(args.limit);
    }
    let ranked = recommender.recommend_matching(catalog, &history, &args.filter.to_spec()?);
    tracing::info!(scorer = recommender.scorer_name(), count = ranked.len(), "recommendations");
    let rendered: Vec<serde_json::Value> = ranked
        .iter()
        .map(|rec| {
            serde_json::json!({
                "recommendation": rec,
                "reason_labels": rec.reason_labels(),
                "based_on_labels": rec.basis_labels(),
            })
        })
        .collect();
    println!("{}", serde_json::to_string_pretty(&rendered)?);
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&cli.log_level)),
        )
        .init();

    let settings = Config::load().and_then(|c| c.settings()).context("loading configuration")?;
    let catalog = load_catalog(&cli, &settings)?;
    tracing::debug!(items = catalog.len(), "catalog loaded");

    match &cli.command {
        Command::Facets => facets(&catalog),
        Command::Query(args) => query(&catalog, &settings, args),
        Command::Recommend(args) => recommend(&catalog, &settings, args),
    }
}
