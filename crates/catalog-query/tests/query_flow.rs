use catalog_core::{Catalog, CatalogItem, Error, FacetName, FacetValue, Level};
use catalog_query::{
    build_facet_index, filter, paginate, run, run_with_limits, sort, CatalogQuery, FilterSpec, SignalRange, SortKey,
    SortPreset, SortSpec,
};
use catalog_core::config::QuerySettings;

fn ids<T: AsRef<CatalogItem>>(items: &[T]) -> Vec<&str> {
    items.iter().map(|i| i.as_ref().id.as_str()).collect()
}

fn five_courses() -> Catalog {
    let items = ["A", "A", "B", "B", "C"]
        .iter()
        .enumerate()
        .map(|(n, cat)| CatalogItem::new(format!("c{n}"), format!("دورة {n}"), *cat, Level::Beginner))
        .collect();
    Catalog::new(items).unwrap()
}

#[test]
fn category_or_within_facet_keeps_original_order() {
    let catalog = five_courses();
    let spec = FilterSpec::new().with_values(FacetName::Category, ["A", "B"]);
    let kept = filter(catalog.items(), &spec);
    assert_eq!(ids(&kept), ["c0", "c1", "c2", "c3"]);
}

#[test]
fn unknown_facet_value_is_an_empty_result_not_an_error() {
    let catalog = five_courses();
    let index = build_facet_index(catalog.items());
    let ghost = FacetValue::value("Z");
    assert!(!index.contains(FacetName::Category, &ghost));
    let spec = FilterSpec::new().with_value(FacetName::Category, ghost);
    let page = run(&catalog, &CatalogQuery::new(10).with_filter(spec)).unwrap();
    assert!(page.is_empty());
    assert_eq!(page.total_pages, 1);
}

#[test]
fn twelve_items_last_page_holds_two() {
    let items: Vec<CatalogItem> = (0..12)
        .map(|n| CatalogItem::new(format!("i{n:02}"), "t", "x", Level::Beginner))
        .collect();
    let catalog = Catalog::new(items).unwrap();
    let page = run(&catalog, &CatalogQuery::new(5).with_page(3)).unwrap();
    assert_eq!(page.total_pages, 3);
    assert_eq!(ids(&page.items), ["i10", "i11"]);
}

#[test]
fn level_sort_is_by_rank() {
    let catalog = Catalog::new(vec![
        CatalogItem::new("x", "x", "c", Level::Advanced),
        CatalogItem::new("y", "y", "c", Level::Beginner),
        CatalogItem::new("z", "z", "c", Level::Intermediate),
    ])
    .unwrap();
    let sorted = sort(catalog.items(), &SortSpec::asc(SortKey::Level), catalog.schema()).unwrap();
    assert_eq!(ids(&sorted), ["y", "z", "x"]);
}

#[test]
fn pipeline_filters_sorts_and_pages_questions() {
    let question = |id: &str, difficulty: &str, rate: f64| {
        CatalogItem::new(id, format!("سؤال {id}"), "javascript", difficulty.parse().unwrap())
            .with_tags(["closures"])
            .with_signal("success_rate", rate)
    };
    let catalog = Catalog::new(vec![
        question("q1", "سهل", 78.0),
        question("q2", "متوسط", 65.0),
        question("q3", "صعب", 52.0),
        question("q4", "سهل", 91.0),
    ])
    .unwrap();

    let spec = FilterSpec::new()
        .with_value(FacetName::Level, "beginner")
        .with_value(FacetName::Level, "intermediate")
        .with_signal_range("success_rate", SignalRange::new(Some(60.0), None).unwrap());
    let query = CatalogQuery::new(2)
        .with_filter(spec)
        .with_sort(SortSpec::desc(SortKey::Signal("success_rate".into())));
    let page = run(&catalog, &query).unwrap();
    assert_eq!(ids(&page.items), ["q4", "q1"]);
    assert_eq!(page.total_items, 3);
    let page = run(&catalog, &query.clone().with_page(2)).unwrap();
    assert_eq!(ids(&page.items), ["q2"]);
}

#[test]
fn invalid_arguments_surface_synchronously() {
    let catalog = five_courses();
    let bad_sort = CatalogQuery::new(5).with_sort(SortPreset::Popular.spec());
    assert!(matches!(run(&catalog, &bad_sort), Err(Error::InvalidArgument(_))));
    assert!(matches!(run(&catalog, &CatalogQuery::new(0)), Err(Error::InvalidArgument(_))));
    let settings = QuerySettings { default_page_size: 5, max_page_size: 20 };
    assert!(matches!(run_with_limits(&catalog, &CatalogQuery::new(50), &settings), Err(Error::InvalidArgument(_))));
    assert!(run_with_limits(&catalog, &CatalogQuery::from_settings(&settings), &settings).is_ok());
}

#[test]
fn empty_catalog_yields_an_empty_first_page() {
    let catalog = Catalog::new(vec![]).unwrap();
    let query = CatalogQuery::default().with_sort(SortPreset::Rating.spec()).with_page(4);
    let page = run(&catalog, &query).unwrap();
    assert_eq!((page.page_number, page.total_pages, page.items.len()), (1, 1, 0));
    assert!(paginate::<&CatalogItem>(&[], 1, 3).unwrap().is_empty());
}
