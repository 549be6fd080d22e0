use serde::Serialize;

use catalog_core::{Error, Result};

/// One fixed-size slice of an ordered sequence. `page_number` is 1-based and
/// `total_pages` is at least 1, even for an empty sequence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page_number: usize,
    pub page_size: usize,
    pub total_items: usize,
    pub total_pages: usize,
}

impl<T> Page<T> {
    pub fn has_next(&self) -> bool {
        self.page_number < self.total_pages
    }

    pub fn has_previous(&self) -> bool {
        self.page_number > 1
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Transforms the items while keeping the page geometry.
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            page_number: self.page_number,
            page_size: self.page_size,
            total_items: self.total_items,
            total_pages: self.total_pages,
        }
    }
}

pub fn total_pages(total_items: usize, page_size: usize) -> usize {
    total_items.div_ceil(page_size).max(1)
}

/// Pages over a borrowed sequence. Out-of-range page numbers clamp to the
/// nearest valid page; navigation never leaves `[1, total_pages]`.
#[derive(Debug, Clone, Copy)]
pub struct Paginator<'a, T> {
    items: &'a [T],
    page_size: usize,
    total_pages: usize,
}

impl<'a, T: Clone> Paginator<'a, T> {
    pub fn new(items: &'a [T], page_size: i64) -> Result<Self> {
        let page_size = usize::try_from(page_size)
            .ok()
            .filter(|&n| n > 0)
            .ok_or_else(|| Error::InvalidArgument(format!("page size must be positive, got {page_size}")))?;
        Ok(Self { items, page_size, total_pages: total_pages(items.len(), page_size) })
    }

    pub fn total_pages(&self) -> usize {
        self.total_pages
    }

    pub fn clamp(&self, page_number: i64) -> usize {
        usize::try_from(page_number).map_or(1, |n| n.clamp(1, self.total_pages))
    }

    pub fn page(&self, page_number: i64) -> Page<T> {
        self.page_at(self.clamp(page_number))
    }

    pub fn go_to(&self, page_number: i64) -> Page<T> {
        self.page(page_number)
    }

    /// The following page, or `current` again on the last page.
    pub fn next(&self, current: &Page<T>) -> Page<T> {
        self.page_at(current.page_number.saturating_add(1))
    }

    /// The preceding page, or `current` again on page 1.
    pub fn previous(&self, current: &Page<T>) -> Page<T> {
        self.page_at(current.page_number.saturating_sub(1))
    }

    fn page_at(&self, page_number: usize) -> Page<T> {
        let page_number = page_number.clamp(1, self.total_pages);
        let start = (page_number - 1).saturating_mul(self.page_size).min(self.items.len());
        let end = start.saturating_add(self.page_size).min(self.items.len());
        Page {
            items: self.items[start..end].to_vec(),
            page_number,
            page_size: self.page_size,
            total_items: self.items.len(),
            total_pages: self.total_pages,
        }
    }
}

/// Slices `items` into the requested page. See [`Paginator`].
pub fn paginate<T: Clone>(items: &[T], page_number: i64, page_size: i64) -> Result<Page<T>> {
    let page = Paginator::new(items, page_size)?.page(page_number);
    tracing::debug!(page = page.page_number, of = page.total_pages, items = page.items.len(), "paginated");
    Ok(page)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PageLink {
    Page(usize),
    Ellipsis,
}

/// Compact pager strip: first page, gap, `radius` neighbours either side of
/// `current`, gap, last page. Short sequences list every page.
pub fn page_window(current: usize, total_pages: usize, radius: usize) -> Vec<PageLink> {
    let total = total_pages.max(1);
    let current = current.clamp(1, total);
    if total <= 2 * radius + 3 {
        return (1..=total).map(PageLink::Page).collect();
    }
    let lo = current.saturating_sub(radius).max(1);
    let hi = (current + radius).min(total);
    let mut links = Vec::with_capacity(2 * radius + 5);
    if lo > 1 {
        links.push(PageLink::Page(1));
    }
    if lo > 2 {
        links.push(PageLink::Ellipsis);
    }
    links.extend((lo..=hi).map(PageLink::Page));
    if hi + 1 < total {
        links.push(PageLink::Ellipsis);
    }
    if hi < total {
        links.push(PageLink::Page(total));
    }
    links
}
