//! Search and pagination over flattened category listings.

use serde::Serialize;

/// Page size bounds applied to every listing.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PageLimits {
    pub default_limit: usize,
    pub max_limit: usize,
}

impl Default for PageLimits {
    fn default() -> Self {
        Self {
            default_limit: 20,
            max_limit: 100,
        }
    }
}

/// Raw listing parameters as supplied by the caller.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ListQuery {
    /// Case-insensitive substring matched against name, id-field and nation.
    pub search: Option<String>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

impl ListQuery {
    /// Lowercased, trimmed search needle; `None` when there is nothing to
    /// filter on.
    pub fn needle(&self) -> Option<String> {
        self.search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_lowercase)
    }

    /// Page number floored at 1 and page size clamped to `1..=max_limit`.
    pub fn normalize(&self, limits: PageLimits) -> (usize, usize) {
        let page = self.page.unwrap_or(1).max(1);
        let limit = self
            .limit
            .unwrap_or(limits.default_limit as i64)
            .clamp(1, limits.max_limit.max(1) as i64);
        (
            usize::try_from(page).unwrap_or(usize::MAX),
            usize::try_from(limit).unwrap_or(1),
        )
    }
}

/// One page of a listing.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Page<T> {
    pub total: usize,
    pub page: usize,
    pub limit: usize,
    pub total_pages: usize,
    pub items: Vec<T>,
}

impl<T> Page<T> {
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            total: self.total,
            page: self.page,
            limit: self.limit,
            total_pages: self.total_pages,
            items: self.items.into_iter().map(f).collect(),
        }
    }
}

/// Slice `items` into page `page` (1-based) of size `limit` (at least 1).
pub fn paginate<T>(items: Vec<T>, page: usize, limit: usize) -> Page<T> {
    let limit = limit.max(1);
    let page = page.max(1);
    let total = items.len();
    let start = (page - 1).saturating_mul(limit);
    let items = items.into_iter().skip(start).take(limit).collect();
    Page {
        total,
        page,
        limit,
        total_pages: total.div_ceil(limit),
        items,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn normalize_applies_defaults_floors_and_caps() {
        let limits = PageLimits::default();
        assert_eq!(ListQuery::default().normalize(limits), (1, 20));

        let q = ListQuery { page: Some(0), limit: Some(500), ..Default::default() };
        assert_eq!(q.normalize(limits), (1, 100));

        let q = ListQuery { page: Some(-3), limit: Some(-10), ..Default::default() };
        assert_eq!(q.normalize(limits), (1, 1));

        let q = ListQuery { page: Some(4), limit: Some(25), ..Default::default() };
        assert_eq!(q.normalize(limits), (4, 25));
    }

    #[test]
    fn needle_ignores_blank_search() {
        let q = ListQuery { search: Some("   ".into()), ..Default::default() };
        assert_eq!(q.needle(), None);
        let q = ListQuery { search: Some(" Tiger ".into()), ..Default::default() };
        assert_eq!(q.needle().as_deref(), Some("tiger"));
    }

    #[test]
    fn paginate_reports_totals() {
        let page = paginate((1..=45).collect::<Vec<_>>(), 3, 20);
        assert_eq!(page.total, 45);
        assert_eq!(page.total_pages, 3);
        assert_eq!(page.items, (41..=45).collect::<Vec<_>>());

        let past_end = paginate(vec![1, 2, 3], 9, 2);
        assert!(past_end.items.is_empty());
        assert_eq!(past_end.total_pages, 2);

        let empty = paginate(Vec::<u8>::new(), 1, 10);
        assert_eq!(empty.total_pages, 0);
    }

    proptest! {
        #[test]
        fn pages_reconstruct_the_listing(len in 0usize..200, limit in 1usize..50) {
            let items: Vec<usize> = (0..len).collect();
            let total_pages = paginate(items.clone(), 1, limit).total_pages;

            let mut rebuilt = Vec::with_capacity(len);
            for page in 1..=total_pages + 1 {
                let slice = paginate(items.clone(), page, limit);
                prop_assert!(slice.items.len() <= limit);
                if page > total_pages {
                    prop_assert!(slice.items.is_empty());
                }
                rebuilt.extend(slice.items);
            }
            prop_assert_eq!(rebuilt, items);
        }
    }
}
