use serde::{Deserialize, Serialize};

/// Resolved page request, 1-based
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub page: u32,
    pub limit: u32,
}

impl Pagination {
    pub fn new(page: u32, limit: u32) -> Self {
        Self {
            page: page.max(1),
            limit: limit.max(1),
        }
    }

    pub fn offset(&self) -> i64 {
        (self.page as i64 - 1) * self.limit as i64
    }

    pub fn limit(&self) -> i64 {
        self.limit as i64
    }

    /// Slice an already-ordered collection, used by the in-memory store
    pub fn slice<T: Clone>(&self, items: &[T]) -> Vec<T> {
        items
            .iter()
            .skip(self.offset() as usize)
            .take(self.limit as usize)
            .cloned()
            .collect()
    }
}

/// `page` / `limit` query parameters as sent by clients
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct PageParams {
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

impl PageParams {
    pub fn resolve(&self, default_limit: u32, max_limit: u32) -> Pagination {
        let limit = self.limit.unwrap_or(default_limit).clamp(1, max_limit.max(1));
        Pagination::new(self.page.unwrap_or(1), limit)
    }
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    pub page: u32,
    pub limit: u32,
    pub total_count: i64,
    pub total_pages: i64,
    pub has_next_page: bool,
    pub has_previous_page: bool,
}

impl PageInfo {
    pub fn new(pagination: Pagination, total_count: i64) -> Self {
        let limit = pagination.limit as i64;
        let total_pages = (total_count + limit - 1) / limit;
        Self {
            page: pagination.page,
            limit: pagination.limit,
            total_count,
            total_pages,
            has_next_page: (pagination.page as i64) < total_pages,
            has_previous_page: pagination.page > 1,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub pagination: PageInfo,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, total_count: i64, pagination: Pagination) -> Self {
        Self {
            items,
            pagination: PageInfo::new(pagination, total_count),
        }
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            pagination: self.pagination,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn limit_is_clamped_to_max() {
        let params = PageParams { page: Some(2), limit: Some(500) };
        assert_eq!(params.resolve(20, 100), Pagination { page: 2, limit: 100 });
        assert_eq!(PageParams::default().resolve(10, 100), Pagination { page: 1, limit: 10 });
    }

    #[test]
    fn page_info_counts() {
        let info = PageInfo::new(Pagination::new(2, 10), 25);
        assert_eq!(info.total_pages, 3);
        assert!(info.has_next_page);
        assert!(info.has_previous_page);

        let empty = PageInfo::new(Pagination::new(1, 10), 0);
        assert_eq!(empty.total_pages, 0);
        assert!(!empty.has_next_page);
    }

    #[test]
    fn slices_by_offset() {
        let items: Vec<u32> = (0..7).collect();
        assert_eq!(Pagination::new(2, 3).slice(&items), vec![3, 4, 5]);
        assert_eq!(Pagination::new(3, 3).slice(&items), vec![6]);
    }
}
