//! Pagination envelope assembled from a page of records and a total count.

use serde::Serialize;

use crate::domain::query::PageRequest;

/// Position of a page within the full result set.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    pub page: usize,
    pub limit: usize,
    pub total: usize,
    pub total_pages: usize,
    pub has_next: bool,
    pub has_prev: bool,
}

impl PageInfo {
    pub fn new(request: PageRequest, total: usize) -> Self {
        let page = request.page();
        let limit = request.limit();
        let total_pages = total.div_ceil(limit);

        Self {
            page,
            limit,
            total,
            total_pages,
            has_next: page < total_pages,
            has_prev: page > 1,
        }
    }
}

/// `{data, pagination}`. Items are kept in the order the store returned them.
#[derive(Debug, Serialize)]
pub struct Paginated<T> {
    pub data: Vec<T>,
    pub pagination: PageInfo,
}

impl<T> Paginated<T> {
    pub fn new(data: Vec<T>, request: PageRequest, total: usize) -> Self {
        Self {
            data,
            pagination: PageInfo::new(request, total),
        }
    }

    pub fn map<U, F>(self, f: F) -> Paginated<U>
    where
        F: FnMut(T) -> U,
    {
        Paginated {
            data: self.data.into_iter().map(f).collect(),
            pagination: self.pagination,
        }
    }
}
