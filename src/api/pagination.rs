use serde::Serialize;

pub(crate) const MAX_PAGE_SIZE: i64 = 1000;

pub(crate) const fn default_limit() -> i64 {
    100
}

/// Normalizes raw paging params: negative offsets clamp to zero and the
/// page size stays within `[1, MAX_PAGE_SIZE]`.
pub(crate) fn clamp_page(skip: i64, limit: i64) -> (i64, i64) {
    (skip.max(0), limit.clamp(1, MAX_PAGE_SIZE))
}

#[derive(Debug, Serialize)]
pub(crate) struct PaginatedResponse<T> {
    pub(crate) items: Vec<T>,
    pub(crate) total_count: i64,
    pub(crate) skip: i64,
    pub(crate) limit: i64,
}
