use serde::Serialize;

use crate::config::PaginationConfig;

/// Requested page window, already clamped to the configured bounds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: usize,
    pub limit: usize,
}

impl PageRequest {
    /// Build from raw query values. Missing or non-numeric values fall back to
    /// page 1 and the default limit; the limit is clamped to `1..=max_limit`.
    pub fn from_params(page: Option<&str>, limit: Option<&str>, config: &PaginationConfig) -> Self {
        let page = parse_number(page).map(|p| p.max(1)).unwrap_or(1);
        let limit = parse_number(limit)
            .map(|l| l.clamp(1, config.max_limit.max(1) as i64))
            .unwrap_or(config.default_limit as i64);

        Self {
            page: page as usize,
            limit: limit as usize,
        }
    }

    pub fn offset(&self) -> usize {
        (self.page - 1).saturating_mul(self.limit)
    }
}

fn parse_number(raw: Option<&str>) -> Option<i64> {
    raw.and_then(|s| s.trim().parse::<i64>().ok())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub page: usize,
    pub limit: usize,
    pub total: usize,
    pub total_pages: usize,
}

#[derive(Debug)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub pagination: Pagination,
}

/// Slice one page out of an already filtered and ordered list
pub fn paginate<T>(items: Vec<T>, request: PageRequest) -> Page<T> {
    let total = items.len();
    let total_pages = total.div_ceil(request.limit);

    let items = items
        .into_iter()
        .skip(request.offset())
        .take(request.limit)
        .collect();

    Page {
        items,
        pagination: Pagination {
            page: request.page,
            limit: request.limit,
            total,
            total_pages,
        },
    }
}
