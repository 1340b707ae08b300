pub const DEFAULT_PER_PAGE: usize = 12;

/// One page of an already ordered result set.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub rows: Vec<T>,
    /// 1-based.
    pub page: usize,
    pub per_page: usize,
    pub total_pages: usize,
    pub total_rows: usize,
}

pub fn total_pages(total_rows: usize, per_page: usize) -> usize {
    total_rows.div_ceil(per_page.max(1))
}

/// Slices `rows` to `page` (1-based). Page 0 is treated as page 1, pages past
/// the end come back empty.
pub fn paginate<T>(rows: Vec<T>, page: usize, per_page: usize) -> Page<T> {
    let per_page = if per_page == 0 { DEFAULT_PER_PAGE } else { per_page };
    let page = page.max(1);
    let total_rows = rows.len();
    let start = (page - 1).saturating_mul(per_page);

    Page {
        rows: rows.into_iter().skip(start).take(per_page).collect(),
        page,
        per_page,
        total_pages: total_pages(total_rows, per_page),
        total_rows,
    }
}
