use crate::error::ConfigError;
use serde::Serialize;

/// One fixed-size page out of a filtered row sequence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// 1-based page number, after clamping.
    pub number: usize,
    pub total_pages: usize,
    pub has_next: bool,
    pub has_prev: bool,
}

/// Slice `items` into the requested page.
///
/// `page_size` must be positive; out-of-range page numbers clamp to the
/// nearest valid page (0 becomes 1, past-the-end becomes the last page).
/// An empty input still yields one empty page.
pub fn paginate<T>(items: Vec<T>, page_size: usize, page_number: usize) -> Result<Page<T>, ConfigError> {
    if page_size == 0 {
        return Err(ConfigError::PageSize);
    }

    let total_pages = items.len().div_ceil(page_size).max(1);
    let number = page_number.clamp(1, total_pages);

    let start = (number - 1) * page_size;
    let end = (start + page_size).min(items.len());
    let items: Vec<T> = if start < items.len() {
        items.into_iter().skip(start).take(end - start).collect()
    } else {
        Vec::new()
    };

    Ok(Page {
        items,
        number,
        total_pages,
        has_next: number < total_pages,
        has_prev: number > 1,
    })
}
