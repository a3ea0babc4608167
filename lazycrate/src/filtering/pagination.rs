use axum::http::header::{CONTENT_RANGE, HeaderMap, HeaderValue};
use serde::Serialize;

/// One page of a paginated lazy load.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub items: Vec<T>,
    /// Rows matching the filters, across all pages.
    pub total: u64,
    /// 1-indexed page number.
    pub page: u64,
    pub rows: u64,
    pub last_page: u64,
}

impl<T> Page<T> {
    #[must_use]
    pub fn new(items: Vec<T>, total: u64, rows: u64, page: u64) -> Self {
        Self {
            items,
            total,
            page,
            rows,
            last_page: last_page(total, rows),
        }
    }

    /// Index of the first row of this page within the full result.
    #[must_use]
    pub const fn offset(&self) -> u64 {
        offset(self.rows, self.page)
    }

    pub fn map<U, F>(self, f: F) -> Page<U>
    where
        F: FnMut(T) -> U,
    {
        Page {
            items: self.items.into_iter().map(f).collect(),
            total: self.total,
            page: self.page,
            rows: self.rows,
            last_page: self.last_page,
        }
    }

    /// `Content-Range` header describing this page.
    #[must_use]
    pub fn content_range(&self, resource_name: &str) -> HeaderMap {
        calculate_content_range(self.offset(), self.items.len() as u64, self.total, resource_name)
    }
}

/// Row offset of a 1-indexed page.
#[must_use]
pub const fn offset(rows: u64, page: u64) -> u64 {
    page.saturating_sub(1).saturating_mul(rows)
}

/// Number of the last page; at least 1 even for an empty result.
#[must_use]
pub const fn last_page(total: u64, rows: u64) -> u64 {
    if rows == 0 {
        return 1;
    }
    let pages = total.div_ceil(rows);
    if pages == 0 { 1 } else { pages }
}

/// Sanitize resource name by removing control characters for HTTP headers
fn sanitize_resource_name(name: &str) -> String {
    name.chars()
        .filter(|c| c.is_ascii() && !c.is_ascii_control())
        .collect()
}

/// Build the `Content-Range` header for `count` items starting at `offset`.
///
/// An empty range is written as `name */total`. Resource names are sanitized so
/// the header value is always valid.
#[must_use]
pub fn calculate_content_range(
    offset: u64,
    count: u64,
    total_count: u64,
    resource_name: &str,
) -> HeaderMap {
    let safe_name = sanitize_resource_name(resource_name);
    let content_range = if count == 0 {
        format!("{safe_name} */{total_count}")
    } else {
        let last = offset.saturating_add(count - 1);
        format!("{safe_name} {offset}-{last}/{total_count}")
    };

    let mut headers = HeaderMap::new();
    let value = HeaderValue::from_str(&content_range)
        .unwrap_or_else(|_| HeaderValue::from_static("items */0"));
    headers.insert(CONTENT_RANGE, value);
    headers
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header(headers: &HeaderMap) -> &str {
        headers.get(CONTENT_RANGE).unwrap().to_str().unwrap()
    }

    #[test]
    fn test_content_range_normal() {
        let headers = calculate_content_range(0, 10, 100, "people");
        assert_eq!(header(&headers), "people 0-9/100");
    }

    #[test]
    fn test_content_range_partial_last_page() {
        let headers = calculate_content_range(20, 3, 23, "people");
        assert_eq!(header(&headers), "people 20-22/23");
    }

    #[test]
    fn test_content_range_empty() {
        let headers = calculate_content_range(0, 0, 0, "people");
        assert_eq!(header(&headers), "people */0");
    }

    /// Resource names with control characters must not inject headers
    #[test]
    fn test_content_range_sanitizes_name() {
        let headers = calculate_content_range(0, 10, 100, "people\r\nInjected: evil");
        let value = header(&headers);
        assert!(!value.contains('\r'));
        assert!(!value.contains('\n'));
    }

    #[test]
    fn test_offsets() {
        assert_eq!(offset(10, 1), 0);
        assert_eq!(offset(10, 3), 20);
        assert_eq!(offset(0, 5), 0);
    }

    #[test]
    fn test_last_page() {
        assert_eq!(last_page(5, 2), 3);
        assert_eq!(last_page(4, 2), 2);
        assert_eq!(last_page(0, 10), 1);
        assert_eq!(last_page(7, 0), 1);
    }

    #[test]
    fn test_page_map_keeps_metadata() {
        let page = Page::new(vec![1, 2], 5, 2, 1).map(|n| n * 10);
        assert_eq!(page.items, vec![10, 20]);
        assert_eq!(page.total, 5);
        assert_eq!(page.last_page, 3);
        assert_eq!(header(&page.content_range("numbers")), "numbers 0-1/5");
    }

    #[test]
    fn test_page_serializes_camel_case() {
        let page = Page::new(vec!["a"], 1, 10, 1);
        assert_eq!(
            serde_json::to_value(&page).unwrap(),
            serde_json::json!({"items": ["a"], "total": 1, "page": 1, "rows": 10, "lastPage": 1})
        );
    }
}
