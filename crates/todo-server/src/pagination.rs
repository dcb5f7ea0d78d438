//! Page request parsing and pagination response headers.
//!
//! Query parameters: `page` (zero-based), `size`, and any number of `sort`
//! values (`property[,property...][,asc|desc]`). Page and size are clamped
//! rather than rejected: an unreadable or negative `page` becomes `0`, a
//! missing, unreadable, or non-positive `size` becomes the configured default,
//! and a `size` above the maximum becomes the maximum. Unknown sort properties
//! are a validation failure.

use axum::http::{header, HeaderMap, HeaderName, HeaderValue};
use todo_types::{Page, PageRequest, Sort};

use crate::config::PagingConfig;
use crate::error::{ApiError, ApiResult};

pub const TOTAL_COUNT_HEADER: HeaderName = HeaderName::from_static("x-total-count");

/// Decoded query string, in request order.
pub type QueryPairs = Vec<(String, String)>;

pub fn parse_query(raw: Option<&str>) -> QueryPairs {
    raw.map(|q| url::form_urlencoded::parse(q.as_bytes()).into_owned().collect())
        .unwrap_or_default()
}

pub fn page_request(pairs: &[(String, String)], paging: &PagingConfig) -> ApiResult<PageRequest> {
    let mut page: Option<&str> = None;
    let mut size: Option<&str> = None;
    let mut sort = Sort::unsorted();

    for (key, value) in pairs {
        match key.as_str() {
            "page" => page = Some(value),
            "size" => size = Some(value),
            "sort" => sort
                .push_param(value)
                .map_err(|e| ApiError::BadRequest(e.to_string()))?,
            _ => {}
        }
    }

    let page = page
        .filter(|p| !p.trim().is_empty())
        .map(|p| p.trim().parse::<i64>().unwrap_or(0).max(0) as u64)
        .unwrap_or(0);

    let size = size
        .filter(|s| !s.trim().is_empty())
        .and_then(|s| s.trim().parse::<i64>().ok())
        .filter(|s| *s >= 1)
        .map(|s| (s as u64).min(paging.max_page_size))
        .unwrap_or(paging.default_page_size);

    PageRequest::new(page, size, sort).map_err(|e| ApiError::BadRequest(e.to_string()))
}

/// `X-Total-Count` and `Link` headers for a page served at `path`.
///
/// Links keep every query parameter of the original request except `page` and
/// `size`, which are appended with the target values.
pub fn pagination_headers<T>(path: &str, pairs: &[(String, String)], page: &Page<T>) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(TOTAL_COUNT_HEADER, HeaderValue::from(page.total_elements));

    let mut links = Vec::with_capacity(4);
    if page.has_next() {
        links.push(link(path, pairs, page.number + 1, page.size, "next"));
    }
    if page.has_previous() {
        links.push(link(path, pairs, page.number - 1, page.size, "prev"));
    }
    links.push(link(path, pairs, page.last_index(), page.size, "last"));
    links.push(link(path, pairs, 0, page.size, "first"));

    match HeaderValue::from_str(&links.join(",")) {
        Ok(value) => {
            headers.insert(header::LINK, value);
        }
        Err(e) => tracing::warn!(error = %e, "could not build Link header"),
    }
    headers
}

fn link(path: &str, pairs: &[(String, String)], number: u64, size: u64, rel: &str) -> String {
    let mut query = url::form_urlencoded::Serializer::new(String::new());
    for (key, value) in pairs {
        if key != "page" && key != "size" {
            query.append_pair(key, value);
        }
    }
    query.append_pair("page", &number.to_string());
    query.append_pair("size", &size.to_string());
    format!("<{path}?{}>; rel=\"{rel}\"", query.finish())
}
