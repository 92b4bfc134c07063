//! Small URL helpers shared by pagination and extraction.

use regex_lite::Regex;
use std::sync::LazyLock;

/// BigCommerce image size token, e.g. `/stencil/608x608/`.
pub static STENCIL_SIZE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/stencil/\d+x\d+/").unwrap());

static PAGE_PARAM: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[?&]page=(\d+)").unwrap());

/// Returns the scheme+host part of a URL (`https://example.com`), or None
/// if the input is not an absolute URL.
pub fn origin_of(url: &str) -> Option<&str> {
    let scheme_end = url.find("://")?;
    let rest = &url[scheme_end + 3..];
    match rest.find('/') {
        Some(idx) => Some(&url[..scheme_end + 3 + idx]),
        None => Some(url),
    }
}

/// Returns the path component of an absolute URL, without query or fragment.
pub fn path_of(url: &str) -> &str {
    let after_scheme = match url.find("://") {
        Some(idx) => &url[idx + 3..],
        None => url,
    };
    let path_start = after_scheme.find('/').map(|i| url.len() - after_scheme.len() + i);
    let path = match path_start {
        Some(idx) => &url[idx..],
        None => "/",
    };
    let end = path.find(['?', '#']).unwrap_or(path.len());
    &path[..end]
}

/// Resolves an href against the page it appeared on. Handles absolute
/// URLs, site-relative paths, and bare query strings; anything else
/// (javascript:, mailto:, protocol-relative oddities) is dropped.
pub fn absolutize(page_url: &str, href: &str) -> Option<String> {
    let href = href.trim();
    if href.is_empty() || href.starts_with("javascript:") || href.starts_with("mailto:") {
        return None;
    }
    if href.starts_with("http://") || href.starts_with("https://") {
        return Some(strip_fragment(href));
    }

    let origin = origin_of(page_url)?;
    if let Some(rest) = href.strip_prefix('/') {
        return Some(strip_fragment(&format!("{}/{}", origin, rest)));
    }
    if href.starts_with('?') {
        let base_end = page_url.find(['?', '#']).unwrap_or(page_url.len());
        return Some(strip_fragment(&format!("{}{}", &page_url[..base_end], href)));
    }

    None
}

fn strip_fragment(url: &str) -> String {
    match url.find('#') {
        Some(idx) => url[..idx].to_string(),
        None => url.to_string(),
    }
}

/// Extracts the `page=N` query parameter, defaulting to 1.
pub fn page_param(url: &str) -> u32 {
    PAGE_PARAM
        .captures(url)
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse().ok())
        .unwrap_or(1)
}

/// Returns the URL with its `page` query parameter set to `page`,
/// appending the parameter if absent.
pub fn with_page_param(url: &str, page: u32) -> String {
    if PAGE_PARAM.is_match(url) {
        let mut out = String::with_capacity(url.len() + 4);
        let caps = PAGE_PARAM.captures(url).unwrap();
        let full = caps.get(0).unwrap();
        let sep = &url[full.start()..full.start() + 1];
        out.push_str(&url[..full.start()]);
        out.push_str(sep);
        out.push_str(&format!("page={}", page));
        out.push_str(&url[full.end()..]);
        out
    } else if url.contains('?') {
        format!("{}&page={}", url, page)
    } else {
        format!("{}?page={}", url, page)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_origin_of() {
        assert_eq!(origin_of("https://example.com/a/b?c=1"), Some("https://example.com"));
        assert_eq!(origin_of("http://example.com"), Some("http://example.com"));
        assert_eq!(origin_of("/relative/path"), None);
    }

    #[test]
    fn test_path_of() {
        assert_eq!(path_of("https://example.com/a/b/?page=2"), "/a/b/");
        assert_eq!(path_of("https://example.com"), "/");
        assert_eq!(path_of("https://example.com/x#frag"), "/x");
    }

    #[test]
    fn test_absolutize() {
        let page = "https://shop.example.com/list/?page=1";
        assert_eq!(
            absolutize(page, "/widget-pro/"),
            Some("https://shop.example.com/widget-pro/".to_string())
        );
        assert_eq!(
            absolutize(page, "https://other.example.com/x"),
            Some("https://other.example.com/x".to_string())
        );
        assert_eq!(
            absolutize(page, "?page=2"),
            Some("https://shop.example.com/list/?page=2".to_string())
        );
        assert_eq!(absolutize(page, "javascript:void(0)"), None);
        assert_eq!(absolutize(page, "mailto:x@example.com"), None);
        assert_eq!(absolutize(page, ""), None);
    }

    #[test]
    fn test_absolutize_strips_fragment() {
        let page = "https://shop.example.com/";
        assert_eq!(
            absolutize(page, "/item/#reviews"),
            Some("https://shop.example.com/item/".to_string())
        );
    }

    #[test]
    fn test_page_param() {
        assert_eq!(page_param("https://x.com/list?page=3"), 3);
        assert_eq!(page_param("https://x.com/list?a=1&page=12"), 12);
        assert_eq!(page_param("https://x.com/list"), 1);
    }

    #[test]
    fn test_with_page_param() {
        assert_eq!(with_page_param("https://x.com/list", 2), "https://x.com/list?page=2");
        assert_eq!(with_page_param("https://x.com/list?a=1", 2), "https://x.com/list?a=1&page=2");
        assert_eq!(
            with_page_param("https://x.com/list?page=1&b=2", 5),
            "https://x.com/list?page=5&b=2"
        );
        assert_eq!(
            with_page_param("https://x.com/list?a=1&page=9", 10),
            "https://x.com/list?a=1&page=10"
        );
    }
}
