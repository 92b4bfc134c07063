//! Listing-page walking: product link discovery and next-page detection.
//!
//! The walk re-derives the same page sequence from the fixed start URL on
//! every run, so resume needs only the checkpoint of product URLs.

use crate::site::client::{Fetch, FetchOutcome};
use crate::site::selectors::listing;
use crate::site::sites::Site;
use crate::site::urls;
use anyhow::{bail, Result};
use scraper::Html;
use std::collections::HashSet;
use tracing::{debug, info, warn};

/// Anchor text that marks a "next page" control.
const NEXT_LABELS: &[&str] = &["next", "›", "»"];

/// Extracts product-detail URLs from a listing page, resolved to absolute
/// form, shape-filtered for the site, and deduplicated in document order.
pub fn product_links(html: &str, page_url: &str, site: Site) -> Vec<String> {
    let doc = Html::parse_document(html);
    let mut seen = HashSet::new();
    let mut links = Vec::new();

    for anchor in doc.select(&listing::ANCHOR) {
        let Some(href) = anchor.value().attr("href") else { continue };
        let Some(url) = urls::absolutize(page_url, href) else { continue };

        if !site.is_product_path(urls::path_of(&url)) {
            continue;
        }

        let url = ensure_trailing_slash(site, url);
        if seen.insert(url.clone()) {
            links.push(url);
        }
    }

    links
}

/// Finds the next listing page, or None when pagination ends. Tries an
/// explicit next link, then "Next"-labelled anchors, then numbered
/// `page=N` links beyond the current page.
pub fn next_page(html: &str, page_url: &str) -> Option<String> {
    let doc = Html::parse_document(html);

    if let Some(next) = doc.select(&listing::NEXT_PAGE).next() {
        if let Some(href) = next.value().attr("href") {
            if let Some(url) = urls::absolutize(page_url, href) {
                return Some(url);
            }
        }
    }

    for anchor in doc.select(&listing::ANCHOR) {
        let text = anchor.text().collect::<String>().trim().to_lowercase();
        if NEXT_LABELS.contains(&text.as_str()) {
            if let Some(href) = anchor.value().attr("href") {
                if let Some(url) = urls::absolutize(page_url, href) {
                    return Some(url);
                }
            }
        }
    }

    // Numbered pagination: any page link past the current page means the
    // walk continues at current+1.
    let current = urls::page_param(page_url);
    let max_seen = doc
        .select(&listing::ANCHOR)
        .filter_map(|a| a.value().attr("href"))
        .map(urls::page_param)
        .max()
        .unwrap_or(1);

    if max_seen > current {
        return Some(urls::with_page_param(page_url, current + 1));
    }

    None
}

/// Walks listing pages from the start URL and returns the discovered
/// product URLs in first-seen order. A failure on the first page is fatal
/// (the start URL is unreachable); later failures log a warning and end
/// the walk early.
pub async fn discover<C: Fetch + ?Sized>(
    client: &C,
    site: Site,
    start_url: &str,
    max_pages: u32,
) -> Result<Vec<String>> {
    let mut products = Vec::new();
    let mut seen_products = HashSet::new();
    let mut visited_pages = HashSet::new();
    let mut page_url = start_url.to_string();

    for page_num in 1..=max_pages {
        if !visited_pages.insert(page_url.clone()) {
            debug!("Already visited {}, ending walk", page_url);
            break;
        }

        info!("Listing page {}: {}", page_num, page_url);

        let html = match client.fetch(&page_url).await {
            Ok(FetchOutcome::Page(html)) => html,
            Ok(FetchOutcome::Missing { status }) if page_num == 1 => {
                bail!("Start URL {} returned status {}", page_url, status);
            }
            Err(e) if page_num == 1 => {
                return Err(anyhow::Error::new(e).context(format!(
                    "Start URL {} is unreachable",
                    start_url
                )));
            }
            Ok(FetchOutcome::Missing { status }) => {
                warn!("Listing page {} returned {}, ending walk", page_url, status);
                break;
            }
            Err(e) => {
                warn!("Listing page {} failed ({}), ending walk", page_url, e);
                break;
            }
        };

        let links = product_links(&html, &page_url, site);
        let mut fresh = 0;
        for link in links {
            if seen_products.insert(link.clone()) {
                products.push(link);
                fresh += 1;
            }
        }
        debug!("Page {}: {} new products (total {})", page_num, fresh, products.len());

        match next_page(&html, &page_url) {
            Some(next) => page_url = next,
            None => {
                debug!("No next page after page {}", page_num);
                break;
            }
        }
    }

    info!("Discovery finished: {} product URLs", products.len());
    Ok(products)
}

/// The taping-tools store canonicalizes product URLs with a trailing slash.
fn ensure_trailing_slash(site: Site, url: String) -> String {
    match site {
        Site::Als if !url.ends_with('/') && !url.contains('?') => format!("{}/", url),
        _ => url,
    }
}
