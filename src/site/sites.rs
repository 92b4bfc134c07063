//! Supported storefronts and their URL conventions.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Path prefixes that are never product pages on the taping-tools store.
const ALS_DENY: &[&str] = &[
    "shop-by-product",
    "brands",
    "order-parts",
    "login",
    "cart",
    "cart.php",
    "compare",
    "wishlist",
    "category",
    "account.php",
];

/// Supported storefronts with their domains and URL shapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Site {
    /// alstapingtools.com - BigCommerce storefront, top-level product slugs.
    #[default]
    Als,
    /// tswfast.com - brand-category listings, `/product/<slug>` pages.
    Tswfast,
}

impl Site {
    /// Returns the storefront domain.
    pub fn domain(&self) -> &'static str {
        match self {
            Site::Als => "www.alstapingtools.com",
            Site::Tswfast => "www.tswfast.com",
        }
    }

    /// Returns the base URL for this storefront.
    pub fn base_url(&self) -> String {
        format!("https://{}", self.domain())
    }

    /// Short identifier used for output and checkpoint file names.
    pub fn slug(&self) -> &'static str {
        match self {
            Site::Als => "als",
            Site::Tswfast => "tswfast",
        }
    }

    /// Builds the first listing-page URL, optionally scoped to a
    /// category/brand path segment.
    pub fn start_url(&self, category: Option<&str>, page_size: u32) -> String {
        match self {
            Site::Als => {
                let segment = category.unwrap_or("shop-by-product");
                format!(
                    "{}/{}/?mode=4&sort=alphaasc&limit={}",
                    self.base_url(),
                    urlencoding::encode(segment),
                    page_size
                )
            }
            Site::Tswfast => {
                let segment = category.unwrap_or("tools_shop_by_brand");
                format!("{}/category/{}", self.base_url(), urlencoding::encode(segment))
            }
        }
    }

    /// Whether a URL path looks like a product-detail page on this site.
    pub fn is_product_path(&self, path: &str) -> bool {
        let trimmed = path.trim_matches('/');
        if trimmed.is_empty() {
            return false;
        }

        match self {
            Site::Als => {
                // Product pages are single top-level slugs (e.g. /mud-box-pro/).
                let parts: Vec<&str> = trimmed.split('/').collect();
                if parts.len() != 1 {
                    return false;
                }
                let slug = parts[0];
                if ALS_DENY.iter().any(|deny| slug == *deny) {
                    return false;
                }
                // Script endpoints (cart.php, login.php) have extensions;
                // product slugs never do.
                if slug.contains('.') {
                    return false;
                }
                slug.len() >= 4 && !slug.chars().all(|c| c.is_ascii_digit())
            }
            Site::Tswfast => {
                let mut parts = trimmed.split('/');
                parts.next() == Some("product") && parts.next().is_some_and(|p| !p.is_empty())
            }
        }
    }

    /// Rewrites a thumbnail image URL to its highest-resolution variant.
    pub fn hi_res_image(&self, url: &str) -> String {
        match self {
            // BigCommerce serves /stencil/<W>x<H>/ size variants.
            Site::Als => super::urls::STENCIL_SIZE.replace(url, "/stencil/1280x1280/").into_owned(),
            Site::Tswfast => url.to_string(),
        }
    }

    /// Marker strings that indicate a product is not purchasable.
    pub fn out_of_stock_markers(&self) -> &'static [&'static str] {
        &["out of stock", "sold out", "currently unavailable"]
    }

    /// Returns all supported sites.
    pub fn all() -> &'static [Site] {
        &[Site::Als, Site::Tswfast]
    }
}

impl fmt::Display for Site {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

impl FromStr for Site {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "als" | "alstapingtools" => Ok(Site::Als),
            "tsw" | "tswfast" => Ok(Site::Tswfast),
            _ => Err(format!("Unknown site: {}. Use: als, tswfast", s)),
        }
    }
}
