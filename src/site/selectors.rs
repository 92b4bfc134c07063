//! CSS selectors for storefront HTML parsing.
//!
//! All selectors used for listing and product pages live here. Update this
//! file when a storefront changes its theme markup.
//!
//! **Update process**: when extraction starts returning defaults, capture
//! an HTML sample, adjust selectors, and add a test fixture.

use scraper::Selector;
use std::sync::LazyLock;

/// Selectors for listing (category) pages.
pub mod listing {
    use super::*;

    /// Every anchor with an href; product-shape filtering happens on the
    /// resolved URL, not in CSS.
    pub static ANCHOR: LazyLock<Selector> = LazyLock::new(|| Selector::parse("a[href]").unwrap());

    /// Explicit next-page links.
    pub static NEXT_PAGE: LazyLock<Selector> = LazyLock::new(|| {
        Selector::parse(
            "a[rel='next'], \
             .pagination-item--next a, \
             a.pagination-next, \
             li.next a",
        )
        .unwrap()
    });
}

/// Selectors for product-detail pages.
pub mod product {
    use super::*;

    /// Page heading.
    pub static H1: LazyLock<Selector> = LazyLock::new(|| Selector::parse("h1").unwrap());

    /// Document title tag.
    pub static TITLE: LazyLock<Selector> = LazyLock::new(|| Selector::parse("title").unwrap());

    /// Theme-specific product name containers.
    pub static NAME: LazyLock<Selector> = LazyLock::new(|| {
        Selector::parse(
            "h1.productView-title, \
             .productView-title, \
             .product-title, \
             .product-name",
        )
        .unwrap()
    });

    /// Price containers, most specific first.
    pub static PRICE: LazyLock<Selector> = LazyLock::new(|| {
        Selector::parse(
            "span.price--main, \
             .productView-price .price, \
             span.price, \
             div.price, \
             #price",
        )
        .unwrap()
    });

    /// Open Graph price meta tag.
    pub static PRICE_META: LazyLock<Selector> =
        LazyLock::new(|| Selector::parse("meta[property='og:price:amount']").unwrap());

    /// SKU value cell (BigCommerce `productView-info` list).
    pub static SKU: LazyLock<Selector> = LazyLock::new(|| {
        Selector::parse(
            "dd.productView-info-value--sku, \
             .sku, \
             #sku, \
             .product-code",
        )
        .unwrap()
    });

    /// UPC value cell.
    pub static UPC: LazyLock<Selector> =
        LazyLock::new(|| Selector::parse("dd.productView-info-value--upc, .upc").unwrap());

    /// MPN value cell.
    pub static MPN: LazyLock<Selector> = LazyLock::new(|| {
        Selector::parse("dd.productView-info-value--mpn, .mpn, .part-number").unwrap()
    });

    /// Brand heading.
    pub static BRAND: LazyLock<Selector> = LazyLock::new(|| {
        Selector::parse(
            "h5.productView-brand a, \
             .productView-brand a, \
             [itemprop='brand']",
        )
        .unwrap()
    });

    /// Stock status element.
    pub static STOCK: LazyLock<Selector> = LazyLock::new(|| {
        Selector::parse(
            ".productView-stock, \
             .stock-status, \
             .availability, \
             #availability",
        )
        .unwrap()
    });

    /// Description containers, theme tab first.
    pub static DESCRIPTION: LazyLock<Selector> = LazyLock::new(|| {
        Selector::parse(
            ".productView-description-tabContent, \
             #tab-description, \
             [itemprop='description'], \
             .product-description, \
             [class*='description']",
        )
        .unwrap()
    });

    /// Block-level text inside a description container.
    pub static DESC_BLOCKS: LazyLock<Selector> =
        LazyLock::new(|| Selector::parse("p, li").unwrap());

    /// First paragraph of a description container.
    pub static PARAGRAPH: LazyLock<Selector> = LazyLock::new(|| Selector::parse("p").unwrap());

    /// Specification tables.
    pub static SPEC_TABLE: LazyLock<Selector> = LazyLock::new(|| {
        Selector::parse(
            "#tab-addition table, \
             table[class*='spec'], \
             table[class*='attribute'], \
             table[class*='detail']",
        )
        .unwrap()
    });

    /// Specification definition lists.
    pub static SPEC_DL: LazyLock<Selector> = LazyLock::new(|| {
        Selector::parse(
            "dl[class*='spec'], \
             dl[class*='attribute']",
        )
        .unwrap()
    });

    pub static ROW: LazyLock<Selector> = LazyLock::new(|| Selector::parse("tr").unwrap());
    pub static CELL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("td, th").unwrap());
    pub static DT: LazyLock<Selector> = LazyLock::new(|| Selector::parse("dt").unwrap());
    pub static DD: LazyLock<Selector> = LazyLock::new(|| Selector::parse("dd").unwrap());

    /// Gallery/carousel thumbnails.
    pub static GALLERY: LazyLock<Selector> = LazyLock::new(|| {
        Selector::parse(
            ".productView-thumbnails img, \
             .product-gallery img, \
             .carousel img, \
             ul.thumbnails img",
        )
        .unwrap()
    });

    /// Zoom/main image elements.
    pub static MAIN_IMAGE: LazyLock<Selector> = LazyLock::new(|| {
        Selector::parse(
            "img[data-zoom-image], \
             .productView-image img, \
             figure.productView-image img, \
             img.product-main-image",
        )
        .unwrap()
    });

    /// Breadcrumb trail links.
    pub static BREADCRUMB: LazyLock<Selector> = LazyLock::new(|| {
        Selector::parse(
            "nav.breadcrumbs a, \
             ul.breadcrumbs a, \
             [class*='breadcrumb'] a",
        )
        .unwrap()
    });
}

/// Schema.org and meta-tag selectors shared across strategies.
pub mod meta {
    use super::*;

    pub static ITEMPROP_NAME: LazyLock<Selector> =
        LazyLock::new(|| Selector::parse("[itemprop='name']").unwrap());

    pub static ITEMPROP_PRICE: LazyLock<Selector> =
        LazyLock::new(|| Selector::parse("[itemprop='price']").unwrap());

    pub static ITEMPROP_SKU: LazyLock<Selector> =
        LazyLock::new(|| Selector::parse("[itemprop='sku']").unwrap());

    pub static ITEMPROP_IMAGE: LazyLock<Selector> =
        LazyLock::new(|| Selector::parse("[itemprop='image']").unwrap());

    pub static OG_IMAGE: LazyLock<Selector> =
        LazyLock::new(|| Selector::parse("meta[property='og:image']").unwrap());

    pub static DESCRIPTION: LazyLock<Selector> =
        LazyLock::new(|| Selector::parse("meta[name='description']").unwrap());
}

#[cfg(test)]
mod tests {
    use super::*;
    use scraper::Html;

    #[test]
    fn test_selectors_compile() {
        // Force evaluation of all lazy selectors to ensure they parse
        let _ = &*listing::ANCHOR;
        let _ = &*listing::NEXT_PAGE;
        let _ = &*product::H1;
        let _ = &*product::NAME;
        let _ = &*product::PRICE;
        let _ = &*product::SKU;
        let _ = &*product::DESCRIPTION;
        let _ = &*product::SPEC_TABLE;
        let _ = &*product::GALLERY;
        let _ = &*product::BREADCRUMB;
        let _ = &*meta::ITEMPROP_PRICE;
        let _ = &*meta::OG_IMAGE;
    }

    #[test]
    fn test_basic_selector_matching() {
        let html = Html::parse_document(
            r#"<h1 class="productView-title">Banjo Taper</h1>
               <dd class="productView-info-value--sku" data-product-sku="BT-100">BT-100</dd>
               <span class="price price--main">$249.00</span>"#,
        );

        let name = html.select(&product::NAME).next().unwrap();
        assert_eq!(name.text().collect::<String>(), "Banjo Taper");

        let sku = html.select(&product::SKU).next().unwrap();
        assert_eq!(sku.value().attr("data-product-sku"), Some("BT-100"));

        let price = html.select(&product::PRICE).next().unwrap();
        assert_eq!(price.text().collect::<String>(), "$249.00");
    }
}
