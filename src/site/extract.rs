//! Field extraction from product pages.
//!
//! Every field runs an ordered list of strategies until one yields a
//! non-empty value; missing data falls back to a typed default and is
//! never an error.

use crate::site::models::ProductRecord;
use crate::site::selectors::{meta, product};
use crate::site::sites::Site;
use crate::site::urls;
use regex_lite::Regex;
use scraper::{ElementRef, Html, Selector};
use std::collections::BTreeMap;
use std::sync::LazyLock;
use tracing::trace;

/// Currency amount in page text, e.g. `$350.00` or `$1,234`.
static CURRENCY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\s*\d[\d,]*(\.\d+)?").unwrap());

/// Trailing `" - Store Name"` style suffix on a `<title>`.
static TITLE_SUFFIX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+[-|]\s+.*$").unwrap());

/// Substrings that mark a non-product image (logos, spacers, icons).
const IMAGE_NOISE: &[&str] = &["logo", "icon", "1x1", "blank", "spinner"];

/// A single extraction attempt: a pure function over the parsed page.
type Strategy = fn(&Html) -> Option<String>;

/// Applies strategies in order, returning the first non-empty trimmed hit.
fn first_hit(doc: &Html, strategies: &[Strategy]) -> Option<String> {
    strategies
        .iter()
        .find_map(|strategy| strategy(doc).map(|v| v.trim().to_string()).filter(|v| !v.is_empty()))
}

const NAME_STRATEGIES: &[Strategy] =
    &[name_from_h1, name_from_title_tag, name_from_theme_class, name_from_schema];

const PRICE_STRATEGIES: &[Strategy] =
    &[price_from_theme_class, price_from_schema, price_from_meta, price_from_page_text];

/// Parses a displayed price into a number by dropping everything except
/// digits and the decimal point. Returns None when nothing numeric is left
/// or the remainder doesn't parse.
pub fn parse_price(text: &str) -> Option<f64> {
    let cleaned: String = text.chars().filter(|c| c.is_ascii_digit() || *c == '.').collect();
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse().ok()
}

/// Extracts structured product fields from a fetched page.
pub struct Extractor {
    site: Site,
}

impl Extractor {
    /// Creates an extractor for the given storefront.
    pub fn new(site: Site) -> Self {
        Self { site }
    }

    /// Extracts a full record from product-page HTML. Never fails: fields
    /// the page doesn't carry keep their defaults.
    pub fn extract(&self, html: &str, url: &str) -> ProductRecord {
        let doc = Html::parse_document(html);
        let mut record = ProductRecord::new(url);

        if let Some(name) = first_hit(&doc, NAME_STRATEGIES) {
            record.name = name;
        }

        // Specs come first so identifier fallbacks can read labeled rows
        let specs = specifications(&doc);

        record.sku = element_value(&doc, &product::SKU, &["data-product-sku"], "SKU")
            .or_else(|| select_text(&doc, &meta::ITEMPROP_SKU))
            .or_else(|| spec_lookup(&specs, &["sku"]));

        record.upc = element_value(&doc, &product::UPC, &["data-product-upc"], "UPC")
            .or_else(|| spec_lookup(&specs, &["upc"]));

        record.mpn = element_value(
            &doc,
            &product::MPN,
            &["data-product-mpn", "data-original-mpn"],
            "MPN",
        )
        .or_else(|| spec_lookup(&specs, &["mpn", "part number"]));

        record.brand = select_text(&doc, &product::BRAND);

        if let Some(price) = first_hit(&doc, PRICE_STRATEGIES) {
            record.price_text = price;
        }
        record.price_numeric = parse_price(&record.price_text);

        let (short, full) = descriptions(&doc);
        record.description_short = short;
        record.description_full = full;

        record.specifications = specs;
        record.in_stock = self.in_stock(&doc);
        record.category = category(&doc);

        self.collect_images(&doc, url, &mut record);

        trace!(
            "Extracted {}: price={} images={} specs={}",
            record.name,
            record.price_text,
            record.images.len(),
            record.specifications.len()
        );

        record
    }

    /// True unless a stock element or the page text carries an
    /// out-of-stock marker.
    fn in_stock(&self, doc: &Html) -> bool {
        let markers = self.site.out_of_stock_markers();

        if let Some(status) = select_text(doc, &product::STOCK) {
            let status = status.to_lowercase();
            if markers.iter().any(|m| status.contains(m)) {
                return false;
            }
        }

        let text = page_text(doc).to_lowercase();
        !markers.iter().any(|m| text.contains(m))
    }

    /// Gathers image URLs from gallery, zoom/main, schema.org, and Open
    /// Graph sources, normalized to hi-res and deduplicated in order.
    fn collect_images(&self, doc: &Html, page_url: &str, record: &mut ProductRecord) {
        let mut add = |record: &mut ProductRecord, raw: &str| {
            if IMAGE_NOISE.iter().any(|noise| raw.to_lowercase().contains(noise)) {
                return;
            }
            if let Some(absolute) = urls::absolutize(page_url, raw) {
                record.push_image(self.site.hi_res_image(&absolute));
            }
        };

        for img in doc.select(&product::GALLERY) {
            if let Some(src) = image_source(img) {
                add(record, src);
            }
        }
        for img in doc.select(&product::MAIN_IMAGE) {
            if let Some(src) = image_source(img) {
                add(record, src);
            }
        }
        for el in doc.select(&meta::ITEMPROP_IMAGE) {
            let raw = el
                .value()
                .attr("content")
                .or_else(|| el.value().attr("src"))
                .or_else(|| el.value().attr("href"));
            if let Some(raw) = raw {
                add(record, raw);
            }
        }
        if let Some(og) = doc.select(&meta::OG_IMAGE).next() {
            if let Some(content) = og.value().attr("content") {
                add(record, content);
            }
        }
    }
}

// Name strategies

fn name_from_h1(doc: &Html) -> Option<String> {
    select_text(doc, &product::H1)
}

fn name_from_title_tag(doc: &Html) -> Option<String> {
    let title = select_text(doc, &product::TITLE)?;
    Some(TITLE_SUFFIX.replace(&title, "").into_owned())
}

fn name_from_theme_class(doc: &Html) -> Option<String> {
    select_text(doc, &product::NAME)
}

fn name_from_schema(doc: &Html) -> Option<String> {
    select_text(doc, &meta::ITEMPROP_NAME)
}

// Price strategies

fn price_from_theme_class(doc: &Html) -> Option<String> {
    doc.select(&product::PRICE).map(|el| text_of(el)).find(|t| t.chars().any(|c| c.is_ascii_digit()))
}

fn price_from_schema(doc: &Html) -> Option<String> {
    let el = doc.select(&meta::ITEMPROP_PRICE).next()?;
    match el.value().attr("content") {
        Some(content) if !content.trim().is_empty() => Some(content.trim().to_string()),
        _ => Some(text_of(el)),
    }
}

fn price_from_meta(doc: &Html) -> Option<String> {
    let el = doc.select(&product::PRICE_META).next()?;
    let amount = el.value().attr("content")?.trim();
    if amount.is_empty() {
        None
    } else {
        Some(format!("${}", amount))
    }
}

fn price_from_page_text(doc: &Html) -> Option<String> {
    CURRENCY.find(&page_text(doc)).map(|m| m.as_str().trim().to_string())
}

// Shared element helpers

fn text_of(el: ElementRef) -> String {
    el.text().collect::<String>().trim().to_string()
}

fn select_text(doc: &Html, selector: &Selector) -> Option<String> {
    doc.select(selector).map(text_of).find(|t| !t.is_empty())
}

fn page_text(doc: &Html) -> String {
    doc.root_element().text().collect()
}

fn image_source(el: ElementRef) -> Option<&str> {
    el.value()
        .attr("data-zoom-image")
        .or_else(|| el.value().attr("src"))
        .or_else(|| el.value().attr("data-src"))
        .or_else(|| el.value().attr("data-original"))
}

/// Reads an identifier from a labeled element: data attributes win over
/// visible text, and a leading `"SKU:"`-style label is stripped from text.
fn element_value(
    doc: &Html,
    selector: &Selector,
    attrs: &[&str],
    label: &str,
) -> Option<String> {
    let el = doc.select(selector).next()?;
    for attr in attrs {
        if let Some(value) = el.value().attr(attr) {
            let value = value.trim();
            if !value.is_empty() {
                return Some(value.to_string());
            }
        }
    }

    let mut text = text_of(el);
    let prefix_len = label.len();
    if text.is_char_boundary(prefix_len) && text[..prefix_len].eq_ignore_ascii_case(label) {
        text = text[prefix_len..].trim_start_matches(':').trim().to_string();
    }
    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

/// Looks up a specification row whose key matches one of `labels`
/// case-insensitively.
fn spec_lookup(specs: &BTreeMap<String, String>, labels: &[&str]) -> Option<String> {
    specs
        .iter()
        .find(|(key, _)| labels.iter().any(|label| key.eq_ignore_ascii_case(label)))
        .map(|(_, value)| value.clone())
        .filter(|value| !value.is_empty())
}

/// Parses specification tables and definition lists into key/value rows.
/// Rows with an empty value are kept; rows with an empty key are dropped.
fn specifications(doc: &Html) -> BTreeMap<String, String> {
    let mut specs = BTreeMap::new();

    for table in doc.select(&product::SPEC_TABLE) {
        for row in table.select(&product::ROW) {
            let cells: Vec<ElementRef> = row.select(&product::CELL).collect();
            if cells.len() >= 2 {
                let key = text_of(cells[0]);
                if !key.is_empty() {
                    specs.insert(key, text_of(cells[1]));
                }
            }
        }
    }

    for dl in doc.select(&product::SPEC_DL) {
        let keys = dl.select(&product::DT).map(text_of);
        let values: Vec<String> = dl.select(&product::DD).map(text_of).collect();
        for (key, value) in keys.zip(values) {
            if !key.is_empty() {
                specs.insert(key, value);
            }
        }
    }

    specs
}

/// Short description is the first paragraph of the description container
/// (or the meta description); full is every block joined by line breaks.
fn descriptions(doc: &Html) -> (String, String) {
    const SHORT_CAP: usize = 500;

    let container = doc.select(&product::DESCRIPTION).next();

    let full = match container {
        Some(container) => {
            let blocks: Vec<String> = container
                .select(&product::DESC_BLOCKS)
                .map(text_of)
                .filter(|t| !t.is_empty())
                .collect();
            if blocks.is_empty() {
                text_of(container)
            } else {
                blocks.join("\n")
            }
        }
        None => String::new(),
    };

    let short = container
        .and_then(|c| c.select(&product::PARAGRAPH).map(text_of).find(|t| !t.is_empty()))
        .or_else(|| {
            doc.select(&meta::DESCRIPTION)
                .next()
                .and_then(|m| m.value().attr("content"))
                .map(|c| c.trim().to_string())
                .filter(|c| !c.is_empty())
        })
        .unwrap_or_else(|| full.clone());

    (short.chars().take(SHORT_CAP).collect(), full)
}

/// Category from the breadcrumb trail: last link that isn't "Home".
fn category(doc: &Html) -> Option<String> {
    let crumbs: Vec<String> = doc
        .select(&product::BREADCRUMB)
        .map(text_of)
        .filter(|t| !t.is_empty() && !t.eq_ignore_ascii_case("home"))
        .collect();
    crumbs.last().cloned()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(html: &str) -> Html {
        Html::parse_document(html)
    }

    // Price parsing

    #[test]
    fn test_parse_price() {
        assert_eq!(parse_price("$350.00"), Some(350.0));
        assert_eq!(parse_price("$1,234.56"), Some(1234.56));
        assert_eq!(parse_price("350"), Some(350.0));
        assert_eq!(parse_price("USD 12.99"), Some(12.99));
    }

    #[test]
    fn test_parse_price_failures() {
        assert_eq!(parse_price(""), None);
        assert_eq!(parse_price("Out of Stock"), None);
        assert_eq!(parse_price("N/A"), None);
        assert_eq!(parse_price("Call for price"), None);
        // Two decimal points can't parse
        assert_eq!(parse_price("$1.2.3"), None);
    }

    // Name strategies

    #[test]
    fn test_name_prefers_h1() {
        let d = doc("<html><head><title>Page Title - Shop</title></head><body><h1>Banjo Taper</h1></body></html>");
        assert_eq!(first_hit(&d, NAME_STRATEGIES), Some("Banjo Taper".to_string()));
    }

    #[test]
    fn test_name_falls_back_to_title() {
        let d = doc("<html><head><title>Corner Roller - Als Taping Tools</title></head><body></body></html>");
        assert_eq!(first_hit(&d, NAME_STRATEGIES), Some("Corner Roller".to_string()));
    }

    #[test]
    fn test_name_title_keeps_hyphenated_words() {
        let d = doc("<html><head><title>Mud-Box Pro | Shop</title></head><body></body></html>");
        assert_eq!(first_hit(&d, NAME_STRATEGIES), Some("Mud-Box Pro".to_string()));
    }

    #[test]
    fn test_name_from_schema() {
        let d = doc(r#"<body><span itemprop="name">Flat Box 10in</span></body>"#);
        assert_eq!(first_hit(&d, NAME_STRATEGIES), Some("Flat Box 10in".to_string()));
    }

    // Price strategies

    #[test]
    fn test_price_from_class() {
        let d = doc(r#"<body><span class="price price--main">$249.00</span></body>"#);
        assert_eq!(first_hit(&d, PRICE_STRATEGIES), Some("$249.00".to_string()));
    }

    #[test]
    fn test_price_skips_priceless_price_element() {
        // A price container that only says "was" shouldn't win over schema.org
        let d = doc(
            r#"<body><span class="price">was</span><span itemprop="price" content="42.50"></span></body>"#,
        );
        assert_eq!(first_hit(&d, PRICE_STRATEGIES), Some("42.50".to_string()));
    }

    #[test]
    fn test_price_from_og_meta() {
        let d = doc(r#"<head><meta property="og:price:amount" content="99.95"></head>"#);
        assert_eq!(first_hit(&d, PRICE_STRATEGIES), Some("$99.95".to_string()));
    }

    #[test]
    fn test_price_from_page_text_regex() {
        let d = doc("<body><p>Sale price this week only: $1,299.99 with free shipping</p></body>");
        assert_eq!(first_hit(&d, PRICE_STRATEGIES), Some("$1,299.99".to_string()));
    }

    #[test]
    fn test_missing_price_yields_defaults() {
        let extractor = Extractor::new(Site::Als);
        let record =
            extractor.extract("<html><body><h1>Mystery Tool</h1></body></html>", "https://x/p/");
        assert_eq!(record.price_text, "N/A");
        assert_eq!(record.price_numeric, None);
    }

    // Identifiers

    #[test]
    fn test_sku_from_data_attr() {
        let d = doc(r#"<dd class="productView-info-value--sku" data-product-sku="TT-500">ignored</dd>"#);
        assert_eq!(
            element_value(&d, &product::SKU, &["data-product-sku"], "SKU"),
            Some("TT-500".to_string())
        );
    }

    #[test]
    fn test_sku_from_text_strips_label() {
        let d = doc(r#"<span class="sku">SKU: AB-123</span>"#);
        assert_eq!(
            element_value(&d, &product::SKU, &["data-product-sku"], "SKU"),
            Some("AB-123".to_string())
        );
    }

    #[test]
    fn test_id_from_spec_table() {
        let html = r#"<table class="spec-table">
            <tr><td>Part Number</td><td>PN-99</td></tr>
            <tr><td>Weight</td><td>2 lb</td></tr>
        </table>"#;
        let specs = specifications(&doc(html));
        assert_eq!(spec_lookup(&specs, &["mpn", "part number"]), Some("PN-99".to_string()));
        assert_eq!(spec_lookup(&specs, &["upc"]), None);
    }

    #[test]
    fn test_spec_lookup_case_insensitive() {
        let mut specs = BTreeMap::new();
        specs.insert("UPC".to_string(), "012345678905".to_string());
        assert_eq!(spec_lookup(&specs, &["upc"]), Some("012345678905".to_string()));
    }

    // Specifications

    #[test]
    fn test_specifications_keep_empty_values() {
        let html = r#"<table class="spec-table">
            <tr><th>Material</th><td>Aluminum</td></tr>
            <tr><th>Finish</th><td></td></tr>
            <tr><th></th><td>orphan</td></tr>
        </table>"#;
        let specs = specifications(&doc(html));
        assert_eq!(specs.len(), 2);
        assert_eq!(specs["Material"], "Aluminum");
        assert_eq!(specs["Finish"], "");
    }

    #[test]
    fn test_specifications_from_dl() {
        let html = r#"<dl class="product-specs">
            <dt>Length</dt><dd>48 in</dd>
            <dt>Width</dt><dd>2 in</dd>
        </dl>"#;
        let specs = specifications(&doc(html));
        assert_eq!(specs["Length"], "48 in");
        assert_eq!(specs["Width"], "2 in");
    }

    // Descriptions

    #[test]
    fn test_descriptions_blocks_as_lines() {
        let html = r#"<div class="productView-description-tabContent">
            <p>A sturdy taping knife.</p>
            <ul><li>Stainless blade</li><li>Soft grip</li></ul>
        </div>"#;
        let (short, full) = descriptions(&doc(html));
        assert_eq!(short, "A sturdy taping knife.");
        assert_eq!(full, "A sturdy taping knife.\nStainless blade\nSoft grip");
    }

    #[test]
    fn test_description_meta_fallback() {
        let html = r#"<head><meta name="description" content="Drywall tools and parts."></head><body></body>"#;
        let (short, full) = descriptions(&doc(html));
        assert_eq!(short, "Drywall tools and parts.");
        assert_eq!(full, "");
    }

    #[test]
    fn test_description_short_capped() {
        let long = "x".repeat(900);
        let html = format!(r#"<div class="product-description"><p>{}</p></div>"#, long);
        let (short, full) = descriptions(&doc(&html));
        assert_eq!(short.chars().count(), 500);
        assert_eq!(full.chars().count(), 900);
    }

    // Stock

    #[test]
    fn test_in_stock_default_true() {
        let extractor = Extractor::new(Site::Als);
        let record = extractor.extract("<body><h1>Tool</h1></body>", "https://x/p/");
        assert!(record.in_stock);
    }

    #[test]
    fn test_out_of_stock_marker_in_text() {
        let extractor = Extractor::new(Site::Als);
        let record = extractor
            .extract("<body><h1>Tool</h1><p>Currently OUT OF STOCK</p></body>", "https://x/p/");
        assert!(!record.in_stock);
    }

    #[test]
    fn test_out_of_stock_price_text() {
        let extractor = Extractor::new(Site::Als);
        let html = r#"<body><h1>Tool</h1><span class="price">Out of Stock</span></body>"#;
        let record = extractor.extract(html, "https://x/p/");
        assert_eq!(record.price_numeric, None);
        assert!(!record.in_stock);
    }

    // Images

    #[test]
    fn test_images_normalized_and_deduped() {
        let extractor = Extractor::new(Site::Als);
        let html = r#"<body>
            <div class="product-gallery">
                <img src="/images/stencil/80x80/products/1/a.jpg">
                <img src="/images/stencil/608x608/products/1/a.jpg">
            </div>
            <meta property="og:image" content="https://www.alstapingtools.com/images/stencil/1280x1280/products/1/a.jpg">
        </body>"#;
        let record = extractor.extract(html, "https://www.alstapingtools.com/tool/");
        // All three candidates collapse to one hi-res URL
        assert_eq!(
            record.images,
            vec!["https://www.alstapingtools.com/images/stencil/1280x1280/products/1/a.jpg"]
        );
    }

    #[test]
    fn test_images_capped_at_nine() {
        let mut gallery = String::from(r#"<div class="product-gallery">"#);
        for i in 0..15 {
            gallery.push_str(&format!(r#"<img src="/products/{}.jpg">"#, i));
        }
        gallery.push_str("</div>");
        let extractor = Extractor::new(Site::Als);
        let record = extractor.extract(&gallery, "https://www.alstapingtools.com/tool/");
        assert_eq!(record.images.len(), 9);
        assert!(record.images[0].ends_with("/products/0.jpg"));
    }

    #[test]
    fn test_images_skip_noise() {
        let html = r#"<body><div class="product-gallery">
            <img src="/images/site-logo.png">
            <img src="/images/products/real.jpg">
        </div></body>"#;
        let extractor = Extractor::new(Site::Als);
        let record = extractor.extract(html, "https://www.alstapingtools.com/tool/");
        assert_eq!(record.images.len(), 1);
        assert!(record.images[0].ends_with("real.jpg"));
    }

    #[test]
    fn test_zoom_image_attr_preferred() {
        let html = r#"<body><img data-zoom-image="/products/zoom.jpg" src="/products/small.jpg" class="product-main-image"></body>"#;
        let extractor = Extractor::new(Site::Tswfast);
        let record = extractor.extract(html, "https://www.tswfast.com/product/x");
        assert_eq!(record.images[0], "https://www.tswfast.com/products/zoom.jpg");
    }

    // Category and brand

    #[test]
    fn test_category_from_breadcrumb() {
        let html = r#"<nav class="breadcrumbs">
            <a href="/">Home</a>
            <a href="/taping-tools/">Taping Tools</a>
            <a href="/taping-tools/boxes/">Flat Boxes</a>
        </nav>"#;
        assert_eq!(category(&doc(html)), Some("Flat Boxes".to_string()));
    }

    #[test]
    fn test_category_ignores_home_only_trail() {
        let html = r#"<nav class="breadcrumbs"><a href="/">Home</a></nav>"#;
        assert_eq!(category(&doc(html)), None);
    }

    #[test]
    fn test_brand_from_theme_heading() {
        let html = r#"<h5 class="productView-brand"><a href="/brands/acme/">Acme Tools</a></h5>"#;
        let extractor = Extractor::new(Site::Als);
        let record = extractor.extract(html, "https://x/p/");
        assert_eq!(record.brand, Some("Acme Tools".to_string()));
    }

    // Whole-record assembly

    #[test]
    fn test_extract_full_page() {
        let html = r#"<html><head>
            <title>Automatic Taper - Als Taping Tools</title>
            <meta name="description" content="Professional automatic taper.">
        </head><body>
            <h1 class="productView-title">Automatic Taper</h1>
            <h5 class="productView-brand"><a>TapePro</a></h5>
            <dl>
                <dd class="productView-info-value--sku" data-product-sku="AT-200">AT-200</dd>
                <dd class="productView-info-value--upc">012345678905</dd>
            </dl>
            <span class="price price--main">$1,450.00</span>
            <div class="productView-description-tabContent">
                <p>Applies tape and mud in one pass.</p>
                <ul><li>55in tube</li></ul>
            </div>
            <div id="tab-addition"><table>
                <tr><td>Weight</td><td>9 lb</td></tr>
            </table></div>
            <div class="product-gallery">
                <img src="/images/stencil/608x608/products/9/taper.jpg">
            </div>
            <nav class="breadcrumbs"><a>Home</a><a>Taping Tools</a></nav>
        </body></html>"#;

        let extractor = Extractor::new(Site::Als);
        let record = extractor.extract(html, "https://www.alstapingtools.com/automatic-taper/");

        assert_eq!(record.name, "Automatic Taper");
        assert_eq!(record.brand, Some("TapePro".to_string()));
        assert_eq!(record.sku, Some("AT-200".to_string()));
        assert_eq!(record.upc, Some("012345678905".to_string()));
        assert_eq!(record.price_text, "$1,450.00");
        assert_eq!(record.price_numeric, Some(1450.0));
        assert!(record.in_stock);
        assert_eq!(record.description_short, "Applies tape and mud in one pass.");
        assert!(record.description_full.contains("55in tube"));
        assert_eq!(record.specifications["Weight"], "9 lb");
        assert_eq!(record.category, Some("Taping Tools".to_string()));
        assert_eq!(record.images.len(), 1);
        assert!(record.images[0].contains("/stencil/1280x1280/"));
    }

    #[test]
    fn test_extract_empty_page_never_fails() {
        let extractor = Extractor::new(Site::Als);
        let record = extractor.extract("", "https://x/p/");
        assert_eq!(record.name, "N/A");
        assert_eq!(record.price_text, "N/A");
        assert!(record.in_stock);
        assert!(record.images.is_empty());
    }
}
