//! Catalog file output: CSV with a fixed column set and a JSON array.

use crate::site::models::{ProductRecord, IMAGE_CAP};
use anyhow::{Context, Result};
use std::path::Path;
use tracing::info;

/// Fixed CSV column set. Images get one column per slot plus a pipe-joined
/// overflow column; specifications are embedded as a JSON string.
pub fn csv_header() -> String {
    let mut columns: Vec<String> = [
        "name",
        "sku",
        "upc",
        "mpn",
        "brand",
        "price",
        "price_numeric",
        "in_stock",
        "category",
        "description_short",
        "description_full",
        "url",
    ]
    .iter()
    .map(|c| c.to_string())
    .collect();

    for i in 1..=IMAGE_CAP {
        columns.push(format!("image_{}", i));
    }
    columns.push("all_images".to_string());
    columns.push("specifications".to_string());

    columns.join(",")
}

/// Renders records as a CSV document (header included).
pub fn csv_string(records: &[ProductRecord]) -> String {
    let mut lines = Vec::with_capacity(records.len() + 1);
    lines.push(csv_header());

    for record in records {
        let mut fields = vec![
            csv_escape(&record.name),
            csv_escape(record.sku.as_deref().unwrap_or("")),
            csv_escape(record.upc.as_deref().unwrap_or("")),
            csv_escape(record.mpn.as_deref().unwrap_or("")),
            csv_escape(record.brand.as_deref().unwrap_or("")),
            csv_escape(&record.price_text),
            record.price_numeric.map(|p| p.to_string()).unwrap_or_default(),
            record.in_stock.to_string(),
            csv_escape(record.category.as_deref().unwrap_or("")),
            csv_escape(&record.description_short),
            csv_escape(&record.description_full),
            csv_escape(&record.url),
        ];

        for i in 0..IMAGE_CAP {
            fields.push(csv_escape(record.images.get(i).map(String::as_str).unwrap_or("")));
        }
        fields.push(csv_escape(&record.images.join("|")));

        let specs = if record.specifications.is_empty() {
            String::new()
        } else {
            serde_json::to_string(&record.specifications).unwrap_or_default()
        };
        fields.push(csv_escape(&specs));

        lines.push(fields.join(","));
    }

    lines.join("\n")
}

/// Renders records as a pretty JSON array with naturally nested fields.
pub fn json_string(records: &[ProductRecord]) -> String {
    serde_json::to_string_pretty(records).unwrap_or_else(|_| "[]".to_string())
}

/// Writes both catalog files. An unwritable output path is fatal.
pub fn write_catalog(
    csv_path: &Path,
    json_path: &Path,
    records: &[ProductRecord],
) -> Result<()> {
    std::fs::write(csv_path, csv_string(records))
        .with_context(|| format!("Failed to write {}", csv_path.display()))?;
    std::fs::write(json_path, json_string(records))
        .with_context(|| format!("Failed to write {}", json_path.display()))?;

    info!(
        "Wrote {} records to {} and {}",
        records.len(),
        csv_path.display(),
        json_path.display()
    );
    Ok(())
}

fn csv_escape(s: &str) -> String {
    if s.contains(',') || s.contains('"') || s.contains('\n') {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}
