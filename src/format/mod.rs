//! Display formatting for product records (table, JSON, markdown, CSV).

use crate::config::OutputFormat;
use crate::output;
use crate::site::models::ProductRecord;

/// Formats records for terminal output.
pub struct Formatter {
    format: OutputFormat,
}

impl Formatter {
    /// Creates a new formatter.
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Formats a single record.
    pub fn format_record(&self, record: &ProductRecord) -> String {
        match self.format {
            OutputFormat::Json => {
                serde_json::to_string_pretty(record).unwrap_or_else(|_| "{}".to_string())
            }
            OutputFormat::Table => self.table_single(record),
            OutputFormat::Markdown => self.markdown_single(record),
            OutputFormat::Csv => output::csv_string(std::slice::from_ref(record)),
        }
    }

    /// Formats multiple records.
    pub fn format_records(&self, records: &[ProductRecord]) -> String {
        if records.is_empty() {
            return match self.format {
                OutputFormat::Json => "[]".to_string(),
                OutputFormat::Csv => output::csv_header(),
                _ => "No products found.".to_string(),
            };
        }

        match self.format {
            OutputFormat::Json => output::json_string(records),
            OutputFormat::Table => self.table_records(records),
            OutputFormat::Markdown => self.markdown_records(records),
            OutputFormat::Csv => output::csv_string(records),
        }
    }

    // Table formatting

    fn table_single(&self, record: &ProductRecord) -> String {
        let mut lines = Vec::new();

        lines.push(format!("Name:     {}", record.name));
        lines.push(format!("URL:      {}", record.url));

        if let Some(sku) = &record.sku {
            lines.push(format!("SKU:      {}", sku));
        }
        if let Some(upc) = &record.upc {
            lines.push(format!("UPC:      {}", upc));
        }
        if let Some(mpn) = &record.mpn {
            lines.push(format!("MPN:      {}", mpn));
        }
        if let Some(brand) = &record.brand {
            lines.push(format!("Brand:    {}", brand));
        }

        lines.push(format!("Price:    {}", record.price_text));
        lines.push(format!(
            "Stock:    {}",
            if record.in_stock { "In Stock" } else { "Out of Stock" }
        ));

        if let Some(category) = &record.category {
            lines.push(format!("Category: {}", category));
        }
        if !record.description_short.is_empty() {
            lines.push(format!("About:    {}", record.description_short));
        }
        if !record.images.is_empty() {
            lines.push(format!("Images:   {}", record.images.len()));
        }
        if !record.specifications.is_empty() {
            lines.push("Specs:".to_string());
            for (key, value) in &record.specifications {
                lines.push(format!("  {}: {}", key, value));
            }
        }

        lines.join("\n")
    }

    fn table_records(&self, records: &[ProductRecord]) -> String {
        let sku_width = 14;
        let price_width = 12;
        let stock_width = 5;
        let name_width = 50;

        let mut lines = Vec::new();

        lines.push(format!(
            "{:<sku_width$}  {:<price_width$}  {:<stock_width$}  {}",
            "SKU", "Price", "Stock", "Name"
        ));
        lines.push(format!(
            "{:-<sku_width$}  {:-<price_width$}  {:-<stock_width$}  {:-<name_width$}",
            "", "", "", ""
        ));

        for record in records {
            let sku = record.sku.as_deref().unwrap_or("-");
            let stock = if record.in_stock { "Yes" } else { "No" };
            let name = if record.name.len() > name_width {
                format!("{}...", &record.name[..name_width - 3])
            } else {
                record.name.clone()
            };

            lines.push(format!(
                "{:<sku_width$}  {:>price_width$}  {:<stock_width$}  {}",
                sku, record.price_text, stock, name
            ));
        }

        lines.push(String::new());
        lines.push(format!("Total: {} products", records.len()));

        lines.join("\n")
    }

    // Markdown formatting

    fn markdown_single(&self, record: &ProductRecord) -> String {
        let mut lines = Vec::new();

        lines.push(format!("## {}", record.name));
        lines.push(String::new());
        lines.push(format!("- **URL:** {}", record.url));

        if let Some(sku) = &record.sku {
            lines.push(format!("- **SKU:** {}", sku));
        }
        if let Some(brand) = &record.brand {
            lines.push(format!("- **Brand:** {}", brand));
        }

        lines.push(format!("- **Price:** {}", record.price_text));
        lines.push(format!(
            "- **Stock:** {}",
            if record.in_stock { "In Stock" } else { "Out of Stock" }
        ));

        if !record.description_short.is_empty() {
            lines.push(String::new());
            lines.push(record.description_short.clone());
        }

        lines.join("\n")
    }

    fn markdown_records(&self, records: &[ProductRecord]) -> String {
        let mut lines = Vec::new();

        lines.push("| SKU | Price | Stock | Name |".to_string());
        lines.push("|-----|-------|-------|------|".to_string());

        for record in records {
            let sku = record.sku.as_deref().unwrap_or("-");
            let stock = if record.in_stock { "✓" } else { "" };
            let name = if record.name.len() > 40 {
                format!("{}...", &record.name[..37])
            } else {
                record.name.clone()
            };

            lines.push(format!(
                "| {} | {} | {} | [{}]({}) |",
                sku, record.price_text, stock, name, record.url
            ));
        }

        lines.push(String::new());
        lines.push(format!("*{} products found*", records.len()));

        lines.join("\n")
    }
}
