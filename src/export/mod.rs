//! CSV export of the product list.
//!
//! The output is `;`-delimited UTF-8 with a BOM prefix. Numeric prices use a
//! comma decimal separator and are emitted raw; text fields are quoted (with
//! doubled quotes) whenever they contain a delimiter, comma, quote or line
//! break.

use std::path::Path;

use chrono::Utc;
use thiserror::Error;

use crate::api::models::PriceField;
use crate::catalog::record::ProductRecord;

/// Byte-order mark prepended to the encoded document.
pub const BOM: &str = "\u{feff}";

/// Fixed column order of the export.
pub const CSV_HEADER: &str =
    "name;brand;pharmacy;price;original_price;discount_percentage;has_discount;position;description;product_url";

/// Failures surfaced by the export path.
#[derive(Debug, Error)]
pub enum ExportError {
    /// Refused: the current view has nothing to export.
    #[error("no records to export")]
    NoRecords,
    /// Writing the output file failed.
    #[error("failed to write export file: {0}")]
    Io(#[from] std::io::Error),
}

/// Default timestamped filename, e.g.
/// `produtos_medicamentos_2025-06-01_14-30-00.csv`.
pub fn default_filename() -> String {
    format!("produtos_medicamentos_{}.csv", Utc::now().format("%Y-%m-%d_%H-%M-%S"))
}

/// One `;`-joined line per record, in input order, without header or BOM.
pub fn csv_rows(records: &[ProductRecord]) -> Vec<String> {
    records.iter().map(csv_row).collect()
}

/// Full CSV document: BOM, header, one line per record. Exporting zero
/// records is an error, not an empty file.
pub fn csv_string(records: &[ProductRecord]) -> Result<String, ExportError> {
    if records.is_empty() {
        return Err(ExportError::NoRecords);
    }
    let mut out = String::from(BOM);
    out.push_str(CSV_HEADER);
    for row in csv_rows(records) {
        out.push('\n');
        out.push_str(&row);
    }
    out.push('\n');
    Ok(out)
}

/// Writes the CSV document to `path`.
pub fn write_csv(records: &[ProductRecord], path: &Path) -> Result<(), ExportError> {
    let document = csv_string(records)?;
    std::fs::write(path, document)?;
    Ok(())
}

fn csv_row(record: &ProductRecord) -> String {
    [
        csv_escape(&record.name),
        csv_escape(&record.brand),
        csv_escape(&record.pharmacy),
        price_cell(&record.price),
        record.original_price.as_ref().map(price_cell).unwrap_or_default(),
        record.discount_percent().map(|d| d.to_string()).unwrap_or_default(),
        record.has_discount.to_string(),
        record.position.map(|p| p.to_string()).unwrap_or_default(),
        record.description.as_deref().map(csv_escape).unwrap_or_default(),
        record.product_url.as_deref().map(csv_escape).unwrap_or_default(),
    ]
    .join(";")
}

/// Numeric prices become unquoted comma-decimal cells (`12,49`); text prices
/// go through the usual escaping.
fn price_cell(price: &PriceField) -> String {
    match price {
        PriceField::Amount(v) => format!("{v:.2}").replace('.', ","),
        PriceField::Text(text) => csv_escape(text),
    }
}

fn csv_escape(s: &str) -> String {
    if s.contains(';')
        || s.contains(',')
        || s.contains('"')
        || s.contains('\n')
        || s.contains('\r')
    {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_record(name: &str, price: PriceField) -> ProductRecord {
        ProductRecord {
            name: name.to_string(),
            brand: "Neo Química".to_string(),
            pharmacy: "Droga Raia".to_string(),
            price,
            original_price: None,
            has_discount: false,
            discount_percentage: None,
            position: Some(1),
            description: None,
            product_url: None,
        }
    }

    #[test]
    fn test_csv_header_columns() {
        assert_eq!(CSV_HEADER.split(';').count(), 10);
        assert!(CSV_HEADER.starts_with("name;brand;pharmacy;price"));
    }

    #[test]
    fn test_csv_row_fixed_order() {
        let mut record = make_record("Dipirona 500mg", PriceField::Amount(12.49));
        record.original_price = Some(PriceField::Amount(15.99));
        record.discount_percentage = Some(22);
        record.has_discount = true;
        record.description = Some("Analgésico".to_string());
        record.product_url = Some("https://example.com/dipirona".to_string());

        let rows = csv_rows(std::slice::from_ref(&record));
        assert_eq!(
            rows[0],
            "Dipirona 500mg;Neo Química;Droga Raia;12,49;15,99;22;true;1;Analgésico;https://example.com/dipirona"
        );
    }

    #[test]
    fn test_csv_comma_description_quoted_others_raw() {
        let mut record = make_record("Dipirona 500mg", PriceField::Amount(12.49));
        record.description = Some("Analgésico, antitérmico".to_string());

        let row = &csv_rows(std::slice::from_ref(&record))[0];
        assert!(row.contains("\"Analgésico, antitérmico\""));
        // The comma-decimal price stays unquoted.
        assert!(row.contains(";12,49;"));
        assert!(row.starts_with("Dipirona 500mg;"));
    }

    #[test]
    fn test_csv_quotes_doubled() {
        let record = make_record("Xarope \"Forte\" 100ml", PriceField::Amount(9.9));
        let row = &csv_rows(std::slice::from_ref(&record))[0];
        assert!(row.starts_with("\"Xarope \"\"Forte\"\" 100ml\";"));
    }

    #[test]
    fn test_csv_semicolon_in_field_quoted() {
        let record = make_record("Kit; 2 unidades", PriceField::Amount(20.0));
        let row = &csv_rows(std::slice::from_ref(&record))[0];
        assert!(row.starts_with("\"Kit; 2 unidades\";"));
    }

    #[test]
    fn test_csv_text_price_passthrough() {
        let record =
            make_record("Dipirona", PriceField::Text("Preço não disponível".to_string()));
        let row = &csv_rows(std::slice::from_ref(&record))[0];
        assert!(row.contains(";Preço não disponível;"));
    }

    #[test]
    fn test_csv_missing_optionals_are_empty_cells() {
        let mut record = make_record("Dipirona", PriceField::Amount(5.0));
        record.position = None;
        let row = &csv_rows(std::slice::from_ref(&record))[0];
        // original_price and discount empty, then has_discount, then empty
        // position, description, url.
        assert!(row.ends_with(";5,00;;;false;;;"));
    }

    #[test]
    fn test_csv_string_has_bom_and_header() {
        let records = vec![make_record("Dipirona", PriceField::Amount(5.0))];
        let document = csv_string(&records).unwrap();

        assert!(document.starts_with(BOM));
        let body = document.strip_prefix(BOM).unwrap();
        assert!(body.starts_with(CSV_HEADER));
        assert_eq!(document.lines().count(), 2);
    }

    #[test]
    fn test_csv_string_refuses_empty() {
        let err = csv_string(&[]).unwrap_err();
        assert!(matches!(err, ExportError::NoRecords));
        assert_eq!(err.to_string(), "no records to export");
    }

    #[test]
    fn test_write_csv_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("export.csv");
        let records = vec![make_record("Dipirona", PriceField::Amount(5.0))];

        write_csv(&records, &path).unwrap();

        let bytes = std::fs::read(&path).unwrap();
        assert_eq!(&bytes[..3], &[0xEF, 0xBB, 0xBF]);
        let content = String::from_utf8(bytes).unwrap();
        assert!(content.contains("Dipirona"));
    }

    #[test]
    fn test_write_csv_empty_produces_no_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("export.csv");

        assert!(write_csv(&[], &path).is_err());
        assert!(!path.exists());
    }

    #[test]
    fn test_default_filename_shape() {
        let name = default_filename();
        assert!(name.starts_with("produtos_medicamentos_"));
        assert!(name.ends_with(".csv"));
        assert_eq!(name.len(), "produtos_medicamentos_YYYY-MM-DD_HH-MM-SS.csv".len());
    }
}
