//! Read a worksheet from CSV text.
//!
//! Spreadsheet tools export one sheet per CSV. Every row, including the header,
//! is kept as raw cells; numeric interpretation is left to coercion.

use std::io::Read;

use crate::domain::{Cell, Sheet};
use crate::error::{IngestError, IngestResult};

/// Parse CSV content into a named `Sheet`.
pub fn sheet_from_csv<R: Read>(name: &str, reader: R) -> IngestResult<Sheet> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut rows = Vec::new();
    for result in reader.records() {
        let record = result.map_err(|e| IngestError::Csv {
            sheet: name.to_string(),
            message: e.to_string(),
        })?;

        let cells: Vec<Cell> = record
            .iter()
            .enumerate()
            .map(|(idx, field)| {
                // Excel's UTF-8 CSV export puts a BOM in front of the first cell.
                let field = if rows.is_empty() && idx == 0 {
                    field.trim_start_matches('\u{feff}')
                } else {
                    field
                };
                Cell::from(field)
            })
            .collect();
        rows.push(cells);
    }

    Ok(Sheet::new(name, rows))
}
