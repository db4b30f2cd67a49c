use crate::error::ChartError;
use crate::error::ResultMessage;
use crate::extract::ExtractError;
use crate::spreadsheet::criteria::Criteria;
use crate::spreadsheet::open_spreadsheet;
use crate::spreadsheet::sheet::Sheet;
use crate::table::Record;
use crate::table::RecordTable;
use crate::table::Scalar;
use std::path::Path;
use tracing::info;
use tracing::warn;

/// Field naming the sheet a metadata record came from.
pub const MODULE_FIELD: &str = "module";

/// Physical row holding the column names; the row above it is a banner.
const HEADER_ROW: usize = 1;

/// Reads the metadata records of every sheet whose name starts with `module`.
///
/// Records keep sheet order then row order. Sheets that fail are reported and
/// skipped; if none can be read the extraction fails.
pub fn extract_metadata(path: &Path) -> Result<Vec<Record>, ChartError> {
    let mut spreadsheet = open_spreadsheet(path).with_prefix(&path.display().to_string())?;
    let criteria = Criteria::name_prefix(MODULE_FIELD)?;
    let mut records = Vec::new();
    let mut sheet_count = 0usize;
    for sheet_name in spreadsheet.select_sheets(&criteria) {
        let table = spreadsheet
            .read_sheet(&sheet_name)
            .and_then(|sheet| metadata_table(&sheet))
            .with_prefix(&sheet_name);
        match table {
            Ok(table) => {
                info!("Read {} metadata rows from sheet '{}'", table.len(), sheet_name);
                sheet_count += 1;
                records.extend(table.records().map(|mut record| {
                    record.insert(MODULE_FIELD, Scalar::Text(sheet_name.to_owned()));
                    record
                }));
            }
            Err(error) => warn!("Error reading sheet '{}': {}", sheet_name, error),
        }
    }
    if sheet_count == 0 {
        Err(ExtractError::NoMetadataSheets(path.display().to_string()))?
    }
    Ok(records)
}

/// Interprets a sheet as banner row, header row, then data rows.
/// Fully empty data rows are dropped.
pub(crate) fn metadata_table(sheet: &Sheet) -> Result<RecordTable, ChartError> {
    let rows = sheet.physical_rows()?;
    if rows.last_key_value().map(|(&row, _)| row < HEADER_ROW).unwrap_or(true) {
        Err(ExtractError::MissingHeader)?
    }
    let width = rows.values().map(Vec::len).max().unwrap_or(0);
    let header = rows
        .get(&HEADER_ROW)
        .cloned()
        .unwrap_or_else(|| vec![Scalar::Null; width]);
    let data = rows
        .range(HEADER_ROW + 1..)
        .map(|(_, row)| row)
        .filter(|row| !row.iter().all(Scalar::is_null))
        .cloned()
        .collect();
    Ok(RecordTable::new(&header, data))
}
