//! # Spreadsheet Reading
//!
//! Reads Office Open XML (`.xlsx`, `.xlsm`, `.xlam`) and OpenDocument (`.ods`)
//! workbooks into per-sheet cell collections. Both formats are zip packages of
//! XML parts and are parsed as event streams.
pub(crate) mod cell;
pub mod criteria;
pub(crate) mod excel;
pub(crate) mod ods;
pub(crate) mod reference;
pub mod sheet;
pub(crate) mod xlsx;

use crate::error::ChartError;
use crate::error::ResultMessage;
use crate::spreadsheet::criteria::Criteria;
use crate::spreadsheet::ods::OdsSpreadsheet;
use crate::spreadsheet::sheet::Sheet;
use crate::spreadsheet::xlsx::XlsxSpreadsheet;
use crate::table::Grid;
use std::ffi::OsStr;
use std::path::Path;
use thiserror::Error;

pub use ods::OdsError;

/// Extensions `open_spreadsheet` understands, lowercase.
pub const SUPPORTED_EXTENSIONS: [&str; 4] = ["xlsx", "xlsm", "xlam", "ods"];

#[derive(Error, Debug)]
pub enum SpreadsheetError {
    #[error("Missing '{0}' in workbook package")]
    FileError(String),

    #[error("Workbook '{0}' has no sheets")]
    SpreadsheetEmptyError(String),

    #[error("Cannot detect file format for '{0}'")]
    InvalidFileFormat(String),

    #[error("Sheet '{1}' not found in '{0}'")]
    SheetNotFound(String, String),

    #[error("Invalid cell value at {0}: '{1}'")]
    CellValueError(String, String),
}

/// A workbook opened for reading.
pub trait Spreadsheet {
    /// Returns the file name of this spreadsheet.
    fn name(&self) -> String;

    /// Sheet names in workbook order.
    fn sheet_names(&self) -> Vec<String>;

    /// Reads all cells of one sheet.
    fn read_sheet(&mut self, sheet_name: &str) -> Result<Sheet, ChartError>;

    /// Names of the sheets accepted by `criteria`, in workbook order.
    fn select_sheets(&self, criteria: &Criteria) -> Vec<String> {
        self.sheet_names()
            .into_iter()
            .filter(|name| criteria.accept(name))
            .collect()
    }
}

/// Opens a workbook, choosing the reader by file extension.
pub fn open_spreadsheet<P: AsRef<Path>>(path: P) -> Result<Box<dyn Spreadsheet>, ChartError> {
    let path = path.as_ref();
    let file_name = path.to_string_lossy().to_string();
    let extension = path
        .extension()
        .and_then(OsStr::to_str)
        .map(str::to_ascii_lowercase);
    let spreadsheet: Box<dyn Spreadsheet> = match extension.as_deref() {
        Some("xlsx") | Some("xlsm") | Some("xlam") => Box::new(XlsxSpreadsheet::open(path)?),
        Some("ods") => Box::new(OdsSpreadsheet::open(path)?),
        _ => Err(SpreadsheetError::InvalidFileFormat(file_name.to_owned()))?,
    };
    Ok(spreadsheet)
}

/// Returns true if the path carries a workbook extension this crate reads.
pub fn is_supported<P: AsRef<Path>>(path: P) -> bool {
    path.as_ref()
        .extension()
        .and_then(OsStr::to_str)
        .map(|extension| SUPPORTED_EXTENSIONS.contains(&extension.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

/// Loads one sheet of an open workbook as a compacted grid.
pub fn load_grid(spreadsheet: &mut dyn Spreadsheet, sheet_name: &str) -> Result<Grid, ChartError> {
    let prefix = format!("{} [{}]", spreadsheet.name(), sheet_name);
    spreadsheet
        .read_sheet(sheet_name)
        .and_then(|sheet| sheet.grid())
        .with_prefix(&prefix)
}
