use crate::error::ChartError;
use crate::helpers::xml::XmlNodeHelper;
use crate::helpers::xml::XmlTextContextHelper;
use crate::helpers::zip::ZipHelper;
use crate::match_xml_events;
use crate::spreadsheet::cell::Cell;
use crate::spreadsheet::cell::CellType;
use crate::spreadsheet::sheet::Sheet;
use crate::spreadsheet::Spreadsheet;
use crate::spreadsheet::SpreadsheetError;
use quick_xml::events::Event;
use quick_xml::name::QName;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use thiserror::Error;
use zip::ZipArchive;

const MIME_TYPE: &[u8] = b"application/vnd.oasis.opendocument.spreadsheet";
const CONTENT: &str = "content.xml";
const MANIFEST: &str = "META-INF/manifest.xml";

const TABLE: QName = QName(b"table:table");
const TABLE_ROW: QName = QName(b"table:table-row");
const TABLE_CELL: QName = QName(b"table:table-cell");
const TABLE_COVERED_CELL: QName = QName(b"table:covered-table-cell");
const ANNOTATION: QName = QName(b"office:annotation");
const PARAGRAPH: QName = QName(b"text:p");
const SPACES: QName = QName(b"text:s");
const FILE_ENTRY: QName = QName(b"manifest:file-entry");
const ENCRYPTION_DATA: QName = QName(b"manifest:encryption-data");

#[derive(Error, Debug)]
pub enum OdsError {
    #[error("Invalid ODS MIME type")]
    MimeTypeError,

    #[error("'{0}' is password protected")]
    PasswordProtected(String),
}

/// An OpenDocument spreadsheet (`.ods`).
pub(crate) struct OdsSpreadsheet {
    pub(crate) name: String,
    zip: ZipArchive<BufReader<File>>,
    sheet_names: Vec<String>,
}

impl OdsSpreadsheet {
    pub(crate) fn open(path: &Path) -> Result<Self, ChartError> {
        let name = path.to_string_lossy().to_string();
        let file = File::open(path)?;
        let mut zip = ZipArchive::new(BufReader::new(file))?;
        check_mime(&mut zip)?;
        if is_password_protected(&mut zip)? {
            Err(OdsError::PasswordProtected(name.to_owned()))?;
        }
        let sheet_names = load_sheet_names(&mut zip)?;
        if sheet_names.is_empty() {
            Err(SpreadsheetError::SpreadsheetEmptyError(name.to_owned()))?
        }
        Ok(OdsSpreadsheet {
            name,
            zip,
            sheet_names,
        })
    }
}

impl Spreadsheet for OdsSpreadsheet {
    fn name(&self) -> String {
        self.name.to_owned()
    }

    fn sheet_names(&self) -> Vec<String> {
        self.sheet_names.to_owned()
    }

    fn read_sheet(&mut self, sheet_name: &str) -> Result<Sheet, ChartError> {
        if !self.sheet_names.iter().any(|name| name == sheet_name) {
            Err(SpreadsheetError::SheetNotFound(self.name.to_owned(), sheet_name.to_owned()))?
        }
        let mut reader = self
            .zip
            .xml_reader(CONTENT)?
            .ok_or_else(|| SpreadsheetError::FileError(CONTENT.to_owned()))?;

        let mut found = false;
        match_xml_events!(reader => {
            Event::Start(event) if event.name() == TABLE => {
                if event.get_attribute_value("table:name")?.as_deref() == Some(sheet_name) {
                    found = true;
                    break;
                }
            }
        });
        let mut sheet = Sheet::new(&self.name, sheet_name);
        if !found {
            return Ok(sheet);
        }

        let mut row = 0usize;
        let mut col = 0usize;
        let mut row_count = 1usize;
        let mut col_count = 1usize;
        let mut kind = CellType::default();
        let mut value = String::new();
        let mut text_context = false;
        let mut annotation_context = false;
        match_xml_events!(reader => {
            Event::End(event) if event.name() == TABLE => break,
            Event::Start(event) if event.name() == TABLE_ROW => {
                row_count = event.parse_attribute_value("table:number-rows-repeated")?.unwrap_or(1);
                col = 0;
            }
            Event::End(event) if event.name() == TABLE_ROW => row += row_count,
            Event::Start(event) if event.name() == TABLE_CELL || event.name() == TABLE_COVERED_CELL => {
                value.clear();
                text_context = false;
                col_count = event.parse_attribute_value("table:number-columns-repeated")?.unwrap_or(1);
                let value_type = event.get_attribute_value("office:value-type")?;
                kind = match value_type.as_deref() {
                    Some("boolean") => CellType::Boolean,
                    Some("date") => CellType::IsoDateTime,
                    Some("time") => CellType::IsoDuration,
                    Some("string") => {
                        let is_error = event
                            .get_attribute_value("calcext:value-type")?
                            .map(|value| value == "error")
                            .unwrap_or(false);
                        if is_error { CellType::Error } else { CellType::Text }
                    }
                    Some(_) => CellType::Number,
                    None => CellType::Empty,
                };
                let attribute = match kind {
                    CellType::Boolean => Some("office:boolean-value"),
                    CellType::IsoDateTime => Some("office:date-value"),
                    CellType::IsoDuration => Some("office:time-value"),
                    CellType::Number => Some("office:value"),
                    _ => None,
                };
                match attribute {
                    Some(attribute) => {
                        if let Some(data) = event.get_attribute_value(attribute)? {
                            value.push_str(&data);
                        }
                    }
                    None => text_context = kind == CellType::Text,
                }
            }
            Event::End(event) if event.name() == TABLE_CELL || event.name() == TABLE_COVERED_CELL => {
                if kind != CellType::Empty && !value.is_empty() {
                    for row_offset in 0..row_count {
                        for col_offset in 0..col_count {
                            sheet.push(Cell {
                                row: row + row_offset,
                                col: col + col_offset,
                                kind,
                                value: value.to_owned(),
                            });
                        }
                    }
                }
                col += col_count;
                text_context = false;
                annotation_context = false;
            }
            Event::Start(event) if text_context && event.name() == ANNOTATION => annotation_context = true,
            Event::End(event) if text_context && event.name() == ANNOTATION => annotation_context = false,
            Event::Start(event) if text_context && !annotation_context && event.name() == PARAGRAPH => {
                if !value.is_empty() {
                    value.push('\n');
                }
            }
            Event::Start(event) if text_context && !annotation_context && event.name() == SPACES => {
                let count = event.parse_attribute_value("text:c")?.unwrap_or(1usize);
                value.push_str(&" ".repeat(count));
            }
            Event::Text(event) if text_context && !annotation_context => value.push_bytes_text(&event)?,
            Event::GeneralRef(event) if text_context && !annotation_context => value.push_bytes_ref(&event)?,
        });
        Ok(sheet)
    }
}

fn check_mime(zip: &mut ZipArchive<BufReader<File>>) -> Result<(), ChartError> {
    if let Some(bytes) = zip.read_bytes("mimetype")? {
        if bytes.trim_ascii() != MIME_TYPE {
            Err(OdsError::MimeTypeError)?;
        }
    }
    Ok(())
}

fn is_password_protected(zip: &mut ZipArchive<BufReader<File>>) -> Result<bool, ChartError> {
    let mut reader = match zip.xml_reader(MANIFEST)? {
        Some(reader) => reader,
        None => return Ok(false),
    };
    let mut file_entry_context = false;
    match_xml_events!(reader => {
        Event::Start(event) if event.name() == FILE_ENTRY => file_entry_context = true,
        Event::End(event) if event.name() == FILE_ENTRY => file_entry_context = false,
        Event::Start(event) if file_entry_context && event.name() == ENCRYPTION_DATA => return Ok(true),
    });
    Ok(false)
}

fn load_sheet_names(zip: &mut ZipArchive<BufReader<File>>) -> Result<Vec<String>, ChartError> {
    let mut reader = zip
        .xml_reader(CONTENT)?
        .ok_or_else(|| SpreadsheetError::FileError(CONTENT.to_owned()))?;
    let mut names = Vec::new();
    match_xml_events!(reader => {
        Event::Start(event) if event.name() == TABLE => {
            names.push(event.require_attribute_value("table:name")?.to_string());
        }
    });
    Ok(names)
}
