//! Serialized text form of a dataset grid.
//!
//! A blob is comma separated, has no header line and no row index, and
//! carries no trailing newline. Reading it back treats the first line as
//! the header and infers one value kind per column.

use crate::error::ChartError;
use crate::table::grid::Grid;
use crate::table::record::RecordTable;
use crate::table::scalar::Scalar;
use crate::table::scalar::NA_VALUES;
use csv::ReaderBuilder;
use csv::Terminator;
use csv::WriterBuilder;
use serde::Serialize;
use std::fmt::Display;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BlobError {
    #[error("Dataset has no header line")]
    MissingHeader,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct TabularBlob(String);

impl TabularBlob {
    /// Serializes a grid row by row.
    pub fn from_grid(grid: &Grid) -> Result<Self, ChartError> {
        let mut writer = WriterBuilder::new()
            .has_headers(false)
            .flexible(true)
            .terminator(Terminator::Any(b'\n'))
            .from_writer(Vec::<u8>::new());
        for row in grid.rows() {
            writer.write_record(row.iter().map(Scalar::to_field))?;
        }
        let bytes = writer
            .into_inner()
            .map_err(|error| ChartError::IoError(error.into_error()))?;
        let text = String::from_utf8_lossy(&bytes);
        Ok(TabularBlob(text.trim().to_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Parses the blob into a record table using its first line as header.
    pub fn parse(&self) -> Result<RecordTable, ChartError> {
        let mut reader = ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(self.0.as_bytes());
        let mut lines = Vec::<Vec<String>>::new();
        for result in reader.records() {
            let record = result?;
            lines.push(record.iter().map(str::to_owned).collect());
        }

        let mut lines = lines.into_iter();
        let header: Vec<Scalar> = lines
            .next()
            .ok_or(BlobError::MissingHeader)?
            .into_iter()
            .map(|name| if name.is_empty() { Scalar::Null } else { Scalar::Text(name) })
            .collect();
        let width = header.len();
        let fields: Vec<Vec<String>> = lines
            .map(|mut line| {
                line.resize(width, String::new());
                line
            })
            .collect();

        let columns: Vec<Vec<Scalar>> = (0..width)
            .map(|col| infer_column(fields.iter().map(|line| line[col].as_str())))
            .collect();
        let rows = (0..fields.len())
            .map(|row| columns.iter().map(|column| column[row].clone()).collect())
            .collect();
        Ok(RecordTable::new(&header, rows))
    }
}

impl Display for TabularBlob {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TabularBlob {
    fn from(text: &str) -> Self {
        TabularBlob(text.to_owned())
    }
}

fn is_missing(field: &str) -> bool {
    NA_VALUES.contains(&field)
}

fn parse_bool(field: &str) -> Option<bool> {
    match field {
        "True" | "TRUE" | "true" => Some(true),
        "False" | "FALSE" | "false" => Some(false),
        _ => None,
    }
}

fn is_numeric(field: &str) -> bool {
    field.bytes().any(|b| b.is_ascii_digit()) && field.trim().parse::<f64>().is_ok()
}

/// Chooses one kind for a whole column: integers when every field is an
/// integer and none is missing, floats when every present field is numeric,
/// booleans when every present field is a boolean literal, text otherwise.
fn infer_column<'a>(fields: impl Iterator<Item = &'a str>) -> Vec<Scalar> {
    let fields: Vec<&str> = fields.collect();
    let present: Vec<&str> = fields.iter().copied().filter(|field| !is_missing(field)).collect();
    let has_missing = present.len() < fields.len();

    if present.is_empty() {
        vec![Scalar::Null; fields.len()]
    } else if !has_missing && present.iter().all(|field| field.trim().parse::<i64>().is_ok()) {
        fields
            .iter()
            .map(|field| field.trim().parse::<i64>().map(Scalar::Int).unwrap_or_default())
            .collect()
    } else if present.iter().all(|field| is_numeric(field)) {
        fields
            .iter()
            .map(|field| field.trim().parse::<f64>().map(Scalar::Float).unwrap_or_default())
            .collect()
    } else if present.iter().all(|field| parse_bool(field).is_some()) {
        fields
            .iter()
            .map(|field| parse_bool(field).map(Scalar::Bool).unwrap_or_default())
            .collect()
    } else {
        fields
            .iter()
            .map(|field| {
                if is_missing(field) {
                    Scalar::Null
                } else {
                    Scalar::Text((*field).to_owned())
                }
            })
            .collect()
    }
}
