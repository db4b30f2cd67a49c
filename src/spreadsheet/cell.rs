use crate::error::ChartError;
use crate::spreadsheet::reference::index_to_reference;
use crate::spreadsheet::SpreadsheetError;
use crate::table::Scalar;
use chrono::NaiveDate;
use chrono::TimeDelta;
use iso8601_duration::Duration as IsoDuration;

/// Epoch a workbook counts serial dates from.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub(crate) enum DateSystem {
    #[default]
    V1900,
    V1904,
}

/// Types of cell data in spreadsheet files.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub(crate) enum CellType {
    #[default]
    Empty,
    Boolean,
    Number,
    /// Serial number formatted as date and time
    DateTime(DateSystem),
    /// Serial number formatted as a date only
    Date(DateSystem),
    /// Serial number formatted as a time of day
    Time,
    /// ISO 8601 date or date-time text
    IsoDateTime,
    /// ISO 8601 duration text, used by OpenDocument for times
    IsoDuration,
    Text,
    Error,
}

impl CellType {
    /// Maps a built-in OOXML number format id to a date/time type.
    pub(crate) fn from_builtin_format(id: &str, system: DateSystem) -> Option<Self> {
        match id {
            "22" => Some(Self::DateTime(system)),
            "14" | "15" | "16" | "17" => Some(Self::Date(system)),
            "18" | "19" | "20" | "21" | "45" | "46" | "47" => Some(Self::Time),
            _ => None,
        }
    }

    /// Classifies a custom number format code by the date and time tokens
    /// it contains, ignoring quoted literals, escapes, and bracketed sections.
    pub(crate) fn from_custom_format(format: &str, system: DateSystem) -> Self {
        let mut is_escaped = false;
        let mut is_literal = false;
        let mut is_bracket = false;
        let mut has_date = false;
        let mut has_time = false;
        for character in format.chars() {
            match character {
                _ if is_escaped => is_escaped = false,
                '_' | '\\' => is_escaped = true,
                '"' => is_literal = !is_literal,
                _ if is_literal => (),
                '[' => is_bracket = true,
                ']' => is_bracket = false,
                _ if is_bracket => (),
                'Y' | 'y' | 'D' | 'd' => has_date = true,
                'H' | 'h' | 'S' | 's' => has_time = true,
                _ => (),
            }
        }
        match (has_date, has_time) {
            (true, true) => Self::DateTime(system),
            (true, false) => Self::Date(system),
            (false, true) => Self::Time,
            (false, false) => Self::Number,
        }
    }
}

/// Represents a single cell in a spreadsheet with position, type, and raw value.
#[derive(Clone, Debug)]
pub(crate) struct Cell {
    pub(crate) row: usize,
    pub(crate) col: usize,
    pub(crate) kind: CellType,
    /// Value text exactly as stored in the workbook part
    pub(crate) value: String,
}

impl Cell {
    /// Returns the Excel-style cell reference (e.g., "A1", "B2").
    pub(crate) fn reference(&self) -> String {
        index_to_reference(self.row, self.col)
    }

    /// Converts the stored text into a typed value. Dates and times become
    /// ISO-like text; error cells become null.
    pub(crate) fn to_scalar(&self) -> Result<Scalar, ChartError> {
        let scalar = match self.kind {
            CellType::Empty | CellType::Error => Scalar::Null,
            CellType::Boolean => Scalar::Bool(self.value == "1" || self.value == "true"),
            CellType::Number => match self.value.parse::<i64>() {
                Ok(value) => Scalar::Int(value),
                Err(_) => Scalar::Float(self.number()?),
            },
            CellType::DateTime(system) => Scalar::Text(self.serial(|serial| to_datetime_string(serial, system))?),
            CellType::Date(system) => Scalar::Text(self.serial(|serial| to_date_string(serial, system))?),
            CellType::Time => Scalar::Text(self.serial(to_time_string)?),
            CellType::IsoDateTime => Scalar::Text(self.value.replace('T', " ")),
            CellType::IsoDuration => Scalar::Text(self.duration_string()?),
            CellType::Text => Scalar::Text(self.value.to_owned()),
        };
        Ok(scalar)
    }

    fn number(&self) -> Result<f64, ChartError> {
        self.value
            .trim()
            .parse::<f64>()
            .map_err(|_| self.value_error())
    }

    /// Formats a serial date or time; serials outside the calendar are errors.
    fn serial<F>(&self, format: F) -> Result<String, ChartError>
    where
        F: Fn(f64) -> Option<String>,
    {
        let serial = self.number()?;
        if !serial.is_finite() {
            return Err(self.value_error());
        }
        format(serial).ok_or_else(|| self.value_error())
    }

    fn duration_string(&self) -> Result<String, ChartError> {
        let duration = self
            .value
            .parse::<IsoDuration>()
            .map_err(|_| self.value_error())?;
        let seconds = (duration.day * 86_400.0
            + duration.hour * 3_600.0
            + duration.minute * 60.0
            + duration.second) as f64;
        to_time_string(seconds / 86_400.0).ok_or_else(|| self.value_error())
    }

    fn value_error(&self) -> ChartError {
        SpreadsheetError::CellValueError(self.reference(), self.value.to_owned()).into()
    }
}

/// Formats the whole-day part of a serial number as `YYYY-MM-DD`.
/// Serial 60 in the 1900 system is the phantom 1900-02-29; earlier serials shift by one day.
fn to_date(serial: f64, system: DateSystem) -> Option<NaiveDate> {
    let days = serial.trunc() as i64;
    let offset = match system {
        DateSystem::V1904 => days.checked_add(1_462)?,
        DateSystem::V1900 if days < 60 => days + 1,
        DateSystem::V1900 => days,
    };
    NaiveDate::from_ymd_opt(1899, 12, 30)?.checked_add_signed(TimeDelta::try_days(offset)?)
}

fn to_date_string(serial: f64, system: DateSystem) -> Option<String> {
    Some(to_date(serial, system)?.format("%Y-%m-%d").to_string())
}

/// Formats the fractional-day part of a serial number as `HH:MM:SS[.mmm]`.
fn to_time_string(serial: f64) -> Option<String> {
    let mut milliseconds = (serial.fract() * 86_400_000f64).round() as i64;
    if serial >= 1.0 {
        milliseconds = (serial.trunc() as i64)
            .checked_mul(86_400_000)?
            .checked_add(milliseconds)?;
    }
    let millis = milliseconds % 1_000;
    let seconds = milliseconds / 1_000 % 60;
    let minutes = milliseconds / 60_000 % 60;
    let hours = milliseconds / 3_600_000;
    if millis > 0 {
        Some(format!("{hours:02}:{minutes:02}:{seconds:02}.{millis:03}"))
    } else {
        Some(format!("{hours:02}:{minutes:02}:{seconds:02}"))
    }
}

fn to_datetime_string(serial: f64, system: DateSystem) -> Option<String> {
    let milliseconds = (serial.fract() * 86_400_000f64).round() as i64;
    let datetime = to_date(serial, system)?
        .and_hms_opt(0, 0, 0)?
        .checked_add_signed(TimeDelta::try_milliseconds(milliseconds)?)?;
    if milliseconds % 1_000 > 0 {
        Some(datetime.format("%Y-%m-%d %H:%M:%S%.3f").to_string())
    } else {
        Some(datetime.format("%Y-%m-%d %H:%M:%S").to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cell(kind: CellType, value: &str) -> Cell {
        Cell {
            row: 0,
            col: 0,
            kind,
            value: value.to_owned(),
        }
    }

    #[test]
    fn custom_formats() {
        let system = DateSystem::V1900;
        assert_eq!(CellType::from_custom_format("yyyy-mm-dd", system), CellType::Date(system));
        assert_eq!(CellType::from_custom_format("hh:mm:ss", system), CellType::Time);
        assert_eq!(CellType::from_custom_format("d/m/yy h:mm", system), CellType::DateTime(system));
        assert_eq!(CellType::from_custom_format("0.00\" days\"", system), CellType::Number);
        assert_eq!(CellType::from_custom_format("[Red]0.00", system), CellType::Number);
        assert_eq!(CellType::from_custom_format("General", system), CellType::Number);
    }

    #[test]
    fn numbers_keep_integers_integral() {
        assert_eq!(cell(CellType::Number, "42").to_scalar().unwrap(), Scalar::Int(42));
        assert_eq!(cell(CellType::Number, "0.25").to_scalar().unwrap(), Scalar::Float(0.25));
        assert!(cell(CellType::Number, "abc").to_scalar().is_err());
    }

    #[test]
    fn serial_dates() {
        let system = DateSystem::V1900;
        assert_eq!(
            cell(CellType::Date(system), "45292").to_scalar().unwrap(),
            Scalar::from("2024-01-01")
        );
        assert_eq!(
            cell(CellType::DateTime(system), "45292.5").to_scalar().unwrap(),
            Scalar::from("2024-01-01 12:00:00")
        );
        assert_eq!(
            cell(CellType::Date(DateSystem::V1904), "0").to_scalar().unwrap(),
            Scalar::from("1904-01-01")
        );
        assert_eq!(cell(CellType::Time, "0.75").to_scalar().unwrap(), Scalar::from("18:00:00"));
    }

    #[test]
    fn serials_outside_the_calendar_are_errors() {
        let system = DateSystem::V1900;
        for value in ["1e20", "-1e20", "inf", "NaN"] {
            assert!(cell(CellType::Date(system), value).to_scalar().is_err(), "{value}");
            assert!(cell(CellType::DateTime(DateSystem::V1904), value).to_scalar().is_err(), "{value}");
        }
        let error = cell(CellType::Time, "1e15").to_scalar().unwrap_err().to_string();
        assert!(error.contains("A1") && error.contains("1e15"), "{error}");
    }

    #[test]
    fn iso_values() {
        assert_eq!(
            cell(CellType::IsoDateTime, "2024-03-01T08:30:00").to_scalar().unwrap(),
            Scalar::from("2024-03-01 08:30:00")
        );
        assert_eq!(
            cell(CellType::IsoDuration, "PT12H30M00S").to_scalar().unwrap(),
            Scalar::from("12:30:00")
        );
    }

    #[test]
    fn booleans_and_errors() {
        assert_eq!(cell(CellType::Boolean, "1").to_scalar().unwrap(), Scalar::Bool(true));
        assert_eq!(cell(CellType::Boolean, "0").to_scalar().unwrap(), Scalar::Bool(false));
        assert_eq!(cell(CellType::Error, "#N/A").to_scalar().unwrap(), Scalar::Null);
    }
}
