//! Office Open XML package helpers
use crate::error::ChartError;
use crate::helpers::xml::XmlNodeHelper;
use crate::helpers::zip::ZipHelper;
use crate::match_xml_events;
use crate::spreadsheet::cell::CellType;
use crate::spreadsheet::cell::DateSystem;
use crate::spreadsheet::SpreadsheetError;
use quick_xml::events::Event;
use std::collections::HashMap;
use std::io::Read;
use std::io::Seek;
use zip::ZipArchive;

const TAG_RELATIONSHIP: &[u8] = b"Relationship";

/// Loads worksheet relationships: relationship id to part path.
pub(super) fn load_relationships<RS: Read + Seek>(
    zip: &mut ZipArchive<RS>,
    path: &str,
) -> Result<HashMap<String, String>, ChartError> {
    let mut reader = zip
        .xml_reader(path)?
        .ok_or_else(|| SpreadsheetError::FileError(path.to_string()))?;
    let mut relationships = HashMap::<String, String>::new();
    match_xml_events!(reader => {
        Event::Start(event) if event.local_name().as_ref() == TAG_RELATIONSHIP => {
            let id = event.get_attribute_value("Id")?;
            let kind = event.get_attribute_value("Type")?;
            let target = event.get_attribute_value("Target")?;
            if kind.map(|it| it.ends_with("/worksheet")).unwrap_or(true) {
                if let Some((id, target)) = id.zip(target) {
                    relationships.insert(id.to_string(), to_zip_path(&target));
                }
            }
        }
    });
    Ok(relationships)
}

/// Resolves each cell style (`cellXfs` entry) to the type its number format implies.
pub(super) fn resolve_number_formats(
    format_indexes: &[String],
    custom_formats: &HashMap<String, String>,
    system: DateSystem,
) -> Vec<CellType> {
    format_indexes
        .iter()
        .map(|id| match custom_formats.get(id) {
            Some(code) => CellType::from_custom_format(code, system),
            None => CellType::from_builtin_format(id, system).unwrap_or(CellType::Number),
        })
        .collect()
}

/// Normalizes a relationship target to a path inside the package.
pub(crate) fn to_zip_path(path: &str) -> String {
    if let Some(stripped) = path.strip_prefix('/') {
        stripped.to_string()
    } else if path.starts_with("xl/") {
        path.to_string()
    } else {
        format!("xl/{path}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zip_paths() {
        assert_eq!(to_zip_path("worksheets/sheet1.xml"), "xl/worksheets/sheet1.xml");
        assert_eq!(to_zip_path("/xl/worksheets/sheet1.xml"), "xl/worksheets/sheet1.xml");
        assert_eq!(to_zip_path("xl/worksheets/sheet1.xml"), "xl/worksheets/sheet1.xml");
    }

    #[test]
    fn number_formats() {
        let indexes = vec!["0".to_owned(), "14".to_owned(), "164".to_owned(), "165".to_owned()];
        let custom = HashMap::from([
            ("164".to_owned(), "h:mm".to_owned()),
            ("165".to_owned(), "0.0%".to_owned()),
        ]);
        let system = DateSystem::V1904;
        assert_eq!(
            resolve_number_formats(&indexes, &custom, system),
            vec![CellType::Number, CellType::Date(system), CellType::Time, CellType::Number]
        );
    }
}
