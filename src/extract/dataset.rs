use crate::error::ChartError;
use crate::extract::ExtractError;
use crate::keyed::KeyedMap;
use crate::spreadsheet::is_supported;
use crate::spreadsheet::load_grid;
use crate::spreadsheet::open_spreadsheet;
use crate::table::TabularBlob;
use glob::glob;
use glob::Pattern;
use regex::Regex;
use std::path::Path;
use std::path::PathBuf;
use tracing::debug;
use tracing::info;
use tracing::warn;

/// Dataset blobs keyed by trimmed sheet name.
pub type DatasetMap = KeyedMap<TabularBlob>;

const FILE_NAME_PATTERN: &str = r"^Module \d+ - Datasets for Charts\.[^.]+$";

/// Workbooks in `dir` named `Module <N> - Datasets for Charts.<ext>`, sorted by path.
pub fn dataset_workbooks(dir: &Path) -> Result<Vec<PathBuf>, ChartError> {
    if !std::fs::metadata(dir).map(|meta| meta.is_dir()).unwrap_or(false) {
        Err(ExtractError::InputDirectory(dir.display().to_string()))?
    }
    let file_name = Regex::new(FILE_NAME_PATTERN)?;
    let pattern = format!(
        "{}/Module * - Datasets for Charts.*",
        Pattern::escape(&dir.to_string_lossy())
    );
    let mut paths = Vec::new();
    for entry in glob(&pattern)? {
        let path = entry?;
        let accepted = path
            .file_name()
            .and_then(|name| name.to_str())
            .map(|name| file_name.is_match(name))
            .unwrap_or(false);
        if accepted && is_supported(&path) && path.is_file() {
            paths.push(path);
        }
    }
    paths.sort();
    Ok(paths)
}

/// Reads every sheet of every dataset workbook in `dir` into a blob.
///
/// Sheets and workbooks that cannot be read are reported and skipped. A sheet
/// name seen twice keeps the later blob.
pub fn extract_datasets(dir: &Path) -> Result<DatasetMap, ChartError> {
    let mut datasets = DatasetMap::new();
    for path in dataset_workbooks(dir)? {
        let mut spreadsheet = match open_spreadsheet(&path) {
            Ok(spreadsheet) => spreadsheet,
            Err(error) => {
                warn!("Failed to open '{}': {}", path.display(), error);
                continue;
            }
        };
        info!("Reading datasets from '{}'", path.display());
        for sheet_name in spreadsheet.sheet_names() {
            let blob = load_grid(spreadsheet.as_mut(), &sheet_name)
                .and_then(|grid| TabularBlob::from_grid(&grid));
            match blob {
                Ok(blob) => {
                    let chart_id = sheet_name.trim();
                    if datasets.upsert(chart_id, blob).is_some() {
                        debug!("Dataset '{}' replaced by sheet in '{}'", chart_id, path.display());
                    }
                }
                Err(error) => warn!("Failed to read sheet '{}' in '{}': {}", sheet_name, path.display(), error),
            }
        }
    }
    Ok(datasets)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_name_pattern() {
        let regex = Regex::new(FILE_NAME_PATTERN).unwrap();
        assert!(regex.is_match("Module 1 - Datasets for Charts.xlsx"));
        assert!(regex.is_match("Module 12 - Datasets for Charts.ODS"));
        assert!(!regex.is_match("Module A - Datasets for Charts.xlsx"));
        assert!(!regex.is_match("~$Module 1 - Datasets for Charts.xlsx"));
    }

    #[test]
    fn workbooks_need_a_supported_extension() {
        let dir = tempfile::tempdir().unwrap();
        for name in [
            "Module 2 - Datasets for Charts.ODS",
            "Module 1 - Datasets for Charts.xlsx",
            "Module 3 - Datasets for Charts.csv",
            "Module 4 - Datasets for Charts.xls",
            "Module A - Datasets for Charts.xlsx",
            "Notes.xlsx",
        ] {
            std::fs::write(dir.path().join(name), b"").unwrap();
        }
        assert_eq!(
            dataset_workbooks(dir.path()).unwrap(),
            vec![
                dir.path().join("Module 1 - Datasets for Charts.xlsx"),
                dir.path().join("Module 2 - Datasets for Charts.ODS"),
            ]
        );
    }

    #[test]
    fn missing_directory_is_fatal() {
        let error = extract_datasets(Path::new("/nonexistent/rusty_charts")).unwrap_err();
        assert!(matches!(error, ChartError::ExtractError(ExtractError::InputDirectory(_))));
    }
}
