use crate::error::ChartError;
use crate::error::ResultMessage;
use serde::Deserialize;
use serde::Serialize;
use std::collections::HashMap;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Column bindings for one chart. Which fields matter depends on the chart type.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct Styling {
    pub x_col_name: Option<String>,
    pub y_col_name: Option<String>,
    pub name_col: Option<String>,
    pub value_col: Option<String>,
    pub category_col: Option<String>,
    pub series_cols: Option<Vec<String>>,
}

/// Styling records keyed by chart identifier.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(transparent)]
pub struct StylingMap(HashMap<String, Styling>);

impl StylingMap {
    pub fn load(path: &Path) -> Result<Self, ChartError> {
        let prefix = format!("Styling file '{}'", path.display());
        let file = File::open(path).map_err(ChartError::from).with_prefix(&prefix)?;
        serde_json::from_reader(BufReader::new(file))
            .map_err(ChartError::from)
            .with_prefix(&prefix)
    }

    /// Styling of a chart; charts without an entry get the empty styling.
    pub fn get(&self, chart_id: &str) -> Styling {
        self.0.get(chart_id).cloned().unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(String, Styling)> for StylingMap {
    fn from_iter<I: IntoIterator<Item = (String, Styling)>>(iter: I) -> Self {
        StylingMap(iter.into_iter().collect())
    }
}
