//! # Merge
//!
//! Filters metadata records down to charts that are ready to be recreated
//! and joins each one with its dataset blob by chart identifier.

use crate::extract::DatasetMap;
use crate::keyed::KeyedMap;
use crate::table::Record;
use crate::table::TabularBlob;
use serde::Serialize;
use tracing::debug;
use tracing::warn;

pub const FIGURE_ID: &str = "Figure ID";
pub const CATEGORY: &str = "Category";
pub const STATUS: &str = "Status";
pub const APACHE_POSSIBLE: &str = "Apache possible?";
pub const DATASET_STATUS: &str = "Dataset Status";
pub const CHART_TYPE: &str = "Chart Type";
pub const TITLE: &str = "Title";

const CHART_TO_RECREATE: &str = "Chart to recreate";
const READY: &str = "Ready";

/// One chart to render: its metadata and, when found, its dataset.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ChartRecord {
    pub metadata: Record,
    pub dataset: Option<TabularBlob>,
}

pub type MergedCharts = KeyedMap<ChartRecord>;

/// Merged charts plus what went missing or was overwritten on the way.
#[derive(Debug, Default)]
pub struct MergeOutcome {
    pub charts: MergedCharts,
    /// Chart ids whose dataset was not found, in merge order
    pub missing_datasets: Vec<String>,
    /// Records dropped because their `Figure ID` was empty
    pub missing_ids: usize,
}

impl MergeOutcome {
    /// Number of records that replaced an earlier one with the same chart id.
    pub fn duplicates(&self) -> usize {
        self.charts.overwrites()
    }
}

/// Whether a metadata record describes a chart that is ready to be recreated.
pub fn is_ready(record: &Record) -> bool {
    record.text(CATEGORY) == Some(CHART_TO_RECREATE)
        && record.text(STATUS) == Some(READY)
        && record.get(APACHE_POSSIBLE).map(|value| value.is_truthy()).unwrap_or(false)
        && record.text(DATASET_STATUS) == Some(READY)
}

/// Joins ready metadata records with datasets by trimmed `Figure ID`.
pub fn merge(metadata: &[Record], datasets: &DatasetMap) -> MergeOutcome {
    let mut outcome = MergeOutcome::default();
    for record in metadata.iter().filter(|record| is_ready(record)) {
        let Some(chart_id) = record.get(FIGURE_ID).and_then(|id| id.to_key()) else {
            warn!("Skipping ready chart without a '{}'", FIGURE_ID);
            outcome.missing_ids += 1;
            continue;
        };
        let dataset = datasets.get(&chart_id).filter(|blob| !blob.is_empty()).cloned();
        if dataset.is_none() {
            warn!("No dataset found for {}", chart_id);
            outcome.missing_datasets.push(chart_id.to_owned());
        }
        let mut metadata = record.clone();
        metadata.remove(APACHE_POSSIBLE);
        metadata.normalize_missing();
        if outcome.charts.upsert(chart_id.to_owned(), ChartRecord { metadata, dataset }).is_some() {
            debug!("Chart {} defined more than once, keeping the last definition", chart_id);
        }
    }
    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::Scalar;

    fn metadata(id: Scalar, status: &str, apache: Scalar, dataset_status: &str) -> Record {
        Record::from_iter([
            (FIGURE_ID, id),
            (CATEGORY, Scalar::from(CHART_TO_RECREATE)),
            (STATUS, Scalar::from(status)),
            (APACHE_POSSIBLE, apache),
            (DATASET_STATUS, Scalar::from(dataset_status)),
            (CHART_TYPE, Scalar::from("Bar chart")),
            (TITLE, Scalar::Float(f64::NAN)),
        ])
    }

    fn datasets() -> DatasetMap {
        let mut datasets = DatasetMap::new();
        datasets.upsert("1.1", TabularBlob::from("a,b\nA,1"));
        datasets
    }

    #[test]
    fn filter_is_exact() {
        let ready = metadata(Scalar::from("1.1"), "Ready", Scalar::Bool(true), "Ready");
        assert!(is_ready(&ready));
        assert!(!is_ready(&metadata(Scalar::from("1.1"), "Pending", Scalar::Bool(true), "Ready")));
        assert!(!is_ready(&metadata(Scalar::from("1.1"), "ready", Scalar::Bool(true), "Ready")));
        assert!(!is_ready(&metadata(Scalar::from("1.1"), "Ready", Scalar::Bool(true), "Not Ready")));
        assert!(!is_ready(&metadata(Scalar::from("1.1"), "Ready", Scalar::Bool(false), "Ready")));
        assert!(!is_ready(&metadata(Scalar::from("1.1"), "Ready", Scalar::Null, "Ready")));
        assert!(!is_ready(&metadata(Scalar::from("1.1"), "Ready", Scalar::Int(1), "Ready")));
        assert!(is_ready(&metadata(Scalar::from("1.1"), "Ready", Scalar::from("Yes"), "Ready")));
    }

    #[test]
    fn joins_datasets_and_reports_missing() {
        let records = vec![
            metadata(Scalar::from(" 1.1 "), "Ready", Scalar::Bool(true), "Ready"),
            metadata(Scalar::Int(2), "Ready", Scalar::Bool(true), "Ready"),
            metadata(Scalar::from("3"), "Pending", Scalar::Bool(true), "Ready"),
        ];
        let outcome = merge(&records, &datasets());

        assert_eq!(outcome.charts.keys().collect::<Vec<_>>(), vec!["1.1", "2"]);
        assert_eq!(outcome.missing_datasets, vec!["2".to_owned()]);

        let chart = outcome.charts.get("1.1").unwrap();
        assert_eq!(chart.dataset, Some(TabularBlob::from("a,b\nA,1")));
        assert_eq!(chart.metadata.get(APACHE_POSSIBLE), None);
        assert_eq!(chart.metadata.get(TITLE), Some(&Scalar::Null));
        assert_eq!(outcome.charts.get("2").unwrap().dataset, None);
    }

    #[test]
    fn duplicate_ids_keep_last_in_first_position() {
        let mut first = metadata(Scalar::Float(1.0), "Ready", Scalar::Bool(true), "Ready");
        first.insert(TITLE, Scalar::from("first"));
        let other = metadata(Scalar::from("5"), "Ready", Scalar::Bool(true), "Ready");
        let mut last = metadata(Scalar::Int(1), "Ready", Scalar::Bool(true), "Ready");
        last.insert(TITLE, Scalar::from("last"));

        let outcome = merge(&[first, other, last], &DatasetMap::new());
        assert_eq!(outcome.duplicates(), 1);
        assert_eq!(outcome.charts.keys().collect::<Vec<_>>(), vec!["1", "5"]);
        assert_eq!(outcome.charts.get("1").unwrap().metadata.text(TITLE), Some("last"));
    }

    #[test]
    fn records_without_id_are_skipped() {
        let records = vec![metadata(Scalar::Null, "Ready", Scalar::Bool(true), "Ready")];
        let outcome = merge(&records, &datasets());
        assert!(outcome.charts.is_empty());
        assert_eq!(outcome.missing_ids, 1);
    }
}
