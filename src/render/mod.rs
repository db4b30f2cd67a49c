//! # Chart Rendering
//!
//! Each merged chart goes through the same steps: resolve its chart type,
//! resolve its styling into a column binding, parse its dataset, load a fresh
//! template, bind the data and persist the result. The first failing step
//! ends that chart only; the other charts are unaffected.
pub mod binder;
pub mod chart_type;
pub mod sink;
pub mod styling;
pub mod template;

use crate::error::ChartError;
use crate::error::ResultMessage;
use crate::merge::ChartRecord;
use crate::merge::MergedCharts;
use crate::merge::CHART_TYPE;
use crate::merge::TITLE;
use crate::render::binder::Binding;
use crate::render::chart_type::ChartType;
use crate::render::sink::OutputSink;
use crate::render::styling::StylingMap;
use crate::render::template::TemplateStore;
use std::path::PathBuf;
use thiserror::Error;
use tracing::info;
use tracing::warn;

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Unsupported chart type '{0}'")]
    UnsupportedChartType(String),

    #[error("Missing styling for {0}: '{1}'")]
    MissingStyling(ChartType, String),

    #[error("No dataset for chart '{0}'")]
    MissingDataset(String),

    #[error("Template not found at '{0}'")]
    TemplateNotFound(String),

    #[error("Template directory '{0}' is not readable: {1}")]
    TemplateDirectory(String, std::io::Error),

    #[error("Missing column '{0}'")]
    MissingColumn(String),

    #[error("Template has no '{0}' slot")]
    MissingSlot(String),

    #[error("'{0}' is not a plain file name")]
    InvalidFileName(String),
}

/// What happened to the charts of one rendering pass.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RenderReport {
    /// Files written, in chart order
    pub rendered: Vec<PathBuf>,
    pub unsupported: usize,
    pub missing_styling: usize,
    pub missing_dataset: usize,
    pub missing_template: usize,
    /// Unparsable datasets, missing columns or slots, unusable ids and write failures
    pub failed: usize,
}

impl RenderReport {
    pub fn skipped(&self) -> usize {
        self.unsupported + self.missing_styling + self.missing_dataset + self.missing_template + self.failed
    }

    fn count(&mut self, error: &ChartError) {
        match error {
            ChartError::RenderError(RenderError::UnsupportedChartType(_)) => self.unsupported += 1,
            ChartError::RenderError(RenderError::MissingStyling(..)) => self.missing_styling += 1,
            ChartError::RenderError(RenderError::MissingDataset(_)) => self.missing_dataset += 1,
            ChartError::RenderError(RenderError::TemplateNotFound(_)) => self.missing_template += 1,
            _ => self.failed += 1,
        }
    }
}

/// Renders merged charts into configuration files.
pub struct Renderer {
    templates: TemplateStore,
    styling: StylingMap,
    sink: OutputSink,
}

impl Renderer {
    pub fn new(templates: TemplateStore, styling: StylingMap, sink: OutputSink) -> Self {
        Renderer {
            templates,
            styling,
            sink,
        }
    }

    /// Renders every chart, isolating failures per chart.
    pub fn render_all(&self, charts: &MergedCharts) -> RenderReport {
        let mut report = RenderReport::default();
        for (chart_id, chart) in charts.iter() {
            match self.render(chart_id, chart) {
                Ok(path) => {
                    info!("Saved chart to '{}'", path.display());
                    report.rendered.push(path);
                }
                Err(error) => {
                    match &error {
                        ChartError::RenderError(RenderError::UnsupportedChartType(_)) => {
                            info!("Skipping {}: {}", chart_id, error)
                        }
                        _ => warn!("Skipping {}: {}", chart_id, error),
                    }
                    report.count(&error);
                }
            }
        }
        report
    }

    /// Renders one chart and returns the path written.
    pub fn render(&self, chart_id: &str, chart: &ChartRecord) -> Result<PathBuf, ChartError> {
        let label = chart.metadata.text(CHART_TYPE).unwrap_or_default();
        let chart_type = ChartType::from_label(label)
            .ok_or_else(|| RenderError::UnsupportedChartType(label.trim().to_lowercase()))?;
        let title = chart.metadata.get(TITLE);
        info!(
            "Generating {} for {}, title: {}",
            chart_type,
            chart_id,
            title.map(|title| title.to_string()).unwrap_or_default()
        );

        let binding = Binding::resolve(chart_type, &self.styling.get(chart_id))?;
        let table = chart
            .dataset
            .as_ref()
            .ok_or_else(|| RenderError::MissingDataset(chart_id.to_owned()))?
            .parse()
            .with_prefix("Failed to read dataset")?;
        let mut template = self.templates.load(chart_type)?;
        binding
            .bind(&mut template, &table, title)
            .map_err(ChartError::from)
            .with_prefix("Error preparing chart data")?;
        self.sink.write(&chart_type.output_file_name(chart_id)?, &template)
    }
}
