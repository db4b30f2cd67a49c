//! The end-to-end run: extract, merge, render.

use crate::error::ChartError;
use crate::extract::extract_datasets;
use crate::extract::extract_metadata;
use crate::merge::merge;
use crate::render::sink::write_json_atomically;
use crate::render::sink::OutputSink;
use crate::render::styling::StylingMap;
use crate::render::template::TemplateStore;
use crate::render::RenderReport;
use crate::render::Renderer;
use std::path::PathBuf;
use tracing::info;

/// Locations a run reads from and writes to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PipelineConfig {
    /// Directory holding `Module <N> - Datasets for Charts.<ext>` workbooks
    pub input_dir: PathBuf,
    pub metadata_workbook: PathBuf,
    pub styling_file: PathBuf,
    pub template_dir: PathBuf,
    pub output_dir: PathBuf,
    /// Optional JSON dump of the merged charts
    pub merged_out: Option<PathBuf>,
}

/// Counts describing one completed run.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub datasets: usize,
    pub dataset_overwrites: usize,
    pub metadata_rows: usize,
    pub merged: usize,
    pub duplicate_ids: usize,
    pub missing_ids: usize,
    pub missing_datasets: Vec<String>,
    pub render: RenderReport,
}

pub struct Pipeline {
    config: PipelineConfig,
}

impl Pipeline {
    pub fn new(config: PipelineConfig) -> Self {
        Pipeline { config }
    }

    /// Runs all stages. Errors returned here are fatal; per-sheet and
    /// per-chart problems are logged and counted in the summary instead.
    pub fn run(&self) -> Result<RunSummary, ChartError> {
        let config = &self.config;
        // Fatal inputs are checked before any workbook is read.
        let styling = StylingMap::load(&config.styling_file)?;
        let templates = TemplateStore::open(&config.template_dir)?;

        let datasets = extract_datasets(&config.input_dir)?;
        info!("Extracted {} datasets", datasets.len());
        let metadata = extract_metadata(&config.metadata_workbook)?;
        info!("Extracted {} metadata rows", metadata.len());

        let outcome = merge(&metadata, &datasets);
        info!(
            "Merged {} charts ({} without dataset, {} duplicate ids)",
            outcome.charts.len(),
            outcome.missing_datasets.len(),
            outcome.duplicates()
        );
        if let Some(path) = &config.merged_out {
            write_json_atomically(path, &outcome.charts)?;
            info!("Saved merged charts to '{}'", path.display());
        }

        let renderer = Renderer::new(templates, styling, OutputSink::new(&config.output_dir));
        let render = renderer.render_all(&outcome.charts);
        let summary = RunSummary {
            datasets: datasets.len(),
            dataset_overwrites: datasets.overwrites(),
            metadata_rows: metadata.len(),
            merged: outcome.charts.len(),
            duplicate_ids: outcome.duplicates(),
            missing_ids: outcome.missing_ids,
            missing_datasets: outcome.missing_datasets,
            render,
        };
        info!(
            "Rendered {} of {} charts, skipped {}",
            summary.render.rendered.len(),
            summary.merged,
            summary.render.skipped()
        );
        Ok(summary)
    }
}
