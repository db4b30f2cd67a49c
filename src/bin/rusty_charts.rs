use anyhow::Context;
use anyhow::Result;
use clap::Parser;
use rusty_charts::Pipeline;
use rusty_charts::PipelineConfig;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::error;
use tracing::warn;
use tracing_subscriber::EnvFilter;

/// Renders chart configuration files from spreadsheet datasets and metadata.
#[derive(Parser, Debug)]
#[command(name = "rusty_charts", version, about)]
struct Cli {
    /// Directory with `Module <N> - Datasets for Charts` workbooks
    #[arg(long)]
    input_dir: PathBuf,

    /// Workbook whose `module*` sheets hold the chart metadata
    #[arg(long)]
    metadata: PathBuf,

    /// JSON object of column bindings keyed by chart id
    #[arg(long)]
    styling: PathBuf,

    /// Directory with `<chart type>_template.json` files
    #[arg(long)]
    templates: PathBuf,

    /// Directory rendered charts are written to
    #[arg(long)]
    output_dir: PathBuf,

    /// Also write the merged charts as JSON to this path
    #[arg(long)]
    merged_out: Option<PathBuf>,
}

impl From<Cli> for PipelineConfig {
    fn from(cli: Cli) -> Self {
        PipelineConfig {
            input_dir: cli.input_dir,
            metadata_workbook: cli.metadata,
            styling_file: cli.styling,
            template_dir: cli.templates,
            output_dir: cli.output_dir,
            merged_out: cli.merged_out,
        }
    }
}

fn main() -> ExitCode {
    init_tracing();
    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            error!("{:#}", error);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let pipeline = Pipeline::new(cli.into());
    let summary = pipeline.run().context("Chart generation failed")?;
    if !summary.missing_datasets.is_empty() {
        warn!("Charts without dataset: {}", summary.missing_datasets.join(", "));
    }
    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}
