use crate::error::ChartError;
use crate::error::ResultMessage;
use crate::render::chart_type::ChartType;
use crate::render::RenderError;
use serde_json::Value;
use std::fs::File;
use std::io::BufReader;
use std::io::ErrorKind;
use std::path::Path;
use std::path::PathBuf;

/// Directory of chart templates, one `<key>_template.json` per chart type.
#[derive(Clone, Debug)]
pub struct TemplateStore {
    dir: PathBuf,
}

impl TemplateStore {
    /// Fails when the directory cannot be listed.
    pub fn open(dir: &Path) -> Result<Self, ChartError> {
        std::fs::read_dir(dir).map_err(|error| RenderError::TemplateDirectory(dir.display().to_string(), error))?;
        Ok(TemplateStore { dir: dir.to_owned() })
    }

    pub fn path(&self, chart_type: ChartType) -> PathBuf {
        self.dir.join(chart_type.template_file_name())
    }

    /// Loads a fresh copy of the template for `chart_type`.
    pub fn load(&self, chart_type: ChartType) -> Result<Value, ChartError> {
        let path = self.path(chart_type);
        let file = match File::open(&path) {
            Ok(file) => file,
            Err(error) if error.kind() == ErrorKind::NotFound => {
                Err(RenderError::TemplateNotFound(path.display().to_string()))?
            }
            Err(error) => Err(error)?,
        };
        serde_json::from_reader(BufReader::new(file))
            .map_err(ChartError::from)
            .with_prefix(&format!("Template '{}'", path.display()))
    }
}
