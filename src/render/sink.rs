use crate::error::ChartError;
use crate::error::ResultMessage;
use crate::render::RenderError;
use serde::Serialize;
use std::fs;
use std::fs::File;
use std::io::BufWriter;
use std::io::Write;
use std::path::Component;
use std::path::Path;
use std::path::PathBuf;

/// Writes JSON documents into an output directory.
#[derive(Clone, Debug)]
pub struct OutputSink {
    dir: PathBuf,
}

impl OutputSink {
    pub fn new(dir: &Path) -> Self {
        OutputSink { dir: dir.to_owned() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Writes `document` as 2-space indented JSON to `<dir>/<file_name>`,
    /// creating the directory if needed. `file_name` must be a single
    /// normal path component.
    pub fn write<T: Serialize>(&self, file_name: &str, document: &T) -> Result<PathBuf, ChartError> {
        let mut components = Path::new(file_name).components();
        if !matches!((components.next(), components.next()), (Some(Component::Normal(_)), None)) {
            Err(RenderError::InvalidFileName(file_name.to_owned()))?
        }
        fs::create_dir_all(&self.dir)
            .map_err(ChartError::from)
            .with_prefix(&format!("Output directory '{}'", self.dir.display()))?;
        let path = self.dir.join(file_name);
        write_json_atomically(&path, document)?;
        Ok(path)
    }
}

/// Serializes into a sibling temporary file, then renames it over `path`.
/// A failed write removes the temporary file and leaves `path` untouched.
pub fn write_json_atomically<T: Serialize>(path: &Path, document: &T) -> Result<(), ChartError> {
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_default();
    let temporary = path.with_file_name(format!(".{file_name}.tmp"));
    let result = write_json(&temporary, document).and_then(|_| Ok(fs::rename(&temporary, path)?));
    if result.is_err() {
        let _ = fs::remove_file(&temporary);
    }
    result.with_prefix(&path.display().to_string())
}

fn write_json<T: Serialize>(path: &Path, document: &T) -> Result<(), ChartError> {
    let mut writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(&mut writer, document)?;
    writer.flush()?;
    writer.get_ref().sync_all()?;
    Ok(())
}
