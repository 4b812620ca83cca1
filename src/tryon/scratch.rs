use crate::Result;
use std::path::{Path, PathBuf};
use tempfile::{Builder, TempPath};
use tracing::{debug, warn};

const PREFIX: &str = "tryon-";

/// Uniquely named files owned by a single try-on run.
///
/// `cleanup` deletes everything and logs failures; dropping without it still
/// removes the files, just silently.
pub struct ScratchFiles {
    dir: Option<PathBuf>,
    paths: Vec<TempPath>,
}

impl ScratchFiles {
    pub fn new(dir: Option<PathBuf>) -> Self {
        Self {
            dir,
            paths: Vec::new(),
        }
    }

    /// Creates an empty file ending in `suffix` and returns its path.
    pub fn create(&mut self, suffix: &str) -> Result<PathBuf> {
        let mut builder = Builder::new();
        builder.prefix(PREFIX).suffix(suffix);

        let file = match &self.dir {
            Some(dir) => builder.tempfile_in(dir)?,
            None => builder.tempfile()?,
        };
        let temp_path = file.into_temp_path();
        let path = temp_path.to_path_buf();
        debug!("Created scratch file {}", path.display());

        self.paths.push(temp_path);
        Ok(path)
    }

    pub fn paths(&self) -> impl Iterator<Item = &Path> {
        self.paths.iter().map(|p| &**p)
    }

    pub fn cleanup(self) {
        for temp_path in self.paths {
            let shown = temp_path.display().to_string();
            match temp_path.close() {
                Ok(()) => debug!("Removed scratch file {}", shown),
                Err(e) => warn!("Could not delete temporary file {}: {}", shown, e),
            }
        }
    }
}
