//! ST-011: `Local::File` and `Local::Directory` resources.

use crate::core::error::{ErrorKind, Result, StackError};
use crate::core::resource::{Properties, Resource};
use crate::core::value::Value;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Writes `Content` to `Path`. Exposes the path.
///
/// With `Ephemeral: true` the file is removed again on teardown.
#[derive(Debug, Default)]
pub struct FileResource {
    properties: Properties,
    path: PathBuf,
    ephemeral: bool,
}

impl Resource for FileResource {
    fn set_properties(&mut self, properties: Properties) {
        self.properties = properties;
    }

    fn create(&mut self) -> Result<()> {
        let path = PathBuf::from(self.properties.require::<String>("Path")?);
        let content = self.properties.require::<String>("Content")?;
        self.ephemeral = self
            .properties
            .optional::<bool>("Ephemeral")?
            .unwrap_or(false);

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| io_error("create", parent, e))?;
            }
        }
        std::fs::write(&path, content).map_err(|e| io_error("write", &path, e))?;
        debug!(path = %path.display(), "file written");
        self.path = path;
        Ok(())
    }

    fn get(&self) -> Value {
        Value::from(self.path.display().to_string())
    }

    fn destroy(&mut self) {
        if !self.ephemeral {
            return;
        }
        if let Err(e) = std::fs::remove_file(&self.path) {
            warn!(path = %self.path.display(), error = %e, "cannot remove ephemeral file");
        }
    }
}

/// Creates the directory at `Path` (and parents). Exposes the path.
#[derive(Debug, Default)]
pub struct DirectoryResource {
    properties: Properties,
    path: PathBuf,
}

impl Resource for DirectoryResource {
    fn set_properties(&mut self, properties: Properties) {
        self.properties = properties;
    }

    fn create(&mut self) -> Result<()> {
        let path = PathBuf::from(self.properties.require::<String>("Path")?);
        std::fs::create_dir_all(&path).map_err(|e| io_error("create", &path, e))?;
        self.path = path;
        Ok(())
    }

    fn get(&self) -> Value {
        Value::from(self.path.display().to_string())
    }
}

fn io_error(action: &str, path: &Path, e: std::io::Error) -> StackError {
    StackError::new(
        ErrorKind::CreateFailed,
        format!("cannot {} {}: {}", action, path.display(), e),
    )
}
