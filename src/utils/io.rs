//! Filesystem helpers that report failures as `internal.io_error`.

use crate::error::{Error, Result};
use std::fs;
use std::path::Path;

fn io_err(context: impl Into<String>) -> impl FnOnce(std::io::Error) -> Error {
    let context = context.into();
    move |e| Error::internal_io(e.to_string(), Some(context))
}

pub fn read_file(path: &Path, operation: &str) -> Result<String> {
    fs::read_to_string(path).map_err(io_err(operation))
}

pub fn read_bytes(path: &Path, operation: &str) -> Result<Vec<u8>> {
    fs::read(path).map_err(io_err(operation))
}

/// Write `content` to `path`, creating missing parent directories.
pub fn write_bytes(path: &Path, content: &[u8], operation: &str) -> Result<()> {
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir).map_err(io_err(format!("{}: create {}", operation, dir.display())))?;
    }
    fs::write(path, content).map_err(io_err(operation))
}

/// Replace `path` through a sibling `<name>.tmp` file so readers never see
/// a partially written config.
pub fn write_file_atomic(path: &Path, content: &str, operation: &str) -> Result<()> {
    let (Some(dir), Some(name)) = (path.parent(), path.file_name()) else {
        return Err(Error::internal_io(
            format!("No file name in {}", path.display()),
            Some(operation.to_string()),
        ));
    };
    let staged = dir.join(format!("{}.tmp", name.to_string_lossy()));

    fs::write(&staged, content).map_err(io_err(format!("{}: stage", operation)))?;
    fs::rename(&staged, path).map_err(io_err(format!("{}: rename", operation)))
}
