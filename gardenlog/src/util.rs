use crate::error::{GardenLogError, Result};
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;

/// Write bytes to `path` via a temp file plus an atomic rename. The temp
/// file is created in the destination directory so the rename never crosses
/// filesystems.
pub(crate) fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    let dir = path.parent().ok_or_else(|| {
        GardenLogError::Other(format!("No parent directory for {}", path.display()))
    })?;
    let persist_err = |source: std::io::Error| GardenLogError::Persistence {
        path: path.to_path_buf(),
        source,
    };

    let mut tmp = NamedTempFile::new_in(dir).map_err(persist_err)?;
    tmp.write_all(bytes).map_err(persist_err)?;
    tmp.persist(path).map_err(|e| persist_err(e.error))?;
    Ok(())
}
