use std::path::Path;

use tempfile::NamedTempFile;

use crate::error::Error;
use crate::types::Result;

/// Empty temporary file in the directory `target` will live in
pub fn temp_beside(target: &Path) -> Result<NamedTempFile> {
    let dir = match target.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    Ok(NamedTempFile::new_in(dir)?)
}

/// Move a staged file onto `target`, replacing whatever is there
pub fn persist(tmp: NamedTempFile, target: &Path) -> Result<()> {
    tmp.persist(target).map_err(|e| Error::Io(e.error))?;
    Ok(())
}
