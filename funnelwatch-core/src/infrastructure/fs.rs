// funnelwatch-core/src/infrastructure/fs.rs

use crate::infrastructure::error::InfrastructureError;
use std::fs;
use std::io::Write;
use std::path::Path;

/// Write content to a file atomically using a temporary file.
///
/// The temporary file is created next to the target (so the rename stays on one
/// filesystem), flushed to disk, then persisted over the target path. Readers see
/// either the previous content or the new one, never a half-written file.
/// Missing parent directories are created.
pub fn atomic_write<P: AsRef<Path>, C: AsRef<[u8]>>(
    path: P,
    content: C,
) -> Result<(), InfrastructureError> {
    let path = path.as_ref();
    let parent = path.parent().unwrap_or_else(|| Path::new("."));
    fs::create_dir_all(parent)?;

    let mut temp_file = tempfile::NamedTempFile::new_in(parent)?;
    temp_file.write_all(content.as_ref())?;
    temp_file.as_file().sync_all()?;

    temp_file
        .persist(path)
        .map_err(|e| InfrastructureError::Io(e.error))?;

    Ok(())
}

/// Serializes `value` as pretty JSON (trailing newline) and writes it atomically.
pub fn write_json<P: AsRef<Path>, T: serde::Serialize>(
    path: P,
    value: &T,
) -> Result<(), InfrastructureError> {
    let mut content = serde_json::to_string_pretty(value)?;
    content.push('\n');
    atomic_write(path, content)
}
