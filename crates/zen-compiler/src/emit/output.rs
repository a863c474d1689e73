//! Putting a finished entity file on disk.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::debug;

/// Write `bytes` to `<path>.tmp`, then rename over `path`.
///
/// A reader never observes a half-written file: either the previous content
/// or the complete new one. The temporary file is removed on failure.
pub fn write_atomically(path: &Path, bytes: &[u8]) -> io::Result<()> {
    let tmp = temporary_path(path);
    if let Err(e) = fs::write(&tmp, bytes).and_then(|()| fs::rename(&tmp, path)) {
        let _ = fs::remove_file(&tmp);
        return Err(e);
    }
    debug!(path = %path.display(), bytes = bytes.len(), "wrote entity file");
    Ok(())
}

fn temporary_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".tmp");
    PathBuf::from(name)
}
