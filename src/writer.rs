//! Writing blocks to a new file

use std::io::Write;
use std::path::Path;

use tempfile::NamedTempFile;

use crate::error::{Error, Result};
use crate::pcapng::Block;
use crate::serialize::encode;

/// Serialize `blocks` and write them to a new file at `path`
///
/// Data is written to a temporary file in the same directory, which is then renamed to `path`.
/// An existing file at `path` is never replaced: the call fails and the file is left unchanged.
/// If any step fails, no file is left behind.
pub fn save<P: AsRef<Path>>(path: P, blocks: &[Block]) -> Result<()> {
    let data = encode(blocks)?;
    write_new(path.as_ref(), &data)
}

pub(crate) fn write_new(path: &Path, data: &[u8]) -> Result<()> {
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let mut tmp = NamedTempFile::new_in(dir)
        .map_err(Error::io_path("create a temporary file in", dir))?;
    tmp.write_all(data)
        .map_err(Error::io_path("write", tmp.path()))?;
    tmp.as_file()
        .sync_all()
        .map_err(Error::io_path("sync", tmp.path()))?;
    // the temporary file is removed on error
    tmp.persist_noclobber(path)
        .map_err(|e| Error::io_path("create", path)(e.error))?;
    Ok(())
}
