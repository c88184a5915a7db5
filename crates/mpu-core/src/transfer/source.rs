//! Shared read-only file handle with positional reads at disjoint offsets.

use bytes::Bytes;
use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::planner::PartRange;

/// Source file for an upload. Safe to clone and read from multiple tasks;
/// each `read_range` is an independent positional read (pread-style), so no
/// lock is needed as long as ranges do not overlap.
#[derive(Debug, Clone)]
pub struct PartSource {
    file: Arc<File>,
    path: PathBuf,
    len: u64,
}

impl PartSource {
    /// Open `path` for reading and capture its size.
    pub fn open(path: &Path) -> io::Result<Self> {
        let file = File::open(path)?;
        let meta = file.metadata()?;
        if !meta.is_file() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("{} is not a regular file", path.display()),
            ));
        }
        Ok(Self {
            file: Arc::new(file),
            path: path.to_path_buf(),
            len: meta.len(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Size in bytes at open time.
    pub fn len(&self) -> u64 {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Read exactly the bytes of `range` on the blocking pool. A file that
    /// shrank since `open` yields `UnexpectedEof`.
    pub async fn read_range(&self, range: &PartRange) -> io::Result<Bytes> {
        let file = Arc::clone(&self.file);
        let (offset, length) = (range.offset, range.length);
        tokio::task::spawn_blocking(move || read_exact_at(&file, offset, length))
            .await
            .map_err(io::Error::other)?
    }
}

#[cfg(unix)]
fn read_exact_at(file: &File, offset: u64, length: u64) -> io::Result<Bytes> {
    use std::os::unix::fs::FileExt;
    let mut buf = vec![0u8; length as usize];
    file.read_exact_at(&mut buf, offset)?;
    Ok(Bytes::from(buf))
}

#[cfg(windows)]
fn read_exact_at(file: &File, offset: u64, length: u64) -> io::Result<Bytes> {
    use std::os::windows::fs::FileExt;
    let mut buf = vec![0u8; length as usize];
    let mut filled = 0usize;
    while filled < buf.len() {
        let n = file.seek_read(&mut buf[filled..], offset + filled as u64)?;
        if n == 0 {
            return Err(io::Error::from(io::ErrorKind::UnexpectedEof));
        }
        filled += n;
    }
    Ok(Bytes::from(buf))
}
