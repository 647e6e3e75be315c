use crate::device::backing_store::{BackingStore, in_bounds};
use crate::slot::constants::FREE_BYTE;
use anyhow::Context;
use bytes::Bytes;
use std::fs;
use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use tracing::warn;

const ERASE_CHUNK: usize = 64 * 1024;

/// A fixed-size device backed by a regular file.
pub struct FileDevice {
    file: File,
    path: PathBuf,
    size: u64,
}

impl FileDevice {
    /// Creates (or truncates) `path` to `size` bytes, every byte erased.
    pub fn create<P: AsRef<Path>>(path: P, size: u64) -> anyhow::Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("creating device dir {:?}", parent))?;
        }
        let mut file = OpenOptions::new()
            .create(true)
            .read(true)
            .write(true)
            .truncate(true)
            .open(path)
            .with_context(|| format!("creating device {:?}", path))?;

        let chunk = vec![FREE_BYTE; ERASE_CHUNK];
        let mut left = size;
        while left > 0 {
            let n = left.min(ERASE_CHUNK as u64) as usize;
            file.write_all(&chunk[..n])
                .with_context(|| format!("erasing device {:?}", path))?;
            left -= n as u64;
        }
        file.sync_all()?;

        Ok(Self {
            file,
            path: path.to_path_buf(),
            size,
        })
    }

    /// Opens an existing device; its size is the current file length.
    pub fn open<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .open(path)
            .with_context(|| format!("opening device {:?}", path))?;
        let size = file.metadata()?.len();
        Ok(Self {
            file,
            path: path.to_path_buf(),
            size,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn sync(&mut self) -> anyhow::Result<()> {
        self.file
            .sync_all()
            .with_context(|| format!("syncing device {:?}", self.path))
    }

    fn read_at(&mut self, offset: u64, buf: &mut [u8]) -> std::io::Result<()> {
        self.file.seek(SeekFrom::Start(offset))?;
        self.file.read_exact(buf)
    }

    fn write_at(&mut self, offset: u64, data: &[u8]) -> std::io::Result<()> {
        self.file.seek(SeekFrom::Start(offset))?;
        self.file.write_all(data)
    }
}

impl BackingStore for FileDevice {
    fn read(&mut self, offset: u64, len: usize) -> Option<Bytes> {
        if !in_bounds(self.size, offset, len) {
            return None;
        }
        let mut buf = vec![0u8; len];
        match self.read_at(offset, &mut buf) {
            Ok(()) => Some(Bytes::from(buf)),
            Err(e) => {
                warn!(path = ?self.path, offset, error = %e, "device read failed");
                None
            }
        }
    }

    fn write(&mut self, offset: u64, data: &[u8]) -> bool {
        if !in_bounds(self.size, offset, data.len()) {
            return false;
        }
        match self.write_at(offset, data) {
            Ok(()) => true,
            Err(e) => {
                warn!(path = ?self.path, offset, error = %e, "device write failed");
                false
            }
        }
    }

    fn size(&self) -> u64 {
        self.size
    }
}
