use std::{fs::{self, File}, io::Write, path::{Path, PathBuf}};

use anyhow::{Context, Result, bail};
use tempfile::NamedTempFile;

/// Create the directory if it doesn’t exist; error if a non-directory exists there.
pub(crate) fn ensure_dir_exists(path: &Path) -> Result<()> {
    if path.exists() {
        if !path.is_dir() {
            bail!("Path exists but is not a directory: {}", path.display());
        }
    } else {
        fs::create_dir_all(path)
            .with_context(|| format!("Failed to create directory {}", path.display()))?;
    }
    Ok(())
}

/// Error unless the file already exists.
pub(crate) fn require_file_exists(path: &Path) -> Result<()> {
    if !path.exists() {
        bail!("File does not exist: {}", path.display());
    }
    if !path.is_file() {
        bail!("Path exists but is not a file: {}", path.display());
    }
    Ok(())
}

/// True if the file is missing or has zero length.
pub(crate) fn file_is_empty(path: &Path) -> Result<bool> {
    match fs::metadata(path) {
        Ok(meta) => Ok(meta.len() == 0),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(true),
        Err(e) => Err(e).with_context(|| format!("stat {}", path.display())),
    }
}

/// Write-then-rename wrapper, so readers never observe a partially written target.
pub(crate) struct PendingWrite {
    target: PathBuf,
    tmp: Option<NamedTempFile>,
}

impl PendingWrite {
    /// Open a temporary file next to `target`.
    pub(crate) fn open(target: &Path, force: bool) -> Result<Self> {
        let parent = match target.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        fs::create_dir_all(parent)
            .with_context(|| format!("create dir {}", parent.display()))?;
        if !force && target.exists() {
            bail!("Refusing to overwrite existing file: {}", target.display());
        }
        let tmp = NamedTempFile::new_in(parent)
            .with_context(|| format!("create temp file in {}", parent.display()))?;

        Ok(Self { target: target.to_path_buf(), tmp: Some(tmp) })
    }

    /// Flush, fsync and atomically move the temporary file onto the target.
    pub(crate) fn finalize(mut self) -> Result<()> {
        let Some(mut tmp) = self.tmp.take() else {
            bail!("pending write to {} already finalized", self.target.display());
        };
        tmp.flush().with_context(|| format!("flush {}", self.target.display()))?;
        tmp.as_file().sync_all().ok(); // best-effort fsync file
        tmp.persist(&self.target)
            .with_context(|| format!("rename to {}", self.target.display()))?;
        if let Some(dir) = self.target.parent() {
            let _ = File::open(dir).and_then(|f| f.sync_all());
        }
        Ok(())
    }

    fn file(&mut self) -> std::io::Result<&mut NamedTempFile> {
        self.tmp.as_mut().ok_or_else(|| std::io::Error::other("pending write already finalized"))
    }
}

impl Write for PendingWrite {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.file()?.write(buf)
    }
    fn flush(&mut self) -> std::io::Result<()> {
        self.file()?.flush()
    }
}
