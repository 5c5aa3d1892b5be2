//! File persistence for keystore documents.
//!
//! The codec never touches the filesystem; this is the caller-side helper
//! the binary uses to keep a document on disk.

use anyhow::{Context, Result};
use getrandom::fill;
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

/// A keystore document on disk.
#[derive(Debug, Clone)]
pub struct Storage {
    path: PathBuf,
}

impl Storage {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Returns `true` if the document file exists.
    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Reads the whole document.
    pub fn load(&self) -> Result<Vec<u8>> {
        fs::read(&self.path)
            .with_context(|| format!("failed to read keystore {}", self.path.display()))
    }

    /// Writes the document crash-safely.
    ///
    /// Data goes to a randomly named sibling file which is synced and then
    /// renamed over the target, followed by a sync of the directory. A crash
    /// leaves either the old or the new document, never a partial one.
    /// Parent directories are created as needed; on Unix the file is 0600.
    pub fn save(&self, data: &[u8]) -> Result<()> {
        let dir = self.parent_dir();
        fs::create_dir_all(dir)?;

        let tmp_path = self.random_tmp_path()?;
        let tmp_file = open_private(&tmp_path).context("failed to create temporary file")?;

        let written = write_synced(tmp_file, data)
            .context("failed to write temporary file")
            .and_then(|()| self.atomic_replace(&tmp_path));
        if let Err(e) = written {
            let _ = fs::remove_file(&tmp_path);
            return Err(e);
        }

        sync_dir(dir)?;
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Directory holding the document; `.` for a bare file name.
    fn parent_dir(&self) -> &Path {
        self.path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or(Path::new("."))
    }

    /// `<file name>.tmp.<16 hex chars>` next to the target.
    fn random_tmp_path(&self) -> Result<PathBuf> {
        let mut buf = [0u8; 8];
        fill(&mut buf).map_err(|e| anyhow::anyhow!("OS random generator unavailable: {e}"))?;

        let file_name = self
            .path
            .file_name()
            .context("keystore path has no file name")?
            .to_string_lossy();

        Ok(self
            .path
            .with_file_name(format!("{file_name}.tmp.{}", hex::encode(buf))))
    }

    /// Uses `ReplaceFileW` with `REPLACEFILE_WRITE_THROUGH` when the target
    /// exists, a plain rename otherwise.
    #[cfg(target_os = "windows")]
    fn atomic_replace(&self, tmp_path: &Path) -> Result<()> {
        use std::ffi::OsStr;
        use std::os::windows::ffi::OsStrExt;
        use windows_sys::Win32::Storage::FileSystem::{REPLACEFILE_WRITE_THROUGH, ReplaceFileW};

        if !self.path.exists() {
            fs::rename(tmp_path, &self.path)?;
            return Ok(());
        }

        fn to_wide(s: &OsStr) -> Vec<u16> {
            s.encode_wide().chain(std::iter::once(0)).collect()
        }

        let target_w = to_wide(self.path.as_os_str());
        let tmp_w = to_wide(tmp_path.as_os_str());

        // SAFETY: both buffers are NUL-terminated UTF-16 that outlive the call,
        // and ReplaceFileW keeps no pointer after returning.
        let result = unsafe {
            ReplaceFileW(
                target_w.as_ptr(),
                tmp_w.as_ptr(),
                std::ptr::null(),
                REPLACEFILE_WRITE_THROUGH,
                std::ptr::null(),
                std::ptr::null(),
            )
        };

        if result == 0 {
            let err = std::io::Error::last_os_error();
            return Err(err).context("atomic replace failed");
        }

        Ok(())
    }

    /// `rename()` is atomic within one filesystem.
    #[cfg(not(target_os = "windows"))]
    fn atomic_replace(&self, tmp_path: &Path) -> Result<()> {
        fs::rename(tmp_path, &self.path)?;
        Ok(())
    }
}

#[cfg(unix)]
fn open_private(path: &Path) -> std::io::Result<File> {
    use std::os::unix::fs::OpenOptionsExt;

    OpenOptions::new()
        .write(true)
        .create_new(true)
        .mode(0o600)
        .open(path)
}

#[cfg(not(unix))]
fn open_private(path: &Path) -> std::io::Result<File> {
    OpenOptions::new().write(true).create_new(true).open(path)
}

fn write_synced(mut file: File, data: &[u8]) -> std::io::Result<()> {
    file.write_all(data)?;
    file.sync_all()
}

#[cfg(not(target_os = "windows"))]
fn sync_dir(dir: &Path) -> std::io::Result<()> {
    File::open(dir)?.sync_all()
}

// directories cannot be opened as files on Windows; ReplaceFileW writes through
#[cfg(target_os = "windows")]
fn sync_dir(_dir: &Path) -> std::io::Result<()> {
    Ok(())
}
