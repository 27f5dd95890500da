// Timestamped copies of exported files

use std::path::{Path, PathBuf};

use chrono::{Local, NaiveDateTime};

use crate::error::IoError;

pub trait HistoryArchiver {
    /// Copy `file` into the archive and return the archived path.
    fn archive(&self, file: &Path) -> Result<PathBuf, IoError>;
}

/// Archives into one directory as `{stem}_{YYYYMMDD_HHMMSS}[_{n}].{ext}`.
#[derive(Debug, Clone)]
pub struct DirArchiver {
    dir: PathBuf,
}

impl DirArchiver {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn archive_at(&self, file: &Path, at: NaiveDateTime) -> Result<PathBuf, IoError> {
        std::fs::create_dir_all(&self.dir).map_err(|e| IoError::io("create history dir", &self.dir, e))?;

        let stem = file.file_stem().map(|s| s.to_string_lossy().into_owned()).unwrap_or_else(|| "export".into());
        let ext = file.extension().map(|e| format!(".{}", e.to_string_lossy())).unwrap_or_default();
        let stamp = at.format("%Y%m%d_%H%M%S");

        let mut target = self.dir.join(format!("{stem}_{stamp}{ext}"));
        let mut n = 1;
        while target.exists() {
            target = self.dir.join(format!("{stem}_{stamp}_{n}{ext}"));
            n += 1;
        }

        std::fs::copy(file, &target).map_err(|e| IoError::io("archive", file, e))?;
        tracing::info!(from = %file.display(), to = %target.display(), "archived");
        Ok(target)
    }
}

impl HistoryArchiver for DirArchiver {
    fn archive(&self, file: &Path) -> Result<PathBuf, IoError> {
        self.archive_at(file, Local::now().naive_local())
    }
}
