use std::path::{Path, PathBuf};

use thiserror::Error;

use tablesync_recon::{ReconError, TableName};

#[derive(Debug, Error)]
pub enum IoError {
    #[error("{op} {}: {source}", path.display())]
    Io {
        op: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("{op} {}: {source}", path.display())]
    Csv {
        op: &'static str,
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
    #[error("parse {}: table '{table}' line {line} has {found} fields, expected {expected}", path.display())]
    Shape {
        path: PathBuf,
        table: TableName,
        line: u64,
        found: usize,
        expected: usize,
    },
    #[error("store {op} on table '{table}': {source}")]
    Store {
        op: &'static str,
        table: String,
        #[source]
        source: rusqlite::Error,
    },
    #[error("unknown encoding label '{label}'")]
    Encoding { label: String },
    #[error(transparent)]
    Recon(#[from] ReconError),
}

impl IoError {
    pub(crate) fn io(op: &'static str, path: &Path, source: std::io::Error) -> Self {
        Self::Io {
            op,
            path: path.to_path_buf(),
            source,
        }
    }

    pub(crate) fn csv(op: &'static str, path: &Path, source: csv::Error) -> Self {
        Self::Csv {
            op,
            path: path.to_path_buf(),
            source,
        }
    }

    pub(crate) fn store(op: &'static str, table: impl std::fmt::Display, source: rusqlite::Error) -> Self {
        Self::Store {
            op,
            table: table.to_string(),
            source,
        }
    }

    /// The wrapped engine error, if this is one.
    pub fn as_recon(&self) -> Option<&ReconError> {
        match self {
            Self::Recon(e) => Some(e),
            _ => None,
        }
    }

    pub fn is_config_error(&self) -> bool {
        match self {
            Self::Encoding { .. } => true,
            Self::Recon(e) => e.is_config_error(),
            _ => false,
        }
    }
}

/// Store errors before a table exists carry the database path instead.
pub(crate) fn db_label(path: &str) -> String {
    format!("<database {path}>")
}
