//! Result export: filter `sync_result` by enabled action codes, write CSV,
//! archive a copy.
//!
//! The CSV is written to a `.partial` sibling and renamed over the target
//! only after the last byte is flushed, so a file at the output path is
//! always complete.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use encoding_rs::Encoding;
use serde::Serialize;

use tablesync_recon::config::ReconConfig;
use tablesync_recon::{ActionTable, Row, SyncResultRow, TableName};

use crate::csv::{resolve_encoding, write_rows, CsvDialect};
use crate::error::IoError;
use crate::history::HistoryArchiver;
use crate::store::RowSource;

/// `action code ∈ {codes of enabled actions}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportPredicate {
    codes: Vec<String>,
}

impl ExportPredicate {
    pub fn from_actions(actions: &ActionTable) -> Self {
        Self {
            codes: actions.enabled_codes().into_iter().map(str::to_string).collect(),
        }
    }

    pub fn codes(&self) -> Vec<&str> {
        self.codes.iter().map(|c| c.as_str()).collect()
    }

    pub fn is_unsatisfiable(&self) -> bool {
        self.codes.is_empty()
    }

    pub fn matches(&self, code: &str) -> bool {
        self.codes.iter().any(|c| c == code)
    }
}

#[derive(Debug, Clone)]
pub struct ExportOptions {
    pub path: PathBuf,
    pub columns: Vec<String>,
    pub delimiter: u8,
    pub encoding: &'static Encoding,
    pub include_header: bool,
}

impl ExportOptions {
    /// Build from `[output]`, resolving relative paths against `base_dir`.
    pub fn from_config(config: &ReconConfig, base_dir: &Path) -> Result<Self, IoError> {
        let output = &config.output;
        Ok(Self {
            path: base_dir.join(&output.file),
            columns: config.output_columns(),
            delimiter: output.delimiter_byte(),
            encoding: resolve_encoding(&output.encoding)?,
            include_header: output.include_header,
        })
    }

    fn dialect(&self) -> CsvDialect {
        CsvDialect {
            delimiter: self.delimiter,
            encoding: self.encoding,
            include_header: self.include_header,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExportReport {
    pub row_count: usize,
    pub path: PathBuf,
    pub archived: Option<PathBuf>,
}

/// Export the rows of `sync_result` whose action code is enabled.
pub fn export_from_source(
    source: &dyn RowSource,
    action_column: &str,
    actions: &ActionTable,
    options: &ExportOptions,
    archiver: Option<&dyn HistoryArchiver>,
) -> Result<ExportReport, IoError> {
    let predicate = ExportPredicate::from_actions(actions);
    warn_if_unsatisfiable(&predicate);
    let rows = source.read_rows_where_in(TableName::SyncResult, action_column, &predicate.codes())?;
    write_export(&rows, options, archiver)
}

/// In-memory variant: export engine rows directly, attaching action codes.
pub fn export_rows(
    rows: &[SyncResultRow],
    action_column: &str,
    actions: &ActionTable,
    options: &ExportOptions,
    archiver: Option<&dyn HistoryArchiver>,
) -> Result<ExportReport, IoError> {
    let predicate = ExportPredicate::from_actions(actions);
    warn_if_unsatisfiable(&predicate);
    let selected: Vec<Row> = select_rows(rows, action_column, actions, &predicate);
    write_export(&selected, options, archiver)
}

/// Flatten rows whose action is enabled, in order.
pub fn select_rows(
    rows: &[SyncResultRow],
    action_column: &str,
    actions: &ActionTable,
    predicate: &ExportPredicate,
) -> Vec<Row> {
    rows.iter()
        .filter_map(|r| {
            let code = actions.code(r.action);
            predicate.matches(code).then(|| r.to_row(action_column, code))
        })
        .collect()
}

fn warn_if_unsatisfiable(predicate: &ExportPredicate) {
    if predicate.is_unsatisfiable() {
        tracing::warn!("all sync actions are disabled; exporting header only");
    }
}

fn write_export(
    rows: &[Row],
    options: &ExportOptions,
    archiver: Option<&dyn HistoryArchiver>,
) -> Result<ExportReport, IoError> {
    let path = &options.path;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| IoError::io("create output dir", parent, e))?;
    }

    let partial = partial_path(path);
    let written = write_partial(&partial, rows, options);
    let row_count = match written {
        Ok(n) => n,
        Err(e) => {
            let _ = std::fs::remove_file(&partial);
            return Err(e);
        }
    };
    std::fs::rename(&partial, path).map_err(|e| IoError::io("rename", path, e))?;
    tracing::info!(path = %path.display(), rows = row_count, "exported");

    let archived = match archiver {
        Some(a) => Some(a.archive(path)?),
        None => None,
    };

    Ok(ExportReport {
        row_count,
        path: path.clone(),
        archived,
    })
}

fn write_partial(partial: &Path, rows: &[Row], options: &ExportOptions) -> Result<usize, IoError> {
    let file = File::create(partial).map_err(|e| IoError::io("create", partial, e))?;
    let mut out = BufWriter::new(file);
    let n = write_rows(&mut out, &options.columns, rows, &options.dialect())
        .map_err(|e| IoError::csv("write", partial, e))?;
    out.flush().map_err(|e| IoError::io("flush", partial, e))?;
    out.get_ref().sync_all().map_err(|e| IoError::io("sync", partial, e))?;
    Ok(n)
}

fn partial_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".partial");
    path.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::DirArchiver;
    use tablesync_recon::SyncAction;
    use tempfile::tempdir;

    fn rows(counts: &[(SyncAction, usize)]) -> Vec<SyncResultRow> {
        let mut out = Vec::new();
        for &(action, n) in counts {
            for i in 0..n {
                out.push(SyncResultRow {
                    action,
                    fields: [("id", format!("{action}-{i}"))].into_iter().collect(),
                    readmitted: false,
                });
            }
        }
        out
    }

    fn options(dir: &Path) -> ExportOptions {
        ExportOptions {
            path: dir.join("out/sync_result.csv"),
            columns: vec!["id".into(), "sync_action".into()],
            delimiter: b',',
            encoding: encoding_rs::UTF_8,
            include_header: true,
        }
    }

    #[test]
    fn disabled_add_is_filtered_out() {
        let dir = tempdir().unwrap();
        let data = rows(&[
            (SyncAction::Add, 5),
            (SyncAction::Update, 3),
            (SyncAction::Delete, 2),
            (SyncAction::Keep, 4),
        ]);
        let actions = ActionTable::default().with_enabled(|a| a != SyncAction::Add);
        let report = export_rows(&data, "sync_action", &actions, &options(dir.path()), None).unwrap();
        assert_eq!(report.row_count, 9);

        let text = std::fs::read_to_string(&report.path).unwrap();
        assert_eq!(text.lines().count(), 10);
        assert!(!text.contains(",1\n"));
        assert!(text.starts_with("id,sync_action\nupdate-0,2\n"));
    }

    #[test]
    fn all_disabled_writes_header_only() {
        let dir = tempdir().unwrap();
        let data = rows(&[(SyncAction::Add, 2)]);
        let actions = ActionTable::default().with_enabled(|_| false);
        let report = export_rows(&data, "sync_action", &actions, &options(dir.path()), None).unwrap();
        assert_eq!(report.row_count, 0);
        assert_eq!(std::fs::read_to_string(&report.path).unwrap(), "id,sync_action\n");
    }

    #[test]
    fn archive_copy_and_no_partial_left() {
        let dir = tempdir().unwrap();
        let archiver = DirArchiver::new(dir.path().join("history"));
        let data = rows(&[(SyncAction::Keep, 1)]);
        let opts = options(dir.path());
        let report = export_rows(&data, "sync_action", &ActionTable::default(), &opts, Some(&archiver as &dyn HistoryArchiver)).unwrap();

        let archived = report.archived.unwrap();
        assert!(archived.starts_with(dir.path().join("history")));
        assert_eq!(
            std::fs::read(&archived).unwrap(),
            std::fs::read(&report.path).unwrap()
        );
        assert!(!partial_path(&opts.path).exists());
    }

    #[test]
    fn predicate_follows_enablement() {
        let actions = ActionTable::default().with_enabled(|a| matches!(a, SyncAction::Delete | SyncAction::Keep));
        let p = ExportPredicate::from_actions(&actions);
        assert_eq!(p.codes(), vec!["3", "9"]);
        assert!(p.matches("9"));
        assert!(!p.matches("1"));
        assert!(!p.is_unsatisfiable());
    }

    #[test]
    fn partial_name_is_sibling() {
        assert_eq!(
            partial_path(Path::new("/tmp/out/a.csv")),
            PathBuf::from("/tmp/out/a.csv.partial")
        );
    }
}
