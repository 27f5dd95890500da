//! The `run` and `check` pipelines: ingest → filter → store → consistency
//! check → reconcile → store → export.
//!
//! Each stage runs to completion before the next begins. Any error aborts the
//! run; the exported file only appears at its final path once it is complete.

use std::path::{Path, PathBuf};

use serde::Serialize;
use thiserror::Error;

use tablesync_io::csv::{read_table, resolve_encoding};
use tablesync_io::{export_from_source, DirArchiver, ExportOptions, ExportReport, HistoryArchiver, IoError, RowSink, RowSource, SqliteStore};
use tablesync_recon::model::{ReconMeta, ReconSummary};
use tablesync_recon::{ExclusionFilter, FilterStats, ReconConfig, ReconError, ReconInput, Row, TableName};

use crate::exit_codes::{EXIT_SYNC_DUPLICATE_KEYS, EXIT_SYNC_INVALID_CONFIG, EXIT_SYNC_RUNTIME};

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Recon(#[from] ReconError),
    #[error(transparent)]
    Io(#[from] IoError),
}

impl PipelineError {
    fn recon(&self) -> Option<&ReconError> {
        match self {
            Self::Recon(e) => Some(e),
            Self::Io(e) => e.as_recon(),
        }
    }

    pub fn exit_code(&self) -> u8 {
        let is_config = match self {
            Self::Recon(e) => e.is_config_error(),
            Self::Io(e) => e.is_config_error(),
        };
        if is_config {
            EXIT_SYNC_INVALID_CONFIG
        } else if matches!(self.recon(), Some(ReconError::DuplicateKeys { .. })) {
            EXIT_SYNC_DUPLICATE_KEYS
        } else {
            EXIT_SYNC_RUNTIME
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Overrides `[database] path`.
    pub database: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct IngestStats {
    pub provided_data: FilterStats,
    pub current_data: FilterStats,
}

#[derive(Debug, Clone, Serialize)]
pub struct PipelineReport {
    pub meta: ReconMeta,
    pub filters: IngestStats,
    pub summary: ReconSummary,
    pub export: ExportReport,
}

#[derive(Debug, Clone, Serialize)]
pub struct CheckReport {
    pub config_name: String,
    pub filters: IngestStats,
}

/// Parse and validate the config, including encoding labels.
pub fn load_config(path: &Path) -> Result<ReconConfig, PipelineError> {
    let config = ReconConfig::from_path(path)?;
    resolve_encoding(&config.tables.provided_data.csv.encoding)?;
    resolve_encoding(&config.tables.current_data.csv.encoding)?;
    resolve_encoding(&config.output.encoding)?;
    tracing::debug!(config = %config.name, path = %path.display(), "config loaded");
    Ok(config)
}

/// Input and output paths in the config are relative to the config file.
pub fn base_dir(config_path: &Path) -> PathBuf {
    config_path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."))
}

pub fn run_pipeline(config_path: &Path, options: &RunOptions) -> Result<PipelineReport, PipelineError> {
    let config = load_config(config_path)?;
    let base = base_dir(config_path);
    let mut store = open_store(&config, &base, options)?;

    let (filters, current_excluded) = ingest_and_check(&config, &base, &mut store)?;

    let input = ReconInput {
        provided: store.read_rows(TableName::ProvidedData)?,
        current: store.read_rows(TableName::CurrentData)?,
        current_excluded,
    };
    let result = tablesync_recon::run(&config, &input)?;

    let actions = config.action_table()?;
    let action_column = &config.sync_result.action_column;
    let flat: Vec<Row> = result
        .rows
        .iter()
        .map(|r| r.to_row(action_column, actions.code(r.action)))
        .collect();
    store.replace_rows(
        TableName::SyncResult,
        &config.sync_result.table_columns(),
        &config.sync_result.column_types(),
        &flat,
    )?;
    ensure_unique_keys(&store, TableName::SyncResult, &config.sync_result.key_columns)?;

    let export_options = ExportOptions::from_config(&config, &base)?;
    let archiver = config.output.history_dir.as_ref().map(|d| DirArchiver::new(base.join(d)));
    if let Some(ref a) = archiver {
        tracing::debug!(dir = %a.dir().display(), "history archive enabled");
    }
    let export = export_from_source(
        &store,
        action_column,
        &actions,
        &export_options,
        archiver.as_ref().map(|a| a as &dyn HistoryArchiver),
    )?;

    Ok(PipelineReport {
        meta: result.meta,
        filters,
        summary: result.summary,
        export,
    })
}

/// Ingest both tables and run the duplicate-key check, without reconciling.
pub fn check_pipeline(config_path: &Path, options: &RunOptions) -> Result<CheckReport, PipelineError> {
    let config = load_config(config_path)?;
    let base = base_dir(config_path);
    let mut store = open_store(&config, &base, options)?;
    let (filters, _) = ingest_and_check(&config, &base, &mut store)?;
    Ok(CheckReport {
        config_name: config.name.clone(),
        filters,
    })
}

fn open_store(config: &ReconConfig, base: &Path, options: &RunOptions) -> Result<SqliteStore, PipelineError> {
    let path = options.database.as_deref().unwrap_or(&config.database.path);
    let store = if path == tablesync_recon::config::IN_MEMORY_DB {
        SqliteStore::in_memory()?
    } else {
        SqliteStore::open(&base.join(path))?
    };
    Ok(store)
}

/// Load, filter and store both inputs, then verify key uniqueness in the
/// store. Returns filter statistics and the excluded current rows.
fn ingest_and_check(
    config: &ReconConfig,
    base: &Path,
    store: &mut SqliteStore,
) -> Result<(IngestStats, Vec<Row>), PipelineError> {
    let (provided_stats, _) = ingest_table(config, base, store, TableName::ProvidedData)?;
    let (current_stats, current_excluded) = ingest_table(config, base, store, TableName::CurrentData)?;

    for (table, keys) in [
        (TableName::ProvidedData, &config.tables.provided_data.key_columns),
        (TableName::CurrentData, &config.tables.current_data.key_columns),
    ] {
        ensure_unique_keys(store, table, keys)?;
    }

    Ok((
        IngestStats {
            provided_data: provided_stats,
            current_data: current_stats,
        },
        current_excluded,
    ))
}

/// Key uniqueness over the rows actually stored in `table`.
fn ensure_unique_keys(store: &SqliteStore, table: TableName, keys: &[String]) -> Result<(), PipelineError> {
    let duplicates = store.duplicate_keys(table, keys)?;
    if duplicates.is_empty() {
        return Ok(());
    }
    tracing::error!(table = %table, database = store.label(), duplicates = duplicates.len(), "duplicate keys");
    Err(ReconError::DuplicateKeys { table, keys: duplicates }.into())
}

fn ingest_table(
    config: &ReconConfig,
    base: &Path,
    store: &mut SqliteStore,
    table: TableName,
) -> Result<(FilterStats, Vec<Row>), PipelineError> {
    let cfg = config.table(table).ok_or_else(|| {
        ReconError::ConfigValidation(format!("table '{table}' has no input file"))
    })?;
    let path = base.join(&cfg.file);

    let loaded = read_table(&path, table, cfg)?;
    config.check_headers(table, &loaded.columns)?;

    let filter = ExclusionFilter::compile(table, &cfg.filters)?;
    let outcome = filter.split(loaded.rows);
    tracing::info!(
        table = %table,
        file = %path.display(),
        original = outcome.stats.original_count,
        filtered = outcome.stats.filtered_count,
        excluded = outcome.stats.excluded_count,
        "ingested"
    );

    store.replace_rows(table, &loaded.columns, &cfg.types, &outcome.filtered)?;
    Ok((outcome.stats, outcome.excluded))
}
