use crate::action::SyncAction;
use crate::classify::classify;
use crate::config::{OutputColumn, ReconConfig};
use crate::consistency::check_unique_keys;
use crate::error::ReconError;
use crate::matcher::{match_rows, JoinPlan, Pairing};
use crate::model::{ColumnType, ReconInput, ReconMeta, ReconResult, Row, SyncResultRow, TableName, Value};
use crate::summary::compute_summary;

/// Reconcile filtered provided rows against filtered current rows.
///
/// Output order is provided order (ADD / UPDATE / KEEP interleaved as they
/// occur), then DELETE rows in current order. Duplicate keys are not
/// detected here; run [`check_unique_keys`](crate::consistency::check_unique_keys)
/// on each side first.
pub fn reconcile(
    provided: &[Row],
    current: &[Row],
    config: &ReconConfig,
) -> Result<Vec<SyncResultRow>, ReconError> {
    let plan = JoinPlan::from_config(config);

    // Header checks normally catch this earlier; rows built in memory skip them.
    if let Some(first) = provided.first() {
        require_columns(TableName::ProvidedData, first, plan.provided_keys.iter())?;
        require_columns(TableName::ProvidedData, first, plan.comparisons.iter().map(|(p, _)| p))?;
    }
    if let Some(first) = current.first() {
        require_columns(TableName::CurrentData, first, plan.current_keys.iter())?;
        require_columns(TableName::CurrentData, first, plan.comparisons.iter().map(|(_, c)| c))?;
    }

    let pairings = match_rows(provided, current, &plan);
    let classified = classify(&pairings, &plan);

    let mut rows = Vec::with_capacity(classified.len());
    for item in &classified {
        let (p, c) = match item.pairing {
            Pairing::ProvidedOnly(p) => (Some(p), None),
            Pairing::Matched { provided, current } => (Some(provided), Some(current)),
            Pairing::CurrentOnly(c) => (None, Some(c)),
        };
        if let (Some(row), false) = (p, item.changed.is_empty()) {
            tracing::trace!(key = %plan.provided_key(row), changed = ?item.changed, "update");
        }
        rows.push(SyncResultRow {
            action: item.action,
            fields: resolve_fields(&config.sync_result.columns, item.action, p, c)?,
            readmitted: false,
        });
    }

    Ok(rows)
}

/// Full engine pass: reconcile, re-admit excluded current rows when
/// configured, verify `sync_result` key uniqueness, and summarize.
///
/// Re-admitted rows must be unique among themselves on the current key
/// columns, and the final rows must be unique on `sync_result.key_columns`;
/// either violation is a `DuplicateKeys` error.
pub fn run(config: &ReconConfig, input: &ReconInput) -> Result<ReconResult, ReconError> {
    let mut rows = reconcile(&input.provided, &input.current, config)?;

    if config.tables.current_data.output_excluded_as_keep && !input.current_excluded.is_empty() {
        check_unique_keys(
            TableName::CurrentData,
            &input.current_excluded,
            &config.tables.current_data.key_columns,
        )?;
        for excluded in &input.current_excluded {
            rows.push(SyncResultRow {
                action: SyncAction::Keep,
                fields: resolve_fields(&config.sync_result.columns, SyncAction::Keep, None, Some(excluded))?,
                readmitted: true,
            });
        }
        tracing::info!(rows = input.current_excluded.len(), "re-admitted excluded current rows as keep");
    }

    check_unique_keys(
        TableName::SyncResult,
        rows.iter().map(|r| &r.fields),
        &config.sync_result.key_columns,
    )?;

    let summary = compute_summary(input.provided.len(), input.current.len(), &rows);
    let actions = config.action_table()?;
    tracing::info!(
        config = %config.name,
        add = summary.count(SyncAction::Add),
        update = summary.count(SyncAction::Update),
        delete = summary.count(SyncAction::Delete),
        keep = summary.count(SyncAction::Keep),
        total = summary.total_rows,
        "reconciliation complete"
    );
    for action in SyncAction::ALL {
        tracing::debug!(
            action = actions.label(action),
            code = actions.code(action),
            enabled = actions.is_enabled(action),
            rows = summary.count(action),
            "action breakdown"
        );
    }

    Ok(ReconResult {
        meta: ReconMeta {
            config_name: config.name.clone(),
            engine_version: env!("CARGO_PKG_VERSION").to_string(),
            run_at: chrono::Utc::now().to_rfc3339(),
        },
        summary,
        rows,
    })
}

/// Resolve every output column through the chain for `action`.
fn resolve_fields(
    columns: &[OutputColumn],
    action: SyncAction,
    provided: Option<&Row>,
    current: Option<&Row>,
) -> Result<Row, ReconError> {
    let mut fields = Row::with_capacity(columns.len());
    for column in columns {
        let value = column.chain_for(action).resolve(provided, current, column.ty);
        fields.insert(column.name.as_str(), conform(value, column)?);
    }
    Ok(fields)
}

/// Coerce a text value into the output column's declared type.
fn conform(value: Value, column: &OutputColumn) -> Result<Value, ReconError> {
    match (&value, column.ty) {
        (Value::Text(text), ColumnType::Integer | ColumnType::Date) => {
            Value::parse(text, column.ty).map_err(|_| ReconError::ValueParse {
                table: TableName::SyncResult,
                column: column.name.clone(),
                value: text.clone(),
                kind: column.ty.to_string(),
            })
        }
        _ => Ok(value),
    }
}

fn require_columns<'a>(
    table: TableName,
    row: &Row,
    columns: impl Iterator<Item = &'a String>,
) -> Result<(), ReconError> {
    for column in columns {
        if !row.contains(column) {
            return Err(ReconError::MissingColumn {
                table,
                column: column.clone(),
            });
        }
    }
    Ok(())
}
