use std::path::Path;

use proptest::prelude::*;
use tablesync_io::{export_from_source, export_rows, ExportOptions, RowSink, SqliteStore};
use tablesync_recon::model::ColumnTypes;
use tablesync_recon::{ActionTable, SyncAction, SyncResultRow, TableName};
use tempfile::tempdir;

fn config_128() -> ProptestConfig {
    ProptestConfig {
        cases: std::env::var("PROPTEST_CASES")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(128),
        failure_persistence: None,
        ..ProptestConfig::default()
    }
}

fn result_rows(actions: &[SyncAction]) -> Vec<SyncResultRow> {
    actions
        .iter()
        .enumerate()
        .map(|(i, &action)| SyncResultRow {
            action,
            fields: [("employee_id", format!("E{i}"))].into_iter().collect(),
            readmitted: false,
        })
        .collect()
}

fn options(dir: &Path) -> ExportOptions {
    ExportOptions {
        path: dir.join("sync_result.csv"),
        columns: vec!["employee_id".into(), "sync_action".into()],
        delimiter: b',',
        encoding: encoding_rs::UTF_8,
        include_header: true,
    }
}

fn load_store(rows: &[SyncResultRow], actions: &ActionTable) -> SqliteStore {
    let mut store = SqliteStore::in_memory().unwrap();
    let flat: Vec<_> = rows
        .iter()
        .map(|r| r.to_row("sync_action", actions.code(r.action)))
        .collect();
    store
        .replace_rows(
            TableName::SyncResult,
            &["employee_id".to_string(), "sync_action".to_string()],
            &ColumnTypes::new(),
            &flat,
        )
        .unwrap();
    store
}

#[test]
fn store_export_skips_disabled_add() {
    let mut actions = vec![SyncAction::Add; 5];
    actions.extend([SyncAction::Update; 3]);
    actions.extend([SyncAction::Delete; 2]);
    actions.extend([SyncAction::Keep; 4]);
    let rows = result_rows(&actions);

    let table = ActionTable::default();
    let store = load_store(&rows, &table);
    let dir = tempdir().unwrap();
    let enabled = table.with_enabled(|a| a != SyncAction::Add);

    let report = export_from_source(&store, "sync_action", &enabled, &options(dir.path()), None).unwrap();
    assert_eq!(report.row_count, 9);

    let text = std::fs::read_to_string(&report.path).unwrap();
    let mut lines = text.lines();
    assert_eq!(lines.next(), Some("employee_id,sync_action"));
    // insertion order survives the WHERE IN filter
    assert_eq!(lines.next(), Some("E5,2"));
    assert_eq!(lines.last(), Some("E13,9"));
}

#[test]
fn store_and_memory_exports_agree() {
    let rows = result_rows(&[SyncAction::Keep, SyncAction::Add, SyncAction::Delete, SyncAction::Update]);
    let table = ActionTable::default().with_enabled(|a| a != SyncAction::Keep);
    let store = load_store(&rows, &table);

    let a = tempdir().unwrap();
    let b = tempdir().unwrap();
    let from_store = export_from_source(&store, "sync_action", &table, &options(a.path()), None).unwrap();
    let from_memory = export_rows(&rows, "sync_action", &table, &options(b.path()), None).unwrap();
    assert_eq!(from_store.row_count, from_memory.row_count);
    assert_eq!(
        std::fs::read(&from_store.path).unwrap(),
        std::fs::read(&from_memory.path).unwrap()
    );
}

fn arb_action() -> impl Strategy<Value = SyncAction> {
    prop::sample::select(SyncAction::ALL.to_vec())
}

proptest! {
    #![proptest_config(config_128())]

    /// Enabling strictly more actions never exports fewer rows.
    #[test]
    fn export_monotonic(
        actions in prop::collection::vec(arb_action(), 0..40),
        smaller in prop::collection::vec(prop::bool::ANY, 4),
        extra in 0usize..4,
    ) {
        let rows = result_rows(&actions);
        let narrow = ActionTable::default().with_enabled(|a| smaller[a as usize]);
        let widen_with = SyncAction::ALL[extra];
        let wide = narrow.with_enabled(|a| narrow.is_enabled(a) || a == widen_with);

        let dir = tempdir().unwrap();
        let n = export_rows(&rows, "sync_action", &narrow, &options(&dir.path().join("n")), None).unwrap();
        let w = export_rows(&rows, "sync_action", &wide, &options(&dir.path().join("w")), None).unwrap();
        prop_assert!(w.row_count >= n.row_count);

        let expected = actions.iter().filter(|a| wide.is_enabled(**a)).count();
        prop_assert_eq!(w.row_count, expected);
    }
}
