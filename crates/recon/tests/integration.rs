use tablesync_recon::consistency::check_unique_keys;
use tablesync_recon::engine::{reconcile, run};
use tablesync_recon::model::{ReconInput, Row, TableName, Value};
use tablesync_recon::{ReconConfig, ReconError, SyncAction};

const CONFIG: &str = r#"
name = "Employee Sync"

[tables.provided_data]
file = "provided.csv"
key_columns = ["employee_id"]
filters = [{ field = "employee_id", type = "exclude", glob = "TEMP*" }]

[tables.current_data]
file = "current.csv"
key_columns = ["user_id"]
output_excluded_as_keep = true
filters = [{ field = "user_id", type = "exclude", glob = "ADM[0-9]*" }]

[column_mapping]
employee_id = "user_id"
name = "user_name"
phone = "user_phone"

[sync_result]
key_columns = ["employee_id"]

[[sync_result.columns]]
name = "employee_id"
sources = [{ provided_data = "employee_id" }, { current_data = "user_id" }]

[[sync_result.columns]]
name = "name"
sources = [{ provided_data = "name" }, { current_data = "user_name" }]

[[sync_result.columns]]
name = "phone"
sources = [{ current_data = "user_phone" }, { provided_data = "phone" }]
add = [{ provided_data = "phone" }]

[[sync_result.columns]]
name = "department"
sources = [{ provided_data = "dept" }, { fixed_value = "GENERAL" }]
delete = [{ fixed_value = "RETIRED" }]

[output]
file = "sync_result.csv"
"#;

fn config() -> ReconConfig {
    ReconConfig::from_toml(CONFIG).unwrap()
}

fn provided(id: &str, name: &str, phone: Option<&str>, dept: Option<&str>) -> Row {
    let mut r = Row::new();
    r.insert("employee_id", id);
    r.insert("name", name);
    r.insert("phone", phone.map(Value::from).unwrap_or(Value::Null));
    r.insert("dept", dept.map(Value::from).unwrap_or(Value::Null));
    r
}

fn current(id: &str, name: &str, phone: Option<&str>) -> Row {
    let mut r = Row::new();
    r.insert("user_id", id);
    r.insert("user_name", name);
    r.insert("user_phone", phone.map(Value::from).unwrap_or(Value::Null));
    r
}

fn text(v: &str) -> Value {
    Value::from(v)
}

// -------------------------------------------------------------------------
// Scenarios
// -------------------------------------------------------------------------

#[test]
fn scenario_add() {
    let rows = reconcile(&[provided("E1", "Alice", None, None)], &[], &config()).unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].action, SyncAction::Add);
    let flat = rows[0].to_row("sync_action", config().action_table().unwrap().code(rows[0].action));
    assert_eq!(flat.value("sync_action"), &text("1"));
}

#[test]
fn scenario_keep() {
    let rows = reconcile(
        &[provided("E1", "Alice", None, None)],
        &[current("E1", "Alice", None)],
        &config(),
    )
    .unwrap();
    assert_eq!(rows[0].action, SyncAction::Keep);
    assert_eq!(config().action_table().unwrap().code(SyncAction::Keep), "9");
}

#[test]
fn scenario_update_mixes_sources_per_column() {
    let rows = reconcile(
        &[provided("E1", "Bob", Some("555-0100"), None)],
        &[current("E1", "Alice", Some("555-0199"))],
        &config(),
    )
    .unwrap();
    let r = &rows[0];
    assert_eq!(r.action, SyncAction::Update);
    // name: provided first
    assert_eq!(r.fields.value("name"), &text("Bob"));
    // phone: current first
    assert_eq!(r.fields.value("phone"), &text("555-0199"));
    // department: provided dept is null, falls to fixed value
    assert_eq!(r.fields.value("department"), &text("GENERAL"));
}

#[test]
fn scenario_delete_uses_delete_chain() {
    let rows = reconcile(&[], &[current("E1", "Alice", Some("555-0199"))], &config()).unwrap();
    let r = &rows[0];
    assert_eq!(r.action, SyncAction::Delete);
    assert_eq!(r.fields.value("employee_id"), &text("E1"));
    assert_eq!(r.fields.value("department"), &text("RETIRED"));
}

#[test]
fn scenario_add_uses_add_override() {
    let rows = reconcile(&[provided("E9", "Zed", Some("555-0000"), Some("OPS"))], &[], &config()).unwrap();
    assert_eq!(rows[0].fields.value("phone"), &text("555-0000"));
    assert_eq!(rows[0].fields.value("department"), &text("OPS"));
}

#[test]
fn scenario_duplicate_provided_key() {
    let rows = vec![
        provided("E1", "Alice", None, None),
        provided("E1", "Alice B", None, None),
    ];
    let config = config();
    let err = check_unique_keys(
        TableName::ProvidedData,
        &rows,
        &config.tables.provided_data.key_columns,
    )
    .unwrap_err();
    match &err {
        ReconError::DuplicateKeys { table, keys } => {
            assert_eq!(*table, TableName::ProvidedData);
            assert_eq!(keys.len(), 1);
            assert_eq!(keys[0].key.to_string(), "E1");
            assert_eq!(keys[0].count, 2);
        }
        other => panic!("unexpected: {other}"),
    }
}

// -------------------------------------------------------------------------
// Full pass with filters and re-admission
// -------------------------------------------------------------------------

#[test]
fn filtered_run_with_readmission() {
    let config = config();
    let provided_filter = tablesync_recon::ExclusionFilter::compile(
        TableName::ProvidedData,
        &config.tables.provided_data.filters,
    )
    .unwrap();
    let current_filter = tablesync_recon::ExclusionFilter::compile(
        TableName::CurrentData,
        &config.tables.current_data.filters,
    )
    .unwrap();

    let p = provided_filter.split(vec![
        provided("E1", "Alice", None, Some("HR")),
        provided("TEMP7", "Temp", None, None),
        provided("E2", "Bob", None, None),
    ]);
    let c = current_filter.split(vec![
        current("E1", "Alice", None),
        current("ADM1", "Root", None),
        current("E3", "Carol", None),
        current("ADMIN", "Not excluded", None),
    ]);
    assert_eq!(p.stats.excluded_count, 1);
    assert_eq!(c.stats.excluded_count, 1);

    let input = ReconInput {
        provided: p.filtered,
        current: c.filtered,
        current_excluded: c.excluded,
    };
    let result = run(&config, &input).unwrap();

    let got: Vec<(String, SyncAction)> = result
        .rows
        .iter()
        .map(|r| (r.fields.value("employee_id").to_string(), r.action))
        .collect();
    assert_eq!(
        got,
        vec![
            ("E1".to_string(), SyncAction::Keep),
            ("E2".to_string(), SyncAction::Add),
            ("E3".to_string(), SyncAction::Delete),
            ("ADMIN".to_string(), SyncAction::Delete),
            ("ADM1".to_string(), SyncAction::Keep),
        ]
    );
    assert_eq!(result.summary.keep, 2);
    assert_eq!(result.summary.readmitted_keep, 1);
    assert_eq!(result.summary.provided_rows, 2);
    assert_eq!(result.summary.current_rows, 3);

    let json = serde_json::to_value(&result.summary).unwrap();
    assert_eq!(json["add"], 1);
    assert_eq!(json["readmitted_keep"], 1);
}

#[test]
fn reconcile_is_idempotent() {
    let config = config();
    let p = vec![provided("E1", "Bob", None, None), provided("E2", "Ann", None, None)];
    let c = vec![current("E1", "Alice", None), current("E5", "Eve", None)];
    let a = reconcile(&p, &c, &config).unwrap();
    let b = reconcile(&p, &c, &config).unwrap();
    assert_eq!(a, b);
}
