use std::collections::HashSet;
use std::path::Path;

use indexmap::IndexMap;
use serde::Deserialize;

use crate::action::{ActionTable, SyncAction, SyncActionsConfig};
use crate::error::ReconError;
use crate::filter::{ExclusionFilter, FilterRule};
use crate::model::{ColumnType, ColumnTypes, TableName, Value};
use crate::source::FieldSourceChain;

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ReconConfig {
    pub name: String,
    #[serde(default)]
    pub database: DatabaseConfig,
    pub tables: TablesConfig,
    /// Provided column → current column.
    pub column_mapping: IndexMap<String, String>,
    pub sync_result: SyncResultConfig,
    #[serde(default)]
    pub sync_actions: SyncActionsConfig,
    pub output: OutputConfig,
}

// ---------------------------------------------------------------------------
// Database
// ---------------------------------------------------------------------------

pub const IN_MEMORY_DB: &str = ":memory:";

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DatabaseConfig {
    #[serde(default = "default_db_path")]
    pub path: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

impl DatabaseConfig {
    pub fn is_in_memory(&self) -> bool {
        self.path == IN_MEMORY_DB
    }
}

fn default_db_path() -> String {
    IN_MEMORY_DB.into()
}

// ---------------------------------------------------------------------------
// Input tables
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TablesConfig {
    pub provided_data: InputTableConfig,
    pub current_data: InputTableConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct InputTableConfig {
    pub file: String,
    pub key_columns: Vec<String>,
    /// Expected columns. Required when the CSV has no header row.
    #[serde(default)]
    pub columns: Option<Vec<String>>,
    #[serde(default)]
    pub csv: CsvOptions,
    #[serde(default)]
    pub types: ColumnTypes,
    #[serde(default)]
    pub filters: Vec<FilterRule>,
    /// Re-admit rows dropped by `filters` as KEEP. Only honoured on `current_data`.
    #[serde(default)]
    pub output_excluded_as_keep: bool,
}

impl InputTableConfig {
    pub fn column_type(&self, column: &str) -> ColumnType {
        self.types.get(column).copied().unwrap_or_default()
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CsvOptions {
    #[serde(default = "default_delimiter")]
    pub delimiter: char,
    #[serde(default = "default_encoding")]
    pub encoding: String,
    #[serde(default = "default_true")]
    pub has_header: bool,
}

impl Default for CsvOptions {
    fn default() -> Self {
        Self {
            delimiter: default_delimiter(),
            encoding: default_encoding(),
            has_header: true,
        }
    }
}

impl CsvOptions {
    /// The delimiter as the single byte the `csv` crate expects.
    pub fn delimiter_byte(&self) -> u8 {
        // validate() guarantees ASCII
        self.delimiter as u8
    }
}

fn default_delimiter() -> char {
    ','
}

fn default_encoding() -> String {
    "utf-8".into()
}

fn default_true() -> bool {
    true
}

// ---------------------------------------------------------------------------
// Sync result
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SyncResultConfig {
    pub key_columns: Vec<String>,
    #[serde(default = "default_action_column")]
    pub action_column: String,
    pub columns: Vec<OutputColumn>,
}

fn default_action_column() -> String {
    "sync_action".into()
}

impl SyncResultConfig {
    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.name.as_str())
    }

    /// Output column names followed by the action column.
    pub fn table_columns(&self) -> Vec<String> {
        self.column_names()
            .map(str::to_string)
            .chain(std::iter::once(self.action_column.clone()))
            .collect()
    }

    pub fn column_types(&self) -> ColumnTypes {
        self.columns.iter().map(|c| (c.name.clone(), c.ty)).collect()
    }
}

/// One `[[sync_result.columns]]` entry: a default source chain plus optional
/// per-action overrides.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OutputColumn {
    pub name: String,
    #[serde(default, rename = "type")]
    pub ty: ColumnType,
    #[serde(default)]
    pub sources: FieldSourceChain,
    #[serde(default)]
    pub add: Option<FieldSourceChain>,
    #[serde(default)]
    pub update: Option<FieldSourceChain>,
    #[serde(default)]
    pub delete: Option<FieldSourceChain>,
    #[serde(default)]
    pub keep: Option<FieldSourceChain>,
}

impl OutputColumn {
    pub fn chain_for(&self, action: SyncAction) -> &FieldSourceChain {
        let over = match action {
            SyncAction::Add => &self.add,
            SyncAction::Update => &self.update,
            SyncAction::Delete => &self.delete,
            SyncAction::Keep => &self.keep,
        };
        over.as_ref().unwrap_or(&self.sources)
    }

    fn chains(&self) -> impl Iterator<Item = (SyncAction, &FieldSourceChain)> {
        SyncAction::ALL.into_iter().map(move |a| (a, self.chain_for(a)))
    }
}

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OutputConfig {
    pub file: String,
    #[serde(default)]
    pub history_dir: Option<String>,
    #[serde(default = "default_delimiter")]
    pub delimiter: char,
    #[serde(default = "default_encoding")]
    pub encoding: String,
    #[serde(default = "default_true")]
    pub include_header: bool,
    #[serde(default)]
    pub columns: Option<Vec<String>>,
}

impl OutputConfig {
    pub fn delimiter_byte(&self) -> u8 {
        self.delimiter as u8
    }
}

// ---------------------------------------------------------------------------
// Parse + Validate
// ---------------------------------------------------------------------------

impl ReconConfig {
    pub fn from_toml(input: &str) -> Result<Self, ReconError> {
        let config: ReconConfig =
            toml::from_str(input).map_err(|e| ReconError::ConfigParse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: &Path) -> Result<Self, ReconError> {
        let input = std::fs::read_to_string(path).map_err(|e| {
            ReconError::ConfigParse(format!("cannot read {}: {e}", path.display()))
        })?;
        Self::from_toml(&input)
    }

    pub fn table(&self, table: TableName) -> Option<&InputTableConfig> {
        match table {
            TableName::ProvidedData => Some(&self.tables.provided_data),
            TableName::CurrentData => Some(&self.tables.current_data),
            TableName::SyncResult => None,
        }
    }

    pub fn action_table(&self) -> Result<ActionTable, ReconError> {
        ActionTable::from_config(&self.sync_actions)
    }

    /// Current-side key columns in provided key order.
    pub fn mapped_key_columns(&self) -> Vec<&str> {
        self.tables
            .provided_data
            .key_columns
            .iter()
            .filter_map(|k| self.column_mapping.get(k).map(|s| s.as_str()))
            .collect()
    }

    /// Mapping entries that are not key columns: (provided, current).
    pub fn comparison_columns(&self) -> Vec<(&str, &str)> {
        let keys = &self.tables.provided_data.key_columns;
        self.column_mapping
            .iter()
            .filter(|(p, _)| !keys.contains(p))
            .map(|(p, c)| (p.as_str(), c.as_str()))
            .collect()
    }

    /// Export column order: explicit list or sync_result columns + action column.
    pub fn output_columns(&self) -> Vec<String> {
        match &self.output.columns {
            Some(cols) => cols.clone(),
            None => self.sync_result.table_columns(),
        }
    }

    pub fn validate(&self) -> Result<(), ReconError> {
        if self.name.trim().is_empty() {
            return Err(ReconError::ConfigValidation("name must not be empty".into()));
        }

        self.validate_input_table(TableName::ProvidedData, &self.tables.provided_data)?;
        self.validate_input_table(TableName::CurrentData, &self.tables.current_data)?;

        if self.tables.provided_data.output_excluded_as_keep {
            return Err(ReconError::ConfigValidation(
                "output_excluded_as_keep is only supported on current_data".into(),
            ));
        }

        self.validate_mapping()?;
        self.validate_sync_result()?;
        self.action_table()?;
        self.validate_output()?;
        Ok(())
    }

    fn validate_input_table(&self, table: TableName, cfg: &InputTableConfig) -> Result<(), ReconError> {
        if cfg.file.trim().is_empty() {
            return Err(ReconError::ConfigValidation(format!("table '{table}': file must not be empty")));
        }
        if cfg.key_columns.is_empty() {
            return Err(ReconError::ConfigValidation(format!(
                "table '{table}': key_columns must not be empty"
            )));
        }
        check_unique_names(&format!("table '{table}' key_columns"), &cfg.key_columns)?;

        if !cfg.csv.has_header && cfg.columns.is_none() {
            return Err(ReconError::ConfigValidation(format!(
                "table '{table}': columns must be declared when has_header = false"
            )));
        }
        check_delimiter(&format!("table '{table}'"), cfg.csv.delimiter)?;

        if let Some(ref columns) = cfg.columns {
            check_unique_names(&format!("table '{table}' columns"), columns)?;
            for key in &cfg.key_columns {
                if !columns.contains(key) {
                    return Err(ReconError::MissingColumn {
                        table,
                        column: key.clone(),
                    });
                }
            }
        }

        // Compile once to surface malformed globs at load time
        ExclusionFilter::compile(table, &cfg.filters)?;
        Ok(())
    }

    fn validate_mapping(&self) -> Result<(), ReconError> {
        let provided = &self.tables.provided_data;
        let current = &self.tables.current_data;

        if self.column_mapping.is_empty() {
            return Err(ReconError::ConfigValidation("column_mapping must not be empty".into()));
        }

        let mut seen_current = HashSet::new();
        for (p, c) in &self.column_mapping {
            if !seen_current.insert(c.as_str()) {
                return Err(ReconError::ConfigValidation(format!(
                    "column_mapping: current column '{c}' is mapped more than once (from '{p}')"
                )));
            }
        }

        for key in &provided.key_columns {
            if !self.column_mapping.contains_key(key) {
                return Err(ReconError::ConfigValidation(format!(
                    "column_mapping: provided key column '{key}' is not mapped"
                )));
            }
        }

        let mapped: HashSet<&str> = self.mapped_key_columns().into_iter().collect();
        let declared: HashSet<&str> = current.key_columns.iter().map(|s| s.as_str()).collect();
        if mapped != declared {
            return Err(ReconError::ConfigValidation(format!(
                "column_mapping: provided keys map to [{}] but current_data key_columns are [{}]",
                self.mapped_key_columns().join(", "),
                current.key_columns.join(", ")
            )));
        }

        if let Some(ref cols) = provided.columns {
            for p in self.column_mapping.keys() {
                if !cols.contains(p) {
                    return Err(ReconError::MissingColumn {
                        table: TableName::ProvidedData,
                        column: p.clone(),
                    });
                }
            }
        }
        if let Some(ref cols) = current.columns {
            for c in self.column_mapping.values() {
                if !cols.contains(c) {
                    return Err(ReconError::MissingColumn {
                        table: TableName::CurrentData,
                        column: c.clone(),
                    });
                }
            }
        }
        Ok(())
    }

    fn validate_sync_result(&self) -> Result<(), ReconError> {
        let sr = &self.sync_result;
        if sr.columns.is_empty() {
            return Err(ReconError::ConfigValidation("sync_result: columns must not be empty".into()));
        }
        if sr.key_columns.is_empty() {
            return Err(ReconError::ConfigValidation(
                "sync_result: key_columns must not be empty".into(),
            ));
        }

        let names: Vec<String> = sr.column_names().map(str::to_string).collect();
        check_unique_names("sync_result columns", &names)?;
        if names.contains(&sr.action_column) {
            return Err(ReconError::ConfigValidation(format!(
                "sync_result: action column '{}' collides with an output column",
                sr.action_column
            )));
        }
        for key in &sr.key_columns {
            if !names.contains(key) {
                return Err(ReconError::MissingColumn {
                    table: TableName::SyncResult,
                    column: key.clone(),
                });
            }
        }

        let provided_cols = self.tables.provided_data.columns.as_ref();
        let current_cols = self.tables.current_data.columns.as_ref();

        for column in &sr.columns {
            for (action, chain) in column.chains() {
                if chain.is_empty() {
                    return Err(ReconError::ConfigValidation(format!(
                        "sync_result column '{}': no sources for action '{action}'",
                        column.name
                    )));
                }
                for fixed in chain.fixed_values() {
                    Value::parse(fixed, column.ty).map_err(|e| {
                        ReconError::ConfigValidation(format!(
                            "sync_result column '{}': fixed value '{fixed}' is not a valid {}: {e}",
                            column.name, column.ty
                        ))
                    })?;
                }
                if let Some(cols) = provided_cols {
                    if let Some(missing) = chain.provided_columns().find(|c| !cols.iter().any(|x| x == c)) {
                        return Err(ReconError::MissingColumn {
                            table: TableName::ProvidedData,
                            column: missing.to_string(),
                        });
                    }
                }
                if let Some(cols) = current_cols {
                    if let Some(missing) = chain.current_columns().find(|c| !cols.iter().any(|x| x == c)) {
                        return Err(ReconError::MissingColumn {
                            table: TableName::CurrentData,
                            column: missing.to_string(),
                        });
                    }
                }
            }
        }
        Ok(())
    }

    fn validate_output(&self) -> Result<(), ReconError> {
        if self.output.file.trim().is_empty() {
            return Err(ReconError::ConfigValidation("output: file must not be empty".into()));
        }
        check_delimiter("output", self.output.delimiter)?;

        if let Some(ref cols) = self.output.columns {
            if cols.is_empty() {
                return Err(ReconError::ConfigValidation("output: columns must not be empty".into()));
            }
            let available = self.sync_result.table_columns();
            for c in cols {
                if !available.contains(c) {
                    return Err(ReconError::MissingColumn {
                        table: TableName::SyncResult,
                        column: c.clone(),
                    });
                }
            }
        }
        Ok(())
    }

    /// Check the real header of an input table against every column the
    /// config relies on. Runs before any row of that table is processed.
    pub fn check_headers(&self, table: TableName, header: &[String]) -> Result<(), ReconError> {
        let Some(cfg) = self.table(table) else {
            return Ok(());
        };

        let require = |column: &str| -> Result<(), ReconError> {
            if header.iter().any(|h| h == column) {
                Ok(())
            } else {
                Err(ReconError::MissingColumn {
                    table,
                    column: column.to_string(),
                })
            }
        };

        for key in &cfg.key_columns {
            require(key)?;
        }
        if let Some(ref cols) = cfg.columns {
            for c in cols {
                require(c)?;
            }
        }
        for rule in &cfg.filters {
            require(&rule.field)?;
        }

        match table {
            TableName::ProvidedData => {
                for p in self.column_mapping.keys() {
                    require(p)?;
                }
                for column in &self.sync_result.columns {
                    for (_, chain) in column.chains() {
                        for c in chain.provided_columns() {
                            require(c)?;
                        }
                    }
                }
            }
            TableName::CurrentData => {
                for c in self.column_mapping.values() {
                    require(c)?;
                }
                for column in &self.sync_result.columns {
                    for (_, chain) in column.chains() {
                        for c in chain.current_columns() {
                            require(c)?;
                        }
                    }
                }
            }
            TableName::SyncResult => {}
        }
        Ok(())
    }
}

fn check_unique_names(what: &str, names: &[String]) -> Result<(), ReconError> {
    let mut seen = HashSet::new();
    for n in names {
        if n.trim().is_empty() {
            return Err(ReconError::ConfigValidation(format!("{what}: empty column name")));
        }
        if !seen.insert(n.as_str()) {
            return Err(ReconError::ConfigValidation(format!("{what}: '{n}' listed twice")));
        }
    }
    Ok(())
}

fn check_delimiter(what: &str, delimiter: char) -> Result<(), ReconError> {
    if !delimiter.is_ascii() || delimiter == '"' || delimiter == '\n' || delimiter == '\r' {
        return Err(ReconError::ConfigValidation(format!(
            "{what}: delimiter {delimiter:?} must be a single ASCII character other than quote or newline"
        )));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) const EMPLOYEES: &str = r#"
name = "Employee Sync"

[tables.provided_data]
file = "provided.csv"
key_columns = ["employee_id"]

[tables.current_data]
file = "current.csv"
key_columns = ["user_id"]

[column_mapping]
employee_id = "user_id"
name = "user_name"

[sync_result]
key_columns = ["employee_id"]

[[sync_result.columns]]
name = "employee_id"
sources = [{ provided_data = "employee_id" }, { current_data = "user_id" }]

[[sync_result.columns]]
name = "name"
sources = [{ provided_data = "name" }, { current_data = "user_name" }]

[output]
file = "out/sync_result.csv"
"#;

    fn with(extra: &str) -> String {
        format!("{EMPLOYEES}\n{extra}")
    }

    #[test]
    fn parse_minimal() {
        let config = ReconConfig::from_toml(EMPLOYEES).unwrap();
        assert_eq!(config.name, "Employee Sync");
        assert!(config.database.is_in_memory());
        assert_eq!(config.mapped_key_columns(), vec!["user_id"]);
        assert_eq!(config.comparison_columns(), vec![("name", "user_name")]);
        assert_eq!(config.sync_result.action_column, "sync_action");
        assert_eq!(config.output_columns(), vec!["employee_id", "name", "sync_action"]);
        assert!(config.output.include_header);
        assert_eq!(config.tables.provided_data.csv.delimiter_byte(), b',');
        assert_eq!(config.action_table().unwrap(), ActionTable::default());
    }

    #[test]
    fn per_action_chain_override() {
        let input = EMPLOYEES.replace(
            "sources = [{ provided_data = \"name\" }, { current_data = \"user_name\" }]",
            "sources = [{ provided_data = \"name\" }, { current_data = \"user_name\" }]\nupdate = [{ current_data = \"user_name\" }, { provided_data = \"name\" }]",
        );
        let config = ReconConfig::from_toml(&input).unwrap();
        let name = &config.sync_result.columns[1];
        assert_eq!(name.chain_for(SyncAction::Update).sources().len(), 2);
        assert_ne!(name.chain_for(SyncAction::Update), name.chain_for(SyncAction::Add));
        assert_eq!(name.chain_for(SyncAction::Keep), &name.sources);
    }

    #[test]
    fn parse_actions_filters_and_types() {
        let input = EMPLOYEES
            .replace(
                "[tables.current_data]\nfile = \"current.csv\"\nkey_columns = [\"user_id\"]",
                "[tables.current_data]\nfile = \"current.csv\"\nkey_columns = [\"user_id\"]\noutput_excluded_as_keep = true\nfilters = [{ field = \"user_id\", type = \"exclude\", glob = \"ADM*\" }]\n[tables.current_data.types]\nhired = \"date\"",
            )
            + "\n[sync_actions.keep]\nenabled = false\nlabel = \"NOCHANGE\"\n";
        let config = ReconConfig::from_toml(&input).unwrap();
        let current = &config.tables.current_data;
        assert!(current.output_excluded_as_keep);
        assert_eq!(current.filters.len(), 1);
        assert_eq!(current.column_type("hired"), ColumnType::Date);
        assert_eq!(current.column_type("other"), ColumnType::Text);
        let actions = config.action_table().unwrap();
        assert!(!actions.is_enabled(SyncAction::Keep));
        assert_eq!(actions.label(SyncAction::Keep), "NOCHANGE");
    }

    #[test]
    fn reject_duplicate_action_code() {
        let err = ReconConfig::from_toml(&with("[sync_actions.delete]\ncode = \"2\"\n")).unwrap_err();
        assert!(matches!(err, ReconError::DuplicateActionCode { .. }), "{err}");
        assert!(err.is_config_error());
    }

    #[test]
    fn reject_malformed_glob() {
        let input = EMPLOYEES.replace(
            "key_columns = [\"employee_id\"]\n\n[tables.current_data]",
            "key_columns = [\"employee_id\"]\nfilters = [{ field = \"employee_id\", type = \"exclude\", glob = \"[E\" }]\n\n[tables.current_data]",
        );
        let err = ReconConfig::from_toml(&input).unwrap_err();
        assert!(matches!(err, ReconError::InvalidGlob { .. }), "{err}");
    }

    #[test]
    fn reject_unmapped_key() {
        let input = EMPLOYEES.replace("employee_id = \"user_id\"\n", "");
        let err = ReconConfig::from_toml(&input).unwrap_err();
        assert!(err.to_string().contains("'employee_id' is not mapped"), "{err}");
    }

    #[test]
    fn reject_key_mismatch_with_current_keys() {
        let input = EMPLOYEES.replace("key_columns = [\"user_id\"]", "key_columns = [\"user_name\"]");
        let err = ReconConfig::from_toml(&input).unwrap_err();
        assert!(err.to_string().contains("current_data key_columns"), "{err}");
    }

    #[test]
    fn reject_empty_key_columns() {
        let input = EMPLOYEES.replace("key_columns = [\"employee_id\"]\n\n", "key_columns = []\n\n");
        let err = ReconConfig::from_toml(&input).unwrap_err();
        assert!(err.to_string().contains("key_columns must not be empty"), "{err}");
    }

    #[test]
    fn reject_excluded_as_keep_on_provided() {
        let input = EMPLOYEES.replace(
            "key_columns = [\"employee_id\"]\n\n[tables.current_data]",
            "key_columns = [\"employee_id\"]\noutput_excluded_as_keep = true\n\n[tables.current_data]",
        );
        let err = ReconConfig::from_toml(&input).unwrap_err();
        assert!(err.to_string().contains("only supported on current_data"), "{err}");
    }

    #[test]
    fn reject_bad_fixed_value_for_type() {
        let input = with(
            "[[sync_result.columns]]\nname = \"level\"\ntype = \"integer\"\nsources = [{ fixed_value = \"high\" }]\n",
        );
        let err = ReconConfig::from_toml(&input).unwrap_err();
        assert!(err.to_string().contains("fixed value 'high'"), "{err}");
    }

    #[test]
    fn reject_unknown_output_column() {
        let err = ReconConfig::from_toml(&EMPLOYEES.replace(
            "file = \"out/sync_result.csv\"",
            "file = \"out/sync_result.csv\"\ncolumns = [\"employee_id\", \"nope\"]",
        ))
        .unwrap_err();
        assert!(matches!(err, ReconError::MissingColumn { table: TableName::SyncResult, .. }), "{err}");
    }

    #[test]
    fn reject_declared_columns_missing_source() {
        let input = EMPLOYEES.replace(
            "key_columns = [\"employee_id\"]\n\n[tables.current_data]",
            "key_columns = [\"employee_id\"]\ncolumns = [\"employee_id\"]\n\n[tables.current_data]",
        );
        let err = ReconConfig::from_toml(&input).unwrap_err();
        match err {
            ReconError::MissingColumn { table, column } => {
                assert_eq!(table, TableName::ProvidedData);
                assert_eq!(column, "name");
            }
            other => panic!("unexpected: {other}"),
        }
    }

    #[test]
    fn reject_headerless_without_columns() {
        let input = EMPLOYEES.replace(
            "key_columns = [\"user_id\"]",
            "key_columns = [\"user_id\"]\n[tables.current_data.csv]\nhas_header = false",
        );
        let err = ReconConfig::from_toml(&input).unwrap_err();
        assert!(err.to_string().contains("has_header = false"), "{err}");
    }

    #[test]
    fn reject_unknown_fields() {
        let err = ReconConfig::from_toml(&with("[surprise]\nx = 1\n")).unwrap_err();
        assert!(matches!(err, ReconError::ConfigParse(_)));
    }

    #[test]
    fn check_headers_reports_missing_comparison_column() {
        let config = ReconConfig::from_toml(EMPLOYEES).unwrap();
        let ok = vec!["employee_id".to_string(), "name".to_string(), "extra".to_string()];
        config.check_headers(TableName::ProvidedData, &ok).unwrap();

        let missing = vec!["user_id".to_string()];
        let err = config.check_headers(TableName::CurrentData, &missing).unwrap_err();
        assert_eq!(err.to_string(), "table 'current_data': missing column 'user_name'");
    }
}
