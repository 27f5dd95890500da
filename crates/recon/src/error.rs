use thiserror::Error;

use crate::consistency::DuplicateKey;
use crate::model::TableName;

#[derive(Debug, Error)]
pub enum ReconError {
    /// TOML parse / deserialization error.
    #[error("config parse error: {0}")]
    ConfigParse(String),
    /// Config validation error (empty key list, unmapped key, bad chain, etc.).
    #[error("config validation error: {0}")]
    ConfigValidation(String),
    /// A filter rule carries a pattern that does not compile.
    #[error("{}invalid glob '{pattern}' on field '{field}': {reason}", table_scope(.table))]
    InvalidGlob {
        table: Option<TableName>,
        field: String,
        pattern: String,
        reason: String,
    },
    /// Two sync actions were bound to the same external code.
    #[error("sync action code '{code}' is used by both {first} and {second}")]
    DuplicateActionCode {
        code: String,
        first: String,
        second: String,
    },
    /// A configured column is absent from the table's actual header.
    #[error("table '{table}': missing column '{column}'")]
    MissingColumn { table: TableName, column: String },
    /// Key tuples occurring more than once within one table.
    #[error("table '{table}': duplicate keys found: {}", format_duplicates(.keys))]
    DuplicateKeys {
        table: TableName,
        keys: Vec<DuplicateKey>,
    },
    /// A cell could not be parsed as the column's declared type.
    #[error("table '{table}', column '{column}': cannot parse '{value}' as {kind}")]
    ValueParse {
        table: TableName,
        column: String,
        value: String,
        kind: String,
    },
}

impl ReconError {
    /// True for errors that are raised before any row is touched.
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            Self::ConfigParse(_)
                | Self::ConfigValidation(_)
                | Self::InvalidGlob { .. }
                | Self::DuplicateActionCode { .. }
                | Self::MissingColumn { .. }
        )
    }
}

/// `"table 'x': "` prefix for messages, empty without a table.
pub(crate) fn table_scope(table: &Option<TableName>) -> String {
    table.map(|t| format!("table '{t}': ")).unwrap_or_default()
}

fn format_duplicates(keys: &[DuplicateKey]) -> String {
    keys.iter()
        .map(|d| format!("{} (x{})", d.key, d.count))
        .collect::<Vec<_>>()
        .join(", ")
}
