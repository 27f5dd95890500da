use std::collections::HashMap;

use chrono::NaiveDate;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::action::SyncAction;

// ---------------------------------------------------------------------------
// Tables
// ---------------------------------------------------------------------------

/// The three relational tables a sync run works with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TableName {
    ProvidedData,
    CurrentData,
    SyncResult,
}

impl TableName {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ProvidedData => "provided_data",
            Self::CurrentData => "current_data",
            Self::SyncResult => "sync_result",
        }
    }
}

impl std::fmt::Display for TableName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Values
// ---------------------------------------------------------------------------

/// Declared type of a column. Cells are parsed into this type on ingest.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnType {
    #[default]
    Text,
    Integer,
    Date,
}

impl std::fmt::Display for ColumnType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Text => write!(f, "text"),
            Self::Integer => write!(f, "integer"),
            Self::Date => write!(f, "date"),
        }
    }
}

/// Column name → declared type. Columns not listed are text.
pub type ColumnTypes = HashMap<String, ColumnType>;

const DATE_FORMATS: [&str; 2] = ["%Y-%m-%d", "%Y/%m/%d"];

/// A nullable scalar cell value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Text(String),
    Integer(i64),
    Date(NaiveDate),
}

impl Value {
    /// Parse a raw cell. Empty input is always `Null`.
    pub fn parse(raw: &str, ty: ColumnType) -> Result<Self, String> {
        if raw.is_empty() {
            return Ok(Self::Null);
        }
        match ty {
            ColumnType::Text => Ok(Self::Text(raw.to_string())),
            ColumnType::Integer => raw
                .trim()
                .parse::<i64>()
                .map(Self::Integer)
                .map_err(|e| e.to_string()),
            ColumnType::Date => {
                let trimmed = raw.trim();
                DATE_FORMATS
                    .iter()
                    .find_map(|fmt| NaiveDate::parse_from_str(trimmed, fmt).ok())
                    .map(Self::Date)
                    .ok_or_else(|| format!("expected one of {}", DATE_FORMATS.join(", ")))
            }
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Canonical string form used for comparison, key matching, glob
    /// matching and CSV output. `None` for null.
    pub fn render(&self) -> Option<String> {
        match self {
            Self::Null => None,
            Self::Text(s) => Some(s.clone()),
            Self::Integer(i) => Some(i.to_string()),
            Self::Date(d) => Some(d.format("%Y-%m-%d").to_string()),
        }
    }

    /// Ordinal equality over the canonical form. Null equals only null.
    pub fn same_as(&self, other: &Value) -> bool {
        match (self, other) {
            (Self::Null, Self::Null) => true,
            (Self::Null, _) | (_, Self::Null) => false,
            (Self::Text(a), Self::Text(b)) => a == b,
            (a, b) => a.render() == b.render(),
        }
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.render() {
            Some(s) => f.write_str(&s),
            None => f.write_str("<null>"),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Self::Integer(i)
    }
}

impl From<NaiveDate> for Value {
    fn from(d: NaiveDate) -> Self {
        Self::Date(d)
    }
}

// ---------------------------------------------------------------------------
// Rows
// ---------------------------------------------------------------------------

static NULL: Value = Value::Null;

/// An ordered mapping from column name to value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Row {
    fields: IndexMap<String, Value>,
}

impl Row {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(n: usize) -> Self {
        Self {
            fields: IndexMap::with_capacity(n),
        }
    }

    pub fn insert(&mut self, column: impl Into<String>, value: impl Into<Value>) {
        self.fields.insert(column.into(), value.into());
    }

    /// `None` when the column is absent (distinct from present-but-null).
    pub fn get(&self, column: &str) -> Option<&Value> {
        self.fields.get(column)
    }

    /// Missing columns read as null.
    pub fn value(&self, column: &str) -> &Value {
        self.fields.get(column).unwrap_or(&NULL)
    }

    pub fn contains(&self, column: &str) -> bool {
        self.fields.contains_key(column)
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(|k| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Row {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            fields: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

// ---------------------------------------------------------------------------
// Input
// ---------------------------------------------------------------------------

/// Pre-loaded, already filtered rows for one run.
#[derive(Debug, Clone, Default)]
pub struct ReconInput {
    pub provided: Vec<Row>,
    pub current: Vec<Row>,
    /// Current rows dropped by the exclusion filter. Only consulted when
    /// `output_excluded_as_keep` is enabled on `current_data`.
    pub current_excluded: Vec<Row>,
}

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

/// One row destined for `sync_result`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SyncResultRow {
    pub action: SyncAction,
    pub fields: Row,
    /// True for current rows re-admitted after exclusion.
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub readmitted: bool,
}

impl SyncResultRow {
    /// Flatten into a store row, appending the action code column.
    pub fn to_row(&self, action_column: &str, code: &str) -> Row {
        let mut row = Row::with_capacity(self.fields.len() + 1);
        for (column, value) in self.fields.iter() {
            row.insert(column, value.clone());
        }
        row.insert(action_column, code);
        row
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReconSummary {
    pub provided_rows: usize,
    pub current_rows: usize,
    pub total_rows: usize,
    pub add: usize,
    pub update: usize,
    pub delete: usize,
    pub keep: usize,
    /// Subset of `keep` that came from excluded current rows.
    pub readmitted_keep: usize,
}

impl ReconSummary {
    pub fn count(&self, action: SyncAction) -> usize {
        match action {
            SyncAction::Add => self.add,
            SyncAction::Update => self.update,
            SyncAction::Delete => self.delete,
            SyncAction::Keep => self.keep,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ReconMeta {
    pub config_name: String,
    pub engine_version: String,
    pub run_at: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReconResult {
    pub meta: ReconMeta,
    pub summary: ReconSummary,
    pub rows: Vec<SyncResultRow>,
}
