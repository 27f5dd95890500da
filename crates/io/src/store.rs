// Relational row store backed by SQLite

use std::path::Path;

use chrono::NaiveDate;
use rusqlite::types::ValueRef;
use rusqlite::{params_from_iter, Connection};

use tablesync_recon::consistency::DuplicateKey;
use tablesync_recon::matcher::KeyTuple;
use tablesync_recon::model::{ColumnType, ColumnTypes};
use tablesync_recon::{Row, TableName, Value};

use crate::error::{db_label, IoError};

/// Synchronous read access to a named table.
pub trait RowSource {
    /// All rows in insertion order.
    fn read_rows(&self, table: TableName) -> Result<Vec<Row>, IoError>;

    /// Rows whose `column` equals one of `values`, in insertion order. An
    /// empty `values` list matches nothing.
    fn read_rows_where_in(&self, table: TableName, column: &str, values: &[&str]) -> Result<Vec<Row>, IoError>;
}

/// Synchronous bulk write: replace the table's contents.
pub trait RowSink {
    fn replace_rows(
        &mut self,
        table: TableName,
        columns: &[String],
        types: &ColumnTypes,
        rows: &[Row],
    ) -> Result<usize, IoError>;
}

pub struct SqliteStore {
    conn: Connection,
    label: String,
}

impl SqliteStore {
    pub fn open(path: &Path) -> Result<Self, IoError> {
        let label = path.display().to_string();
        let conn = Connection::open(path).map_err(|e| IoError::store("open", db_label(&label), e))?;
        tracing::debug!(database = %label, "store opened");
        Ok(Self { conn, label })
    }

    pub fn in_memory() -> Result<Self, IoError> {
        let label = ":memory:".to_string();
        let conn = Connection::open_in_memory().map_err(|e| IoError::store("open", db_label(&label), e))?;
        Ok(Self { conn, label })
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// Declared columns and types, in table order. Empty if the table does not exist.
    pub fn schema(&self, table: TableName) -> Result<Vec<(String, ColumnType)>, IoError> {
        let mut stmt = self
            .conn
            .prepare(&format!("PRAGMA table_info({})", quote_ident(table.as_str())))
            .map_err(|e| IoError::store("schema", table, e))?;
        let columns = stmt
            .query_map([], |row| {
                let name: String = row.get(1)?;
                let decl: String = row.get(2)?;
                Ok((name, type_from_decl(&decl)))
            })
            .map_err(|e| IoError::store("schema", table, e))?
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| IoError::store("schema", table, e))?;
        Ok(columns)
    }

    pub fn count(&self, table: TableName) -> Result<usize, IoError> {
        let n: i64 = self
            .conn
            .query_row(&format!("SELECT COUNT(*) FROM {}", quote_ident(table.as_str())), [], |r| r.get(0))
            .map_err(|e| IoError::store("count", table, e))?;
        Ok(n as usize)
    }

    /// Key tuples occurring more than once, ordered by first occurrence.
    pub fn duplicate_keys(&self, table: TableName, key_columns: &[String]) -> Result<Vec<DuplicateKey>, IoError> {
        let keys = key_columns.iter().map(|k| quote_ident(k)).collect::<Vec<_>>().join(", ");
        let sql = format!(
            "SELECT {keys}, COUNT(*) FROM {t} GROUP BY {keys} HAVING COUNT(*) > 1 ORDER BY MIN(rowid)",
            t = quote_ident(table.as_str())
        );
        let width = key_columns.len();

        let mut stmt = self.conn.prepare(&sql).map_err(|e| IoError::store("duplicate check", table, e))?;
        let found = stmt
            .query_map([], |row| {
                let mut parts = Vec::with_capacity(width);
                for i in 0..width {
                    parts.push(render_ref(row.get_ref(i)?));
                }
                let count: i64 = row.get(width)?;
                Ok(DuplicateKey {
                    key: KeyTuple::new(parts),
                    count: count as usize,
                })
            })
            .map_err(|e| IoError::store("duplicate check", table, e))?
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| IoError::store("duplicate check", table, e))?;
        Ok(found)
    }

    fn select(&self, table: TableName, op: &'static str, filter: Option<(&str, &[&str])>) -> Result<Vec<Row>, IoError> {
        let schema = self.schema(table)?;
        let columns = schema.iter().map(|(c, _)| quote_ident(c)).collect::<Vec<_>>().join(", ");
        let mut sql = format!("SELECT {columns} FROM {}", quote_ident(table.as_str()));
        let mut bind: Vec<&str> = Vec::new();
        if let Some((column, values)) = filter {
            let slots = vec!["?"; values.len()].join(", ");
            sql.push_str(&format!(" WHERE {} IN ({slots})", quote_ident(column)));
            bind.extend_from_slice(values);
        }
        sql.push_str(" ORDER BY rowid");

        let mut stmt = self.conn.prepare(&sql).map_err(|e| IoError::store(op, table, e))?;
        let rows = stmt
            .query_map(params_from_iter(bind.iter()), |r| {
                let mut row = Row::with_capacity(schema.len());
                for (i, (name, ty)) in schema.iter().enumerate() {
                    row.insert(name.as_str(), from_sql(r.get_ref(i)?, *ty));
                }
                Ok(row)
            })
            .map_err(|e| IoError::store(op, table, e))?
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| IoError::store(op, table, e))?;
        Ok(rows)
    }
}

impl RowSource for SqliteStore {
    fn read_rows(&self, table: TableName) -> Result<Vec<Row>, IoError> {
        self.select(table, "read", None)
    }

    fn read_rows_where_in(&self, table: TableName, column: &str, values: &[&str]) -> Result<Vec<Row>, IoError> {
        if values.is_empty() {
            return Ok(Vec::new());
        }
        self.select(table, "filtered read", Some((column, values)))
    }
}

impl RowSink for SqliteStore {
    /// Drop and recreate the table with `columns`, then insert every row in
    /// one transaction.
    fn replace_rows(
        &mut self,
        table: TableName,
        columns: &[String],
        types: &ColumnTypes,
        rows: &[Row],
    ) -> Result<usize, IoError> {
        let name = quote_ident(table.as_str());
        let defs = columns
            .iter()
            .map(|c| format!("{} {}", quote_ident(c), decl_for(types.get(c).copied().unwrap_or_default())))
            .collect::<Vec<_>>()
            .join(", ");

        let tx = self.conn.transaction().map_err(|e| IoError::store("begin", table, e))?;
        tx.execute_batch(&format!("DROP TABLE IF EXISTS {name}; CREATE TABLE {name} ({defs});"))
            .map_err(|e| IoError::store("create", table, e))?;

        {
            let slots = vec!["?"; columns.len()].join(", ");
            let mut stmt = tx
                .prepare(&format!("INSERT INTO {name} VALUES ({slots})"))
                .map_err(|e| IoError::store("insert", table, e))?;
            for row in rows {
                let values = columns.iter().map(|c| to_sql(row.value(c)));
                stmt.execute(params_from_iter(values))
                    .map_err(|e| IoError::store("insert", table, e))?;
            }
        }

        tx.commit().map_err(|e| IoError::store("commit", table, e))?;
        tracing::debug!(table = %table, rows = rows.len(), "table replaced");
        Ok(rows.len())
    }
}

fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

fn decl_for(ty: ColumnType) -> &'static str {
    match ty {
        ColumnType::Text => "TEXT",
        ColumnType::Integer => "INTEGER",
        ColumnType::Date => "DATE",
    }
}

fn type_from_decl(decl: &str) -> ColumnType {
    match decl.to_ascii_uppercase().as_str() {
        "INTEGER" => ColumnType::Integer,
        "DATE" => ColumnType::Date,
        _ => ColumnType::Text,
    }
}

fn to_sql(value: &Value) -> rusqlite::types::Value {
    use rusqlite::types::Value as Sql;
    match value {
        Value::Null => Sql::Null,
        Value::Integer(i) => Sql::Integer(*i),
        Value::Text(s) => Sql::Text(s.clone()),
        Value::Date(d) => Sql::Text(d.format("%Y-%m-%d").to_string()),
    }
}

fn from_sql(value: ValueRef<'_>, ty: ColumnType) -> Value {
    match (value, ty) {
        (ValueRef::Null, _) => Value::Null,
        (ValueRef::Integer(i), ColumnType::Integer) => Value::Integer(i),
        (ValueRef::Text(t), ColumnType::Date) => {
            let text = String::from_utf8_lossy(t);
            NaiveDate::parse_from_str(&text, "%Y-%m-%d")
                .map(Value::Date)
                .unwrap_or_else(|_| Value::Text(text.into_owned()))
        }
        (other, _) => render_ref(other).map(Value::Text).unwrap_or(Value::Null),
    }
}

fn render_ref(value: ValueRef<'_>) -> Option<String> {
    match value {
        ValueRef::Null => None,
        ValueRef::Integer(i) => Some(i.to_string()),
        ValueRef::Real(f) => Some(f.to_string()),
        ValueRef::Text(t) | ValueRef::Blob(t) => Some(String::from_utf8_lossy(t).into_owned()),
    }
}
