// CSV ingest and emit

use std::io::Write;
use std::path::Path;

use encoding_rs::Encoding;

use tablesync_recon::config::{CsvOptions, InputTableConfig};
use tablesync_recon::model::ColumnTypes;
use tablesync_recon::{ReconError, Row, TableName, Value};

use crate::error::IoError;

/// Header plus typed rows of one input file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CsvTable {
    pub columns: Vec<String>,
    pub rows: Vec<Row>,
}

/// Resolve a WHATWG encoding label (`utf-8`, `shift_jis`, `windows-1252`, ...).
pub fn resolve_encoding(label: &str) -> Result<&'static Encoding, IoError> {
    Encoding::for_label(label.trim().as_bytes()).ok_or_else(|| IoError::Encoding {
        label: label.to_string(),
    })
}

/// Read a file and decode it to UTF-8 with the configured encoding.
///
/// A BOM overrides the label. When the label is UTF-8 but the bytes are not,
/// the file is decoded as Windows-1252 (common for Excel-exported CSVs).
pub fn read_file_as_utf8(path: &Path, label: &str) -> Result<String, IoError> {
    let encoding = resolve_encoding(label)?;
    let bytes = std::fs::read(path).map_err(|e| IoError::io("read", path, e))?;

    let (decoded, used, had_errors) = encoding.decode(&bytes);
    if had_errors && used == encoding_rs::UTF_8 {
        tracing::warn!(path = %path.display(), "input is not valid UTF-8, decoding as windows-1252");
        let (decoded, _, _) = encoding_rs::WINDOWS_1252.decode(&bytes);
        return Ok(decoded.into_owned());
    }
    if had_errors {
        tracing::warn!(path = %path.display(), encoding = used.name(), "malformed sequences replaced");
    }
    Ok(decoded.into_owned())
}

/// Load one input table: decode, split into records, parse cells by type.
pub fn read_table(path: &Path, table: TableName, cfg: &InputTableConfig) -> Result<CsvTable, IoError> {
    let content = read_file_as_utf8(path, &cfg.csv.encoding)?;
    let parsed = parse_table(&content, table, &cfg.csv, cfg.columns.as_deref(), &cfg.types)
        .map_err(|e| match e {
            ParseError::Csv(source) => IoError::csv("parse", path, source),
            ParseError::Shape { line, found, expected } => IoError::Shape {
                path: path.to_path_buf(),
                table,
                line,
                found,
                expected,
            },
            ParseError::Recon(e) => IoError::Recon(e),
        })?;
    tracing::debug!(table = %table, path = %path.display(), rows = parsed.rows.len(), "csv loaded");
    Ok(parsed)
}

#[derive(Debug)]
enum ParseError {
    Csv(csv::Error),
    /// A record's field count differs from the declared columns.
    Shape { line: u64, found: usize, expected: usize },
    Recon(ReconError),
}

impl From<csv::Error> for ParseError {
    fn from(e: csv::Error) -> Self {
        Self::Csv(e)
    }
}

fn parse_table(
    content: &str,
    table: TableName,
    opts: &CsvOptions,
    declared: Option<&[String]>,
    types: &ColumnTypes,
) -> Result<CsvTable, ParseError> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(opts.delimiter_byte())
        .has_headers(opts.has_header)
        .from_reader(content.as_bytes());

    let columns: Vec<String> = if opts.has_header {
        reader.headers()?.iter().map(|h| h.trim().to_string()).collect()
    } else {
        declared.map(|d| d.to_vec()).unwrap_or_default()
    };

    let mut rows = Vec::new();
    for result in reader.records() {
        let record = result?;
        if record.len() != columns.len() {
            return Err(ParseError::Shape {
                line: record.position().map(|p| p.line()).unwrap_or(0),
                found: record.len(),
                expected: columns.len(),
            });
        }

        let mut row = Row::with_capacity(columns.len());
        for (column, raw) in columns.iter().zip(record.iter()) {
            let ty = types.get(column).copied().unwrap_or_default();
            let value = Value::parse(raw, ty).map_err(|_| {
                ParseError::Recon(ReconError::ValueParse {
                    table,
                    column: column.clone(),
                    value: raw.to_string(),
                    kind: ty.to_string(),
                })
            })?;
            row.insert(column.as_str(), value);
        }
        rows.push(row);
    }

    Ok(CsvTable { columns, rows })
}

/// Output dialect for [`write_rows`].
#[derive(Debug, Clone, Copy)]
pub struct CsvDialect {
    pub delimiter: u8,
    pub encoding: &'static Encoding,
    pub include_header: bool,
}

impl Default for CsvDialect {
    fn default() -> Self {
        Self {
            delimiter: b',',
            encoding: encoding_rs::UTF_8,
            include_header: true,
        }
    }
}

/// Serialize `rows` projected onto `columns`, then encode. Nulls are empty
/// fields. Returns the number of data rows written.
pub fn write_rows<W: Write>(
    out: &mut W,
    columns: &[String],
    rows: &[Row],
    dialect: &CsvDialect,
) -> Result<usize, csv::Error> {
    let mut writer = csv::WriterBuilder::new()
        .delimiter(dialect.delimiter)
        .from_writer(Vec::new());

    if dialect.include_header {
        writer.write_record(columns)?;
    }
    for row in rows {
        writer.write_record(columns.iter().map(|c| row.value(c).render().unwrap_or_default()))?;
    }

    let utf8 = writer.into_inner().map_err(|e| csv::Error::from(e.into_error()))?;
    let bytes = if dialect.encoding == encoding_rs::UTF_8 {
        utf8
    } else {
        let text = String::from_utf8_lossy(&utf8);
        let (encoded, _, unmappable) = dialect.encoding.encode(&text);
        if unmappable {
            tracing::warn!(encoding = dialect.encoding.name(), "characters not representable in output encoding");
        }
        encoded.into_owned()
    };

    out.write_all(&bytes).map_err(csv::Error::from)?;
    Ok(rows.len())
}
