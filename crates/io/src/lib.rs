// File I/O operations

pub mod csv;
pub mod error;
pub mod export;
pub mod history;
pub mod store;

pub use error::IoError;
pub use export::{export_from_source, export_rows, ExportOptions, ExportPredicate, ExportReport};
pub use history::{DirArchiver, HistoryArchiver};
pub use store::{RowSink, RowSource, SqliteStore};
