//! `tablesync-recon`: config-driven reconciliation of a provided table
//! against a current table.
//!
//! Pure engine crate: receives pre-loaded rows, returns classified sync rows.
//! No CSV, SQLite or filesystem dependencies.

pub mod action;
pub mod classify;
pub mod config;
pub mod consistency;
pub mod engine;
pub mod error;
pub mod filter;
pub mod glob;
pub mod matcher;
pub mod model;
pub mod source;
pub mod summary;

pub use action::{ActionTable, SyncAction};
pub use config::ReconConfig;
pub use engine::{reconcile, run};
pub use error::ReconError;
pub use filter::{filter, ExclusionFilter, FilterOutcome, FilterRule, FilterStats, RuleKind};
pub use model::{ColumnType, ReconInput, ReconResult, Row, SyncResultRow, TableName, Value};
pub use source::{FieldSource, FieldSourceChain};
