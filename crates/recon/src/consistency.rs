//! Key uniqueness check, run per table before reconciliation and on the
//! assembled `sync_result`.

use indexmap::IndexMap;
use serde::Serialize;

use crate::error::ReconError;
use crate::matcher::KeyTuple;
use crate::model::{Row, TableName};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DuplicateKey {
    pub key: KeyTuple,
    pub count: usize,
}

/// Key tuples that occur more than once, in order of first occurrence.
pub fn find_duplicate_keys<'a, S: AsRef<str>>(
    rows: impl IntoIterator<Item = &'a Row>,
    key_columns: &[S],
) -> Vec<DuplicateKey> {
    let mut counts: IndexMap<KeyTuple, usize> = IndexMap::new();
    for row in rows {
        *counts.entry(KeyTuple::from_row(row, key_columns)).or_insert(0) += 1;
    }
    counts
        .into_iter()
        .filter(|(_, count)| *count > 1)
        .map(|(key, count)| DuplicateKey { key, count })
        .collect()
}

pub fn check_unique_keys<'a, S: AsRef<str>>(
    table: TableName,
    rows: impl IntoIterator<Item = &'a Row>,
    key_columns: &[S],
) -> Result<(), ReconError> {
    let keys = find_duplicate_keys(rows, key_columns);
    if keys.is_empty() {
        Ok(())
    } else {
        tracing::error!(table = %table, duplicates = keys.len(), "duplicate keys");
        Err(ReconError::DuplicateKeys { table, keys })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rows(ids: &[&str]) -> Vec<Row> {
        ids.iter().map(|id| [("id", *id)].into_iter().collect()).collect()
    }

    #[test]
    fn unique_keys_pass() {
        check_unique_keys(TableName::ProvidedData, &rows(&["E1", "E2"]), &["id"]).unwrap();
        check_unique_keys(TableName::ProvidedData, &[], &["id"]).unwrap();
    }

    #[test]
    fn duplicates_listed_with_counts_in_first_seen_order() {
        let dups = find_duplicate_keys(&rows(&["E2", "E1", "E2", "E1", "E3", "E1"]), &["id"]);
        assert_eq!(dups.len(), 2);
        assert_eq!(dups[0].key.to_string(), "E2");
        assert_eq!(dups[0].count, 2);
        assert_eq!(dups[1].key.to_string(), "E1");
        assert_eq!(dups[1].count, 3);
    }

    #[test]
    fn error_names_key_and_count() {
        let err = check_unique_keys(TableName::ProvidedData, &rows(&["E1", "E1"]), &["id"]).unwrap_err();
        assert!(err.to_string().contains("E1 (x2)"), "{err}");
        assert!(!err.is_config_error());
    }

    #[test]
    fn composite_key_only_duplicates_on_full_tuple() {
        let data: Vec<Row> = vec![
            [("org", "A"), ("id", "1")].into_iter().collect(),
            [("org", "B"), ("id", "1")].into_iter().collect(),
        ];
        assert!(find_duplicate_keys(&data, &["org", "id"]).is_empty());
        assert!(find_duplicate_keys(data.iter().take(1), &["id"]).is_empty());
        assert_eq!(find_duplicate_keys(&data, &["id"]).len(), 1);
    }
}
