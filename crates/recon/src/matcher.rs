use std::collections::HashMap;

use serde::Serialize;

use crate::config::ReconConfig;
use crate::model::Row;

/// Rendered values of a row's key columns, in key-column order.
///
/// Null components compare equal to each other, so two rows whose key is
/// null in the same position share a key (the same grouping SQLite applies
/// in `GROUP BY`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct KeyTuple(Vec<Option<String>>);

impl KeyTuple {
    pub fn new(parts: Vec<Option<String>>) -> Self {
        Self(parts)
    }

    pub fn from_row<S: AsRef<str>>(row: &Row, columns: &[S]) -> Self {
        Self(columns.iter().map(|c| row.value(c.as_ref()).render()).collect())
    }

    pub fn parts(&self) -> &[Option<String>] {
        &self.0
    }
}

impl std::fmt::Display for KeyTuple {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let part = |p: &Option<String>| p.clone().unwrap_or_else(|| "<null>".to_string());
        match self.0.as_slice() {
            [single] => f.write_str(&part(single)),
            parts => {
                let joined: Vec<String> = parts.iter().map(part).collect();
                write!(f, "({})", joined.join(", "))
            }
        }
    }
}

/// Key and comparison columns for one provided ↔ current join.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinPlan {
    pub provided_keys: Vec<String>,
    /// Current-side key columns, positionally aligned with `provided_keys`.
    pub current_keys: Vec<String>,
    /// (provided column, current column) pairs compared for UPDATE vs KEEP.
    pub comparisons: Vec<(String, String)>,
}

impl JoinPlan {
    pub fn from_config(config: &ReconConfig) -> Self {
        Self {
            provided_keys: config.tables.provided_data.key_columns.clone(),
            current_keys: config
                .mapped_key_columns()
                .into_iter()
                .map(str::to_string)
                .collect(),
            comparisons: config
                .comparison_columns()
                .into_iter()
                .map(|(p, c)| (p.to_string(), c.to_string()))
                .collect(),
        }
    }

    pub fn provided_key(&self, row: &Row) -> KeyTuple {
        KeyTuple::from_row(row, &self.provided_keys)
    }

    pub fn current_key(&self, row: &Row) -> KeyTuple {
        KeyTuple::from_row(row, &self.current_keys)
    }
}

/// Outcome of looking up one key on both sides.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pairing<'a> {
    ProvidedOnly(&'a Row),
    Matched { provided: &'a Row, current: &'a Row },
    CurrentOnly(&'a Row),
}

/// Full outer join on the mapped key columns.
///
/// Provided rows come first in provided order, each either matched or not;
/// then every current row no provided row claimed, in current order. When a
/// key repeats on the current side the first occurrence is the match target
/// and later copies surface as `CurrentOnly`.
pub fn match_rows<'a>(provided: &'a [Row], current: &'a [Row], plan: &JoinPlan) -> Vec<Pairing<'a>> {
    let mut index: HashMap<KeyTuple, usize> = HashMap::with_capacity(current.len());
    for (i, row) in current.iter().enumerate() {
        index.entry(plan.current_key(row)).or_insert(i);
    }

    let mut current_used = vec![false; current.len()];
    let mut pairings = Vec::with_capacity(provided.len() + current.len());

    for p in provided {
        match index.get(&plan.provided_key(p)) {
            Some(&ci) if !current_used[ci] => {
                current_used[ci] = true;
                pairings.push(Pairing::Matched {
                    provided: p,
                    current: &current[ci],
                });
            }
            _ => pairings.push(Pairing::ProvidedOnly(p)),
        }
    }

    pairings.extend(
        current
            .iter()
            .enumerate()
            .filter(|(i, _)| !current_used[*i])
            .map(|(_, c)| Pairing::CurrentOnly(c)),
    );

    pairings
}
