//! Exclusion filter applied to incoming rows before reconciliation.
//!
//! A row is dropped when its field matches any `exclude` rule. When at least
//! one `include` rule exists, a surviving row must also match one of them.
//! Rules of the same kind are ORed; the two kinds are ANDed. A null or
//! missing field never matches a pattern.

use serde::{Deserialize, Serialize};

use crate::error::{table_scope, ReconError};
use crate::glob::GlobPattern;
use crate::model::{Row, TableName};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleKind {
    Include,
    Exclude,
}

/// `{ field = "...", type = "include" | "exclude", glob = "..." }`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FilterRule {
    pub field: String,
    #[serde(rename = "type")]
    pub kind: RuleKind,
    pub glob: String,
}

impl FilterRule {
    pub fn include(field: &str, glob: &str) -> Self {
        Self {
            field: field.into(),
            kind: RuleKind::Include,
            glob: glob.into(),
        }
    }

    pub fn exclude(field: &str, glob: &str) -> Self {
        Self {
            field: field.into(),
            kind: RuleKind::Exclude,
            glob: glob.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct FilterStats {
    pub original_count: usize,
    pub filtered_count: usize,
    pub excluded_count: usize,
}

#[derive(Debug, Clone, Default)]
pub struct FilterOutcome {
    pub filtered: Vec<Row>,
    pub excluded: Vec<Row>,
    pub stats: FilterStats,
}

#[derive(Debug, Clone)]
struct CompiledRule {
    field: String,
    pattern: GlobPattern,
}

impl CompiledRule {
    fn matches(&self, row: &Row) -> bool {
        match row.value(&self.field).render() {
            Some(value) => self.pattern.is_match(&value),
            None => false,
        }
    }
}

/// Compiled rule set for one table.
#[derive(Debug, Clone, Default)]
pub struct ExclusionFilter {
    excludes: Vec<CompiledRule>,
    includes: Vec<CompiledRule>,
}

impl ExclusionFilter {
    /// Compile every rule. A malformed glob fails here, never during `apply`.
    pub fn compile(table: TableName, rules: &[FilterRule]) -> Result<Self, ReconError> {
        Self::build(Some(table), rules)
    }

    /// Errors name `table` when one is given.
    fn build(table: Option<TableName>, rules: &[FilterRule]) -> Result<Self, ReconError> {
        let mut filter = Self::default();
        for rule in rules {
            if rule.field.trim().is_empty() {
                return Err(ReconError::ConfigValidation(format!(
                    "{}filter rule with glob '{}' has an empty field",
                    table_scope(&table),
                    rule.glob
                )));
            }
            let pattern = GlobPattern::new(&rule.glob).map_err(|e| ReconError::InvalidGlob {
                table,
                field: rule.field.clone(),
                pattern: rule.glob.clone(),
                reason: e.to_string(),
            })?;
            let compiled = CompiledRule {
                field: rule.field.clone(),
                pattern,
            };
            match rule.kind {
                RuleKind::Exclude => filter.excludes.push(compiled),
                RuleKind::Include => filter.includes.push(compiled),
            }
        }
        Ok(filter)
    }

    pub fn keeps(&self, row: &Row) -> bool {
        if self.excludes.iter().any(|r| r.matches(row)) {
            return false;
        }
        self.includes.is_empty() || self.includes.iter().any(|r| r.matches(row))
    }

    /// Split rows into kept and excluded. Input order is preserved on both sides.
    pub fn apply(&self, rows: &[Row]) -> FilterOutcome {
        let mut outcome = FilterOutcome {
            filtered: Vec::with_capacity(rows.len()),
            excluded: Vec::new(),
            stats: FilterStats {
                original_count: rows.len(),
                ..Default::default()
            },
        };

        for row in rows {
            if self.keeps(row) {
                outcome.filtered.push(row.clone());
            } else {
                outcome.excluded.push(row.clone());
            }
        }

        outcome.stats.filtered_count = outcome.filtered.len();
        outcome.stats.excluded_count = outcome.excluded.len();
        outcome
    }

    /// Owned variant of [`apply`](Self::apply) that moves rows instead of cloning.
    pub fn split(&self, rows: Vec<Row>) -> FilterOutcome {
        let original_count = rows.len();
        let (filtered, excluded): (Vec<Row>, Vec<Row>) =
            rows.into_iter().partition(|row| self.keeps(row));
        FilterOutcome {
            stats: FilterStats {
                original_count,
                filtered_count: filtered.len(),
                excluded_count: excluded.len(),
            },
            filtered,
            excluded,
        }
    }
}

/// Compile `rules` and apply them to `rows` in one step. Not tied to a
/// table, so compile errors carry no table name.
pub fn filter(rows: &[Row], rules: &[FilterRule]) -> Result<FilterOutcome, ReconError> {
    let compiled = ExclusionFilter::build(None, rules)?;
    Ok(compiled.apply(rows))
}
