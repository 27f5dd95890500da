use serde::{Deserialize, Serialize};

use crate::model::{ColumnType, Row, Value};

/// Where one output field may take its value from.
///
/// In TOML each source is an inline table with a single key:
/// `{ provided_data = "name" }`, `{ current_data = "user_name" }` or
/// `{ fixed_value = "ENG" }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldSource {
    ProvidedData(String),
    CurrentData(String),
    FixedValue(String),
}

/// Ordered sources for one output column. The first present, non-null value
/// wins; when every source is exhausted the field is null.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldSourceChain(Vec<FieldSource>);

impl FieldSourceChain {
    pub fn new(sources: Vec<FieldSource>) -> Self {
        Self(sources)
    }

    pub fn sources(&self) -> &[FieldSource] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn resolve(&self, provided: Option<&Row>, current: Option<&Row>, ty: ColumnType) -> Value {
        for source in &self.0 {
            let candidate = match source {
                FieldSource::ProvidedData(column) => provided.and_then(|r| r.get(column)).cloned(),
                FieldSource::CurrentData(column) => current.and_then(|r| r.get(column)).cloned(),
                FieldSource::FixedValue(text) => Some(fixed(text, ty)),
            };
            match candidate {
                Some(value) if !value.is_null() => return value,
                _ => continue,
            }
        }
        Value::Null
    }

    pub fn provided_columns(&self) -> impl Iterator<Item = &str> {
        self.0.iter().filter_map(|s| match s {
            FieldSource::ProvidedData(c) => Some(c.as_str()),
            _ => None,
        })
    }

    pub fn current_columns(&self) -> impl Iterator<Item = &str> {
        self.0.iter().filter_map(|s| match s {
            FieldSource::CurrentData(c) => Some(c.as_str()),
            _ => None,
        })
    }

    pub fn fixed_values(&self) -> impl Iterator<Item = &str> {
        self.0.iter().filter_map(|s| match s {
            FieldSource::FixedValue(v) => Some(v.as_str()),
            _ => None,
        })
    }
}

/// Fixed values are type-checked at config load; text is the fallback.
fn fixed(text: &str, ty: ColumnType) -> Value {
    Value::parse(text, ty).unwrap_or_else(|_| Value::Text(text.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chain() -> FieldSourceChain {
        FieldSourceChain::new(vec![
            FieldSource::ProvidedData("name".into()),
            FieldSource::CurrentData("user_name".into()),
            FieldSource::FixedValue("UNKNOWN".into()),
        ])
    }

    fn row(pairs: &[(&str, Option<&str>)]) -> Row {
        let mut r = Row::new();
        for (k, v) in pairs {
            r.insert(*k, v.map(Value::from).unwrap_or(Value::Null));
        }
        r
    }

    #[test]
    fn provided_first() {
        let p = row(&[("name", Some("Bob"))]);
        let c = row(&[("user_name", Some("Alice"))]);
        assert_eq!(chain().resolve(Some(&p), Some(&c), ColumnType::Text), Value::from("Bob"));
    }

    #[test]
    fn falls_through_null_and_missing() {
        let p = row(&[("name", None)]);
        let c = row(&[("user_name", Some("Alice"))]);
        assert_eq!(chain().resolve(Some(&p), Some(&c), ColumnType::Text), Value::from("Alice"));
        assert_eq!(chain().resolve(None, Some(&c), ColumnType::Text), Value::from("Alice"));
        let c_missing = row(&[("other", Some("x"))]);
        assert_eq!(
            chain().resolve(Some(&p), Some(&c_missing), ColumnType::Text),
            Value::from("UNKNOWN")
        );
    }

    #[test]
    fn exhausted_chain_is_null() {
        let only_rows = FieldSourceChain::new(vec![
            FieldSource::ProvidedData("a".into()),
            FieldSource::CurrentData("b".into()),
        ]);
        assert_eq!(only_rows.resolve(None, None, ColumnType::Text), Value::Null);
        assert_eq!(FieldSourceChain::default().resolve(None, None, ColumnType::Text), Value::Null);
    }

    #[test]
    fn fixed_value_takes_column_type() {
        let c = FieldSourceChain::new(vec![FieldSource::FixedValue("10".into())]);
        assert_eq!(c.resolve(None, None, ColumnType::Integer), Value::Integer(10));
        assert_eq!(c.resolve(None, None, ColumnType::Text), Value::from("10"));
    }

    #[test]
    fn deserializes_from_inline_tables() {
        #[derive(Deserialize)]
        struct Wrapper {
            sources: FieldSourceChain,
        }
        let w: Wrapper = toml::from_str(
            r#"sources = [{ provided_data = "name" }, { current_data = "user_name" }, { fixed_value = "UNKNOWN" }]"#,
        )
        .unwrap();
        assert_eq!(w.sources, chain());
    }

    #[test]
    fn column_iterators() {
        let c = chain();
        assert_eq!(c.provided_columns().collect::<Vec<_>>(), vec!["name"]);
        assert_eq!(c.current_columns().collect::<Vec<_>>(), vec!["user_name"]);
        assert_eq!(c.fixed_values().collect::<Vec<_>>(), vec!["UNKNOWN"]);
    }
}
