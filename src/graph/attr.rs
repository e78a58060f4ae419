use std::{collections::BTreeMap, fmt};

/// Attribute map attached to nodes and edges, ordered by name.
pub type Attrs = BTreeMap<String, AttrValue>;

/// A single node/edge attribute value.
#[derive(Debug, Clone, PartialEq)]
pub enum AttrValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    /// Distinct values collected when several edges are merged into one.
    List(Vec<AttrValue>),
}

impl AttrValue {
    /// GraphML `attr.type` for this value.
    pub(crate) fn graphml_type(&self) -> &'static str {
        match self {
            AttrValue::Bool(_) => "boolean",
            AttrValue::Int(_) => "long",
            AttrValue::Float(_) => "double",
            AttrValue::Str(_) | AttrValue::List(_) => "string",
        }
    }

    /// Get the value as a float, if numeric.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            AttrValue::Int(i) => Some(*i as f64),
            AttrValue::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// Merge values into one: the value itself if all agree, else the distinct values in first-seen order.
    /// Lists are flattened before comparison.
    pub(crate) fn merge(values: impl IntoIterator<Item = AttrValue>) -> Option<AttrValue> {
        let mut distinct: Vec<AttrValue> = Vec::new();
        for value in values {
            let items = match value {
                AttrValue::List(items) => items,
                other => vec![other],
            };
            for item in items {
                if !distinct.contains(&item) { distinct.push(item) }
            }
        }
        match distinct.len() {
            0 => None,
            1 => distinct.pop(),
            _ => Some(AttrValue::List(distinct)),
        }
    }

    fn to_json(&self) -> serde_json::Value {
        match self {
            AttrValue::Bool(b) => serde_json::Value::from(*b),
            AttrValue::Int(i) => serde_json::Value::from(*i),
            AttrValue::Float(f) => serde_json::Value::from(*f),
            AttrValue::Str(s) => serde_json::Value::from(s.as_str()),
            AttrValue::List(items) => serde_json::Value::Array(items.iter().map(AttrValue::to_json).collect()),
        }
    }
}

impl fmt::Display for AttrValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttrValue::Bool(b) => write!(f, "{b}"),
            AttrValue::Int(i) => write!(f, "{i}"),
            AttrValue::Float(x) => write!(f, "{x}"),
            AttrValue::Str(s) => f.write_str(s),
            AttrValue::List(_) => write!(f, "{}", self.to_json()),
        }
    }
}

impl From<bool> for AttrValue { fn from(v: bool) -> Self { AttrValue::Bool(v) } }
impl From<i64> for AttrValue { fn from(v: i64) -> Self { AttrValue::Int(v) } }
impl From<f64> for AttrValue { fn from(v: f64) -> Self { AttrValue::Float(v) } }
impl From<String> for AttrValue { fn from(v: String) -> Self { AttrValue::Str(v) } }
impl From<&str> for AttrValue { fn from(v: &str) -> Self { AttrValue::Str(v.to_string()) } }

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merge_collapses_identical_values() {
        let merged = AttrValue::merge(["residential".into(), "residential".into()]);
        assert_eq!(merged, Some(AttrValue::from("residential")));
    }

    #[test]
    fn merge_keeps_distinct_values_in_order() {
        let merged = AttrValue::merge([
            AttrValue::Int(7),
            AttrValue::List(vec![AttrValue::Int(3), AttrValue::Int(7)]),
        ]);
        assert_eq!(merged, Some(AttrValue::List(vec![AttrValue::Int(7), AttrValue::Int(3)])));
        assert_eq!(AttrValue::merge(Vec::new()), None);
    }

    #[test]
    fn lists_display_as_json() {
        let value = AttrValue::List(vec!["Main St".into(), AttrValue::Int(2)]);
        assert_eq!(value.to_string(), r#"["Main St",2]"#);
        assert_eq!(AttrValue::Bool(true).to_string(), "true");
    }
}
