use std::collections::HashMap;

/// A read-only, string-keyed view of one tabular row. The evaluator's only
/// source of field values.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Row(HashMap<String, String>);

impl Row {
    pub fn new() -> Self {
        Self(HashMap::new())
    }

    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<String>) {
        self.0.insert(field.into(), value.into());
    }

    /// The raw string value of `field`, or `None` if the row has no such
    /// field (treated by the evaluator as a SQL-style NULL).
    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }
}

impl<const N: usize, K, V> From<[(K, V); N]> for Row
where
    K: Into<String>,
    V: Into<String>,
{
    fn from(pairs: [(K, V); N]) -> Self {
        Self(pairs.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

impl<K, V> FromIterator<(K, V)> for Row
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}
