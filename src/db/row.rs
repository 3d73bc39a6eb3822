use crate::db::value::Value;

/// A row of data read back from the store.
///
/// Rows are ordered collections of values; the order matches the result
/// columns reported alongside them.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    /// The ordered values in this row.
    pub values: Vec<Value>,
}

impl Row {
    /// Creates a new row from a vector of values.
    pub fn new(values: Vec<Value>) -> Self {
        Self { values }
    }

    /// Gets a reference to the value at the given column index.
    pub fn get_value(&self, index: usize) -> Option<&Value> {
        self.values.get(index)
    }
}

/// Column/value pairs for a single insert.
///
/// Pairs keep their insertion order so the generated statement is
/// deterministic. Setting the same column twice keeps the last value.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct RowData {
    pairs: Vec<(String, Value)>,
}

impl RowData {
    /// Creates an empty row.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a column/value pair, replacing any earlier value for the column.
    pub fn set(mut self, column: &str, value: impl Into<Value>) -> Self {
        let value = value.into();
        match self.pairs.iter_mut().find(|(name, _)| name == column) {
            Some(pair) => pair.1 = value,
            None => self.pairs.push((column.to_owned(), value)),
        }
        self
    }

    /// Returns true if no columns have been set.
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// The column names, in insertion order.
    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.pairs.iter().map(|(name, _)| name.as_str())
    }

    /// The values, in insertion order.
    pub fn values(&self) -> impl Iterator<Item = &Value> {
        self.pairs.iter().map(|(_, value)| value)
    }

    /// Number of columns set.
    pub fn len(&self) -> usize {
        self.pairs.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_data_keeps_insertion_order() {
        let row = RowData::new()
            .set("id", 1)
            .set("name", "Alice")
            .set("age", Value::Null);

        let columns: Vec<_> = row.columns().collect();
        assert_eq!(columns, vec!["id", "name", "age"]);
        assert_eq!(row.len(), 3);
    }

    #[test]
    fn test_row_data_last_write_wins() {
        let row = RowData::new().set("name", "Alice").set("name", "Bob");

        assert_eq!(row.len(), 1);
        assert_eq!(
            row.values().next(),
            Some(&Value::Text("Bob".to_string()))
        );
    }

    #[test]
    fn test_row_data_empty() {
        assert!(RowData::new().is_empty());
        assert!(!RowData::new().set("id", 1).is_empty());
    }
}
