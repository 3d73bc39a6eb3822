/// Metadata for a single column, as reported by the store's
/// `pragma_table_info` introspection.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnInfo {
    /// Ordinal position within the table (0-based).
    pub cid: i64,

    /// The column name.
    pub name: String,

    /// The declared type, e.g. `"INTEGER"` or `"TEXT"`. May be empty for
    /// columns declared without a type.
    pub decl_type: String,

    /// Whether the column carries a NOT NULL constraint.
    pub not_null: bool,

    /// The default value expression, if one was declared.
    pub default_value: Option<String>,

    /// Whether the column is part of the primary key.
    pub primary_key: bool,
}
