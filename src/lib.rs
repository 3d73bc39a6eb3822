pub(crate) mod common;
pub(crate) mod db;

pub use common::error::DatabaseError;
pub use db::column::ColumnInfo;
pub use db::manager::{QueryResponse, SqliteManager};
pub use db::row::{Row, RowData};
pub use db::value::Value;
