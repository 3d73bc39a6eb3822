pub mod column;
pub mod manager;
pub mod row;
pub mod value;
