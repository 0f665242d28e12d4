//! Per-word attribute table and the filters evaluated against it.

pub mod filter;
pub mod row;
pub mod store;

pub use filter::{compile, compile_all, Filter};
pub use row::{AttributeRow, WordInfo};
pub use store::AttributeStore;
