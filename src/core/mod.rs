pub mod dataset;
pub mod row;
pub mod types;
pub mod value;

pub use dataset::{Dataset, TabularFrame};
pub use row::Row;
pub use types::*;
