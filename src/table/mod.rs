pub mod derived;
pub mod format;
pub mod view;

pub use derived::DerivedColumns;
pub use view::{PageSize, SortDirection, SortState, TableOptions, TableView};
