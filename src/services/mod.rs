pub mod backend;
pub mod csv_loader;
pub mod export;

pub use backend::{Answer, AskResponse, BackendClient, ChartDescriptor, UploadReceipt};
pub use export::CsvExport;
