#![allow(clippy::collapsible_if)]
#![allow(clippy::collapsible_match)]
#![allow(clippy::collapsible_else_if)]

pub mod chart;
pub mod config;
pub mod core;
pub mod drilldown;
pub mod error;
pub mod logging;
pub mod services;
pub mod session;
pub mod table;
pub mod tui;

// Re-export commonly used types
pub use chart::{ChartData, ChartKind, ChartSpec};
pub use config::Config;
pub use core::{CsvImportOptions, Dataset, Row, TabularFrame, WindowId};
pub use drilldown::{DrillOutcome, MatchMode, drill_down};
pub use error::{BackendError, OptixError, Result};
pub use services::{AskResponse, BackendClient};
pub use session::{BackendEvent, Session};
pub use table::{TableOptions, TableView};
pub use tui::{Action, ActionCategory};
