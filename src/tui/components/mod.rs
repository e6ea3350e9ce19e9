pub mod chart_panel;
pub mod chat_panel;
pub mod dashboard;
pub mod prompt;
pub mod table_panel;

pub use chart_panel::render_chart;
pub use chat_panel::ChatPanel;
pub use dashboard::Dashboard;
pub use prompt::{LineInput, Prompt, PromptKind, PromptOutcome};
pub use table_panel::{TableCursor, render_table};
