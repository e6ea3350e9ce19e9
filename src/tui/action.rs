use serde::{Deserialize, Serialize};
use std::fmt;

/// All possible actions in the application
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub enum Action {
    // Navigation
    MoveUp,
    MoveDown,
    MoveLeft,
    MoveRight,
    NextPage,
    PrevPage,
    FirstPage,
    LastPage,

    // Windows
    NextWindow,
    PrevWindow,
    ToggleCollapse,
    DeleteWindow,
    PinAnswer,

    // Data Operations
    Sort,
    Filter,
    Find,
    ClearFilters,
    CyclePageSize,
    HideColumn,
    ShowAllColumns,
    Export,

    // Chat
    FocusChat,
    Upload,

    // Application
    ToggleHelp,
    Quit,
    Confirm,
    Cancel,
}

impl Action {
    /// Get human-readable description
    pub fn description(&self) -> &'static str {
        match self {
            Action::MoveUp => "Move cursor up",
            Action::MoveDown => "Move cursor down",
            Action::MoveLeft => "Previous column or chart point",
            Action::MoveRight => "Next column or chart point",
            Action::NextPage => "Next page",
            Action::PrevPage => "Previous page",
            Action::FirstPage => "First page",
            Action::LastPage => "Last page",
            Action::NextWindow => "Next window",
            Action::PrevWindow => "Previous window",
            Action::ToggleCollapse => "Collapse or expand window",
            Action::DeleteWindow => "Delete window",
            Action::PinAnswer => "Pin last answer as a window",
            Action::Sort => "Cycle sort on column",
            Action::Filter => "Filter column",
            Action::Find => "Filter all columns",
            Action::ClearFilters => "Clear filters",
            Action::CyclePageSize => "Change page size",
            Action::HideColumn => "Hide column",
            Action::ShowAllColumns => "Show all columns",
            Action::Export => "Export window to CSV",
            Action::FocusChat => "Ask a question",
            Action::Upload => "Upload a CSV file",
            Action::ToggleHelp => "Toggle help screen",
            Action::Quit => "Quit application",
            Action::Confirm => "Drill down / confirm",
            Action::Cancel => "Cancel",
        }
    }

    /// Get category for grouping in help screen
    pub fn category(&self) -> ActionCategory {
        match self {
            Action::MoveUp
            | Action::MoveDown
            | Action::MoveLeft
            | Action::MoveRight
            | Action::NextPage
            | Action::PrevPage
            | Action::FirstPage
            | Action::LastPage => ActionCategory::Navigation,

            Action::NextWindow
            | Action::PrevWindow
            | Action::ToggleCollapse
            | Action::DeleteWindow
            | Action::PinAnswer => ActionCategory::Windows,

            Action::Sort
            | Action::Filter
            | Action::Find
            | Action::ClearFilters
            | Action::CyclePageSize
            | Action::HideColumn
            | Action::ShowAllColumns
            | Action::Export => ActionCategory::DataOps,

            Action::FocusChat | Action::Upload => ActionCategory::Chat,

            Action::ToggleHelp | Action::Quit | Action::Confirm | Action::Cancel => {
                ActionCategory::Application
            }
        }
    }

    /// Get all possible actions (for validation)
    pub fn all() -> Vec<Action> {
        vec![
            Action::MoveUp,
            Action::MoveDown,
            Action::MoveLeft,
            Action::MoveRight,
            Action::NextPage,
            Action::PrevPage,
            Action::FirstPage,
            Action::LastPage,
            Action::NextWindow,
            Action::PrevWindow,
            Action::ToggleCollapse,
            Action::DeleteWindow,
            Action::PinAnswer,
            Action::Sort,
            Action::Filter,
            Action::Find,
            Action::ClearFilters,
            Action::CyclePageSize,
            Action::HideColumn,
            Action::ShowAllColumns,
            Action::Export,
            Action::FocusChat,
            Action::Upload,
            Action::ToggleHelp,
            Action::Quit,
            Action::Confirm,
            Action::Cancel,
        ]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionCategory {
    Navigation,
    Windows,
    DataOps,
    Chat,
    Application,
}

impl ActionCategory {
    pub fn all() -> [ActionCategory; 5] {
        [
            ActionCategory::Navigation,
            ActionCategory::Windows,
            ActionCategory::DataOps,
            ActionCategory::Chat,
            ActionCategory::Application,
        ]
    }
}

impl fmt::Display for ActionCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActionCategory::Navigation => write!(f, "Navigation"),
            ActionCategory::Windows => write!(f, "Windows"),
            ActionCategory::DataOps => write!(f, "Data Operations"),
            ActionCategory::Chat => write!(f, "Chat"),
            ActionCategory::Application => write!(f, "Application"),
        }
    }
}
