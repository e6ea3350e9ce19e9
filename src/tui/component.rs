use crate::core::WindowId;
use crate::session::Session;
use crate::tui::action::Action;
use crate::tui::components::prompt::PromptKind;
use crate::tui::theme::Theme;
use color_eyre::Result;
use ratatui::{Frame, layout::Rect};
use std::path::PathBuf;

/// Work a component hands back to the app because it needs the backend, the
/// filesystem or another component.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Prompt(PromptKind),
    Ask(String),
    Upload(PathBuf),
    Export(WindowId),
    Quit,
}

/// Result of routing an action to a component.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// Not handled, keep propagating
    Ignored,
    Consumed,
    Command(Command),
}

/// Base trait for all TUI components
///
/// Components own only view state (cursors, selection, input buffers); the
/// data they show lives in the [`Session`], which is passed in on every call.
pub trait Component {
    /// Handle an action against the session.
    fn handle_action(&mut self, action: Action, session: &mut Session) -> Result<Outcome>;

    /// Render the component within the given area
    fn render(&mut self, frame: &mut Frame, area: Rect, session: &Session, theme: &Theme);

    /// Actions this component handles, used for context help
    fn supported_actions(&self) -> &[Action];

    /// Get component name for debugging/logging
    fn name(&self) -> &str;
}

/// Components that can receive keyboard focus
pub trait Focusable: Component {
    fn is_focused(&self) -> bool;

    fn set_focused(&mut self, focused: bool);
}
