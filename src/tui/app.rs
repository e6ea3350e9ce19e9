use crate::config::Config;
use crate::core::WindowId;
use crate::services::BackendClient;
use crate::services::export::write_export;
use crate::session::{BackendEvent, Session};
use crate::tui::component::{Command, Outcome};
use crate::tui::components::{ChatPanel, Dashboard, Prompt, PromptKind, PromptOutcome};
use crate::tui::{Action, ActionCategory, Component, Focusable, KeyBindings, Theme};
use color_eyre::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind};
use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
};
use std::path::{Path, PathBuf};
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel};
use tracing::{debug, error, info, warn};

/// Which panel receives keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Dashboard,
    Chat,
}

/// Application state
///
/// Owns the session, routes keys to the focused panel and runs backend calls
/// on the tokio runtime. Calls report back through a channel that the UI loop
/// drains with [`App::drain_events`].
pub struct App {
    session: Session,

    client: BackendClient,
    events_tx: UnboundedSender<BackendEvent>,
    events_rx: UnboundedReceiver<BackendEvent>,

    dashboard: Dashboard,
    chat: ChatPanel,

    /// Modal prompt (when active)
    prompt: Option<Prompt>,
    focus: Focus,
    show_help: bool,

    keybindings: KeyBindings,
    theme: Theme,
    export_dir: PathBuf,

    should_quit: bool,
}

impl App {
    /// Create a new App instance
    pub fn new(config: &Config) -> Result<Self> {
        let client = BackendClient::new(&config.backend)?;
        let keybindings = match &config.keybindings {
            Some(path) => KeyBindings::load_from_file(path)?,
            None => KeyBindings::default(),
        };
        for problem in keybindings.validate() {
            warn!("Keybindings: {problem}");
        }
        let (events_tx, events_rx) = unbounded_channel();

        Ok(Self {
            session: Session::new(config.table.clone()),
            client,
            events_tx,
            events_rx,
            dashboard: Dashboard::new(),
            chat: ChatPanel::new(),
            prompt: None,
            focus: Focus::Dashboard,
            show_help: false,
            keybindings,
            theme: Theme::from_name(config.theme),
            export_dir: config.export.directory.clone(),
            should_quit: false,
        })
    }

    // Backend work

    /// Read a CSV, parse it locally and upload it in the background.
    pub fn upload_file(&mut self, path: &Path) {
        let bytes = match std::fs::read(path) {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!("Could not read {}: {e}", path.display());
                self.session
                    .notice(format!("Could not read {}: {e}", path.display()));
                return;
            }
        };
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload.csv".to_string());

        self.session.load_csv(&name, &String::from_utf8_lossy(&bytes));
        self.session.begin_upload();

        let client = self.client.clone();
        let tx = self.events_tx.clone();
        tokio::spawn(async move {
            let result = client.upload_csv(&name, bytes).await;
            if tx.send(BackendEvent::Uploaded(result)).is_err() {
                debug!("Upload finished after the UI closed");
            }
        });
    }

    /// Send a question to the backend in the background.
    pub fn ask(&mut self, text: &str) {
        let Some(question) = self.session.submit_question(text) else {
            return;
        };
        let client = self.client.clone();
        let tx = self.events_tx.clone();
        tokio::spawn(async move {
            let result = client.ask(&question).await;
            if tx.send(BackendEvent::Answered { question, result }).is_err() {
                debug!("Answer arrived after the UI closed");
            }
        });
    }

    /// Apply every finished backend call. New windows take the selection.
    pub fn drain_events(&mut self) -> usize {
        let mut applied = 0;
        while let Ok(event) = self.events_rx.try_recv() {
            if let Some(id) = self.session.apply_event(event) {
                self.dashboard.select(id, &self.session);
            }
            applied += 1;
        }
        applied
    }

    // Input

    /// Handle a key event
    pub fn handle_key_event(&mut self, key: KeyEvent) -> Result<()> {
        // Only handle key press events, ignore release/repeat
        if key.kind != KeyEventKind::Press {
            return Ok(());
        }

        if let Some(prompt) = &mut self.prompt {
            match prompt.handle_key(&key) {
                PromptOutcome::Pending => {}
                PromptOutcome::Cancelled => self.prompt = None,
                PromptOutcome::Submitted(value) => {
                    if let Some(prompt) = self.prompt.take() {
                        self.submit_prompt(&prompt.kind, &value);
                    }
                }
            }
            return Ok(());
        }

        if self.focus == Focus::Chat && !self.show_help {
            if key.code == KeyCode::Esc {
                self.set_focus(Focus::Dashboard);
                return Ok(());
            }
            match self.chat.handle_key(&key) {
                Outcome::Ignored => {}
                outcome => return self.handle_outcome(outcome),
            }
        }

        // Translate key to action
        if let Some(action) = self.keybindings.get_action(&key) {
            self.handle_action(action)?;
        }
        Ok(())
    }

    /// Handle an action
    pub fn handle_action(&mut self, action: Action) -> Result<()> {
        if self.show_help {
            if matches!(action, Action::ToggleHelp | Action::Cancel | Action::Quit) {
                self.show_help = false;
            }
            return Ok(());
        }

        match action {
            Action::Quit => {
                self.should_quit = true;
                Ok(())
            }
            Action::ToggleHelp => {
                self.show_help = true;
                Ok(())
            }
            Action::FocusChat => {
                self.set_focus(Focus::Chat);
                Ok(())
            }
            Action::Cancel => {
                self.set_focus(Focus::Dashboard);
                Ok(())
            }
            Action::Upload => {
                let outcome = self.chat.handle_action(action, &mut self.session)?;
                self.handle_outcome(outcome)
            }
            _ => {
                let outcome = match self.focus {
                    Focus::Chat => self.chat.handle_action(action, &mut self.session)?,
                    Focus::Dashboard => self.dashboard.handle_action(action, &mut self.session)?,
                };
                self.handle_outcome(outcome)
            }
        }
    }

    fn handle_outcome(&mut self, outcome: Outcome) -> Result<()> {
        match outcome {
            Outcome::Command(command) => self.run_command(command),
            Outcome::Ignored | Outcome::Consumed => Ok(()),
        }
    }

    fn run_command(&mut self, command: Command) -> Result<()> {
        debug!("Running command {command:?}");
        match command {
            Command::Prompt(kind) => self.open_prompt(kind),
            Command::Ask(text) => self.ask(&text),
            Command::Upload(path) => self.upload_file(&path),
            Command::Export(id) => self.export(id)?,
            Command::Quit => self.should_quit = true,
        }
        Ok(())
    }

    fn open_prompt(&mut self, kind: PromptKind) {
        let current = match &kind {
            PromptKind::UploadPath => None,
            PromptKind::ColumnFilter { window, column } => self
                .session
                .window(*window)
                .and_then(|w| w.table())
                .and_then(|v| v.column_filter(column))
                .map(str::to_string),
            PromptKind::GlobalFilter { window } => self
                .session
                .window(*window)
                .and_then(|w| w.table())
                .map(|v| v.global_filter().to_string()),
        };
        self.prompt = Some(Prompt::new(kind, current.as_deref().unwrap_or("")));
    }

    fn submit_prompt(&mut self, kind: &PromptKind, value: &str) {
        match kind {
            PromptKind::UploadPath => {
                let path = value.trim();
                if !path.is_empty() {
                    self.upload_file(Path::new(path));
                }
            }
            _ => self.dashboard.apply_filter(kind, value, &mut self.session),
        }
    }

    fn export(&mut self, id: WindowId) -> Result<()> {
        let Some(export) = self.session.export_window(id)? else {
            self.session.notice("Nothing to export in this window.");
            return Ok(());
        };
        match write_export(&self.export_dir, &export) {
            Ok(path) => {
                info!("Exported window {id} to {}", path.display());
                self.session.notice(format!("Exported {}", path.display()));
            }
            Err(e) => {
                error!("Export of {} failed: {e}", export.file_name);
                self.session.notice(format!("Export failed: {e}"));
            }
        }
        Ok(())
    }

    fn set_focus(&mut self, focus: Focus) {
        self.focus = focus;
        self.chat.set_focused(focus == Focus::Chat);
        self.dashboard.set_focused(focus == Focus::Dashboard);
    }

    // Rendering

    pub fn render(&mut self, frame: &mut Frame) {
        let area = frame.area();
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(0), Constraint::Length(1)])
            .split(area);
        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(65), Constraint::Percentage(35)])
            .split(rows[0]);

        self.dashboard
            .render(frame, columns[0], &self.session, &self.theme);
        self.chat.render(frame, columns[1], &self.session, &self.theme);
        frame.render_widget(Paragraph::new(self.status_line()), rows[1]);

        if let Some(prompt) = &self.prompt {
            prompt.render(frame, area, &self.theme);
        }
        if self.show_help {
            self.render_help(frame, Self::centered_rect(70, 80, area));
        }
    }

    fn status_line(&self) -> Line<'static> {
        let hints = [
            Action::NextWindow,
            Action::FocusChat,
            Action::Upload,
            Action::ToggleHelp,
            Action::Quit,
        ];
        let text = hints
            .iter()
            .filter_map(|a| self.keybindings.hint(*a))
            .collect::<Vec<_>>()
            .join("  ");
        Line::from(Span::styled(text, self.theme.muted_style()))
    }

    fn render_help(&self, frame: &mut Frame, area: Rect) {
        let mut lines = Vec::new();
        for category in ActionCategory::all() {
            lines.push(Line::from(Span::styled(
                category.to_string(),
                self.theme.header_style(),
            )));
            for action in Action::all().into_iter().filter(|a| a.category() == category) {
                let keys = self.keybindings.get_keys_for_action(action).join(", ");
                lines.push(Line::from(vec![
                    Span::styled(format!("  {keys:<18}"), self.theme.info_style()),
                    Span::raw(action.description()),
                ]));
            }
            lines.push(Line::default());
        }
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(self.theme.border_style(true))
            .title(" Keys (? or Esc to close) ");
        frame.render_widget(Clear, area);
        frame.render_widget(Paragraph::new(lines).block(block), area);
    }

    /// Helper to create centered rectangle
    fn centered_rect(percent_w: u16, percent_h: u16, area: Rect) -> Rect {
        let width = (area.width * percent_w) / 100;
        let height = (area.height * percent_h) / 100;
        let x = area.x + (area.width.saturating_sub(width)) / 2;
        let y = area.y + (area.height.saturating_sub(height)) / 2;
        Rect {
            x,
            y,
            width,
            height,
        }
    }

    // Accessors

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut Session {
        &mut self.session
    }

    pub fn focus(&self) -> Focus {
        self.focus
    }

    pub fn prompt(&self) -> Option<&Prompt> {
        self.prompt.as_ref()
    }

    pub fn show_help(&self) -> bool {
        self.show_help
    }

    pub fn selected_window(&self) -> Option<WindowId> {
        self.dashboard.selected_id(&self.session)
    }

    /// Sender for backend events, for callers that run their own requests.
    pub fn event_sender(&self) -> UnboundedSender<BackendEvent> {
        self.events_tx.clone()
    }

    pub fn set_export_dir(&mut self, dir: impl Into<PathBuf>) {
        self.export_dir = dir.into();
    }

    /// Get reference to theme
    pub fn theme(&self) -> &Theme {
        &self.theme
    }

    /// Set theme
    pub fn set_theme(&mut self, theme: Theme) {
        self.theme = theme;
    }

    /// Get keybindings
    pub fn keybindings(&self) -> &KeyBindings {
        &self.keybindings
    }

    /// Set keybindings
    pub fn set_keybindings(&mut self, keybindings: KeyBindings) {
        self.keybindings = keybindings;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Row, TabularFrame};
    use crate::services::{Answer, AskResponse, UploadReceipt};
    use crate::session::MSG_ANALYZED;
    use crossterm::event::KeyModifiers;
    use ratatui::{Terminal, backend::TestBackend};
    use serde_json::json;
    use tempfile::TempDir;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn create_test_app() -> App {
        App::new(&Config::default()).unwrap()
    }

    fn uploaded(app: &App) {
        app.event_sender()
            .send(BackendEvent::Uploaded(Ok(UploadReceipt {
                status: 200,
                body: "{}".into(),
            })))
            .unwrap();
    }

    fn table_answer(app: &mut App, question: &str) {
        assert!(app.session_mut().submit_question(question).is_some());
        let frame = TabularFrame::new(
            vec!["Supplier".into(), "Qty".into()],
            vec![
                Row::from_pairs([("Supplier", json!("Acme")), ("Qty", json!(5))]),
                Row::from_pairs([("Supplier", json!("Globex")), ("Qty", json!(2))]),
            ],
        );
        app.event_sender()
            .send(BackendEvent::Answered {
                question: question.into(),
                result: Ok(AskResponse {
                    answer: Answer::Text("Two suppliers".into()),
                    is_dataframe: true,
                    dataframe: Some(frame),
                    chart: None,
                }),
            })
            .unwrap();
    }

    #[test]
    fn test_quit_action() {
        let mut app = create_test_app();
        assert!(!app.should_quit());
        app.handle_key_event(key(KeyCode::Char('q'))).unwrap();
        assert!(app.should_quit());
    }

    #[test]
    fn test_drain_applies_events_and_selects_window() {
        let mut app = create_test_app();
        uploaded(&app);
        assert_eq!(app.drain_events(), 1);
        assert!(app.session().can_ask());
        assert_eq!(app.session().messages().last().unwrap().text, MSG_ANALYZED);

        table_answer(&mut app, "show suppliers");
        assert_eq!(app.drain_events(), 1);
        let id = app.selected_window().unwrap();
        assert_eq!(app.session().window(id).unwrap().title, "Suppliers");
    }

    #[test]
    fn test_chat_focus_captures_typing() {
        let mut app = create_test_app();
        app.handle_key_event(key(KeyCode::Char('i'))).unwrap();
        assert_eq!(app.focus(), Focus::Chat);

        // 'q' is text while typing
        app.handle_key_event(key(KeyCode::Char('q'))).unwrap();
        assert!(!app.should_quit());

        app.handle_key_event(key(KeyCode::Esc)).unwrap();
        assert_eq!(app.focus(), Focus::Dashboard);
    }

    #[test]
    fn test_filter_prompt_round_trip() {
        let mut app = create_test_app();
        uploaded(&app);
        table_answer(&mut app, "show suppliers");
        app.drain_events();
        let id = app.selected_window().unwrap();

        app.handle_key_event(key(KeyCode::Char('f'))).unwrap();
        assert!(app.prompt().is_some());
        for c in "glo".chars() {
            app.handle_key_event(key(KeyCode::Char(c))).unwrap();
        }
        app.handle_key_event(key(KeyCode::Enter)).unwrap();
        assert!(app.prompt().is_none());

        let view = app.session().window(id).unwrap().table().unwrap();
        assert_eq!(view.column_filter("Supplier"), Some("glo"));
        assert_eq!(view.filtered_len(), 1);

        app.handle_key_event(key(KeyCode::Char('o'))).unwrap();
        app.handle_key_event(key(KeyCode::Esc)).unwrap();
        assert!(app.prompt().is_none());
    }

    #[test]
    fn test_export_writes_file() {
        let dir = TempDir::new().unwrap();
        let mut app = create_test_app();
        app.set_export_dir(dir.path());
        uploaded(&app);
        table_answer(&mut app, "show suppliers");
        app.drain_events();

        app.handle_key_event(key(KeyCode::Char('e'))).unwrap();
        let written = std::fs::read_to_string(dir.path().join("Suppliers.csv")).unwrap();
        assert_eq!(written, "Supplier,Qty\nAcme,5\nGlobex,2");
        assert!(app.session().messages().last().unwrap().text.starts_with("Exported"));
    }

    #[test]
    fn test_help_overlay_and_render() {
        let mut app = create_test_app();
        app.handle_key_event(key(KeyCode::Char('?'))).unwrap();
        assert!(app.show_help());

        let mut terminal = Terminal::new(TestBackend::new(120, 40)).unwrap();
        terminal.draw(|f| app.render(f)).unwrap();
        let text: String = terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect();
        assert!(text.contains("Data Operations"));

        // Other keys are swallowed while help is open
        app.handle_key_event(key(KeyCode::Char('q'))).unwrap();
        assert!(!app.should_quit());
        assert!(!app.show_help());
    }

    #[test]
    fn test_keybindings_management() {
        let mut app = create_test_app();
        app.set_keybindings(KeyBindings::default());
        assert!(!app.keybindings().get_keys_for_action(Action::Quit).is_empty());
        app.set_theme(Theme::light());
        assert_eq!(app.theme().name, "Light");
    }
}
