use crate::session::{ChatMessage, MessageKind, Sender, Session};
use crate::tui::action::Action;
use crate::tui::component::{Command, Component, Focusable, Outcome};
use crate::tui::components::prompt::{LineInput, PromptKind};
use crate::tui::theme::Theme;
use color_eyre::Result;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};

const BUSY_TEXT: &str = "Optix is thinking...";

/// Conversation transcript plus the question input.
pub struct ChatPanel {
    input: LineInput,
    focused: bool,
    /// Lines scrolled up from the newest message
    scroll: usize,
    supported_actions: Vec<Action>,
}

impl Default for ChatPanel {
    fn default() -> Self {
        Self::new()
    }
}

impl ChatPanel {
    pub fn new() -> Self {
        Self {
            input: LineInput::default(),
            focused: false,
            scroll: 0,
            supported_actions: vec![
                Action::MoveUp,
                Action::MoveDown,
                Action::FocusChat,
                Action::Upload,
            ],
        }
    }

    pub fn input(&self) -> &str {
        self.input.value()
    }

    /// Raw key handling while the input has focus. Enter submits the
    /// question; Esc is left to the app.
    pub fn handle_key(&mut self, key: &KeyEvent) -> Outcome {
        match key.code {
            KeyCode::Enter => {
                let text = self.input.take();
                self.scroll = 0;
                if text.trim().is_empty() {
                    Outcome::Consumed
                } else {
                    Outcome::Command(Command::Ask(text))
                }
            }
            KeyCode::Esc => Outcome::Ignored,
            KeyCode::PageUp | KeyCode::Up => {
                self.scroll += 1;
                Outcome::Consumed
            }
            KeyCode::PageDown | KeyCode::Down => {
                self.scroll = self.scroll.saturating_sub(1);
                Outcome::Consumed
            }
            _ => {
                if self.input.handle_key(key) {
                    Outcome::Consumed
                } else {
                    Outcome::Ignored
                }
            }
        }
    }

    fn message_lines(message: &ChatMessage, width: usize, theme: &Theme) -> Vec<Line<'static>> {
        let (who, who_style) = match message.sender {
            Sender::User => ("You", theme.user_style()),
            Sender::Bot => ("Optix", theme.bot_style().add_modifier(ratatui::style::Modifier::BOLD)),
        };
        let body_style = match message.kind {
            MessageKind::Notice => theme.warning_style(),
            MessageKind::Text if message.sender == Sender::User => theme.user_style(),
            MessageKind::Text => theme.normal_style(),
        };

        let mut lines = vec![Line::from(vec![
            Span::styled(who.to_string(), who_style),
            Span::styled(format!("  {}", message.at.format("%H:%M")), theme.muted_style()),
        ])];
        let wrap_width = width.saturating_sub(2).max(10);
        for part in message.text.lines() {
            for wrapped in textwrap::wrap(part, wrap_width) {
                lines.push(Line::from(Span::styled(format!("  {wrapped}"), body_style)));
            }
        }
        lines.push(Line::default());
        lines
    }
}

impl Component for ChatPanel {
    fn handle_action(&mut self, action: Action, _session: &mut Session) -> Result<Outcome> {
        Ok(match action {
            Action::MoveUp => {
                self.scroll += 1;
                Outcome::Consumed
            }
            Action::MoveDown => {
                self.scroll = self.scroll.saturating_sub(1);
                Outcome::Consumed
            }
            Action::FocusChat => {
                self.focused = true;
                Outcome::Consumed
            }
            Action::Upload => Outcome::Command(Command::Prompt(PromptKind::UploadPath)),
            _ => Outcome::Ignored,
        })
    }

    fn render(&mut self, frame: &mut Frame, area: Rect, session: &Session, theme: &Theme) {
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(theme.border_style(self.focused))
            .title(" Chat ");
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Min(1),
                Constraint::Length(1),
                Constraint::Length(3),
            ])
            .split(inner);

        let width = chunks[0].width as usize;
        let lines: Vec<Line> = session
            .messages()
            .iter()
            .flat_map(|m| Self::message_lines(m, width, theme))
            .collect();
        let height = chunks[0].height as usize;
        let max_scroll = lines.len().saturating_sub(height);
        self.scroll = self.scroll.min(max_scroll);
        let offset = max_scroll - self.scroll;
        frame.render_widget(
            Paragraph::new(lines).scroll((offset as u16, 0)),
            chunks[0],
        );

        if session.is_busy() {
            frame.render_widget(
                Paragraph::new(Span::styled(BUSY_TEXT, theme.info_style())),
                chunks[1],
            );
        }

        let placeholder = if session.can_ask() {
            "Ask about your inventory"
        } else {
            "Press o to upload a CSV"
        };
        let input_line = if self.input.value().is_empty() && !self.focused {
            Line::from(Span::styled(placeholder, theme.muted_style()))
        } else {
            self.input.line(theme)
        };
        let input_block = Block::default()
            .borders(Borders::ALL)
            .border_style(if self.focused {
                theme.border_style(true)
            } else {
                Style::default().fg(theme.border)
            })
            .title(" Question ");
        frame.render_widget(Paragraph::new(input_line).block(input_block), chunks[2]);
    }

    fn supported_actions(&self) -> &[Action] {
        &self.supported_actions
    }

    fn name(&self) -> &str {
        "ChatPanel"
    }
}

impl Focusable for ChatPanel {
    fn is_focused(&self) -> bool {
        self.focused
    }

    fn set_focused(&mut self, focused: bool) {
        self.focused = focused;
    }
}
